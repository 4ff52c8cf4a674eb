//! Shared fixtures for the send tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use hyper::header::HeaderName;
use hyper::{Body, Response};
use smn_send::sys_statichost::{FileMeta, FileReader, Filesystem};
use tempfile::TempDir;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A site tree:
///
/// ```text
/// index.html  file.js  file.js.br  file.js.gz  page.json  about.html
/// styles.css  .secret  .git/config  docs/index.html  sub/readme.txt
/// ```
pub fn site() -> TempDir {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    for (rel, contents) in [
        ("index.html", "<h1>home</h1>"),
        ("file.js", "console.log('plain');"),
        ("file.js.br", "BR"),
        ("file.js.gz", "GZIP"),
        ("page.json", "{}"),
        ("about.html", "<p>about</p>"),
        ("styles.css", "body{}"),
        (".secret", "hunter2"),
        (".git/config", "[core]"),
        ("docs/index.html", "<h1>docs</h1>"),
        ("sub/readme.txt", "read me"),
    ] {
        write(dir.path(), rel, contents);
    }
    dir
}

pub fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

pub fn header<'a>(res: &'a Response<Body>, name: HeaderName) -> Option<&'a str> {
    res.headers().get(name).and_then(|v| v.to_str().ok())
}

pub async fn body_string(res: Response<Body>) -> String {
    let bytes = hyper::body::to_bytes(res.into_body()).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub enum Entry {
    File(&'static str),
    Dir,
    Fail(io::ErrorKind),
}

/// In-memory filesystem that records every call it receives.
#[derive(Default)]
pub struct MemoryFs {
    entries: HashMap<PathBuf, Entry>,
    calls: Mutex<Vec<String>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, entry: Entry) -> Self {
        self.entries.insert(PathBuf::from(path), entry);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str, path: &Path) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{op} {}", path.display()));
    }
}

impl Filesystem for MemoryFs {
    async fn exists(&self, path: &Path) -> bool {
        self.record("exists", path);
        matches!(self.entries.get(path), Some(Entry::File(_) | Entry::Dir))
    }

    async fn stat(&self, path: &Path) -> io::Result<FileMeta> {
        self.record("stat", path);
        let modified = Some(SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000_000));
        match self.entries.get(path) {
            Some(Entry::File(contents)) => Ok(FileMeta {
                size: contents.len() as u64,
                modified,
                is_dir: false,
            }),
            Some(Entry::Dir) => Ok(FileMeta {
                size: 4096,
                modified,
                is_dir: true,
            }),
            Some(Entry::Fail(kind)) => Err(io::Error::from(*kind)),
            None => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }

    async fn open(&self, path: &Path) -> io::Result<FileReader> {
        self.record("open", path);
        match self.entries.get(path) {
            Some(Entry::File(contents)) => Ok(Box::pin(io::Cursor::new(contents.as_bytes().to_vec()))),
            Some(Entry::Fail(kind)) => Err(io::Error::from(*kind)),
            _ => Err(io::Error::from(io::ErrorKind::NotFound)),
        }
    }
}
