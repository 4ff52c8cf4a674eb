//! Filesystem capability the sender probes and reads through.

use std::future::Future;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::time::SystemTime;

use tokio::io::AsyncRead;

/// Byte source handed to the response body.
pub type FileReader = Pin<Box<dyn AsyncRead + Send>>;

/// What the sender needs to know about a resolved path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub is_dir: bool,
}

impl From<std::fs::Metadata> for FileMeta {
    fn from(meta: std::fs::Metadata) -> Self {
        Self {
            size: meta.len(),
            modified: meta.modified().ok(),
            is_dir: meta.is_dir(),
        }
    }
}

pub trait Filesystem: Send + Sync {
    /// Best-effort existence check. Errors read as "absent".
    fn exists(&self, path: &Path) -> impl Future<Output = bool> + Send;

    fn stat(&self, path: &Path) -> impl Future<Output = io::Result<FileMeta>> + Send;

    fn open(&self, path: &Path) -> impl Future<Output = io::Result<FileReader>> + Send;
}

/// The real disk, through tokio's blocking-pool file APIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskFilesystem;

impl Filesystem for DiskFilesystem {
    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    async fn stat(&self, path: &Path) -> io::Result<FileMeta> {
        tokio::fs::metadata(path).await.map(FileMeta::from)
    }

    async fn open(&self, path: &Path) -> io::Result<FileReader> {
        let file = tokio::fs::File::open(path).await?;
        Ok(Box::pin(file))
    }
}
