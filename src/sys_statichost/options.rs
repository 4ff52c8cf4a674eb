//! Options for a send, and the validated sender built from them.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde::de::{self, Deserializer, SeqAccess, Visitor};

use crate::error::SendError;
use crate::sys_statichost::core::normalize_root;
use crate::sys_statichost::fs::FileMeta;
use crate::sys_statichost::handlers::ResponseHandle;

type HeaderFn = dyn Fn(&mut dyn ResponseHandle, &Path, &FileMeta) + Send + Sync;

/// Caller hook run on the response before the built-in headers are derived.
#[derive(Clone)]
pub struct HeaderHook(Arc<HeaderFn>);

impl HeaderHook {
    pub fn call(&self, res: &mut dyn ResponseHandle, path: &Path, meta: &FileMeta) {
        (self.0)(res, path, meta)
    }
}

impl fmt::Debug for HeaderHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HeaderHook(..)")
    }
}

/// Per-send options. Deserializes from documents using the familiar
/// option names (`maxAge`, `hidden`, `format`, ...); `max_age` is given
/// in milliseconds there.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SendOptions {
    pub(crate) root: Option<PathBuf>,
    pub(crate) index: Option<String>,
    #[serde(alias = "maxage", alias = "maxAge", deserialize_with = "millis")]
    pub(crate) max_age: Duration,
    pub(crate) immutable: bool,
    pub(crate) hidden: bool,
    pub(crate) format: bool,
    #[serde(deserialize_with = "extension_list")]
    pub(crate) extensions: Option<Vec<String>>,
    pub(crate) brotli: bool,
    pub(crate) gzip: bool,
    #[serde(skip)]
    pub(crate) set_headers: Option<HeaderHook>,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            root: None,
            index: None,
            max_age: Duration::ZERO,
            immutable: false,
            hidden: false,
            format: true,
            extensions: None,
            brotli: true,
            gzip: true,
            set_headers: None,
        }
    }
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(doc: &str) -> Result<Self, SendError> {
        Ok(serde_json::from_str(doc)?)
    }

    /// Directory files are served from. Defaults to the working directory.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// File served for paths ending in `/` and for directories.
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn immutable(mut self, immutable: bool) -> Self {
        self.immutable = immutable;
        self
    }

    /// Allow serving dotfiles and anything under dot-directories.
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Serve `dir/index` for `dir` requested without a trailing slash.
    pub fn format(mut self, format: bool) -> Self {
        self.format = format;
        self
    }

    /// Extensions tried in order when the path has none, e.g. `["html", ".json"]`.
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }

    pub fn brotli(mut self, brotli: bool) -> Self {
        self.brotli = brotli;
        self
    }

    pub fn gzip(mut self, gzip: bool) -> Self {
        self.gzip = gzip;
        self
    }

    pub fn set_headers<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut dyn ResponseHandle, &Path, &FileMeta) + Send + Sync + 'static,
    {
        self.set_headers = Some(HeaderHook(Arc::new(hook)));
        self
    }
}

fn millis<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    // fractions floor, negatives clamp to zero
    let ms = f64::deserialize(deserializer)?;
    if ms.is_nan() {
        return Err(de::Error::custom("max age must be a number"));
    }
    Ok(Duration::from_millis(ms.max(0.0).floor() as u64))
}

const EXTENSIONS_MSG: &str = "option extensions must be array of strings or false";

fn extension_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ExtensionList;

    impl<'de> Visitor<'de> for ExtensionList {
        type Value = Option<Vec<String>>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an array of strings or false")
        }

        fn visit_bool<E: de::Error>(self, enabled: bool) -> Result<Self::Value, E> {
            if enabled {
                Err(E::custom(EXTENSIONS_MSG))
            } else {
                Ok(None)
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut list = Vec::new();
            loop {
                match seq.next_element::<String>() {
                    Ok(Some(ext)) => list.push(ext),
                    Ok(None) => return Ok(Some(list)),
                    Err(_) => return Err(de::Error::custom(EXTENSIONS_MSG)),
                }
            }
        }
    }

    deserializer.deserialize_any(ExtensionList)
}

/// Options checked once, with the root made absolute and extensions
/// normalized. Cheap to share across requests.
#[derive(Debug, Clone)]
pub struct StaticSender {
    pub(crate) root: PathBuf,
    pub(crate) index: Option<String>,
    pub(crate) extensions: Option<Vec<String>>,
    pub(crate) options: SendOptions,
}

impl StaticSender {
    pub fn new(options: SendOptions) -> Result<Self, SendError> {
        let root = normalize_root(options.root.as_deref()).map_err(SendError::Server)?;
        let index = options.index.clone().filter(|index| !index.is_empty());

        let extensions = match &options.extensions {
            Some(list) if !list.is_empty() => {
                let mut normalized = Vec::with_capacity(list.len());
                for ext in list {
                    normalized.push(normalize_extension(ext)?);
                }
                Some(normalized)
            }
            _ => None,
        };

        Ok(Self {
            root,
            index,
            extensions,
            options,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> &SendOptions {
        &self.options
    }
}

fn normalize_extension(ext: &str) -> Result<String, SendError> {
    if ext.is_empty() || ext == "." || ext.contains(['/', '\\']) {
        return Err(SendError::Config(format!("invalid extension {ext:?}")));
    }
    if ext.starts_with('.') {
        Ok(ext.to_string())
    } else {
        Ok(format!(".{ext}"))
    }
}
