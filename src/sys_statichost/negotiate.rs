//! Sibling-file probes: precompressed variants first, then extension fallback.
//!
//! Every probe is a single awaited existence check, run one after another.
//! A failing probe counts as "absent" and never fails the send.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::sys_accept::EncodingPreference;
use crate::sys_statichost::core::{has_extension, with_suffix};
use crate::sys_statichost::fs::Filesystem;

/// Precompressed variants, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCoding {
    Brotli,
    Gzip,
}

impl ContentCoding {
    pub const PREFERENCE: [ContentCoding; 2] = [ContentCoding::Brotli, ContentCoding::Gzip];

    /// `Content-Encoding` token.
    pub fn token(self) -> &'static str {
        match self {
            ContentCoding::Brotli => "br",
            ContentCoding::Gzip => "gzip",
        }
    }

    /// Suffix of the sibling file on disk.
    pub fn suffix(self) -> &'static str {
        match self {
            ContentCoding::Brotli => ".br",
            ContentCoding::Gzip => ".gz",
        }
    }
}

/// Find a precompressed sibling of `path` the client prefers over identity.
pub async fn negotiate_encoding<F, A>(
    fs: &F,
    accepts: &A,
    path: &Path,
    brotli: bool,
    gzip: bool,
) -> Option<(PathBuf, ContentCoding)>
where
    F: Filesystem,
    A: EncodingPreference + Sync + ?Sized,
{
    for coding in ContentCoding::PREFERENCE {
        let enabled = match coding {
            ContentCoding::Brotli => brotli,
            ContentCoding::Gzip => gzip,
        };
        if !enabled || accepts.preferred(&[coding.token(), "identity"]) != Some(coding.token()) {
            continue;
        }

        let sibling = with_suffix(path, coding.suffix());
        if fs.exists(&sibling).await {
            debug!(path = %sibling.display(), encoding = coding.token(), "adopting precompressed sibling");
            return Some((sibling, coding));
        }
    }
    None
}

/// First `path + ext` that exists, for paths without an extension.
/// `extensions` must already start with a dot.
pub async fn search_extensions<F>(fs: &F, path: &Path, extensions: &[String]) -> Option<PathBuf>
where
    F: Filesystem,
{
    if has_extension(path) {
        return None;
    }

    for ext in extensions {
        let candidate = with_suffix(path, ext);
        if fs.exists(&candidate).await {
            debug!(path = %candidate.display(), "extension fallback hit");
            return Some(candidate);
        }
    }
    None
}
