//! Pure path logic: decoding, sandboxing under a root, hidden segments.
//! No Hyper types and no I/O here.

use std::ffi::OsStr;
use std::io;
use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

use crate::error::SendError;

/// The request path after decoding, before it touches the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    /// Decoded path with any leading root marker removed.
    pub relative: String,
    /// Whether the raw path ended in `/`. Decided before decoding.
    pub trailing_slash: bool,
}

impl RequestPath {
    /// Relative path with `index` appended when the request named a directory.
    pub fn with_index(&self, index: Option<&str>) -> String {
        match index {
            Some(index) if self.trailing_slash => format!("{}{}", self.relative, index),
            _ => self.relative.clone(),
        }
    }
}

/// Strip the leading root marker and percent-decode the rest.
pub fn normalize_request(raw: &str) -> Result<RequestPath, SendError> {
    let trailing_slash = raw.ends_with('/');
    let stripped = raw.trim_start_matches('/');

    let relative = decode_path(stripped).ok_or(SendError::BadRequest("failed to decode"))?;
    if relative.contains('\0') {
        return Err(SendError::BadRequest("malicious path"));
    }

    Ok(RequestPath {
        relative,
        trailing_slash,
    })
}

/// Strict percent-decoding: every `%` must start a two-digit hex escape
/// and the decoded bytes must be UTF-8.
pub fn decode_path(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let escape = bytes.get(i + 1..i + 3)?;
            if !escape.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    percent_decode_str(encoded)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// Make `root` absolute and lexically normal. An empty or missing root
/// means the current working directory.
pub fn normalize_root(root: Option<&Path>) -> io::Result<PathBuf> {
    let root = match root {
        Some(root) if root.is_absolute() => root.to_path_buf(),
        Some(root) if !root.as_os_str().is_empty() => std::env::current_dir()?.join(root),
        _ => std::env::current_dir()?,
    };

    let mut normalized = PathBuf::new();
    for component in root.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component.as_os_str())
            }
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
        }
    }
    Ok(normalized)
}

/// Join `relative` under `root` so the result can never leave `root`.
///
/// `..` segments that would climb above `root` are dropped, as are root
/// and drive markers embedded in the request, so `../../etc/passwd`
/// lands on `root/etc/passwd`.
pub fn resolve_under_root(root: &Path, relative: impl AsRef<Path>) -> PathBuf {
    let mut normalized = PathBuf::new();
    let mut depth = 0usize;

    for component in relative.as_ref().components() {
        match component {
            Component::Normal(segment) => {
                normalized.push(segment);
                depth += 1;
            }
            Component::ParentDir if depth > 0 => {
                normalized.pop();
                depth -= 1;
            }
            Component::ParentDir | Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    let resolved = root.join(normalized);
    if resolved.starts_with(root) {
        resolved
    } else {
        root.to_path_buf()
    }
}

/// True when a segment below `root` starts with a dot.
///
/// Segments of `root` itself are never inspected.
pub fn is_hidden(root: &Path, path: &Path) -> bool {
    let below = path.strip_prefix(root).unwrap_or(path);
    below.components().any(|component| match component {
        Component::Normal(segment) => segment.as_encoded_bytes().first() == Some(&b'.'),
        _ => false,
    })
}

/// True when the last segment contains a dot.
pub fn has_extension(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.as_encoded_bytes().contains(&b'.'))
        .unwrap_or(false)
}

/// Append a raw suffix to the final segment, e.g. `app.js` + `.br`.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}

/// Extension describing the content of `path`, looking through a
/// compressed-sibling suffix if one was adopted.
pub fn content_extension<'a>(path: &'a Path, encoding_suffix: &str) -> Option<&'a str> {
    let name = path.file_name().and_then(OsStr::to_str)?;
    let name = if encoding_suffix.is_empty() {
        name
    } else {
        name.strip_suffix(encoding_suffix).unwrap_or(name)
    };
    Path::new(name).extension().and_then(OsStr::to_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> PathBuf {
        PathBuf::from("/srv/www")
    }

    #[test]
    fn trailing_slash_comes_from_the_raw_path() {
        let req = normalize_request("/docs/").unwrap();
        assert!(req.trailing_slash);
        assert_eq!(req.relative, "docs/");

        // an encoded slash does not count
        let req = normalize_request("/docs%2F").unwrap();
        assert!(!req.trailing_slash);
        assert_eq!(req.relative, "docs/");
    }

    #[test]
    fn leading_root_markers_are_stripped() {
        assert_eq!(normalize_request("///etc/passwd").unwrap().relative, "etc/passwd");
    }

    #[test]
    fn malformed_escapes_are_rejected() {
        for raw in ["/%zz", "/a%", "/a%4", "/%E0%A4%A"] {
            let err = normalize_request(raw).unwrap_err();
            assert!(err.to_string().contains("failed to decode"), "{raw}");
        }
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(decode_path("%ff%fe").is_none());
    }

    #[test]
    fn plus_is_not_a_space() {
        assert_eq!(decode_path("a+b%20c").as_deref(), Some("a+b c"));
    }

    #[test]
    fn nul_bytes_are_malicious() {
        let err = normalize_request("/a%00.txt").unwrap_err();
        assert_eq!(err.to_string(), "malicious path");
    }

    #[test]
    fn index_only_appended_for_trailing_slash() {
        let dir = normalize_request("/").unwrap();
        assert_eq!(dir.with_index(Some("index.html")), "index.html");

        let file = normalize_request("/about").unwrap();
        assert_eq!(file.with_index(Some("index.html")), "about");
        assert_eq!(dir.with_index(None), "");
    }

    #[test]
    fn traversal_never_escapes_root() {
        let corpus = [
            "../../etc/passwd",
            "a/../../../etc/passwd",
            "/etc/passwd",
            "..",
            "./../.",
            "a/b/../../..",
            "....//....//etc",
        ];
        for input in corpus {
            let resolved = resolve_under_root(&root(), input);
            assert!(resolved.starts_with(root()), "{input} -> {}", resolved.display());
        }
        assert_eq!(
            resolve_under_root(&root(), "../../etc/passwd"),
            PathBuf::from("/srv/www/etc/passwd")
        );
    }

    #[test]
    fn decoded_dot_segments_are_clamped() {
        let req = normalize_request("/%2e%2e%2fsecret").unwrap();
        assert_eq!(req.relative, "../secret");
        assert_eq!(
            resolve_under_root(&root(), &req.relative),
            PathBuf::from("/srv/www/secret")
        );
    }

    #[test]
    fn parents_inside_root_still_work() {
        assert_eq!(
            resolve_under_root(&root(), "css/../js/app.js"),
            PathBuf::from("/srv/www/js/app.js")
        );
        assert_eq!(resolve_under_root(&root(), ""), root());
    }

    #[test]
    fn absolute_relative_paths_are_rebased() {
        assert_eq!(
            resolve_under_root(&root(), Path::new("d").join("/etc/passwd")),
            PathBuf::from("/srv/www/etc/passwd")
        );
    }

    #[test]
    fn root_is_made_absolute_and_normal() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(normalize_root(None).unwrap(), cwd);
        assert_eq!(normalize_root(Some(Path::new(""))).unwrap(), cwd);
        assert_eq!(normalize_root(Some(Path::new("public/./x/.."))).unwrap(), cwd.join("public"));
        assert_eq!(
            normalize_root(Some(Path::new("/srv/../srv/www/"))).unwrap(),
            root()
        );
    }

    #[test]
    fn hidden_segments_below_root() {
        assert!(is_hidden(&root(), Path::new("/srv/www/.secret")));
        assert!(is_hidden(&root(), Path::new("/srv/www/.git/config")));
        assert!(!is_hidden(&root(), Path::new("/srv/www/a.b/c")));

        // dotted components of the root itself are not checked
        let dotted = PathBuf::from("/home/me/.site");
        assert!(!is_hidden(&dotted, Path::new("/home/me/.site/index.html")));
    }

    #[test]
    fn extension_detection_uses_last_segment() {
        assert!(has_extension(Path::new("/srv/www/app.js")));
        assert!(has_extension(Path::new("/srv/www/.profile")));
        assert!(!has_extension(Path::new("/srv/www/v1.2/page")));
    }

    #[test]
    fn content_extension_looks_through_encoding() {
        assert_eq!(content_extension(Path::new("/a/app.js.br"), ".br"), Some("js"));
        assert_eq!(content_extension(Path::new("/a/app.js.gz"), ".gz"), Some("js"));
        assert_eq!(content_extension(Path::new("/a/archive.gz"), ""), Some("gz"));
        assert_eq!(content_extension(Path::new("/a/README"), ""), None);
    }

    #[test]
    fn suffix_is_appended_to_the_name() {
        assert_eq!(with_suffix(Path::new("/a/app.js"), ".br"), PathBuf::from("/a/app.js.br"));
    }
}
