//! HTTP glue: resolve a request path under the root and stream the file
//! back through a response handle.

use std::io;
use std::path::{Path, PathBuf};

use hyper::header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, HeaderName, HeaderValue};
use hyper::{Body, Request, Response};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use crate::error::SendError;
use crate::sys_accept::{AcceptEncoding, EncodingPreference};
use crate::sys_statichost::core::{is_hidden, normalize_request, resolve_under_root};
use crate::sys_statichost::fs::{DiskFilesystem, FileMeta, FileReader, Filesystem};
use crate::sys_statichost::headers::derive_headers;
use crate::sys_statichost::negotiate::{ContentCoding, negotiate_encoding, search_extensions};
use crate::sys_statichost::options::{SendOptions, StaticSender};

/// Body attached to the response on success.
pub type FileBody = ReaderStream<FileReader>;

/// The parts of a response the sender touches.
pub trait ResponseHandle {
    fn header(&self, name: &HeaderName) -> Option<&HeaderValue>;
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);
    fn remove_header(&mut self, name: &HeaderName);
    fn set_body(&mut self, body: FileBody);
}

impl ResponseHandle for Response<Body> {
    fn header(&self, name: &HeaderName) -> Option<&HeaderValue> {
        self.headers().get(name)
    }

    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers_mut().insert(name, value);
    }

    fn remove_header(&mut self, name: &HeaderName) {
        self.headers_mut().remove(name);
    }

    fn set_body(&mut self, body: FileBody) {
        *self.body_mut() = Body::wrap_stream(body);
    }
}

/// Why a request was left for the next handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// A segment below the root starts with a dot.
    Hidden,
    /// The target is a directory and no index applies.
    Directory,
}

/// Successful outcome of a send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    /// The file at this absolute path is streaming into the response.
    Served(PathBuf),
    /// Nothing was touched; the caller should pass the request on.
    Skipped(SkipReason),
}

impl StaticSender {
    /// Resolve `raw_path` under the root and stream the file into `res`.
    ///
    /// Probes run strictly in order: compressed siblings, extension
    /// fallback, then stat. `res` is only modified when the file is served.
    pub async fn send<R, A, F>(
        &self,
        res: &mut R,
        accepts: &A,
        fs: &F,
        raw_path: &str,
    ) -> Result<Sent, SendError>
    where
        R: ResponseHandle + Send,
        A: EncodingPreference + Sync + ?Sized,
        F: Filesystem,
    {
        debug!(path = raw_path, options = ?self.options, "send");
        if raw_path.is_empty() {
            return Err(SendError::Config("pathname required".to_string()));
        }

        let request = normalize_request(raw_path)?;
        let relative = request.with_index(self.index.as_deref());
        let mut path = resolve_under_root(&self.root, &relative);

        if !self.options.hidden && is_hidden(&self.root, &path) {
            debug!(path = %path.display(), "hidden path skipped");
            return Ok(Sent::Skipped(SkipReason::Hidden));
        }

        let mut coding = None;
        if let Some((sibling, found)) =
            negotiate_encoding(fs, accepts, &path, self.options.brotli, self.options.gzip).await
        {
            path = sibling;
            coding = Some(found);
        }

        if let Some(extensions) = &self.extensions {
            if let Some(found) = search_extensions(fs, &path, extensions).await {
                path = found;
            }
        }

        let Some(meta) = self.resolve_metadata(fs, &mut path, &mut coding).await? else {
            debug!(path = %path.display(), "directory without index skipped");
            return Ok(Sent::Skipped(SkipReason::Directory));
        };

        let reader = fs.open(&path).await.map_err(|err| classify(err, &path))?;

        if let Some(coding) = coding {
            res.set_header(CONTENT_ENCODING, HeaderValue::from_static(coding.token()));
            res.remove_header(&CONTENT_LENGTH);
        }
        let encoding_suffix = coding.map(ContentCoding::suffix).unwrap_or("");
        derive_headers(res, &path, &meta, encoding_suffix, &self.options);
        res.set_body(ReaderStream::new(reader));

        debug!(path = %path.display(), size = meta.size, "serving");
        Ok(Sent::Served(path))
    }

    /// Stat the target, stepping into `index` once for directories.
    ///
    /// `None` means the target is a directory that cannot be served.
    async fn resolve_metadata<F: Filesystem>(
        &self,
        fs: &F,
        path: &mut PathBuf,
        coding: &mut Option<ContentCoding>,
    ) -> Result<Option<FileMeta>, SendError> {
        let meta = fs
            .stat(path.as_path())
            .await
            .map_err(|err| classify(err, path.as_path()))?;
        if !meta.is_dir {
            return Ok(Some(meta));
        }

        let index = match &self.index {
            Some(index) if self.options.format => index,
            _ => return Ok(None),
        };

        // the index goes through the same sandbox as the request path
        let below = path.strip_prefix(&self.root).unwrap_or(Path::new("")).join(index);
        *path = resolve_under_root(&self.root, below);
        // the directory is not the compressed body anymore
        *coding = None;
        debug!(path = %path.display(), "directory, trying index");

        let meta = fs
            .stat(path.as_path())
            .await
            .map_err(|err| classify(err, path.as_path()))?;
        Ok(if meta.is_dir { None } else { Some(meta) })
    }
}

/// Split filesystem failures into "not found" and everything else.
fn classify(err: io::Error, path: &Path) -> SendError {
    match err.kind() {
        io::ErrorKind::NotFound
        | io::ErrorKind::NotADirectory
        | io::ErrorKind::InvalidFilename => SendError::NotFound(err),
        _ => {
            warn!(path = %path.display(), error = %err, "stat failed");
            SendError::Server(err)
        }
    }
}

/// One-shot send with options checked on every call.
pub async fn send<R, A, F>(
    res: &mut R,
    accepts: &A,
    fs: &F,
    raw_path: &str,
    options: SendOptions,
) -> Result<Sent, SendError>
where
    R: ResponseHandle + Send,
    A: EncodingPreference + Sync + ?Sized,
    F: Filesystem,
{
    StaticSender::new(options)?.send(res, accepts, fs, raw_path).await
}

/// Try to serve a file for this request from disk.
/// Returns `None` when the request should fall through to the next handler.
pub async fn handler_static(sender: &StaticSender, req: &Request<Body>) -> Option<Response<Body>> {
    let accepts = AcceptEncoding::from_request(req);
    let mut res = Response::new(Body::empty());

    match sender
        .send(&mut res, &accepts, &DiskFilesystem, req.uri().path())
        .await
    {
        Ok(Sent::Served(_)) => Some(res),
        Ok(Sent::Skipped(_)) => None,
        Err(err) => Some(error_response(&err)),
    }
}

/// Plain-text error response; server-side detail is not exposed.
pub fn error_response(err: &SendError) -> Response<Body> {
    let status = err.status();
    let message = if err.expose() {
        err.to_string()
    } else {
        status.canonical_reason().unwrap_or("Internal Server Error").to_string()
    };

    let mut res = Response::new(Body::from(message));
    *res.status_mut() = status;
    res.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    res
}
