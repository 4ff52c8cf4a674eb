//! Resolve request paths to files under a root directory and stream them
//! into hyper responses.
//!
//! The request path is percent-decoded and clamped under the root, dotfiles
//! are skipped, `.br`/`.gz` siblings are preferred when the client accepts
//! them, extensionless paths may fall back to a list of extensions, and
//! directories are served through their index file. `Content-Length`,
//! `Last-Modified`, `Cache-Control` and `Content-Type` come from the file.
//!
//! ```no_run
//! use hyper::{Body, Request, Response};
//! use smn_send::{SendOptions, StaticSender, handler_static};
//!
//! # async fn route(req: Request<Body>) -> Result<Response<Body>, smn_send::SendError> {
//! let sender = StaticSender::new(SendOptions::new().root("static").index("index.html"))?;
//! if let Some(res) = handler_static(&sender, &req).await {
//!     return Ok(res);
//! }
//! // not ours: hand the request to the next handler
//! # Ok(Response::new(Body::empty()))
//! # }
//! ```

pub mod error;
pub mod sys_accept;
pub mod sys_statichost;

pub use error::SendError;
pub use sys_accept::{AcceptEncoding, EncodingPreference};
pub use sys_statichost::{
    DiskFilesystem, FileMeta, Filesystem, ResponseHandle, SendOptions, Sent, SkipReason,
    StaticSender, error_response, handler_static, send,
};
