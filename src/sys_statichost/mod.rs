//! Static file sending: sandboxed resolution, precompressed siblings,
//! extension fallback, directory index and cache headers.

pub mod core;
pub mod fs;
pub mod handlers;
pub mod headers;
pub mod negotiate;
pub mod options;

pub use self::fs::{DiskFilesystem, FileMeta, FileReader, Filesystem};
pub use self::handlers::{
    FileBody, ResponseHandle, Sent, SkipReason, error_response, handler_static, send,
};
pub use self::negotiate::ContentCoding;
pub use self::options::{HeaderHook, SendOptions, StaticSender};
