//! Content-coding negotiation from `Accept-Encoding`.

pub mod core;
pub mod handlers;

pub use self::core::{AcceptEncoding, EncodingPreference};
