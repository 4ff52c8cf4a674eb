//! HTTP glue: read `Accept-Encoding` off a hyper request.

use hyper::header::ACCEPT_ENCODING;
use hyper::{HeaderMap, Request};

use crate::sys_accept::core::AcceptEncoding;

impl AcceptEncoding {
    /// Combines repeated `Accept-Encoding` headers; non-UTF-8 values are skipped.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let values: Vec<&str> = headers
            .get_all(ACCEPT_ENCODING)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect();

        if values.is_empty() {
            Self::parse(None)
        } else {
            Self::parse(Some(&values.join(",")))
        }
    }

    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self::from_headers(req.headers())
    }
}
