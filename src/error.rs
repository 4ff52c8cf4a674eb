//! Failures raised while resolving and sending a file.

use std::io;

use hyper::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SendError {
    /// The request path could not be decoded or is otherwise unusable.
    #[error("{0}")]
    BadRequest(&'static str),

    /// Nothing on disk answers to the request path.
    #[error("not found: {0}")]
    NotFound(#[source] io::Error),

    /// Any other filesystem failure while looking at the target.
    #[error("filesystem error: {0}")]
    Server(#[source] io::Error),

    /// Programmer error in the options or the call itself.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SendError {
    pub fn status(&self) -> StatusCode {
        match self {
            SendError::BadRequest(_) => StatusCode::BAD_REQUEST,
            SendError::NotFound(_) => StatusCode::NOT_FOUND,
            SendError::Server(_) | SendError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the message is safe to show to the client.
    pub fn expose(&self) -> bool {
        self.status().is_client_error()
    }
}

impl From<serde_json::Error> for SendError {
    fn from(err: serde_json::Error) -> Self {
        SendError::Config(err.to_string())
    }
}
