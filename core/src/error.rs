//! Error types for the request helpers.
//!
//! # Design
//! Each stage of a round trip fails in its own variant so callers can tell
//! "nothing was sent" (`InvalidRequest`, `Serialization`) from "the server
//! answered with an error" (`Status`) and "the server answered with something
//! we could not read" (`Decode`). Nothing is retried or logged here; every
//! error goes back to the caller.

/// Errors returned by `RestClient` and the free request functions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be built: empty URL, unknown method, or a header
    /// the HTTP layer refuses.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The client configuration is inconsistent.
    #[error("invalid client config: {0}")]
    Config(String),

    /// The request payload could not be encoded as JSON. No request was sent.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// DNS, connect, TLS, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// The server returned a status outside `[200, 300)`.
    #[error("code: {status}, status: {status_text}, body: {}", String::from_utf8_lossy(.body))]
    Status {
        status: u16,
        status_text: String,
        body: Vec<u8>,
    },

    /// The response body is not valid JSON for the expected type.
    #[error("deserialization failed: {0}")]
    Decode(#[source] serde_json::Error),
}

impl Error {
    /// Status code of a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw body of a non-2xx response.
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Error::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Transport(ureq::Error::Timeout(_)))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
