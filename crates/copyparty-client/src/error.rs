//! Error type for copyparty operations.

use crate::redact::sanitize_reqwest_error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CopypartyError {
    /// Invalid connection configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Arguments that cannot be turned into a request (e.g. malformed base64 upload data).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// copyparty answered with a non-2xx status. `body` is the response body as sent.
    #[error("copyparty returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// The request never produced a response (connect/DNS/TLS/read failure).
    #[error("http transport error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, CopypartyError>;

impl From<reqwest::Error> for CopypartyError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(sanitize_reqwest_error(&value))
    }
}

impl CopypartyError {
    /// HTTP status of a remote failure.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}
