//! Transport-specific error types

use thiserror::Error;
use std::io;

/// Transport-specific errors
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request could not be completed
    #[error("Gateway request error: {0}")]
    Http(String),

    /// Gateway replied with a non-success status
    #[error("Gateway status {code}: {message}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Response body, verbatim
        message: String,
    },

    /// Reply body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Protocol error in a mailbox payload
    #[error("Protocol error: {0}")]
    Protocol(#[from] aorelay_proto::ProtocolError),

    /// Key file is missing, unreadable or malformed
    #[error("Credential error: {0}")]
    Credential(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}
