//! Inference-specific error types

use thiserror::Error;

/// Inference-specific errors
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Network error reaching the inference service
    #[error("Network error: {0}")]
    Network(String),

    /// Request exceeded the configured timeout
    #[error("Inference request timed out")]
    Timeout,

    /// Service replied with a non-success status
    #[error("Inference service error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body, verbatim
        message: String,
    },

    /// Reply body did not have the expected shape
    #[error("Invalid inference response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err.to_string())
        }
    }
}
