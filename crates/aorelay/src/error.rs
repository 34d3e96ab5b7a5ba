//! Error types for the Aorelay library

use thiserror::Error;

/// Main error type for Aorelay operations
///
/// Per-cycle and per-request failures (transport, inference) are
/// contained in their originating step and surface only in logs, so
/// nothing propagates out of the poll loop but lifecycle misuse.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Relay lifecycle misuse
    #[error("Relay state error: {0}")]
    State(String),
}
