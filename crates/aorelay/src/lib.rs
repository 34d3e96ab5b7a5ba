//! # Aorelay
//!
//! A polling relay between a decentralized process mailbox and a local
//! inference service.
//!
//! On a fixed interval the relay fetches pending requests addressed to a
//! process, drops the ones it has already accepted, and answers each new
//! one by running its content through an inference client and submitting
//! the completion back to the mailbox as a signed response.

#![warn(missing_docs)]

pub use aorelay_proto as proto;

/// Error types for the Aorelay library
pub mod error;

/// Deduplication ledger for admitted requests
pub mod ledger;

/// Poll loop and request handling
pub mod relay;

pub use error::RelayError;
pub use ledger::Ledger;
pub use relay::{Relay, RelayConfig};

/// Result type alias for Aorelay operations
pub type Result<T> = std::result::Result<T, RelayError>;
