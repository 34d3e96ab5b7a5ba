//! # Aorelay Protocol
//!
//! Wire types and payload parsing for the Aorelay process mailbox.

#![warn(missing_docs)]

/// Mailbox message types and payload parsing
pub mod message;

/// Error types for protocol operations
pub mod error;

pub use message::{
    DryrunQuery, DryrunReply, MailboxMessage, PendingRequest, ResponsePayload, SignedEnvelope, Tag,
};
pub use error::ProtocolError;
