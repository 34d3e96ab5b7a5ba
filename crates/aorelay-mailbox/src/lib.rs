//! # Aorelay Mailbox
//!
//! Remote mailbox transport layer for Aorelay.

#![warn(missing_docs)]

/// Mailbox abstraction and gateway implementation
pub mod client;

/// Signing identity loaded from a key file
pub mod wallet;

/// Transport-specific error types
pub mod error;

pub use client::{GatewayMailbox, Mailbox, MailboxConfig};
pub use wallet::WalletIdentity;
pub use error::TransportError;
