//! # Aorelay LLM
//!
//! Inference client support for Aorelay.

#![warn(missing_docs)]

/// Inference client abstraction
pub mod client;

/// Ollama chat client
pub mod ollama;

/// Inference-specific error types
pub mod error;

pub use client::InferenceClient;
pub use ollama::{OllamaClient, OllamaConfig};
pub use error::InferenceError;
