//! Inference client abstraction

use async_trait::async_trait;

use crate::error::InferenceError;

/// Capability interface for single-turn text inference
///
/// Implementations may block for seconds; callers decide how to schedule
/// around that. No retry or backoff is performed at this boundary.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Run a single prompt through the model and return the completion
    async fn infer(&self, prompt: &str) -> Result<String, InferenceError>;
}
