//! Inference engine contract.
//!
//! The engine is an external collaborator: given a batch of conversations it
//! returns one [`Prediction`] per conversation, in order. Retries, timeouts
//! and batching strategy are the engine's business, not this crate's.

mod chat;

pub use chat::{ChatRole, ChatTurn, Conversation, Prediction};

use crate::error::InferenceError;

/// A chat-completion backend.
pub trait InferenceEngine: Send + Sync {
    /// Runs every conversation and returns one prediction per conversation,
    /// in input order.
    fn chat(&self, conversations: &[Conversation]) -> Result<Vec<Prediction>, InferenceError>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str {
        "unknown"
    }
}

/// Calls `engine` and checks that it honoured the one-output-per-input
/// contract.
pub fn chat_checked(
    engine: &dyn InferenceEngine,
    conversations: &[Conversation],
) -> Result<Vec<Prediction>, InferenceError> {
    let predictions = engine.chat(conversations)?;
    if predictions.len() != conversations.len() {
        return Err(InferenceError::ResponseCountMismatch {
            expected: conversations.len(),
            actual: predictions.len(),
        });
    }
    Ok(predictions)
}
