//! Error types for capnav.
//!
//! All errors are strongly typed using thiserror so callers can
//! pattern match on the exact failure. Batch stages never surface these
//! for a single item: per-item failures are recorded in the stage outcome.

use thiserror::Error;

use crate::storage::StoreError;

/// Errors produced while turning an intent into a task list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifyError {
    #[error("Please enter a use case description.")]
    EmptyInput,

    #[error("Please configure the inference engine first.")]
    EngineNotConfigured,

    #[error("Error identifying tasks: {message}")]
    InferenceFailure {
        message: String,
    },
}

/// Errors surfaced by an [`InferenceEngine`](crate::inference::InferenceEngine).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InferenceError {
    #[error("Inference engine is not configured")]
    EngineNotConfigured,

    #[error("Inference call failed: {message}")]
    Failed {
        message: String,
    },

    #[error("Inference returned {actual} predictions for {expected} conversations")]
    ResponseCountMismatch {
        expected: usize,
        actual: usize,
    },
}

impl InferenceError {
    /// Creates a generic inference failure.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Errors produced by a [`Judge`](crate::judge::Judge).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JudgeError {
    #[error("Label '{label}' is not part of the judge vocabulary")]
    UnknownLabel {
        label: String,
    },

    #[error("No log-probability for label '{label}' in prediction {index}")]
    MissingLogprob {
        index: usize,
        label: String,
    },

    #[error("Invalid label vocabulary: {reason}")]
    InvalidVocabulary {
        reason: String,
    },

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Top-level error type for capnav.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("Identification error: {0}")]
    Identify(#[from] IdentifyError),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Judge error: {0}")]
    Judge(#[from] JudgeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl NavError {
    /// Returns true if this error came from the knowledge store.
    #[must_use]
    pub const fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Returns true if the model output broke the structured-output contract.
    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::Judge(JudgeError::UnknownLabel { .. } | JudgeError::MissingLogprob { .. })
        )
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Inference(InferenceError::Failed { .. })
            | Self::Judge(JudgeError::Inference(InferenceError::Failed { .. }))
            | Self::Identify(IdentifyError::InferenceFailure { .. }) => true,
            Self::Store(e) => matches!(e, StoreError::BackendError(_)),
            _ => false,
        }
    }
}

/// Result type alias for capnav operations.
pub type NavResult<T> = Result<T, NavError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_error_messages() {
        assert_eq!(
            IdentifyError::EmptyInput.to_string(),
            "Please enter a use case description."
        );
        let err = IdentifyError::InferenceFailure {
            message: "timeout".to_string(),
        };
        assert_eq!(err.to_string(), "Error identifying tasks: timeout");
    }

    #[test]
    fn test_judge_error_unknown_label() {
        let err = JudgeError::UnknownLabel {
            label: "maybe".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("maybe"));
    }

    #[test]
    fn test_judge_error_from_inference() {
        let err: JudgeError = InferenceError::failed("boom").into();
        assert!(matches!(err, JudgeError::Inference(_)));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_contract_violation_classification() {
        let err = NavError::from(JudgeError::MissingLogprob {
            index: 2,
            label: "yes".to_string(),
        });
        assert!(err.is_contract_violation());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(NavError::from(InferenceError::failed("503")).is_retryable());
        assert!(!NavError::from(IdentifyError::EmptyInput).is_retryable());
        assert!(NavError::from(StoreError::BackendError("down".to_string())).is_retryable());
        assert!(!NavError::from(StoreError::UnknownClass("x".to_string())).is_retryable());
    }
}
