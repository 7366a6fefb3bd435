use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Author of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    /// The human (or caller) side.
    User,
    /// The model side.
    Assistant,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Who wrote the turn.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
}

impl ChatTurn {
    /// A user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// An assistant turn.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// An ordered sequence of turns sent to the engine as one unit.
pub type Conversation = Vec<ChatTurn>;

/// Raw output of one conversation.
///
/// `logprobs` maps token strings to natural-log probabilities. Engines
/// that do not report them leave the map empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Generated text.
    pub text: String,

    /// Token log-probabilities, possibly empty.
    #[serde(default)]
    pub logprobs: HashMap<String, f64>,
}

impl Prediction {
    /// A prediction with text only.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            logprobs: HashMap::new(),
        }
    }

    /// Adds a token log-probability.
    #[must_use]
    pub fn with_logprob(mut self, token: impl Into<String>, logprob: f64) -> Self {
        self.logprobs.insert(token.into(), logprob);
        self
    }

    /// Log-probability of `token`, falling back to the single-leading-space
    /// variant models often emit.
    #[must_use]
    pub fn token_logprob(&self, token: &str) -> Option<f64> {
        self.logprobs
            .get(token)
            .or_else(|| self.logprobs.get(&format!(" {token}")))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_constructors() {
        assert_eq!(ChatTurn::user("hi").role, ChatRole::User);
        assert_eq!(ChatTurn::assistant("hello").role, ChatRole::Assistant);
        assert_eq!(ChatRole::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_token_logprob_prefers_bare_token() {
        let p = Prediction::text("yes")
            .with_logprob("yes", -0.1)
            .with_logprob(" yes", -2.0);
        assert_eq!(p.token_logprob("yes"), Some(-0.1));
    }

    #[test]
    fn test_token_logprob_space_fallback() {
        let p = Prediction::text("no").with_logprob(" no", -0.5);
        assert_eq!(p.token_logprob("no"), Some(-0.5));
        assert_eq!(p.token_logprob("yes"), None);
    }

    #[test]
    fn test_prediction_deserializes_without_logprobs() {
        let p: Prediction = serde_json::from_str(r#"{"text": "<score>no</score>"}"#).unwrap();
        assert!(p.logprobs.is_empty());
    }
}
