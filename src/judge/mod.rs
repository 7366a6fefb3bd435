//! Binary judges over LLM output.
//!
//! A [`Judge`] owns a two-entry [`LabelVocabulary`]: the tokens the model is
//! asked to emit (e.g. `"no"`/`"yes"`) and the class names they map to.
//! [`Guardian`] is the log-probability based implementation.

mod guardian;
pub mod score;

pub use guardian::{Guardian, RowScore};
pub use score::{extract_label, ExtractedLabel, LabelSource};

use serde::{Deserialize, Serialize};

use crate::error::JudgeError;

/// The two output label tokens and their class names, in matching order.
///
/// Index 0 is the negative class, index 1 the positive class; probability
/// rows are laid out the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelVocabulary {
    output_labels: [String; 2],
    label_names: [String; 2],
}

impl LabelVocabulary {
    /// Creates a vocabulary.
    ///
    /// # Errors
    /// `InvalidVocabulary` if a label is blank or both labels are equal.
    pub fn new(
        output_labels: [impl Into<String>; 2],
        label_names: [impl Into<String>; 2],
    ) -> Result<Self, JudgeError> {
        let output_labels = output_labels.map(Into::into);
        let label_names = label_names.map(Into::into);

        if output_labels.iter().any(|l| l.trim().is_empty()) {
            return Err(JudgeError::InvalidVocabulary {
                reason: "output labels must not be blank".to_string(),
            });
        }
        if output_labels[0] == output_labels[1] {
            return Err(JudgeError::InvalidVocabulary {
                reason: format!("output labels must differ, both are '{}'", output_labels[0]),
            });
        }

        Ok(Self {
            output_labels,
            label_names,
        })
    }

    /// The label tokens.
    #[must_use]
    pub const fn output_labels(&self) -> &[String; 2] {
        &self.output_labels
    }

    /// The class names.
    #[must_use]
    pub const fn label_names(&self) -> &[String; 2] {
        &self.label_names
    }

    /// Position of `label` by exact membership.
    #[must_use]
    pub fn position(&self, label: &str) -> Option<usize> {
        self.output_labels.iter().position(|l| l == label)
    }

    /// Class name for `label`.
    ///
    /// # Errors
    /// `UnknownLabel` if `label` is not one of the output labels.
    pub fn name_for(&self, label: &str) -> Result<&str, JudgeError> {
        self.position(label)
            .map(|idx| self.label_names[idx].as_str())
            .ok_or_else(|| JudgeError::UnknownLabel {
                label: label.to_string(),
            })
    }
}

impl Default for LabelVocabulary {
    fn default() -> Self {
        Self {
            output_labels: ["no".to_string(), "yes".to_string()],
            label_names: ["No".to_string(), "Yes".to_string()],
        }
    }
}

/// Serializable judge settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeConfig {
    /// Tokens the model emits, negative class first.
    pub output_labels: Vec<String>,
    /// Class names returned by `classify`, same order.
    pub label_names: Vec<String>,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        let vocabulary = LabelVocabulary::default();
        Self {
            output_labels: vocabulary.output_labels.to_vec(),
            label_names: vocabulary.label_names.to_vec(),
        }
    }
}

impl TryFrom<&JudgeConfig> for LabelVocabulary {
    type Error = JudgeError;

    fn try_from(config: &JudgeConfig) -> Result<Self, Self::Error> {
        let pair = |values: &[String], what: &str| -> Result<[String; 2], JudgeError> {
            match values {
                [a, b] => Ok([a.clone(), b.clone()]),
                _ => Err(JudgeError::InvalidVocabulary {
                    reason: format!("expected exactly 2 {what}, got {}", values.len()),
                }),
            }
        };
        Self::new(
            pair(&config.output_labels, "output labels")?,
            pair(&config.label_names, "label names")?,
        )
    }
}

/// What is being judged: a bare prompt, or a prompt and the response to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JudgeInput {
    /// A single user prompt.
    Prompt(String),
    /// A prompt followed by an assistant response.
    Exchange {
        /// The user prompt.
        prompt: String,
        /// The assistant response under judgement.
        response: String,
    },
}

impl From<&str> for JudgeInput {
    fn from(prompt: &str) -> Self {
        Self::Prompt(prompt.to_string())
    }
}

impl From<String> for JudgeInput {
    fn from(prompt: String) -> Self {
        Self::Prompt(prompt)
    }
}

impl<P: Into<String>, R: Into<String>> From<(P, R)> for JudgeInput {
    fn from((prompt, response): (P, R)) -> Self {
        Self::Exchange {
            prompt: prompt.into(),
            response: response.into(),
        }
    }
}

/// A scorer turning engine output into a label or a probability row.
pub trait Judge: Send + Sync {
    /// The label vocabulary.
    fn vocabulary(&self) -> &LabelVocabulary;

    /// Classifies one input and returns the class name.
    ///
    /// # Errors
    /// `UnknownLabel` when the model's label is outside the vocabulary;
    /// `Inference` when the engine call fails.
    fn classify(&self, input: &JudgeInput) -> Result<String, JudgeError>;

    /// Probability rows `[p(label 0), p(label 1)]`, one per input whose label
    /// matched the vocabulary. Rows for other labels are dropped, so the row
    /// count may be smaller than the input count.
    ///
    /// # Errors
    /// `MissingLogprob` when a matched label has no log-probability;
    /// `Inference` when the engine call fails.
    fn predict_proba(&self, inputs: &[String]) -> Result<Vec<[f64; 2]>, JudgeError>;
}
