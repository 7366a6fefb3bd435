use std::sync::Arc;

use serde::Serialize;

use crate::error::JudgeError;
use crate::inference::{chat_checked, ChatTurn, Conversation, InferenceEngine, Prediction};
use crate::judge::score::extract_label;
use crate::judge::{Judge, JudgeConfig, JudgeInput, LabelVocabulary};

/// Outcome of scoring one row of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowScore {
    /// `[p(label 0), p(label 1)]`.
    Scored {
        /// The probability row.
        probs: [f64; 2],
    },
    /// The model emitted a label outside the vocabulary.
    Dropped {
        /// What the model emitted.
        label: String,
    },
    /// The label matched, but the engine reported no log-probability for it.
    MissingLogprob {
        /// The matched label.
        label: String,
    },
}

impl RowScore {
    /// The probability row, if scored.
    #[must_use]
    pub const fn probs(&self) -> Option<[f64; 2]> {
        match self {
            Self::Scored { probs } => Some(*probs),
            _ => None,
        }
    }
}

/// Log-probability judge over an [`InferenceEngine`].
///
/// The model is expected to answer with one of the two vocabulary labels,
/// optionally wrapped as `<score>LABEL</score>`. The confidence of the
/// emitted label is `exp(logprob)`; the other class gets the complement.
#[derive(Clone)]
pub struct Guardian {
    engine: Arc<dyn InferenceEngine>,
    vocabulary: LabelVocabulary,
}

impl Guardian {
    /// Creates a guardian with an explicit vocabulary.
    #[must_use]
    pub fn new(engine: Arc<dyn InferenceEngine>, vocabulary: LabelVocabulary) -> Self {
        Self { engine, vocabulary }
    }

    /// Creates a guardian from serialized settings.
    ///
    /// # Errors
    /// `InvalidVocabulary` if the configured labels are not a valid pair.
    pub fn from_config(engine: Arc<dyn InferenceEngine>, config: &JudgeConfig) -> Result<Self, JudgeError> {
        Ok(Self::new(engine, LabelVocabulary::try_from(config)?))
    }

    /// Scores every input in one engine batch and reports each row's fate.
    ///
    /// Inputs are trimmed and sent as single-turn user conversations. The
    /// result has one entry per input, in order.
    ///
    /// # Errors
    /// `Inference` when the engine call fails or breaks the one-output-per-
    /// conversation contract.
    pub fn score_batch(&self, inputs: &[String]) -> Result<Vec<RowScore>, JudgeError> {
        let conversations: Vec<Conversation> = inputs
            .iter()
            .map(|input| vec![ChatTurn::user(input.trim())])
            .collect();
        let predictions = chat_checked(self.engine.as_ref(), &conversations)?;

        let rows: Vec<RowScore> = predictions.iter().map(|p| self.score_prediction(p)).collect();
        tracing::debug!(
            model = self.engine.model_name(),
            rows = rows.len(),
            scored = rows.iter().filter(|r| r.probs().is_some()).count(),
            "scored batch"
        );
        Ok(rows)
    }

    fn score_prediction(&self, prediction: &Prediction) -> RowScore {
        let extracted = extract_label(&prediction.text);
        let Some(position) = self.vocabulary.position(extracted.label) else {
            return RowScore::Dropped {
                label: extracted.label.to_string(),
            };
        };
        let Some(logprob) = prediction.token_logprob(extracted.label) else {
            return RowScore::MissingLogprob {
                label: extracted.label.to_string(),
            };
        };

        let p = logprob.exp();
        let probs = if position == 0 { [p, 1.0 - p] } else { [1.0 - p, p] };
        RowScore::Scored { probs }
    }

    fn conversation(input: &JudgeInput) -> Conversation {
        match input {
            JudgeInput::Prompt(prompt) => vec![ChatTurn::user(prompt.as_str())],
            JudgeInput::Exchange { prompt, response } => vec![
                ChatTurn::user(prompt.as_str()),
                ChatTurn::assistant(response.as_str()),
            ],
        }
    }
}

impl Judge for Guardian {
    fn vocabulary(&self) -> &LabelVocabulary {
        &self.vocabulary
    }

    fn classify(&self, input: &JudgeInput) -> Result<String, JudgeError> {
        let conversation = Self::conversation(input);
        let predictions = chat_checked(self.engine.as_ref(), std::slice::from_ref(&conversation))?;
        let text = predictions.first().map_or("", |p| p.text.as_str());

        let extracted = extract_label(text);
        let name = self.vocabulary.name_for(extracted.label).map_err(|e| {
            tracing::warn!(
                label = extracted.label,
                source = ?extracted.source,
                "judge label outside vocabulary"
            );
            e
        })?;
        Ok(name.to_string())
    }

    fn predict_proba(&self, inputs: &[String]) -> Result<Vec<[f64; 2]>, JudgeError> {
        let rows = self.score_batch(inputs)?;
        let mut probs = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            match row {
                RowScore::Scored { probs: row } => probs.push(row),
                RowScore::Dropped { label } => {
                    tracing::debug!(index, %label, "dropping row with unrecognised label");
                }
                RowScore::MissingLogprob { label } => {
                    return Err(JudgeError::MissingLogprob { index, label });
                }
            }
        }
        Ok(probs)
    }
}

impl std::fmt::Debug for Guardian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guardian")
            .field("model", &self.engine.model_name())
            .field("vocabulary", &self.vocabulary)
            .finish()
    }
}
