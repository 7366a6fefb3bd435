//! Intent to AI-task identification.
//!
//! One free-text use-case description goes to the inference engine as a
//! single-conversation batch; the first prediction is read back as an
//! ordered list of task names. There is no retry here.

use std::sync::Arc;

use crate::error::IdentifyError;
use crate::inference::{chat_checked, ChatTurn, InferenceEngine};

const INSTRUCTION: &str = "You are an expert in AI system design. Identify the AI tasks \
needed to implement the use case below. Answer with a JSON array of task names only, most \
relevant first.";

/// Turns an intent into an ordered list of task names.
#[derive(Clone, Default)]
pub struct TaskIdentifier {
    engine: Option<Arc<dyn InferenceEngine>>,
    task_catalog: Vec<String>,
}

impl TaskIdentifier {
    /// Identifier backed by `engine`.
    #[must_use]
    pub fn new(engine: Arc<dyn InferenceEngine>) -> Self {
        Self {
            engine: Some(engine),
            task_catalog: Vec::new(),
        }
    }

    /// Identifier with no engine yet; [`identify`](Self::identify) fails with
    /// [`IdentifyError::EngineNotConfigured`] until one is set.
    #[must_use]
    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Restrict answers to known task names by listing them in the prompt.
    #[must_use]
    pub fn with_task_catalog(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.task_catalog = names.into_iter().map(Into::into).collect();
        self
    }

    /// Installs or replaces the engine.
    pub fn set_engine(&mut self, engine: Arc<dyn InferenceEngine>) {
        self.engine = Some(engine);
    }

    /// Returns true once an engine is installed.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.engine.is_some()
    }

    /// Identifies the tasks an intent calls for.
    ///
    /// # Errors
    /// - `EmptyInput`: blank intent; the engine is not called
    /// - `EngineNotConfigured`: no engine installed
    /// - `InferenceFailure`: the engine call failed or returned nothing
    pub fn identify(&self, intent: &str) -> Result<Vec<String>, IdentifyError> {
        if intent.trim().is_empty() {
            return Err(IdentifyError::EmptyInput);
        }
        let engine = self
            .engine
            .as_deref()
            .ok_or(IdentifyError::EngineNotConfigured)?;

        let conversation = vec![ChatTurn::user(self.prompt(intent))];
        let predictions = chat_checked(engine, std::slice::from_ref(&conversation)).map_err(|e| {
            tracing::warn!(model = engine.model_name(), error = %e, "task identification failed");
            IdentifyError::InferenceFailure {
                message: e.to_string(),
            }
        })?;

        let tasks = predictions
            .first()
            .map(|p| parse_task_list(&p.text))
            .unwrap_or_default();
        tracing::debug!(model = engine.model_name(), tasks = tasks.len(), "identified tasks");
        Ok(tasks)
    }

    fn prompt(&self, intent: &str) -> String {
        let mut prompt = String::from(INSTRUCTION);
        if !self.task_catalog.is_empty() {
            prompt.push_str("\n\nChoose only from these tasks: ");
            prompt.push_str(&self.task_catalog.join(", "));
        }
        prompt.push_str("\n\nUse case: ");
        prompt.push_str(intent);
        prompt
    }
}

impl std::fmt::Debug for TaskIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskIdentifier")
            .field("configured", &self.is_configured())
            .field("task_catalog", &self.task_catalog.len())
            .finish()
    }
}

/// Parses model output into task names.
///
/// A JSON array of strings anywhere in the text wins. Otherwise the answer
/// is read line by line: when any line is a list item (bullet or number),
/// only list items count; lines ending in `:` are headings and never count.
/// Markers and bold markup are stripped, and repeated names are kept once,
/// at their first position.
#[must_use]
pub fn parse_task_list(text: &str) -> Vec<String> {
    let names = json_array(text).unwrap_or_else(|| {
        let lines: Vec<(bool, &str)> = text
            .lines()
            .map(strip_list_marker)
            .filter(|(_, line)| !line.is_empty() && !line.ends_with(':'))
            .collect();
        let any_listed = lines.iter().any(|(listed, _)| *listed);
        lines
            .into_iter()
            .filter(|(listed, _)| *listed || !any_listed)
            .map(|(_, line)| line.to_string())
            .collect()
    });

    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if !name.is_empty() && !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

fn json_array(text: &str) -> Option<Vec<String>> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Strips a bullet or `N.`/`N)` prefix; the flag says whether one was there.
fn strip_list_marker(line: &str) -> (bool, &str) {
    let line = line.trim();
    let bulleted = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "));
    let (listed, rest) = match bulleted {
        Some(rest) => (true, rest),
        None => {
            let digits = line.chars().take_while(char::is_ascii_digit).count();
            let numbered = (digits > 0)
                .then(|| &line[digits..])
                .and_then(|rest| rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")));
            numbered.map_or((false, line), |rest| (true, rest))
        }
    };
    let rest = rest.trim();
    let unbolded = rest
        .strip_prefix("**")
        .and_then(|l| l.strip_suffix("**"))
        .unwrap_or(rest)
        .trim();
    (listed, unbolded)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::error::InferenceError;
    use crate::inference::{Conversation, Prediction};

    struct Scripted {
        reply: Result<String, InferenceError>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl InferenceEngine for Scripted {
        fn chat(&self, conversations: &[Conversation]) -> Result<Vec<Prediction>, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(conversations.len(), 1);
            self.reply.clone().map(|text| vec![Prediction::text(text)])
        }
    }

    #[test]
    fn returns_engine_task_list_in_order() {
        let engine = Scripted::ok(r#"["Question Answering", "Summarization"]"#);
        let identifier = TaskIdentifier::new(engine.clone());
        let tasks = identifier
            .identify("Summarize claims and answer agent questions")
            .unwrap();
        assert_eq!(tasks, vec!["Question Answering", "Summarization"]);
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn blank_intent_never_reaches_engine() {
        let engine = Scripted::ok("[]");
        let identifier = TaskIdentifier::new(engine.clone());
        assert_eq!(identifier.identify(""), Err(IdentifyError::EmptyInput));
        assert_eq!(identifier.identify("   "), Err(IdentifyError::EmptyInput));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_engine_is_reported() {
        let identifier = TaskIdentifier::unconfigured();
        assert_eq!(
            identifier.identify("classify tickets"),
            Err(IdentifyError::EngineNotConfigured)
        );
    }

    #[test]
    fn engine_failure_becomes_inference_failure() {
        let engine = Arc::new(Scripted {
            reply: Err(InferenceError::failed("rate limited")),
            calls: AtomicUsize::new(0),
        });
        let err = TaskIdentifier::new(engine).identify("x").unwrap_err();
        assert_eq!(
            err,
            IdentifyError::InferenceFailure {
                message: "Inference call failed: rate limited".to_string()
            }
        );
    }

    #[test]
    fn parses_markdown_lists_without_preamble() {
        let text = "Here are the tasks:\n1. **Question Answering**\n2. Summarization\n- Text Classification\n\nLet me know if you need more.";
        assert_eq!(
            parse_task_list(text),
            vec!["Question Answering", "Summarization", "Text Classification"]
        );
    }

    #[test]
    fn plain_lines_are_tasks_when_nothing_is_listed() {
        let text = "Tasks:\nSummarization\nTranslation";
        assert_eq!(parse_task_list(text), vec!["Summarization", "Translation"]);
    }

    #[test]
    fn parses_embedded_json_and_dedups() {
        let text = "Answer: [\"Summarization\", \"Summarization\", \" Translation \"]";
        assert_eq!(parse_task_list(text), vec!["Summarization", "Translation"]);
    }

    #[test]
    fn prompt_lists_catalog() {
        let identifier = TaskIdentifier::unconfigured().with_task_catalog(["Summarization", "Translation"]);
        let prompt = identifier.prompt("translate manuals");
        assert!(prompt.contains("Summarization, Translation"));
        assert!(prompt.ends_with("Use case: translate manuals"));
    }
}
