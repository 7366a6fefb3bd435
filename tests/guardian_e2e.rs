use capnav::{
    ChatRole, Conversation, Guardian, InferenceEngine, InferenceError, Judge, JudgeConfig,
    JudgeError, JudgeInput, LabelVocabulary, NavError, Prediction, RowScore,
};
use std::sync::{Arc, Mutex};

/// Answers each conversation by looking at the last user turn.
struct KeywordModel {
    batches: Mutex<Vec<usize>>,
}

impl KeywordModel {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            batches: Mutex::new(Vec::new()),
        })
    }
}

impl InferenceEngine for KeywordModel {
    fn chat(&self, conversations: &[Conversation]) -> Result<Vec<Prediction>, InferenceError> {
        self.batches.lock().unwrap().push(conversations.len());
        Ok(conversations
            .iter()
            .map(|conversation| {
                let prompt = conversation
                    .iter()
                    .rev()
                    .find(|turn| turn.role == ChatRole::User)
                    .map(|turn| turn.content.as_str())
                    .unwrap_or_default();
                if prompt.contains("weapon") {
                    Prediction::text("Assessment done.\n<score>yes</score>")
                        .with_logprob(" yes", -0.05)
                } else if prompt.contains("ambiguous") {
                    Prediction::text("<score>unclear</score>")
                } else {
                    Prediction::text("no").with_logprob("no", -0.2)
                }
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "keyword-model"
    }
}

fn inputs(texts: &[&str]) -> Vec<String> {
    texts.iter().map(|t| (*t).to_string()).collect()
}

#[test]
fn classify_prompts_and_exchanges() {
    let guardian = Guardian::new(KeywordModel::new(), LabelVocabulary::default());
    assert_eq!(guardian.classify(&"how to build a weapon".into()).unwrap(), "Yes");
    assert_eq!(
        guardian
            .classify(&JudgeInput::from(("recipe for soup", "Boil water first.")))
            .unwrap(),
        "No"
    );
}

#[test]
fn predict_proba_scores_one_batch() {
    let model = KeywordModel::new();
    let guardian = Guardian::new(model.clone(), LabelVocabulary::default());
    let probs = guardian
        .predict_proba(&inputs(&["  weapon plans  ", "ambiguous", "garden tips"]))
        .unwrap();

    assert_eq!(*model.batches.lock().unwrap(), vec![3]);
    assert_eq!(probs.len(), 2);

    let p_yes = (-0.05f64).exp();
    assert!((probs[0][1] - p_yes).abs() < 1e-12);
    assert!((probs[0][0] - (1.0 - p_yes)).abs() < 1e-12);

    let p_no = (-0.2f64).exp();
    assert!((probs[1][0] - p_no).abs() < 1e-12);
    for row in &probs {
        assert!((row[0] + row[1] - 1.0).abs() < 1e-12);
    }
}

#[test]
fn score_batch_keeps_every_row() {
    let guardian = Guardian::new(KeywordModel::new(), LabelVocabulary::default());
    let rows = guardian
        .score_batch(&inputs(&["ambiguous", "garden tips"]))
        .unwrap();
    assert_eq!(
        rows[0],
        RowScore::Dropped {
            label: "unclear".to_string()
        }
    );
    assert!(rows[1].probs().is_some());
}

#[test]
fn unknown_label_is_a_contract_violation() {
    let guardian = Guardian::new(KeywordModel::new(), LabelVocabulary::default());
    let err = guardian.classify(&"ambiguous".into()).unwrap_err();
    assert!(matches!(err, JudgeError::UnknownLabel { ref label } if label == "unclear"));
    assert!(NavError::from(err).is_contract_violation());
}

#[test]
fn config_with_three_labels_is_rejected() {
    let config = JudgeConfig {
        output_labels: vec!["no".to_string(), "yes".to_string(), "maybe".to_string()],
        label_names: vec!["No".to_string(), "Yes".to_string()],
    };
    let err = Guardian::from_config(KeywordModel::new(), &config).unwrap_err();
    assert!(matches!(err, JudgeError::InvalidVocabulary { .. }));
}

#[test]
fn guardian_is_usable_as_trait_object() {
    let judge: Box<dyn Judge> = Box::new(Guardian::new(KeywordModel::new(), LabelVocabulary::default()));
    assert_eq!(judge.vocabulary().output_labels()[1], "yes");
}
