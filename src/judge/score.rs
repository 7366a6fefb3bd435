//! The `<score>…</score>` structured-output convention.
//!
//! Grammar: an optional `<score>LABEL</score>` wrapper anywhere in the text
//! (first occurrence wins, content trimmed); without one, the whole trimmed
//! text is the label.

use std::sync::OnceLock;

use regex::Regex;

const SCORE_PATTERN: &str = r"<score>(.*?)</score>";

static SCORE_RE: OnceLock<Regex> = OnceLock::new();

fn score_regex() -> &'static Regex {
    SCORE_RE.get_or_init(|| Regex::new(SCORE_PATTERN).expect("score pattern is a valid regex"))
}

/// Where a label token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelSource {
    /// Content of a `<score>` tag.
    Tagged,
    /// No tag was present; the raw text was used.
    RawText,
}

/// A label token read from model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractedLabel<'a> {
    /// The trimmed label token.
    pub label: &'a str,
    /// Whether it came from a tag.
    pub source: LabelSource,
}

/// Trimmed content of the first `<score>` tag, if any.
///
/// Like the pattern's `.`, a tag does not span lines.
#[must_use]
pub fn score_tag(text: &str) -> Option<&str> {
    score_regex()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Reads the label token from `text`, falling back to the raw text.
#[must_use]
pub fn extract_label(text: &str) -> ExtractedLabel<'_> {
    match score_tag(text) {
        Some(label) => ExtractedLabel {
            label,
            source: LabelSource::Tagged,
        },
        None => ExtractedLabel {
            label: text.trim(),
            source: LabelSource::RawText,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_label() {
        let got = extract_label("Reasoning...\n<score> yes </score>");
        assert_eq!(got.label, "yes");
        assert_eq!(got.source, LabelSource::Tagged);
    }

    #[test]
    fn test_first_tag_wins() {
        assert_eq!(score_tag("<score>no</score><score>yes</score>"), Some("no"));
    }

    #[test]
    fn test_raw_text_fallback() {
        let got = extract_label("yes\n");
        assert_eq!(got.label, "yes");
        assert_eq!(got.source, LabelSource::RawText);
    }

    #[test]
    fn test_unclosed_tag_falls_back() {
        let got = extract_label("<score>yes");
        assert_eq!(got.label, "<score>yes");
        assert_eq!(got.source, LabelSource::RawText);
    }

    #[test]
    fn test_tag_does_not_span_lines() {
        assert_eq!(score_tag("<score>\nyes\n</score>"), None);
    }

    #[test]
    fn test_empty_tag() {
        assert_eq!(score_tag("<score></score>"), Some(""));
    }
}
