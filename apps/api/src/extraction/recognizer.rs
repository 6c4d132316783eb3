//! Entity Recognizer: turns token-classification output into person-name
//! candidates.
//!
//! The model itself sits behind [`EntityTagger`]. `AppState` carries it as
//! `Arc<dyn EntityTagger>`, loaded once at startup; tests inject a mock.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::extraction::normalizer::NormalizedText;

/// Max gap (in characters) between two person spans that still belong to one name.
const MERGE_GAP_CHARS: usize = 5;

#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed model response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One labelled span as returned by a token-classification model.
///
/// `start`/`end` are character offsets into the text that was tagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedSpan {
    pub word: String,
    #[serde(alias = "entity_group", alias = "entity")]
    pub label: String,
    pub score: f32,
    pub start: usize,
    pub end: usize,
}

/// Read-only token-classification capability.
pub trait EntityTagger: Send + Sync {
    /// Short backend label for logs ("huggingface", "disabled", ...).
    fn backend(&self) -> &str;

    fn tag(&self, text: &str) -> Result<Vec<TaggedSpan>, TaggerError>;
}

/// Tagger used when no model is configured. Always returns no spans, so name
/// resolution runs on the heading heuristic alone.
pub struct DisabledTagger;

impl EntityTagger for DisabledTagger {
    fn backend(&self) -> &str {
        "disabled"
    }

    fn tag(&self, _text: &str) -> Result<Vec<TaggedSpan>, TaggerError> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Model,
    Heuristic,
}

/// A possible candidate name. `start` is a byte offset into the normalized text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameCandidate {
    pub text: String,
    pub start: usize,
    pub score: f32,
    pub source: CandidateSource,
}

/// Tags the first `window_chars` characters and returns person candidates in
/// order of appearance. Tagger failures degrade to "no candidates".
pub fn recognize_names(
    tagger: &dyn EntityTagger,
    text: &NormalizedText,
    window_chars: usize,
) -> Vec<NameCandidate> {
    if text.is_empty() {
        return Vec::new();
    }

    let window = char_prefix(text.as_str(), window_chars);
    let spans = match tagger.tag(window) {
        Ok(spans) => spans,
        Err(e) => {
            warn!(
                "Entity tagger '{}' failed, falling back to heuristics: {e}",
                tagger.backend()
            );
            return Vec::new();
        }
    };

    let candidates = merge_person_spans(window, spans);
    debug!("Entity tagger produced {} name candidate(s)", candidates.len());
    candidates
}

/// Filters to person labels, then joins spans separated only by spaces so that
/// subword pieces and first/last names become one candidate.
fn merge_person_spans(window: &str, mut spans: Vec<TaggedSpan>) -> Vec<NameCandidate> {
    spans.retain(|s| is_person_label(&s.label));
    spans.sort_by_key(|s| s.start);

    // Each group tracks the furthest end seen, since an overlapping span may
    // end before the one it overlaps.
    let mut groups: Vec<(Vec<TaggedSpan>, usize)> = Vec::new();
    for span in spans {
        match groups.last_mut() {
            Some((group, end)) if joins(window, *end, span.start) => {
                *end = (*end).max(span.end);
                group.push(span);
            }
            _ => {
                let end = span.end;
                groups.push((vec![span], end));
            }
        }
    }

    groups
        .into_iter()
        .filter_map(|(group, end)| {
            let first = group.first()?;
            let start = byte_offset(window, first.start)?;
            let end = byte_offset(window, end)?;
            let text = if start < end {
                window[start..end].to_string()
            } else {
                group
                    .iter()
                    .map(|s| s.word.trim_start_matches("##"))
                    .collect::<Vec<_>>()
                    .join(" ")
            };
            let score = group.iter().map(|s| s.score).sum::<f32>() / group.len() as f32;
            Some(NameCandidate {
                text,
                start,
                score,
                source: CandidateSource::Model,
            })
        })
        .collect()
}

fn is_person_label(label: &str) -> bool {
    let bare = label
        .strip_prefix("B-")
        .or_else(|| label.strip_prefix("I-"))
        .unwrap_or(label);
    bare.eq_ignore_ascii_case("PER") || bare.eq_ignore_ascii_case("PERSON")
}

fn joins(window: &str, prev_end: usize, next_start: usize) -> bool {
    if next_start < prev_end {
        return true;
    }
    if next_start - prev_end > MERGE_GAP_CHARS {
        return false;
    }
    match (byte_offset(window, prev_end), byte_offset(window, next_start)) {
        (Some(a), Some(b)) => window[a..b].chars().all(|c| c == ' '),
        _ => false,
    }
}

/// Byte offset of the `chars`-th character; `None` when past the end.
fn byte_offset(text: &str, chars: usize) -> Option<usize> {
    if chars == text.chars().count() {
        return Some(text.len());
    }
    text.char_indices().nth(chars).map(|(i, _)| i)
}

fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((i, _)) => &text[..i],
        None => text,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::extraction::normalizer::normalize;

    /// Returns a fixed set of spans, or an error when `fail` is set. Every
    /// text it is asked to tag is kept in `received`.
    pub(crate) struct MockTagger {
        pub spans: Vec<TaggedSpan>,
        pub fail: bool,
        pub received: Mutex<Vec<String>>,
    }

    impl MockTagger {
        pub(crate) fn with_spans(spans: Vec<TaggedSpan>) -> Self {
            Self {
                spans,
                fail: false,
                received: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                fail: true,
                ..Self::with_spans(vec![])
            }
        }

        pub(crate) fn received(&self) -> Vec<String> {
            self.received.lock().unwrap().clone()
        }
    }

    impl EntityTagger for MockTagger {
        fn backend(&self) -> &str {
            "mock"
        }

        fn tag(&self, text: &str) -> Result<Vec<TaggedSpan>, TaggerError> {
            self.received.lock().unwrap().push(text.to_string());
            if self.fail {
                return Err(TaggerError::Unavailable("mock offline".to_string()));
            }
            Ok(self.spans.clone())
        }
    }

    /// Builds a span for `word` at its first occurrence in `text`.
    pub(crate) fn span_for(text: &str, word: &str, label: &str, score: f32) -> TaggedSpan {
        let byte = text.find(word).expect("word present in fixture");
        let start = text[..byte].chars().count();
        TaggedSpan {
            word: word.to_string(),
            label: label.to_string(),
            score,
            start,
            end: start + word.chars().count(),
        }
    }

    #[test]
    fn test_filters_to_person_labels() {
        let text = normalize("Rahul Sharma\nInfosys Bangalore");
        let tagger = MockTagger::with_spans(vec![
            span_for(text.as_str(), "Rahul Sharma", "PER", 0.99),
            span_for(text.as_str(), "Infosys", "ORG", 0.98),
            span_for(text.as_str(), "Bangalore", "LOC", 0.97),
        ]);
        let candidates = recognize_names(&tagger, &text, 1000);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "Rahul Sharma");
        assert_eq!(candidates[0].source, CandidateSource::Model);
    }

    #[test]
    fn test_accepts_bio_and_long_person_labels() {
        assert!(is_person_label("PER"));
        assert!(is_person_label("B-PER"));
        assert!(is_person_label("I-PER"));
        assert!(is_person_label("person"));
        assert!(!is_person_label("B-ORG"));
        assert!(!is_person_label("PERCENT"));
    }

    #[test]
    fn test_merges_subword_and_adjacent_spans() {
        let text = normalize("Sujan Kumar Madakasira\nmail4sujankumar@gmail.com");
        let tagger = MockTagger::with_spans(vec![
            TaggedSpan {
                word: "Su".into(),
                label: "PER".into(),
                score: 0.9,
                start: 0,
                end: 2,
            },
            TaggedSpan {
                word: "##jan".into(),
                label: "PER".into(),
                score: 0.8,
                start: 2,
                end: 5,
            },
            span_for(text.as_str(), "Kumar", "PER", 0.95),
            span_for(text.as_str(), "Madakasira", "PER", 0.85),
        ]);
        let candidates = recognize_names(&tagger, &text, 1000);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "Sujan Kumar Madakasira");
        assert!((candidates[0].score - 0.875).abs() < 1e-6);
    }

    #[test]
    fn test_does_not_merge_across_lines_or_punctuation() {
        let text = normalize("Priya\nSingh, Anita Rao");
        let tagger = MockTagger::with_spans(vec![
            span_for(text.as_str(), "Priya", "PER", 0.9),
            span_for(text.as_str(), "Singh", "PER", 0.9),
            span_for(text.as_str(), "Anita Rao", "PER", 0.9),
        ]);
        let names: Vec<String> = recognize_names(&tagger, &text, 1000)
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert_eq!(names, vec!["Priya", "Singh", "Anita Rao"]);
    }

    #[test]
    fn test_tagger_failure_yields_no_candidates() {
        let text = normalize("John Andrew Smith");
        assert!(recognize_names(&MockTagger::failing(), &text, 1000).is_empty());
    }

    #[test]
    fn test_empty_text_skips_tagger() {
        let tagger = MockTagger::failing();
        assert!(recognize_names(&tagger, &normalize(""), 1000).is_empty());
    }

    #[test]
    fn test_offsets_are_character_based() {
        let text = normalize("Résumé of José García\nEngineer");
        let tagger =
            MockTagger::with_spans(vec![span_for(text.as_str(), "José García", "PER", 0.9)]);
        let candidates = recognize_names(&tagger, &text, 1000);
        assert_eq!(candidates[0].text, "José García");
        assert_eq!(&text.as_str()[candidates[0].start..], "José García\nEngineer");
    }

    #[test]
    fn test_tagger_sees_char_bounded_window() {
        let text = normalize("José García\nEngineer");
        let tagger = MockTagger::with_spans(vec![
            span_for(text.as_str(), "José", "PER", 0.9),
            span_for(text.as_str(), "García", "PER", 0.9),
        ]);
        let candidates = recognize_names(&tagger, &text, 4);

        assert_eq!(tagger.received(), vec!["José".to_string()]);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "José");
    }

    #[test]
    fn test_overlapping_spans_keep_furthest_end() {
        let text = normalize("Rahul Sharma\nrahul@example.com");
        let tagger = MockTagger::with_spans(vec![
            span_for(text.as_str(), "Rahul Sharma", "PER", 0.9),
            span_for(text.as_str(), "Rahul", "PER", 0.7),
        ]);
        let candidates = recognize_names(&tagger, &text, 1000);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text, "Rahul Sharma");
        assert_eq!(candidates[0].start, 0);
    }

    #[test]
    fn test_char_prefix_respects_boundaries() {
        assert_eq!(char_prefix("héllo", 2), "hé");
        assert_eq!(char_prefix("abc", 10), "abc");
    }

    #[test]
    fn test_span_json_uses_entity_group_alias() {
        let json = r#"{"entity_group":"PER","score":0.998,"word":"Rahul","start":0,"end":5}"#;
        let span: TaggedSpan = serde_json::from_str(json).unwrap();
        assert_eq!(span.label, "PER");
        assert_eq!(span.end, 5);
    }
}
