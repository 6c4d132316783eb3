//! Degree extractor: lexicon of degree tokens plus an optional field of study
//! taken from the rest of the same line.

use regex::Regex;

use super::FieldExtractor;
use crate::extraction::record::Field;

/// Case-insensitive tokens. Order matters where one token prefixes another.
const CASE_INSENSITIVE_TOKENS: &[&str] = &[
    r"(?:bachelor|master)(?:'?s)?\s+(?:of|in)\s+[a-z]+",
    r"doctor\s+of\s+philosophy",
    r"b\.?\s?tech",
    r"m\.?\s?tech",
    r"b\.?\s?sc",
    r"m\.?\s?sc",
    r"b\.?\s?com",
    r"m\.?\s?com",
    r"b\.?\s?c\.?\s?a",
    r"m\.?\s?c\.?\s?a",
    r"b\.?\s?b\.?\s?a",
    r"m\.?\s?b\.?\s?a",
    r"ph\.?\s?d",
];

/// Words that end a field-of-study phrase.
const FIELD_STOP: &[&str] = &[
    "from", "at", "with", "cgpa", "gpa", "sgpa", "grade", "percentage", "marks", "university",
    "institute", "college", "school", "academy", "iit", "nit", "iiit", "bits", "vit", "iim",
    "mit", "present", "since", "during", "year", "batch", "graduated", "expected",
];

const TRAILING_CONNECTORS: &[&str] = &["and", "&", "in", "of", "the", "for", "with"];

const MAX_FIELD_WORDS: usize = 6;

pub struct DegreeExtractor {
    lexicon: Regex,
    dotted: Regex,
    institution_initials: Regex,
    field_of_study: Regex,
}

impl DegreeExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            lexicon: Regex::new(&format!(
                r"(?i)\b(?:{})\b\.?",
                CASE_INSENSITIVE_TOKENS.join("|")
            ))?,
            // B.E., M.E., B.A., M.A., B.S., M.S., case-sensitive so "be"/"ma" never match.
            dotted: Regex::new(r"(?:^|[^A-Za-z.])([BM]\.[EAS]\.?)(?:[^A-Za-z.]|$)")?,
            // "M.S. Ramaiah Institute" names a college, not a degree.
            institution_initials: Regex::new(
                r"^\s+[A-Z][a-z]+\s+(?i:university|institute|college|school)\b",
            )?,
            field_of_study: Regex::new(
                r"^\s*(?:[-–:,(]\s*)?(?:((?i:in|of))\s+)?([A-Za-z&][A-Za-z&/ ]*)",
            )?,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.first_token(text).is_some()
    }

    /// Earliest degree token as (start, end) byte offsets.
    fn first_token(&self, text: &str) -> Option<(usize, usize)> {
        let lexical = self
            .lexicon
            .find_iter(text)
            .find(|m| {
                !text[..m.start()]
                    .chars()
                    .next_back()
                    .is_some_and(|c| c == '@' || c == '.')
            })
            .map(|m| (m.start(), m.end()));

        let dotted = self
            .dotted
            .captures_iter(text)
            .filter_map(|c| c.get(1))
            .find(|m| !self.institution_initials.is_match(&text[m.end()..]))
            .map(|m| (m.start(), m.end()));

        match (lexical, dotted) {
            (Some(a), Some(b)) => Some(if b.0 < a.0 { b } else { a }),
            (a, b) => a.or(b),
        }
    }

    /// Field of study following the token on the same line, e.g. "in Computer Science".
    fn trailing_field(&self, rest_of_line: &str) -> Option<(Option<String>, String)> {
        let caps = self.field_of_study.captures(rest_of_line)?;
        let connector = caps.get(1).map(|m| m.as_str().to_lowercase());
        let phrase = caps.get(2)?.as_str();

        let mut words: Vec<&str> = phrase
            .split_whitespace()
            .take_while(|w| !FIELD_STOP.contains(&w.to_lowercase().as_str()))
            .take(MAX_FIELD_WORDS)
            .collect();
        while words
            .last()
            .is_some_and(|w| TRAILING_CONNECTORS.contains(&w.to_lowercase().as_str()))
        {
            words.pop();
        }

        if words.is_empty() {
            None
        } else {
            Some((connector, words.join(" ")))
        }
    }
}

impl FieldExtractor for DegreeExtractor {
    fn field(&self) -> Field {
        Field::Degree
    }

    fn extract(&self, text: &str) -> Option<String> {
        let (start, end) = self.first_token(text)?;
        let token = text[start..end].trim();

        let line_end = text[end..].find('\n').map_or(text.len(), |i| end + i);
        let degree = match self.trailing_field(&text[end..line_end]) {
            Some((Some(connector), field)) => format!("{token} {connector} {field}"),
            Some((None, field)) => format!("{token} {field}"),
            None => token.to_string(),
        };
        Some(degree)
    }
}
