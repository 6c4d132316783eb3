//! Name Resolver: picks one name from model candidates, or falls back to the
//! first heading line.

use regex::Regex;
use tracing::debug;

use crate::extraction::fields::{DegreeExtractor, EmailExtractor, PhoneExtractor};
use crate::extraction::normalizer::NormalizedText;
use crate::extraction::recognizer::{CandidateSource, NameCandidate};

/// Words that mark a phrase as an institution or degree rather than a person.
const NON_PERSON_WORDS: &[&str] = &[
    "university", "institute", "college", "school", "academy", "technology", "engineering",
    "science", "sciences", "management", "department", "bachelor", "master", "degree",
    "education", "experience", "skills", "objective", "summary", "contact", "email", "phone",
];

/// Document-title lines skipped by the heading heuristic.
const TITLE_LINES: &[&str] = &["resume", "cv", "curriculum vitae", "bio-data", "biodata", "bio data"];

const MIN_WORDS: usize = 2;
const MAX_WORDS: usize = 4;
const MIN_CHARS: usize = 4;
const MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NameRules {
    /// Number of non-blank lines that make up the heading region.
    pub heading_lines: usize,
    /// Minimum model score for a heading candidate to win outright.
    pub min_score: f32,
}

impl Default for NameRules {
    fn default() -> Self {
        Self {
            heading_lines: 5,
            min_score: 0.75,
        }
    }
}

pub struct NameResolver {
    rules: NameRules,
    email: EmailExtractor,
    phone: PhoneExtractor,
    degree: DegreeExtractor,
    decoration: Regex,
    honorific: Regex,
    title_suffix: Regex,
}

impl NameResolver {
    pub fn new(rules: NameRules) -> Result<Self, regex::Error> {
        Ok(Self {
            rules,
            email: EmailExtractor::new()?,
            phone: PhoneExtractor::new()?,
            degree: DegreeExtractor::new()?,
            decoration: Regex::new(r"[#*_|•]+")?,
            honorific: Regex::new(r"(?i)^(?:mr|ms|mrs|dr|prof)\.?\s+")?,
            title_suffix: Regex::new(r"(?i)(?:\s+(?:resume|cv|profile))+\s*$")?,
        })
    }

    /// Resolves the candidate's name. `None` means no usable name was found.
    pub fn resolve(&self, text: &NormalizedText, candidates: &[NameCandidate]) -> Option<String> {
        if let Some(chosen) = self.pick_model_candidate(text, candidates) {
            debug!("Name resolved from model candidate at byte {}", chosen.start);
            return Some(chosen.text);
        }

        let fallback = self.heading_heuristic(text)?;
        debug!("Name resolved from heading line at byte {}", fallback.start);
        Some(fallback.text)
    }

    fn pick_model_candidate(
        &self,
        text: &NormalizedText,
        candidates: &[NameCandidate],
    ) -> Option<NameCandidate> {
        let heading_end = heading_end(text, self.rules.heading_lines);

        let cleaned: Vec<NameCandidate> = candidates
            .iter()
            .filter_map(|c| {
                self.clean_name(&c.text).map(|name| NameCandidate {
                    text: name,
                    ..c.clone()
                })
            })
            .collect();

        if let Some(heading) = cleaned
            .iter()
            .find(|c| c.start < heading_end && c.score >= self.rules.min_score)
        {
            return Some(heading.clone());
        }

        // Strict `>` keeps the earliest of equally scored candidates.
        let mut best: Option<&NameCandidate> = None;
        for candidate in &cleaned {
            if best.map_or(true, |b| candidate.score > b.score) {
                best = Some(candidate);
            }
        }
        best.cloned()
    }

    /// First line that is not a document title, accepted when it looks like
    /// a plain 2–4 word name and nothing else.
    fn heading_heuristic(&self, text: &NormalizedText) -> Option<NameCandidate> {
        let (start, line) = text
            .lines_with_offsets()
            .into_iter()
            .find(|(_, line)| !is_title_line(line))?;

        if self.email.is_match(line) || self.phone.is_match(line) || self.degree.is_match(line) {
            return None;
        }
        if !is_plain_name(line) {
            return None;
        }

        Some(NameCandidate {
            text: self.clean_name(line)?,
            start,
            score: 0.0,
            source: CandidateSource::Heuristic,
        })
    }

    /// Strips tagging and layout artifacts from a raw name and validates shape.
    pub fn clean_name(&self, raw: &str) -> Option<String> {
        let name = self.decoration.replace_all(raw, " ");
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
        let name = self.honorific.replace(&name, "");
        let name = self.title_suffix.replace(&name, "");

        let words: Vec<String> = name
            .split_whitespace()
            .map(|w| w.chars().filter(|c| !c.is_ascii_digit()).collect::<String>())
            .filter(|w| w.chars().count() > 1)
            .map(|w| recase(&w))
            .collect();

        if words
            .iter()
            .any(|w| NON_PERSON_WORDS.contains(&w.to_lowercase().as_str()))
        {
            return None;
        }
        if !(MIN_WORDS..=MAX_WORDS).contains(&words.len()) {
            return None;
        }

        let cleaned = words.join(" ");
        (MIN_CHARS..=MAX_CHARS)
            .contains(&cleaned.chars().count())
            .then_some(cleaned)
    }
}

/// Byte offset where the heading region ends.
fn heading_end(text: &NormalizedText, heading_lines: usize) -> usize {
    if heading_lines == 0 {
        return 0;
    }
    match text.lines_with_offsets().get(heading_lines - 1) {
        Some((offset, line)) => offset + line.len(),
        None => text.as_str().len(),
    }
}

fn is_title_line(line: &str) -> bool {
    let key = line
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    TITLE_LINES.contains(&key.as_str())
}

fn is_plain_name(line: &str) -> bool {
    let words: Vec<&str> = line.split_whitespace().collect();
    (MIN_WORDS..=MAX_WORDS).contains(&words.len())
        && words.iter().all(|w| {
            w.chars().any(char::is_alphabetic)
                && w.chars()
                    .all(|c| c.is_alphabetic() || matches!(c, '\'' | '’' | '-' | '.'))
        })
}

/// All-upper or all-lower words become capitalized; mixed case is kept.
fn recase(word: &str) -> String {
    let letters = || word.chars().filter(|c| c.is_alphabetic());
    let all_upper = letters().all(char::is_uppercase);
    let all_lower = letters().all(char::is_lowercase);
    if !(all_upper || all_lower) {
        return word.to_string();
    }

    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::normalizer::normalize;

    fn resolver() -> NameResolver {
        NameResolver::new(NameRules::default()).unwrap()
    }

    fn model(text: &str, name: &str, score: f32) -> NameCandidate {
        NameCandidate {
            text: name.to_string(),
            start: text.find(name).expect("name present in fixture"),
            score,
            source: CandidateSource::Model,
        }
    }

    #[test]
    fn test_clean_name_strips_artifacts() {
        let r = resolver();
        assert_eq!(r.clean_name("## RAHUL SHARMA ##").as_deref(), Some("Rahul Sharma"));
        assert_eq!(r.clean_name("Mr. john smith").as_deref(), Some("John Smith"));
        assert_eq!(r.clean_name("Priya Nair Resume").as_deref(), Some("Priya Nair"));
        assert_eq!(r.clean_name("Anita K Rao").as_deref(), Some("Anita Rao"));
        assert_eq!(r.clean_name("Ronald McDonald").as_deref(), Some("Ronald McDonald"));
    }

    #[test]
    fn test_clean_name_rejects_non_names() {
        let r = resolver();
        assert_eq!(r.clean_name("Rahul"), None);
        assert_eq!(r.clean_name("Indian Institute of Technology"), None);
        assert_eq!(r.clean_name("Computer Science Engineering"), None);
        assert_eq!(r.clean_name("One Two Three Four Five"), None);
    }

    #[test]
    fn test_heading_candidate_beats_higher_score_below() {
        let text = normalize(
            "Rahul Sharma\nrahul@example.com\n\nReferences\nDr. Priya Menon, Professor",
        );
        let candidates = vec![
            model(text.as_str(), "Rahul Sharma", 0.80),
            model(text.as_str(), "Priya Menon", 0.99),
        ];
        assert_eq!(
            resolver().resolve(&text, &candidates).as_deref(),
            Some("Rahul Sharma")
        );
    }

    #[test]
    fn test_low_score_heading_falls_back_to_best_overall() {
        let text = normalize("Rahul Sharma\nline two\nline three\nline four\nline five\nPriya Menon");
        let candidates = vec![
            model(text.as_str(), "Rahul Sharma", 0.40),
            model(text.as_str(), "Priya Menon", 0.90),
        ];
        assert_eq!(
            resolver().resolve(&text, &candidates).as_deref(),
            Some("Priya Menon")
        );
    }

    #[test]
    fn test_equal_scores_resolve_to_first_occurrence() {
        let text = normalize("a\nb\nc\nd\ne\nAnita Rao\nPriya Menon");
        let candidates = vec![
            model(text.as_str(), "Anita Rao", 0.6),
            model(text.as_str(), "Priya Menon", 0.6),
        ];
        assert_eq!(
            resolver().resolve(&text, &candidates).as_deref(),
            Some("Anita Rao")
        );
    }

    #[test]
    fn test_heuristic_takes_first_line() {
        let text = normalize("John Andrew Smith\nSoftware Engineer\njohn@example.com");
        assert_eq!(
            resolver().resolve(&text, &[]).as_deref(),
            Some("John Andrew Smith")
        );
    }

    #[test]
    fn test_heuristic_skips_title_line() {
        let text = normalize("RESUME\n\nPRIYA NAIR\npriya@example.com");
        assert_eq!(resolver().resolve(&text, &[]).as_deref(), Some("Priya Nair"));
    }

    #[test]
    fn test_heuristic_rejects_contact_and_degree_lines() {
        let r = resolver();
        assert_eq!(r.resolve(&normalize("jane.doe@example.com\nJane Doe"), &[]), None);
        assert_eq!(r.resolve(&normalize("+91 98765 43210"), &[]), None);
        assert_eq!(r.resolve(&normalize("B.Tech Computer Science"), &[]), None);
        assert_eq!(r.resolve(&normalize("Objective: to build things"), &[]), None);
    }

    #[test]
    fn test_heuristic_runs_when_candidates_fail_cleaning() {
        let text = normalize("Sneha Kulkarni\nVisvesvaraya Technological University");
        let candidates = vec![model(text.as_str(), "Visvesvaraya", 0.9)];
        assert_eq!(
            resolver().resolve(&text, &candidates).as_deref(),
            Some("Sneha Kulkarni")
        );
    }

    #[test]
    fn test_empty_text_has_no_name() {
        assert_eq!(resolver().resolve(&normalize(""), &[]), None);
    }
}
