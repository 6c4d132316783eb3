//! College/University extractor.
//!
//! Two lexicon families compete and the earliest hit in reading order wins:
//! - well-known abbreviations (`IIT Bombay`, `VIT Vellore`), stored verbatim;
//! - full names built around an institution keyword
//!   (`National Institute of Technology, Karnataka`).
//!
//! Abbreviations are never expanded.

use regex::Regex;

use super::FieldExtractor;
use crate::extraction::record::Field;

const ABBREVIATIONS: &[&str] = &[
    "IIIT", "IIT", "NIT", "BITS", "VIT", "IIM", "MIT", "IISc", "IISER", "DTU", "NSUT",
];

const INSTITUTION_KEYWORDS: &[&str] = &["university", "institute", "college", "school", "academy"];

/// Heading and degree words that the capitalized-prefix rule tends to swallow.
const LEADING_NOISE: &[&str] = &[
    "education", "academic", "academics", "qualification", "qualifications", "details",
    "background", "btech", "mtech", "be", "me", "bsc", "msc", "bcom", "mcom", "bca", "mca",
    "bba", "mba", "phd", "cse", "ece", "eee",
];

/// Words that end a full institution name when they follow the keyword.
const TRAILING_STOP: &[&str] = &[
    "cgpa", "gpa", "sgpa", "grade", "percentage", "marks", "btech", "mtech", "be", "bsc",
    "msc", "bcom", "mcom", "bca", "mca", "bba", "mba", "phd", "present",
];

/// Words that introduce the institution ("B.Tech from ...", "Studied at ...").
/// Everything up to the last of them is dropped.
const LEADING_STOP: &[&str] = &[
    "from", "at", "in", "graduated", "studied", "attended", "pursuing",
];

/// Degree titles spelled out as "Bachelor of X" / "Master in X".
const DEGREE_TITLES: &[&str] = &["bachelor", "bachelors", "master", "masters"];

const CONNECTORS: &[&str] = &["of", "and", "for", "the", "&", "at"];

const MIN_LEN: usize = 5;
const MAX_LEN: usize = 150;

pub struct CollegeExtractor {
    abbreviation: Regex,
    full_name: Regex,
}

impl CollegeExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        let cap = r"[A-Z][A-Za-z.&'’]*";
        let connector = r"(?i:of|and|for|the|&|at)";
        let keyword = format!(r"(?i:{})", INSTITUTION_KEYWORDS.join("|"));

        let abbreviation = format!(
            r"\b(?:{})\b(?:(?: |, | - |-)[A-Z][a-z]+)?",
            ABBREVIATIONS.join("|")
        );
        let full_name = format!(
            r"(?:{cap} (?:{connector} )?)*{keyword}\b(?:,? (?:{connector} )*{cap})*"
        );

        Ok(Self {
            abbreviation: Regex::new(&abbreviation)?,
            full_name: Regex::new(&full_name)?,
        })
    }

    fn first_full_name(&self, text: &str) -> Option<(usize, String)> {
        self.full_name
            .find_iter(text)
            .find_map(|m| clean_full_name(m.as_str()).map(|name| (m.start(), name)))
    }

    fn first_abbreviation(&self, text: &str) -> Option<(usize, String)> {
        self.abbreviation
            .find(text)
            .map(|m| (m.start(), m.as_str().to_string()))
    }
}

impl FieldExtractor for CollegeExtractor {
    fn field(&self) -> Field {
        Field::College
    }

    fn extract(&self, text: &str) -> Option<String> {
        match (self.first_full_name(text), self.first_abbreviation(text)) {
            (Some((full_at, full)), Some((abbr_at, abbr))) => {
                if abbr_at < full_at {
                    Some(abbr)
                } else {
                    Some(full)
                }
            }
            (Some((_, full)), None) => Some(full),
            (None, Some((_, abbr))) => Some(abbr),
            (None, None) => None,
        }
    }
}

fn word_key(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric() && c != '&')
        .replace('.', "")
        .to_lowercase()
}

fn is_keyword(word: &str) -> bool {
    INSTITUTION_KEYWORDS.contains(&word_key(word).as_str())
}

/// Trims heading/degree noise in front of the name and grade noise after it.
/// Requires at least one word besides the institution keyword.
fn clean_full_name(raw: &str) -> Option<String> {
    let words: Vec<&str> = raw.split_whitespace().collect();
    let keyword_at = words.iter().position(|w| is_keyword(w))?;

    let start = (0..keyword_at)
        .rev()
        .find(|&i| is_leading_stop(&words, i))
        .map_or(0, |i| i + 1);
    let start = skip_leading_noise(&words, start, keyword_at);

    let stop = words[keyword_at + 1..]
        .iter()
        .position(|w| TRAILING_STOP.contains(&word_key(w).as_str()))
        .map_or(words.len(), |p| keyword_at + 1 + p);

    let mut kept: Vec<&str> = words[start..stop].to_vec();
    while kept
        .last()
        .is_some_and(|w| CONNECTORS.contains(&word_key(w).as_str()))
    {
        kept.pop();
    }
    if kept.len() < 2 {
        return None;
    }

    let name = kept
        .join(" ")
        .trim_end_matches(|c: char| matches!(c, ',' | '.' | '-' | '–' | ':' | ';'))
        .to_string();

    within_bounds(&name).then_some(name)
}

/// "in" right after a degree title belongs to the title ("Masters in Finance").
fn is_leading_stop(words: &[&str], i: usize) -> bool {
    let key = word_key(words[i]);
    if !LEADING_STOP.contains(&key.as_str()) {
        return false;
    }
    !(key == "in" && i > 0 && DEGREE_TITLES.contains(&word_key(words[i - 1]).as_str()))
}

/// Skips heading words and spelled-out degree titles in front of the keyword.
fn skip_leading_noise(words: &[&str], mut start: usize, keyword_at: usize) -> usize {
    while start < keyword_at {
        let key = word_key(words[start]);
        if LEADING_NOISE.contains(&key.as_str()) {
            start += 1;
        } else if DEGREE_TITLES.contains(&key.as_str())
            && start + 3 <= keyword_at
            && matches!(word_key(words[start + 1]).as_str(), "of" | "in")
        {
            start += 3;
        } else {
            break;
        }
    }
    start
}

fn within_bounds(name: &str) -> bool {
    (MIN_LEN..=MAX_LEN).contains(&name.chars().count())
}
