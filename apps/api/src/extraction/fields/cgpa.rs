//! CGPA/GPA extractor with range validation.
//!
//! A value with a denominator (`8.5/10`, `3.6 out of 4`) must satisfy
//! `0 <= value <= denominator <= 10`. A bare value must not exceed the
//! configured default scale. Out-of-range hits are skipped, never clamped.

use regex::{Captures, Regex};

use super::FieldExtractor;
use crate::extraction::record::Field;

const KEYWORD: &str = r"(?:c\.?g\.?p\.?a|s\.?g\.?p\.?a|gpa|grade\s+point(?:\s+average)?)";
const NUMBER: &str = r"(\d+(?:\.\d+)?)";
const MAX_DENOMINATOR: f32 = 10.0;

pub struct CgpaExtractor {
    keyword_first: Regex,
    value_first: Regex,
    default_scale: f32,
}

impl CgpaExtractor {
    pub fn new(default_scale: f32) -> Result<Self, regex::Error> {
        let denominator = format!(r"(?:\s*(?:/|out\s+of)\s*{NUMBER})?");
        Ok(Self {
            keyword_first: Regex::new(&format!(
                r"(?i)\b{KEYWORD}\b\.?\s*(?:[:=\-–]|is|of)?\s*{NUMBER}{denominator}"
            ))?,
            value_first: Regex::new(&format!(
                r"(?i){NUMBER}{denominator}\s*(?:c\.?g\.?p\.?a|s\.?g\.?p\.?a|gpa)\b"
            ))?,
            default_scale,
        })
    }

    fn accept(&self, caps: &Captures<'_>) -> Option<String> {
        let value = caps.get(1)?.as_str();
        let denominator = caps.get(2).map(|m| m.as_str());
        let v: f32 = value.parse().ok()?;

        let in_range = match denominator {
            Some(d) => {
                let d: f32 = d.parse().ok()?;
                d > 0.0 && d <= MAX_DENOMINATOR && (0.0..=d).contains(&v)
            }
            None => (0.0..=self.default_scale).contains(&v),
        };
        if !in_range {
            return None;
        }

        Some(match denominator {
            Some(d) => format!("{value} / {d}"),
            None => value.to_string(),
        })
    }
}

impl FieldExtractor for CgpaExtractor {
    fn field(&self) -> Field {
        Field::Cgpa
    }

    fn extract(&self, text: &str) -> Option<String> {
        let mut hits: Vec<(usize, Captures<'_>)> = self
            .keyword_first
            .captures_iter(text)
            .chain(self.value_first.captures_iter(text))
            .filter_map(|c| Some((c.get(0)?.start(), c)))
            .collect();
        hits.sort_by_key(|(start, _)| *start);

        hits.iter().find_map(|(_, caps)| self.accept(caps))
    }
}
