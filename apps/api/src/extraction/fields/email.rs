use regex::Regex;

use super::FieldExtractor;
use crate::extraction::record::Field;

pub struct EmailExtractor {
    pattern: Regex,
}

impl EmailExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(
                r"(?i)\b[a-z0-9._%+-]+@[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}\b",
            )?,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

impl FieldExtractor for EmailExtractor {
    fn field(&self) -> Field {
        Field::Email
    }

    fn extract(&self, text: &str) -> Option<String> {
        self.pattern
            .find(text)
            .map(|m| m.as_str().trim_matches('.').to_lowercase())
    }
}
