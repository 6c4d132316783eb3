use regex::Regex;

use super::FieldExtractor;
use crate::extraction::record::Field;

const MIN_DIGITS: usize = 10;
const MAX_DIGITS: usize = 13;

/// Phone numbers: 10–13 digits in groups separated by spaces, dashes, dots or
/// parentheses, with an optional leading `+`. Output keeps digits only, plus
/// the `+` when the number carried one.
pub struct PhoneExtractor {
    run: Regex,
    group: Regex,
}

impl PhoneExtractor {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            run: Regex::new(r"(?:\+\s?)?\(?\d+\)?(?:[ .\-]{1,3}\(?\d+\)?)*")?,
            group: Regex::new(r"\d+")?,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.extract(text).is_some()
    }

    /// Longest window of consecutive digit groups holding 10–13 digits that
    /// does not read as a date or year range.
    /// The `+` is only kept when the window starts at the first group.
    fn best_window(&self, run: &str) -> Option<String> {
        let groups: Vec<&str> = self.group.find_iter(run).map(|m| m.as_str()).collect();
        let plus = run.starts_with('+');

        for start in 0..groups.len() {
            let mut total = 0;
            let mut accepted = None;
            for end in start..groups.len() {
                total += groups[end].len();
                if total > MAX_DIGITS {
                    break;
                }
                if total >= MIN_DIGITS && is_phone_shaped(&groups[start..=end]) {
                    accepted = Some(end);
                }
            }
            if let Some(end) = accepted {
                let digits: String = groups[start..=end].concat();
                return Some(if plus && start == 0 {
                    format!("+{digits}")
                } else {
                    digits
                });
            }
        }
        None
    }
}

/// Rejects windows holding a group of two digits or fewer past the first
/// (day, month, grade decimals) or more than one year-like group.
fn is_phone_shaped(groups: &[&str]) -> bool {
    let short_tail = groups.iter().skip(1).any(|g| g.len() <= 2);
    let years = groups.iter().filter(|g| looks_like_year(g)).count();
    !short_tail && years < 2
}

fn looks_like_year(group: &str) -> bool {
    group.len() == 4 && (group.starts_with("19") || group.starts_with("20"))
}

impl FieldExtractor for PhoneExtractor {
    fn field(&self) -> Field {
        Field::Phone
    }

    fn extract(&self, text: &str) -> Option<String> {
        self.run
            .find_iter(text)
            .filter(|m| {
                text[..m.start()]
                    .chars()
                    .next_back()
                    .map_or(true, |c| !c.is_alphanumeric())
            })
            .find_map(|m| self.best_window(m.as_str()))
    }
}
