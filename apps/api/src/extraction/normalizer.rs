//! Text Normalizer: canonical line-preserving form of extracted resume text.

use serde::Serialize;

const ZERO_WIDTH: &[char] = &['\u{200b}', '\u{200c}', '\u{200d}', '\u{feff}'];

/// Normalized resume text. Only constructed through [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Character count, used for the minimum-text check at intake.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }

    /// Non-blank lines with their byte offset into the text.
    pub fn lines_with_offsets(&self) -> Vec<(usize, &str)> {
        let mut offset = 0;
        let mut lines = Vec::new();
        for line in self.0.split('\n') {
            if !line.is_empty() {
                lines.push((offset, line));
            }
            offset += line.len() + 1;
        }
        lines
    }
}

/// Normalizes raw extractor output.
///
/// Whitespace runs inside a line collapse to one space, hyphenated line wraps
/// are rejoined, blank-line runs collapse to a single blank line and the
/// result carries no leading or trailing blank lines. Idempotent.
pub fn normalize(raw: &str) -> NormalizedText {
    let unified = raw
        .replace("\r\n", "\n")
        .replace(['\r', '\u{c}'], "\n")
        .replace(ZERO_WIDTH, "");

    let mut lines: Vec<String> = Vec::new();
    let mut pending_blank = false;

    for line in unified.split('\n') {
        let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");

        if collapsed.is_empty() {
            pending_blank = !lines.is_empty();
            continue;
        }

        if !pending_blank {
            if let Some(prev) = lines.last_mut() {
                if ends_with_wrap_hyphen(prev) && starts_lowercase(&collapsed) {
                    prev.pop();
                    prev.push_str(&collapsed);
                    continue;
                }
            }
        }

        if pending_blank {
            lines.push(String::new());
            pending_blank = false;
        }
        lines.push(collapsed);
    }

    NormalizedText(lines.join("\n"))
}

fn ends_with_wrap_hyphen(line: &str) -> bool {
    let mut rev = line.chars().rev();
    matches!(
        (rev.next(), rev.next()),
        (Some('-'), Some(c)) if c.is_lowercase()
    )
}

fn starts_lowercase(line: &str) -> bool {
    line.chars().next().is_some_and(char::is_lowercase)
}
