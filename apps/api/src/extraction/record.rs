//! Record Assembler: the fixed six-field output of one pipeline run.

use serde::{Deserialize, Serialize};

/// Placeholder stored for any field the pipeline could not find.
pub const NOT_FOUND: &str = "Not Found";

/// The six candidate fields, in export column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Phone,
    College,
    Degree,
    Cgpa,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Name,
        Field::Email,
        Field::Phone,
        Field::College,
        Field::Degree,
        Field::Cgpa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::College => "college",
            Field::Degree => "degree",
            Field::Cgpa => "cgpa",
        }
    }
}

/// Structured output handed to the review queue.
///
/// Every field is always populated: either an extracted value or [`NOT_FOUND`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    pub degree: String,
    pub cgpa: String,
}

impl ExtractedRecord {
    /// A record with every field set to the sentinel.
    pub fn empty() -> Self {
        RecordBuilder::default().build()
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::College => &self.college,
            Field::Degree => &self.degree,
            Field::Cgpa => &self.cgpa,
        }
    }

    pub fn is_found(&self, field: Field) -> bool {
        self.get(field) != NOT_FOUND
    }

    pub fn found_count(&self) -> usize {
        Field::ALL.iter().filter(|f| self.is_found(**f)).count()
    }

    /// Leading numeric part of the CGPA (`"9.04 / 10"` → `9.04`).
    pub fn cgpa_value(&self) -> Option<f32> {
        if !self.is_found(Field::Cgpa) {
            return None;
        }
        self.cgpa.split('/').next()?.trim().parse().ok()
    }
}

/// Collects per-field values and fills the gaps with the sentinel.
#[derive(Debug, Default, Clone)]
pub struct RecordBuilder {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    college: Option<String>,
    degree: Option<String>,
    cgpa: Option<String>,
}

impl RecordBuilder {
    pub fn set(&mut self, field: Field, value: Option<String>) -> &mut Self {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::College => &mut self.college,
            Field::Degree => &mut self.degree,
            Field::Cgpa => &mut self.cgpa,
        };
        *slot = value;
        self
    }

    pub fn build(self) -> ExtractedRecord {
        ExtractedRecord {
            name: or_sentinel(self.name),
            email: or_sentinel(self.email),
            phone: or_sentinel(self.phone),
            college: or_sentinel(self.college),
            degree: or_sentinel(self.degree),
            cgpa: or_sentinel(self.cgpa),
        }
    }
}

fn or_sentinel(value: Option<String>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => NOT_FOUND.to_string(),
    }
}
