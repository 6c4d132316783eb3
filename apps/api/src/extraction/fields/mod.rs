//! Pattern Extractors: one independent, total extractor per record field.
//!
//! Every extractor scans the normalized text and stops at its first valid hit.
//! Construction compiles the regexes once; `extract` never fails and returns
//! `None` when nothing valid is found.

pub mod cgpa;
pub mod college;
pub mod degree;
pub mod email;
pub mod phone;

use crate::extraction::record::Field;

pub use cgpa::CgpaExtractor;
pub use college::CollegeExtractor;
pub use degree::DegreeExtractor;
pub use email::EmailExtractor;
pub use phone::PhoneExtractor;

/// Capability shared by all field extractors. Carried by the pipeline as
/// `Box<dyn FieldExtractor>` and iterated table-style.
pub trait FieldExtractor: Send + Sync {
    fn field(&self) -> Field;

    fn extract(&self, text: &str) -> Option<String>;
}

/// The five pattern extractors, in record order.
pub fn default_extractors(
    cgpa_default_scale: f32,
) -> Result<Vec<Box<dyn FieldExtractor>>, regex::Error> {
    Ok(vec![
        Box::new(EmailExtractor::new()?),
        Box::new(PhoneExtractor::new()?),
        Box::new(CollegeExtractor::new()?),
        Box::new(DegreeExtractor::new()?),
        Box::new(CgpaExtractor::new(cgpa_default_scale)?),
    ])
}
