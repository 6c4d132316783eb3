// Resume field extraction.
// Pipeline: normalizer → recognizer → resolver → fields → record.
// All model calls go through the EntityTagger seam; no direct HTTP here.

pub mod document;
pub mod fields;
pub mod handlers;
pub mod normalizer;
pub mod pipeline;
pub mod recognizer;
pub mod record;
pub mod resolver;
