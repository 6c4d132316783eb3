//! Extraction pipeline: normalize → recognize → resolve → extract → assemble.
//!
//! Synchronous and side-effect free apart from the tagger call. Missing data
//! never becomes an error; every run yields a complete [`ExtractedRecord`].

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::extraction::document::{document_text, RawDocument, TextExtractor};
use crate::extraction::fields::{default_extractors, FieldExtractor};
use crate::extraction::normalizer::{normalize, NormalizedText};
use crate::extraction::recognizer::{recognize_names, EntityTagger};
use crate::extraction::record::{ExtractedRecord, Field, RecordBuilder};
use crate::extraction::resolver::{NameResolver, NameRules};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid extraction pattern: {0}")]
    Pattern(#[from] regex::Error),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    /// Characters of normalized text sent to the tagger.
    pub ner_window_chars: usize,
    pub name_rules: NameRules,
    /// Upper bound for a CGPA written without a denominator.
    pub cgpa_default_scale: f32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            ner_window_chars: 1000,
            name_rules: NameRules::default(),
            cgpa_default_scale: 10.0,
        }
    }
}

/// Result of one run, with the normalized text kept for intake checks.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub text: NormalizedText,
    pub record: ExtractedRecord,
}

pub struct ExtractionPipeline {
    tagger: Arc<dyn EntityTagger>,
    resolver: NameResolver,
    extractors: Vec<Box<dyn FieldExtractor>>,
    ner_window_chars: usize,
}

impl ExtractionPipeline {
    pub fn new(
        tagger: Arc<dyn EntityTagger>,
        settings: PipelineSettings,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            tagger,
            resolver: NameResolver::new(settings.name_rules)?,
            extractors: default_extractors(settings.cgpa_default_scale)?,
            ner_window_chars: settings.ner_window_chars,
        })
    }

    pub fn tagger_backend(&self) -> &str {
        self.tagger.backend()
    }

    /// Runs the pipeline over a raw document.
    pub fn process(&self, doc: &RawDocument, extractor: &dyn TextExtractor) -> PipelineOutput {
        let raw = document_text(doc, extractor);
        let text = normalize(&raw);
        let record = self.extract(&text);
        info!(
            "Extracted {}/{} fields from {:?} document ({} chars)",
            record.found_count(),
            Field::ALL.len(),
            doc.kind,
            text.char_len()
        );
        PipelineOutput { text, record }
    }

    /// Runs recognition, resolution and the pattern extractors over
    /// already-normalized text.
    pub fn extract(&self, text: &NormalizedText) -> ExtractedRecord {
        let mut builder = RecordBuilder::default();
        if text.is_empty() {
            return builder.build();
        }

        let candidates = recognize_names(self.tagger.as_ref(), text, self.ner_window_chars);
        builder.set(Field::Name, self.resolver.resolve(text, &candidates));

        for extractor in &self.extractors {
            let value = extractor.extract(text.as_str());
            debug!(
                "{} extractor: {}",
                extractor.field().as_str(),
                if value.is_some() { "hit" } else { "miss" }
            );
            builder.set(extractor.field(), value);
        }

        builder.build()
    }
}
