use std::sync::Arc;

use crate::config::Config;
use crate::extraction::document::TextExtractor;
use crate::extraction::pipeline::ExtractionPipeline;
use crate::review::store::ReviewStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Read-only after startup; shared across blocking extraction tasks.
    pub pipeline: Arc<ExtractionPipeline>,
    /// Pluggable PDF text extractor. Default: PdfTextExtractor.
    pub text_extractor: Arc<dyn TextExtractor>,
    pub reviews: ReviewStore,
    pub config: Config,
}
