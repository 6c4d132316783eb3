mod config;
mod errors;
mod extraction;
mod ner_client;
mod review;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::document::PdfTextExtractor;
use crate::extraction::pipeline::ExtractionPipeline;
use crate::extraction::recognizer::{DisabledTagger, EntityTagger};
use crate::ner_client::{HfInferenceTagger, HfTaggerConfig};
use crate::review::store::ReviewStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume-intake v{}", env!("CARGO_PKG_VERSION"));

    // Initialize entity tagger (blocking client, so build it off the runtime)
    let tagger = build_tagger(&config).await?;
    info!("Entity tagger initialized (backend: {})", tagger.backend());

    // Build extraction pipeline
    let pipeline = Arc::new(
        ExtractionPipeline::new(tagger, config.pipeline_settings())
            .context("Failed to build extraction pipeline")?,
    );

    // Build app state
    let state = AppState {
        pipeline: pipeline.clone(),
        text_extractor: Arc::new(PdfTextExtractor),
        reviews: ReviewStore::new(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    release_off_runtime(pipeline).await?;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}

/// Drops `value` on the blocking pool. The tagger may own a blocking HTTP
/// client, which panics when dropped inside the async runtime.
async fn release_off_runtime<T: Send + 'static>(value: T) -> Result<()> {
    tokio::task::spawn_blocking(move || drop(value))
        .await
        .context("spawn_blocking failed while releasing the pipeline")
}

/// Hugging Face tagger when a token is configured, otherwise the disabled tagger.
async fn build_tagger(config: &Config) -> Result<Arc<dyn EntityTagger>> {
    let Some(api_token) = config.hf_api_token.clone() else {
        warn!("HF_API_TOKEN not set; names will come from the heading heuristic only");
        return Ok(Arc::new(DisabledTagger));
    };

    let tagger_config = HfTaggerConfig {
        api_url: config.ner_api_url.clone(),
        model: config.ner_model.clone(),
        api_token,
        timeout: Duration::from_secs(config.ner_timeout_secs),
    };
    let model = tagger_config.model.clone();

    let tagger = tokio::task::spawn_blocking(move || HfInferenceTagger::new(tagger_config))
        .await
        .context("spawn_blocking failed while building the NER client")?
        .context("Failed to build the NER client")?;
    info!("NER model: {model} at {}", tagger.endpoint());

    Ok(Arc::new(tagger))
}
