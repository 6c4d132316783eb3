use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::extraction::document::{RawDocument, SourceKind};
use crate::review::store::ReviewEntry;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ExtractRequest {
    pub text: String,
    pub sender: Option<String>,
}

/// POST /api/v1/resumes/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    Json(req): Json<ExtractRequest>,
) -> Result<(StatusCode, Json<ReviewEntry>), AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::Validation("text must not be empty".to_string()));
    }
    let doc = RawDocument::text(req.text).with_sender(blank_to_none(req.sender));
    let entry = intake(&state, doc).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// POST /api/v1/resumes/upload
/// Multipart form: `file` (PDF or plain text) and an optional `sender`.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ReviewEntry>), AppError> {
    let mut file: Option<(Bytes, Option<String>, Option<String>)> = None;
    let mut sender: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let content_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read file: {e}")))?;
                file = Some((data, content_type, file_name));
            }
            Some("sender") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read sender: {e}")))?;
                sender = blank_to_none(Some(value));
            }
            _ => {}
        }
    }

    let (payload, content_type, file_name) = file.ok_or_else(|| {
        AppError::Validation("multipart field 'file' is required".to_string())
    })?;

    let kind = SourceKind::from_content_type(content_type.as_deref(), file_name.as_deref())
        .ok_or_else(|| {
            AppError::UnsupportedMediaType(format!(
                "expected a PDF or plain-text file, got {}",
                content_type.as_deref().unwrap_or("unknown type")
            ))
        })?;

    let doc = RawDocument::new(payload, kind)
        .with_file_name(file_name)
        .with_sender(sender);

    let entry = intake(&state, doc).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Runs the pipeline off the async runtime, then queues the record.
async fn intake(state: &AppState, doc: RawDocument) -> Result<ReviewEntry, AppError> {
    let pipeline = state.pipeline.clone();
    let text_extractor = state.text_extractor.clone();
    let sender = doc.sender.clone();

    // PDF parsing, the model call and the regex passes are all blocking work.
    let output =
        tokio::task::spawn_blocking(move || pipeline.process(&doc, text_extractor.as_ref()))
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("spawn_blocking failed in extraction: {e}"))
            })?;

    if output.text.char_len() < state.config.min_text_chars {
        return Err(AppError::UnprocessableEntity(format!(
            "document yielded {} characters of text; at least {} are required \
             (image-only or protected PDF?)",
            output.text.char_len(),
            state.config.min_text_chars
        )));
    }

    let entry = state.reviews.insert(output.record, sender).await?;
    info!(
        "Resume {} accepted: name='{}', email='{}'",
        entry.id, entry.record.name, entry.record.email
    );
    Ok(entry)
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
