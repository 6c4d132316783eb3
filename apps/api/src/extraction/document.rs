//! Raw documents and the text-extraction seam.

use std::panic::{catch_unwind, AssertUnwindSafe};

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Pdf,
    Text,
}

impl SourceKind {
    /// Detects the kind from an upload's content type, falling back to the
    /// file extension. `None` for anything the pipeline cannot read.
    pub fn from_content_type(content_type: Option<&str>, file_name: Option<&str>) -> Option<Self> {
        let mime = content_type
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_lowercase())
            .unwrap_or_default();

        match mime.as_str() {
            "application/pdf" => return Some(SourceKind::Pdf),
            m if m.starts_with("text/") => return Some(SourceKind::Text),
            "" | "application/octet-stream" => {}
            _ => return None,
        }

        let ext = file_name?.rsplit_once('.')?.1.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(SourceKind::Pdf),
            "txt" => Some(SourceKind::Text),
            _ => None,
        }
    }
}

/// One inbound resume, before any text has been pulled out of it.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub payload: Bytes,
    pub kind: SourceKind,
    pub file_name: Option<String>,
    pub sender: Option<String>,
}

impl RawDocument {
    pub fn new(payload: Bytes, kind: SourceKind) -> Self {
        Self {
            payload,
            kind,
            file_name: None,
            sender: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Bytes::from(text.into()), SourceKind::Text)
    }

    pub fn with_sender(mut self, sender: Option<String>) -> Self {
        self.sender = sender;
        self
    }

    pub fn with_file_name(mut self, file_name: Option<String>) -> Self {
        self.file_name = file_name;
        self
    }
}

#[derive(Debug, Error)]
pub enum TextExtractError {
    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("PDF library panicked while reading the document")]
    Panicked,
}

/// Turns PDF bytes into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, pdf: &[u8]) -> Result<String, TextExtractError>;
}

/// `pdf-extract` backed extractor.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, pdf: &[u8]) -> Result<String, TextExtractError> {
        // pdf-extract panics on some malformed inputs.
        match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(pdf))) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(TextExtractError::Pdf(format!("{e:?}"))),
            Err(_) => Err(TextExtractError::Panicked),
        }
    }
}

/// Raw text of a document. Extraction failures are logged and yield "".
pub fn document_text(doc: &RawDocument, extractor: &dyn TextExtractor) -> String {
    match doc.kind {
        SourceKind::Text => String::from_utf8_lossy(&doc.payload).into_owned(),
        SourceKind::Pdf => match extractor.extract_text(&doc.payload) {
            Ok(text) => {
                debug!("Extracted {} bytes of text from PDF", text.len());
                text
            }
            Err(e) => {
                warn!(
                    "Text extraction failed for {}: {e}",
                    doc.file_name.as_deref().unwrap_or("<unnamed>")
                );
                String::new()
            }
        },
    }
}
