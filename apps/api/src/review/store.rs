//! In-memory review queue for extracted records.
//!
//! One entry per accepted resume. Emails are unique across the queue,
//! compared case-insensitively; a record without an email never collides.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::extraction::record::{ExtractedRecord, Field};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Pending,
    Reviewed,
    Shortlisted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewEntry {
    pub id: Uuid,
    pub record: ExtractedRecord,
    pub status: ReviewStatus,
    pub sender: Option<String>,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("A resume with email '{0}' is already in the queue")]
    DuplicateEmail(String),

    #[error("No resume with email '{0}'")]
    UnknownEmail(String),
}

#[derive(Clone, Default)]
pub struct ReviewStore {
    entries: Arc<RwLock<Vec<ReviewEntry>>>,
}

impl ReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a record as `Pending`. Rejects an email already present.
    pub async fn insert(
        &self,
        record: ExtractedRecord,
        sender: Option<String>,
    ) -> Result<ReviewEntry, ReviewError> {
        let mut entries = self.entries.write().await;

        if record.is_found(Field::Email)
            && entries
                .iter()
                .any(|e| e.record.email.eq_ignore_ascii_case(&record.email))
        {
            return Err(ReviewError::DuplicateEmail(record.email));
        }

        let entry = ReviewEntry {
            id: Uuid::new_v4(),
            record,
            status: ReviewStatus::Pending,
            sender,
            received_at: Utc::now(),
        };
        entries.push(entry.clone());
        info!("Queued resume {} ({} in queue)", entry.id, entries.len());
        Ok(entry)
    }

    /// Entries in arrival order. With `min_cgpa`, only entries whose CGPA
    /// value is at least that; entries without a CGPA are left out.
    pub async fn list(&self, min_cgpa: Option<f32>) -> Vec<ReviewEntry> {
        let entries = self.entries.read().await;
        match min_cgpa {
            None => entries.clone(),
            Some(min) => entries
                .iter()
                .filter(|e| e.record.cgpa_value().is_some_and(|v| v >= min))
                .cloned()
                .collect(),
        }
    }

    pub async fn update_status(
        &self,
        email: &str,
        status: ReviewStatus,
    ) -> Result<ReviewEntry, ReviewError> {
        let email = email.trim();
        let mut entries = self.entries.write().await;
        let entry = entries
            .iter_mut()
            .find(|e| {
                e.record.is_found(Field::Email) && e.record.email.eq_ignore_ascii_case(email)
            })
            .ok_or_else(|| ReviewError::UnknownEmail(email.to_string()))?;

        entry.status = status;
        info!("Resume {} marked {:?}", entry.id, status);
        Ok(entry.clone())
    }

    pub async fn count(&self) -> usize {
        self.entries.read().await.len()
    }
}
