//! Improvement engine
//!
//! Re-touches an existing record by appending a timestamped marker line to
//! every file, re-validating through the moderation filter, and persisting
//! the new files mapping. Each clean pass appends one more marker, so
//! repeated passes grow content monotonically; bounding how often this runs
//! is the scheduler's job, not ours.

use crate::moderation::DenylistClassifier;
use crate::store::RecordStore;
use crate::types::{FileMap, SiteRecord};
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Result of a single improvement pass.
#[derive(Debug, Clone)]
pub enum ImproveOutcome {
    /// Files were updated and persisted.
    Updated(FileMap),
    /// Post-update content was flagged; the stored record was left untouched.
    Skipped,
}

impl std::fmt::Display for ImproveOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImproveOutcome::Updated(files) => write!(f, "updated {} file(s)", files.len()),
            ImproveOutcome::Skipped => write!(f, "skipped (content flagged)"),
        }
    }
}

/// Applies improvement passes against the record store.
pub struct Improver {
    store: Arc<dyn RecordStore>,
    classifier: DenylistClassifier,
}

impl Improver {
    pub fn new(store: Arc<dyn RecordStore>, classifier: DenylistClassifier) -> Self {
        Self { store, classifier }
    }

    /// Run one improvement pass over a record.
    ///
    /// A flagged result is a defined terminal outcome, not an error; only
    /// store failures surface as `Err`. The stored record is never mutated
    /// before validation passes.
    pub async fn improve(&self, record: &SiteRecord) -> Result<ImproveOutcome> {
        info!(name = %record.name, fingerprint = %record.fingerprint, "improving record");

        let marker = format!("\n<!-- Auto-improved at {} -->", Utc::now().to_rfc3339());
        let mut improved: FileMap = record.files.clone();
        for content in improved.values_mut() {
            content.push_str(&marker);
        }

        if self.classifier.is_flagged(&improved) {
            info!(name = %record.name, "record flagged after improvement, skipping update");
            return Ok(ImproveOutcome::Skipped);
        }

        self.store
            .update_fields(
                "fingerprint",
                &record.fingerprint,
                serde_json::json!({ "files": improved }),
            )
            .await
            .with_context(|| format!("failed to update record {}", record.fingerprint))?;

        info!(name = %record.name, "record improved");
        Ok(ImproveOutcome::Updated(improved))
    }
}
