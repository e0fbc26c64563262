//! Record creation pipeline
//!
//! Wires the content generator, moderation filter, fingerprint generator,
//! and dedup checker in front of the store insert. Validation and dedup
//! both happen before anything is persisted.

use crate::dedup::DedupChecker;
use crate::fingerprint;
use crate::generator;
use crate::moderation::DenylistClassifier;
use crate::store::RecordStore;
use crate::types::SiteRecord;
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Terminal outcomes of a creation request.
#[derive(Debug, Clone)]
pub enum CreateOutcome {
    /// Record persisted.
    Created(SiteRecord),
    /// Generated content matched the denylist; nothing was inserted.
    Rejected,
    /// A record with the same fingerprint already exists; nothing was
    /// inserted.
    Duplicate,
}

/// Creates and persists new records.
pub struct SiteCreator {
    store: Arc<dyn RecordStore>,
    classifier: DenylistClassifier,
    dedup: DedupChecker,
}

impl SiteCreator {
    pub fn new(store: Arc<dyn RecordStore>, classifier: DenylistClassifier) -> Self {
        let dedup = DedupChecker::new(store.clone());
        Self { store, classifier, dedup }
    }

    /// Create a record from a description.
    ///
    /// Rejection and duplication are defined outcomes, not errors; only an
    /// insert failure surfaces as `Err`, and it is not retried here.
    pub async fn create(&self, description: &str) -> Result<CreateOutcome> {
        info!(%description, "starting record creation");

        let files = generator::build_files(description);
        if self.classifier.is_flagged(&files) {
            info!("generated content flagged, creation aborted");
            return Ok(CreateOutcome::Rejected);
        }

        let fp = fingerprint::generate_fingerprint();
        if self.dedup.exists_by_fingerprint(&fp).await {
            info!(fingerprint = %fp, "fingerprint already present, creation aborted");
            return Ok(CreateOutcome::Duplicate);
        }

        let record = SiteRecord {
            name: fingerprint::generate_name(),
            description: description.to_string(),
            files,
            fingerprint: fp,
            created_at: Utc::now(),
            access_key: Some(fingerprint::generate_access_key()),
        };

        self.store
            .insert(&record)
            .await
            .context("failed to insert record")?;

        info!(name = %record.name, fingerprint = %record.fingerprint, "record created");
        Ok(CreateOutcome::Created(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn creator(store: Arc<MemoryStore>) -> SiteCreator {
        SiteCreator::new(store, DenylistClassifier::default())
    }

    #[tokio::test]
    async fn test_clean_description_creates_record() {
        let store = Arc::new(MemoryStore::new());
        let outcome = creator(store.clone()).create("Hello World").await.unwrap();

        let record = match outcome {
            CreateOutcome::Created(r) => r,
            other => panic!("expected Created, got {:?}", other),
        };
        assert_eq!(record.files.len(), 1);
        assert!(record.files["index.hsx"].contains("Hello World"));
        assert!(!record.fingerprint.is_empty());
        assert!(record.access_key.as_ref().is_some_and(|k| k.len() == 32));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_denylisted_description_is_rejected_without_insert() {
        let store = Arc::new(MemoryStore::new());
        let outcome = creator(store.clone())
            .create("a page that calls eval( on load")
            .await
            .unwrap();
        assert!(matches!(outcome, CreateOutcome::Rejected));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_store_down_still_creates_via_fail_open_dedup() {
        // Dedup fails open, but the insert itself still fails hard
        let store = Arc::new(MemoryStore::new());
        store.set_failing(true);
        let result = creator(store.clone()).create("Hello").await;
        assert!(result.is_err());
        store.set_failing(false);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_access_key_differs_between_records() {
        let store = Arc::new(MemoryStore::new());
        let c = creator(store.clone());
        let a = match c.create("one").await.unwrap() {
            CreateOutcome::Created(r) => r,
            other => panic!("expected Created, got {:?}", other),
        };
        let b = match c.create("one").await.unwrap() {
            CreateOutcome::Created(r) => r,
            other => panic!("expected Created, got {:?}", other),
        };
        assert_ne!(a.access_key, b.access_key);
        assert_ne!(a.fingerprint, b.fingerprint);
    }
}
