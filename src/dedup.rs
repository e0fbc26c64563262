//! Duplicate detection against the record store.
//!
//! The check queries on the candidate record's freshly generated
//! fingerprint, so in practice it can only catch an exact fingerprint
//! collision, never semantic content duplication. That narrow guarantee is
//! deliberate; see DESIGN.md for why the fingerprint is not a content hash.

use crate::store::RecordStore;
use std::sync::Arc;
use tracing::warn;

/// Fingerprint-exact dedup checker.
pub struct DedupChecker {
    store: Arc<dyn RecordStore>,
}

impl DedupChecker {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Whether any stored record already carries this fingerprint.
    ///
    /// FAIL-OPEN: a store error is treated as "no duplicate found" so a
    /// briefly unreachable store never blocks record creation. The error is
    /// logged and swallowed.
    pub async fn exists_by_fingerprint(&self, fingerprint: &str) -> bool {
        match self.store.query_by_field("fingerprint", fingerprint).await {
            Ok(records) => !records.is_empty(),
            Err(e) => {
                warn!(%fingerprint, error = %e, "dedup check failed, treating as not duplicate");
                false
            }
        }
    }
}
