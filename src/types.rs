//! Core data model shared across the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named text files belonging to a record, keyed by filename.
pub type FileMap = BTreeMap<String, String>;

/// A persisted unit of generated content.
///
/// `files` is the only mutable field after creation, and it only changes
/// through the improvement engine. `fingerprint` is assigned exactly once,
/// before the first insert, and doubles as the record's external identifier
/// and dedup key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteRecord {
    /// Display name, generated at creation.
    pub name: String,
    /// Caller-supplied free text the content was generated from.
    pub description: String,
    /// Filename -> content mapping. Never empty after creation.
    pub files: FileMap,
    /// Dedup key and external identifier. Not guaranteed globally unique.
    pub fingerprint: String,
    /// Creation timestamp, set once.
    pub created_at: DateTime<Utc>,
    /// Opaque per-record secret. Never derived from content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
}

impl SiteRecord {
    /// Whole days elapsed between creation and `now`.
    ///
    /// Floor division, so a record stays at the same age for a full day.
    /// Negative if `created_at` is in the future (clock skew); callers treat
    /// that as "no milestone".
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_days()
    }
}
