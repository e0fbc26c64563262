//! In-process record store.
//!
//! Backs the CLI's offline mode and the test suite. Supports failure
//! injection so fail-open and tick-abort behavior can be exercised
//! deterministically.

use super::{RecordStore, StoreError};
use crate::types::SiteRecord;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Record store held entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<SiteRecord>>,
    fail: AtomicBool,
    fail_update_for: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every store operation fails with `Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    /// Fail only `update_fields` calls matching this value; other
    /// operations keep working. `None` clears the injection.
    pub fn set_update_failure(&self, match_value: Option<&str>) {
        *self.fail_update_for.lock().unwrap() = match_value.map(|v| v.to_string());
    }

    /// Seed a record directly, bypassing the creation pipeline.
    pub fn seed(&self, record: SiteRecord) {
        self.records.lock().unwrap().push(record);
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of a record by fingerprint, if present.
    pub fn get(&self, fingerprint: &str) -> Option<SiteRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.fingerprint == fingerprint)
            .cloned()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("injected failure".to_string()))
        } else {
            Ok(())
        }
    }

    fn field_value(record: &SiteRecord, field: &str) -> Option<String> {
        match field {
            "fingerprint" => Some(record.fingerprint.clone()),
            "name" => Some(record.name.clone()),
            "description" => Some(record.description.clone()),
            _ => None,
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, record: &SiteRecord) -> Result<(), StoreError> {
        self.check_available()?;
        let mut records = self.records.lock().unwrap();
        // Create-or-fail: duplicate fingerprints are rejected like a
        // unique-constraint violation would be
        if records.iter().any(|r| r.fingerprint == record.fingerprint) {
            return Err(StoreError::Status {
                status: 409,
                body: format!("duplicate fingerprint {}", record.fingerprint),
            });
        }
        records.push(record.clone());
        Ok(())
    }

    async fn query_by_field(&self, field: &str, value: &str) -> Result<Vec<SiteRecord>, StoreError> {
        self.check_available()?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| Self::field_value(r, field).as_deref() == Some(value))
            .cloned()
            .collect())
    }

    async fn query_all(&self, limit: Option<usize>) -> Result<Vec<SiteRecord>, StoreError> {
        self.check_available()?;
        let records = self.records.lock().unwrap();
        let take = limit.unwrap_or(records.len());
        Ok(records.iter().take(take).cloned().collect())
    }

    async fn update_fields(
        &self,
        match_field: &str,
        match_value: &str,
        fields: Value,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        if self.fail_update_for.lock().unwrap().as_deref() == Some(match_value) {
            return Err(StoreError::Unavailable(format!(
                "injected update failure for {}",
                match_value
            )));
        }
        let mut records = self.records.lock().unwrap();
        for record in records
            .iter_mut()
            .filter(|r| Self::field_value(r, match_field).as_deref() == Some(match_value))
        {
            if let Some(files) = fields.get("files") {
                record.files = serde_json::from_value(files.clone())
                    .map_err(|e| StoreError::Decode(e.to_string()))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileMap;
    use chrono::Utc;

    fn record(fp: &str) -> SiteRecord {
        SiteRecord {
            name: "Site_1".to_string(),
            description: "test".to_string(),
            files: FileMap::from([("index.hsx".to_string(), "<html></html>".to_string())]),
            fingerprint: fp.to_string(),
            created_at: Utc::now(),
            access_key: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_query() {
        let store = MemoryStore::new();
        store.insert(&record("site_1_aa")).await.unwrap();
        let found = store.query_by_field("fingerprint", "site_1_aa").await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(store
            .query_by_field("fingerprint", "site_2_bb")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_fingerprint() {
        let store = MemoryStore::new();
        store.insert(&record("site_1_aa")).await.unwrap();
        assert!(store.insert(&record("site_1_aa")).await.is_err());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_query_all_limit() {
        let store = MemoryStore::new();
        store.insert(&record("site_1_aa")).await.unwrap();
        store.insert(&record("site_2_bb")).await.unwrap();
        assert_eq!(store.query_all(Some(1)).await.unwrap().len(), 1);
        assert_eq!(store.query_all(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_fields_replaces_files_only() {
        let store = MemoryStore::new();
        store.insert(&record("site_1_aa")).await.unwrap();
        let new_files = FileMap::from([("index.hsx".to_string(), "updated".to_string())]);
        store
            .update_fields(
                "fingerprint",
                "site_1_aa",
                serde_json::json!({ "files": new_files }),
            )
            .await
            .unwrap();
        let rec = store.get("site_1_aa").unwrap();
        assert_eq!(rec.files["index.hsx"], "updated");
        assert_eq!(rec.description, "test");
    }

    #[tokio::test]
    async fn test_targeted_update_failure() {
        let store = MemoryStore::new();
        store.insert(&record("site_1_aa")).await.unwrap();
        store.insert(&record("site_2_bb")).await.unwrap();
        store.set_update_failure(Some("site_1_aa"));

        let files = serde_json::json!({ "files": { "index.hsx": "updated" } });
        assert!(store
            .update_fields("fingerprint", "site_1_aa", files.clone())
            .await
            .is_err());
        // Reads and other updates are unaffected
        store
            .update_fields("fingerprint", "site_2_bb", files)
            .await
            .unwrap();
        assert_eq!(store.query_all(None).await.unwrap().len(), 2);
        assert_eq!(store.get("site_2_bb").unwrap().files["index.hsx"], "updated");

        store.set_update_failure(None);
        let files = serde_json::json!({ "files": { "index.hsx": "later" } });
        store
            .update_fields("fingerprint", "site_1_aa", files)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryStore::new();
        store.set_failing(true);
        assert!(matches!(
            store.query_all(None).await,
            Err(StoreError::Unavailable(_))
        ));
        store.set_failing(false);
        assert!(store.query_all(None).await.is_ok());
    }
}
