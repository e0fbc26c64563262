//! Record store adapters
//!
//! The pipeline treats the store as a generic CRUD data service reached over
//! the network: blocking, fallible calls with no retry, timeout, or backoff
//! policy here. Any such policy belongs to the store side.

pub mod memory;
pub mod rest;

use crate::types::SiteRecord;
use async_trait::async_trait;

pub use memory::MemoryStore;
pub use rest::RestStore;

/// Errors surfaced by a record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Request(String),
    #[error("store returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("store returned malformed data: {0}")]
    Decode(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// The CRUD surface the pipeline requires from a record store.
///
/// `insert` is create-or-fail with no upsert semantics. `query_all` assumes
/// no server-side filtering beyond an optional row limit; all age and
/// milestone filtering is client-side.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record. Fails if the store rejects it.
    async fn insert(&self, record: &SiteRecord) -> Result<(), StoreError>;

    /// Exact-match query on a single field.
    async fn query_by_field(&self, field: &str, value: &str) -> Result<Vec<SiteRecord>, StoreError>;

    /// Fetch every record, optionally capped at `limit` rows.
    async fn query_all(&self, limit: Option<usize>) -> Result<Vec<SiteRecord>, StoreError>;

    /// Partial update of every record matching `match_field == match_value`.
    ///
    /// `fields` is a JSON object of column -> new value; only the named
    /// columns are replaced.
    async fn update_fields(
        &self,
        match_field: &str,
        match_value: &str,
        fields: serde_json::Value,
    ) -> Result<(), StoreError>;
}
