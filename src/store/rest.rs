//! REST record store client.
//!
//! Speaks a PostgREST-style HTTP API: exact-match filters as
//! `?field=eq.value` query parameters, inserts as POST bodies, partial
//! updates as PATCH bodies scoped by the same filters. Authentication is an
//! opaque API key sent both as `apikey` and bearer token.

use super::{RecordStore, StoreError};
use crate::types::SiteRecord;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// HTTP client for the remote record store.
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

impl RestStore {
    /// Create a client for the given store endpoint and table.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            table: table.into(),
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status { status: status.as_u16(), body })
    }

    fn connect_err(e: reqwest::Error) -> StoreError {
        if e.is_connect() || e.is_timeout() {
            StoreError::Unavailable(e.to_string())
        } else {
            StoreError::Request(e.to_string())
        }
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn insert(&self, record: &SiteRecord) -> Result<(), StoreError> {
        let req = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=minimal")
            .json(record);
        let response = self.authed(req).send().await.map_err(Self::connect_err)?;
        Self::check_status(response).await?;
        Ok(())
    }

    async fn query_by_field(&self, field: &str, value: &str) -> Result<Vec<SiteRecord>, StoreError> {
        let filter = format!("eq.{}", value);
        let req = self
            .client
            .get(self.table_url())
            .query(&[("select", "*"), (field, filter.as_str())]);
        let response = self.authed(req).send().await.map_err(Self::connect_err)?;
        let response = Self::check_status(response).await?;
        response
            .json::<Vec<SiteRecord>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn query_all(&self, limit: Option<usize>) -> Result<Vec<SiteRecord>, StoreError> {
        let mut req = self.client.get(self.table_url()).query(&[("select", "*")]);
        if let Some(limit) = limit {
            req = req.query(&[("limit", limit.to_string())]);
        }
        let response = self.authed(req).send().await.map_err(Self::connect_err)?;
        let response = Self::check_status(response).await?;
        response
            .json::<Vec<SiteRecord>>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn update_fields(
        &self,
        match_field: &str,
        match_value: &str,
        fields: Value,
    ) -> Result<(), StoreError> {
        let filter = format!("eq.{}", match_value);
        let req = self
            .client
            .patch(self.table_url())
            .query(&[(match_field, filter.as_str())])
            .header("Prefer", "return=minimal")
            .json(&fields);
        let response = self.authed(req).send().await.map_err(Self::connect_err)?;
        Self::check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_strips_trailing_slash() {
        let store = RestStore::new("https://store.example.com/", "key", "sites");
        assert_eq!(store.table_url(), "https://store.example.com/rest/v1/sites");
    }
}
