//! Remote tier - authoritative record source over HTTP.
//!
//! The slowest tier and the only source of truth. The store queries it on
//! demand and holds no state on its behalf.
//!
//! # Endpoints
//! Relative to the configured base URL:
//! - `GET records` - full collection
//! - `PUT records` - replace the full collection
//! - `PUT records/{id}` - upsert one record
//! - `DELETE records` - drop the full collection

use crate::error::{StoreError, StoreResult};
use crate::tier::RecordTier;
use crate::types::{Record, RecordCollection};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Url};
use std::time::Duration;

/// Configuration for the remote tier.
#[derive(Clone, Debug)]
pub struct RemoteConfig {
    /// Base URL of the record service, e.g. `http://localhost:8000/api/v1`.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/v1".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP-backed remote tier.
#[derive(Clone, Debug)]
pub struct RemoteTier {
    client: Client,
    records_url: Url,
}

impl RemoteTier {
    /// Builds a remote tier, failing fast when the configuration cannot
    /// produce a usable endpoint.
    pub fn new(config: RemoteConfig) -> StoreResult<Self> {
        if config.base_url.trim().is_empty() {
            return Err(StoreError::PreconditionViolation(
                "remote base URL is empty".to_string(),
            ));
        }

        // Trailing slash so joins keep the base path instead of replacing its
        // last segment.
        let normalized = if config.base_url.ends_with('/') {
            config.base_url.clone()
        } else {
            format!("{}/", config.base_url)
        };

        let base_url = Url::parse(&normalized).map_err(|e| {
            StoreError::PreconditionViolation(format!(
                "invalid remote base URL `{}`: {e}",
                config.base_url
            ))
        })?;

        let records_url = base_url.join("records").map_err(|e| {
            StoreError::PreconditionViolation(format!(
                "cannot derive records endpoint from `{}`: {e}",
                config.base_url
            ))
        })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                StoreError::PreconditionViolation(format!("cannot build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            records_url,
        })
    }

    /// Endpoint serving the full collection.
    pub fn records_url(&self) -> &Url {
        &self.records_url
    }

    fn record_url(&self, id: &str) -> StoreResult<Url> {
        self.records_url
            .join(&format!("records/{id}"))
            .map_err(|e| StoreError::RemoteFailure(format!("invalid record id `{id}`: {e}")))
    }
}

#[async_trait]
impl RecordTier for RemoteTier {
    async fn fetch_all(&self) -> StoreResult<RecordCollection> {
        let response = self
            .client
            .get(self.records_url.clone())
            .send()
            .await?
            .error_for_status()?;

        let records: RecordCollection = response.json().await?;
        debug!("remote returned {} records", records.len());
        Ok(records)
    }

    async fn save_all(&self, records: &[Record]) -> StoreResult<()> {
        self.client
            .put(self.records_url.clone())
            .json(&records)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn save_one(&self, record: &Record) -> StoreResult<()> {
        let url = self.record_url(&record.id)?;
        self.client
            .put(url)
            .json(record)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn delete_all(&self) -> StoreResult<()> {
        self.client
            .delete(self.records_url.clone())
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = RemoteConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.timeout.as_secs(), 10);
    }

    #[test]
    fn test_empty_base_url_is_rejected() {
        let config = RemoteConfig {
            base_url: "   ".to_string(),
            ..RemoteConfig::default()
        };
        let err = RemoteTier::new(config).unwrap_err();
        assert!(matches!(err, StoreError::PreconditionViolation(_)));
    }

    #[test]
    fn test_unparseable_base_url_is_rejected() {
        let config = RemoteConfig {
            base_url: "not a url".to_string(),
            ..RemoteConfig::default()
        };
        let err = RemoteTier::new(config).unwrap_err();
        assert!(matches!(err, StoreError::PreconditionViolation(_)));
    }

    #[test]
    fn test_records_endpoint_keeps_base_path() {
        let config = RemoteConfig {
            base_url: "http://localhost:8000/api/v1".to_string(),
            ..RemoteConfig::default()
        };
        let tier = RemoteTier::new(config).unwrap();
        assert_eq!(
            tier.records_url().as_str(),
            "http://localhost:8000/api/v1/records"
        );
        assert_eq!(
            tier.record_url("r-1").unwrap().as_str(),
            "http://localhost:8000/api/v1/records/r-1"
        );
    }
}
