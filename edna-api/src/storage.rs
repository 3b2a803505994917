//! HTTP object store
//!
//! Reads the public bucket over plain HTTPS. The listing is one request with
//! a large `max-keys`; every other object is fetched by key.

use async_trait::async_trait;
use edna_common::listing::BucketListing;
use edna_common::{Error, ObjectStore, Result};
use std::time::Duration;
use tracing::debug;

/// User agent sent to the bucket
const USER_AGENT: &str = concat!("edna-api/", env!("CARGO_PKG_VERSION"));

/// [`ObjectStore`] backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    http_client: reqwest::Client,
    base_url: String,
    max_keys: u64,
}

impl HttpObjectStore {
    pub fn new(base_url: &str, max_keys: u64, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_keys,
        })
    }

    /// URL of the bucket listing
    pub fn listing_url(&self) -> String {
        format!("{}/?max-keys={}", self.base_url, self.max_keys)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        debug!(url = %url, "Fetching object");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn fetch_listing(&self) -> Result<BucketListing> {
        let xml = self.get_text(&self.listing_url()).await?;
        BucketListing::from_xml(&xml)
    }

    async fn fetch_text(&self, key: &str) -> Result<String> {
        self.get_text(&self.object_url(key)).await
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let store =
            HttpObjectStore::new("https://bucket.test/edna/", 1000, Duration::from_secs(5)).unwrap();
        assert_eq!(store.listing_url(), "https://bucket.test/edna/?max-keys=1000");
        assert_eq!(
            store.object_url("ma_1234567/a.jpg"),
            "https://bucket.test/edna/ma_1234567/a.jpg"
        );
    }
}
