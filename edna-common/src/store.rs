//! Object storage collaborator
//!
//! The pipeline never talks HTTP itself. Everything it reads goes through
//! [`ObjectStore`], implemented over reqwest by the service crate and by
//! [`StaticStore`] in tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use crate::listing::{BucketListing, ListingEntry};
use crate::time_series::{parse_csv, CsvRow};
use crate::{Error, Result};

/// Read access to the monitoring bucket
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Full object listing, in bucket order
    async fn fetch_listing(&self) -> Result<BucketListing>;

    /// Object body as text
    async fn fetch_text(&self, key: &str) -> Result<String>;

    /// Object body decoded as JSON
    async fn fetch_json(&self, key: &str) -> Result<Value> {
        let text = self.fetch_text(key).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Object body parsed as a CSV sheet with a header row
    async fn fetch_csv(&self, key: &str) -> Result<Vec<CsvRow>> {
        let text = self.fetch_text(key).await?;
        parse_csv(&text)
    }

    /// Public URL of an object
    fn object_url(&self, key: &str) -> String;
}

/// In-memory bucket
#[derive(Debug, Clone, Default)]
pub struct StaticStore {
    base_url: String,
    entries: Vec<ListingEntry>,
    bodies: HashMap<String, String>,
    failures: HashMap<String, u16>,
}

impl StaticStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Add a listed object with its body; size is the body length
    pub fn with_object(mut self, key: &str, body: &str) -> Self {
        self.entries.push(ListingEntry::new(key, body.len() as i64));
        self.bodies.insert(key.to_string(), body.to_string());
        self
    }

    /// Add a listing entry without a body (directory markers, images)
    pub fn with_entry(mut self, key: &str, size: i64) -> Self {
        self.entries.push(ListingEntry::new(key, size));
        self
    }

    /// Serve a body for a key that is not part of the listing
    pub fn with_unlisted(mut self, key: &str, body: &str) -> Self {
        self.bodies.insert(key.to_string(), body.to_string());
        self
    }

    /// Make fetching `key` fail with an HTTP status
    pub fn with_failure(mut self, key: &str, status: u16) -> Self {
        self.failures.insert(key.to_string(), status);
        self
    }
}

#[async_trait]
impl ObjectStore for StaticStore {
    async fn fetch_listing(&self) -> Result<BucketListing> {
        Ok(BucketListing::from_entries(self.entries.clone()))
    }

    async fn fetch_text(&self, key: &str) -> Result<String> {
        if let Some(status) = self.failures.get(key) {
            return Err(Error::Fetch {
                url: self.object_url(key),
                status: *status,
            });
        }

        self.bodies.get(key).cloned().ok_or_else(|| Error::Fetch {
            url: self.object_url(key),
            status: 404,
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}
