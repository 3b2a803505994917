//! Bucket listing
//!
//! The object store exposes its inventory as an S3 `ListBucketResult` XML
//! document. Keys are flat, slash-delimited paths; "folders" only exist as
//! zero-size marker objects.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::Result;

/// One object of the listing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListingEntry {
    /// Slash-delimited object key
    #[serde(rename = "Key")]
    pub key: String,

    /// Object size in bytes; zero or less marks a directory placeholder
    #[serde(rename = "Size", default)]
    pub size: i64,

    #[serde(rename = "LastModified", default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl ListingEntry {
    pub fn new(key: impl Into<String>, size: i64) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified: None,
        }
    }

    /// Directory markers never contribute to a site
    pub fn is_file(&self) -> bool {
        self.size > 0
    }
}

/// Parsed `ListBucketResult` document
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BucketListing {
    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "IsTruncated", default)]
    pub is_truncated: bool,

    /// Entries in listing order
    #[serde(rename = "Contents", default)]
    pub contents: Vec<ListingEntry>,
}

impl BucketListing {
    pub fn from_entries(entries: Vec<ListingEntry>) -> Self {
        Self {
            name: String::new(),
            is_truncated: false,
            contents: entries,
        }
    }

    /// Parse the XML body returned by the bucket endpoint
    pub fn from_xml(xml: &str) -> Result<Self> {
        let listing: BucketListing = quick_xml::de::from_str(xml)?;

        if listing.is_truncated {
            warn!(
                bucket = %listing.name,
                entries = listing.contents.len(),
                "Bucket listing is truncated; raise max-keys to see every object"
            );
        }
        debug!(
            bucket = %listing.name,
            entries = listing.contents.len(),
            "Parsed bucket listing"
        );

        Ok(listing)
    }

    /// Entries with a positive size, in listing order
    pub fn files(&self) -> impl Iterator<Item = (usize, &ListingEntry)> {
        self.contents.iter().enumerate().filter(|(_, e)| e.is_file())
    }
}
