//! Common error types for the eDNA monitoring pipeline

use thiserror::Error;

/// Common result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the storage collaborator and the parsers
#[derive(Error, Debug)]
pub enum Error {
    /// Upstream answered with a non-success status
    #[error("Fetch failed for {url}: HTTP {status}")]
    Fetch { url: String, status: u16 },

    /// Upstream could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// Bucket listing was not valid ListBucketResult XML
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::DeError),

    /// CSV asset could not be read
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON asset could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// GeoJSON object had no usable coordinates
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True when the upstream store reported the object as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Fetch { status: 404, .. } | Error::NotFound(_))
    }
}
