//! # eDNA Common Library
//!
//! Core of the eDNA monitoring API:
//! - Bucket listing and object key classification
//! - Info text parsing (language sections, positional description fields)
//! - Time-series CSV selection policies
//! - Site list and site detail aggregation
//! - Static reference data (species taxonomy, typology tables, chart legend)
//! - Storage trait implemented by the service crate

pub mod aggregate;
pub mod classify;
pub mod countries;
pub mod error;
pub mod geometry;
pub mod groups;
pub mod language;
pub mod listing;
pub mod store;
pub mod text_record;
pub mod time_series;

pub use error::{Error, Result};
pub use groups::GroupPrefix;
pub use language::Language;
pub use store::{ObjectStore, StaticStore};
