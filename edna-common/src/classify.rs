//! Object key classification
//!
//! The bucket has no schema: the site a file belongs to and what the file is
//! for are both inferred from the key itself.
//!
//! ```text
//! ma_2111174670/2111174670_time_series.csv
//! ^^             ^^^^^^^^^^ ^^^^^^^^^^^ ^^^
//! group prefix   site id    role hint   extension
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::groups::GroupPrefix;

/// Shortest digit run accepted as a site id
pub const MIN_SITE_ID_LEN: usize = 6;

pub const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "png", "jpeg"];

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").expect("digit run pattern"));

/// What an object is used for when building a site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetRole {
    Image,
    Geometry,
    InfoText,
    TaxaCsv,
    TimeSeriesCsv,
    ReportPdf,
}

/// Result of classifying one key
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    pub site_id: Option<String>,
    pub group_prefix: Option<GroupPrefix>,
    pub role: Option<AssetRole>,
}

/// Classify a raw object key
pub fn classify(key: &str) -> Classification {
    let Some(site_id) = site_id(key) else {
        return Classification::default();
    };

    Classification {
        site_id: Some(site_id),
        group_prefix: path_group_prefix(key),
        role: role(key),
    }
}

/// Last run of digits in the key, if long enough to be a site id
///
/// Path segments may carry short numbers of their own, so the last run wins.
pub fn site_id(key: &str) -> Option<String> {
    DIGIT_RUN
        .find_iter(key)
        .last()
        .map(|m| m.as_str())
        .filter(|run| run.len() >= MIN_SITE_ID_LEN)
        .map(str::to_string)
}

/// Final path segment of a key
pub fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Lower-cased extension of the final segment (whole segment without a dot)
pub fn extension(key: &str) -> String {
    let name = file_name(key);
    let ext = match name.rfind('.') {
        Some(idx) => &name[idx + 1..],
        None => name,
    };
    ext.to_ascii_lowercase()
}

/// Group encoded before the first underscore of the first path segment
pub fn path_group_prefix(key: &str) -> Option<GroupPrefix> {
    let first = key.split('/').next()?;
    let token = first.split('_').next()?;
    GroupPrefix::from_path_token(token)
}

/// Role implied by extension and file name
pub fn role(key: &str) -> Option<AssetRole> {
    let ext = extension(key);
    let name = file_name(key);

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Some(AssetRole::Image);
    }

    match ext.as_str() {
        // point overlays share the extension but are not site polygons
        "json" if name.contains("point") => None,
        "json" => Some(AssetRole::Geometry),
        "txt" => Some(AssetRole::InfoText),
        "csv" if name.contains("taxa") => Some(AssetRole::TaxaCsv),
        "csv" if name.contains("time_series") => Some(AssetRole::TimeSeriesCsv),
        "pdf" => Some(AssetRole::ReportPdf),
        _ => None,
    }
}
