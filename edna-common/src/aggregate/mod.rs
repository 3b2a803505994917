//! Site aggregation
//!
//! Both views make one pass over the listing. Every relevant entry becomes a
//! [`FetchPlan`]; plans are fetched concurrently but results come back in
//! listing order and are folded into per-site state sequentially, so "first
//! seen" and "last seen" rules mean the same thing as a plain sequential walk.

pub mod detail;
pub mod list;
pub mod species;

use chrono::Datelike;
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::debug;

use crate::classify::{classify, AssetRole};
use crate::groups::GroupPrefix;
use crate::language::Language;
use crate::listing::BucketListing;
use crate::store::ObjectStore;
use crate::text_record::{parse_localized, LocalizedRecord, DESCRIPTION_VOCABULARY};
use crate::time_series::CsvRow;
use crate::Result;

pub use detail::{aggregate_detail, LegendEntry, SiteDetail, TimeSeriesSummary};
pub use list::{aggregate_list, GeometryError, SiteList, SiteRecord};
pub use species::{SpeciesEntry, SpeciesYearPolicy};

/// Fetches kept in flight per request
pub const DEFAULT_FETCH_CONCURRENCY: usize = 8;

/// Per-request settings of an aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    pub lang: Language,
    /// Upper bound for time-series year selection
    pub current_year: i32,
    pub concurrency: usize,
    pub species_policy: SpeciesYearPolicy,
}

impl AggregateOptions {
    pub fn new(lang: Language) -> Self {
        Self {
            lang,
            current_year: chrono::Utc::now().year(),
            concurrency: DEFAULT_FETCH_CONCURRENCY,
            species_policy: SpeciesYearPolicy::default(),
        }
    }

    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_species_policy(mut self, policy: SpeciesYearPolicy) -> Self {
        self.species_policy = policy;
        self
    }
}

/// One listing entry scheduled for retrieval
#[derive(Debug, Clone)]
pub(crate) struct FetchPlan {
    /// Position in the listing
    pub position: usize,
    pub site_id: String,
    pub key: String,
    pub role: AssetRole,
    pub path_prefix: Option<GroupPrefix>,
}

/// Retrieved body of a planned entry
#[derive(Debug)]
pub(crate) enum Fetched {
    /// Asset served by URL only (images, reports)
    Url(String),
    /// Geometry failures are kept so the merge can record them
    Geometry(Result<Value>),
    Info(LocalizedRecord),
    Rows(Vec<CsvRow>),
}

/// Plans for every file entry accepted by `keep`
pub(crate) fn plan_fetches<F>(listing: &BucketListing, keep: F) -> Vec<FetchPlan>
where
    F: Fn(&str, AssetRole) -> bool,
{
    listing
        .files()
        .filter_map(|(position, entry)| {
            let classification = classify(&entry.key);
            let site_id = classification.site_id?;
            let role = classification.role?;
            keep(&site_id, role).then(|| FetchPlan {
                position,
                site_id,
                key: entry.key.clone(),
                role,
                path_prefix: classification.group_prefix,
            })
        })
        .collect()
}

/// Fetch every plan, at most `concurrency` at a time, preserving plan order
pub(crate) async fn fetch_all<K>(
    store: &dyn ObjectStore,
    plans: Vec<FetchPlan>,
    allowed_keys: &[K],
    concurrency: usize,
) -> Result<Vec<(FetchPlan, Fetched)>>
where
    K: AsRef<str> + Sync,
{
    debug!(plans = plans.len(), concurrency, "Fetching site assets");

    let results: Vec<Result<(FetchPlan, Fetched)>> = stream::iter(plans)
        .map(|plan| async move {
            let fetched = fetch_one(store, &plan, allowed_keys).await?;
            Ok((plan, fetched))
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    results.into_iter().collect()
}

async fn fetch_one<K>(store: &dyn ObjectStore, plan: &FetchPlan, allowed_keys: &[K]) -> Result<Fetched>
where
    K: AsRef<str> + Sync,
{
    let fetched = match plan.role {
        AssetRole::Image | AssetRole::ReportPdf => Fetched::Url(store.object_url(&plan.key)),
        AssetRole::Geometry => Fetched::Geometry(store.fetch_json(&plan.key).await),
        AssetRole::InfoText => {
            let text = store.fetch_text(&plan.key).await?;
            Fetched::Info(parse_localized(&text, allowed_keys, &DESCRIPTION_VOCABULARY))
        }
        AssetRole::TaxaCsv | AssetRole::TimeSeriesCsv => {
            Fetched::Rows(store.fetch_csv(&plan.key).await?)
        }
    };
    Ok(fetched)
}

/// Group of a site: typology wins over the path token
pub(crate) fn effective_prefix(
    typology: Option<GroupPrefix>,
    path: Option<GroupPrefix>,
) -> Option<GroupPrefix> {
    typology.or(path)
}
