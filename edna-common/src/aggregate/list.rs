//! Site list
//!
//! Map markers for every complete site of the bucket.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{info, warn};

use super::species::{fill_quantities, select_richness, species_placeholders, SpeciesEntry};
use super::{effective_prefix, fetch_all, plan_fetches, AggregateOptions, FetchPlan, Fetched};
use crate::classify::AssetRole;
use crate::geometry::centroid;
use crate::groups::{integrity_icon, GroupPrefix, GROUP_ORDER, INTEGRITY_COLUMN};
use crate::store::ObjectStore;
use crate::text_record::{LocalizedRecord, LIST_KEYS};
use crate::time_series::{integrity_reading, CsvRow};
use crate::Result;

/// One marker of the site list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRecord {
    pub id: String,
    pub img: String,
    pub info: LocalizedRecord,
    /// Centroid of the site polygon
    pub geometry: Value,
    pub prefix: GroupPrefix,
    pub species: Vec<SpeciesEntry>,
    pub icon: String,
    pub integrity_index: Option<String>,
}

/// Polygon that could not be turned into a marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeometryError {
    pub error: String,
    pub id: String,
}

impl GeometryError {
    /// Polygon of site `id` failed to load or had no coordinates
    pub fn polygon(id: &str) -> Self {
        Self {
            error: "Error processing polygon".to_string(),
            id: id.to_string(),
        }
    }
}

/// Result of a list aggregation
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteList {
    pub sites: Vec<SiteRecord>,
    pub errors: Vec<GeometryError>,
}

#[derive(Debug, Default)]
struct SiteState {
    /// Listing position of the first image or geometry entry
    anchor: Option<usize>,
    img: Option<String>,
    info: Option<LocalizedRecord>,
    geometry: Option<Value>,
    path_prefix: Option<GroupPrefix>,
    typology_prefix: Option<GroupPrefix>,
    time_series: Option<Vec<CsvRow>>,
}

fn wanted(role: AssetRole) -> bool {
    matches!(
        role,
        AssetRole::Image | AssetRole::Geometry | AssetRole::InfoText | AssetRole::TimeSeriesCsv
    )
}

/// Build the ordered site list
///
/// Sites need an image, a polygon and an info file to be listed. Polygons that
/// fail to load are reported in [`SiteList::errors`] and do not abort the run.
pub async fn aggregate_list(store: &dyn ObjectStore, options: &AggregateOptions) -> Result<SiteList> {
    let listing = store.fetch_listing().await?;
    let plans = plan_fetches(&listing, |_, role| wanted(role));
    let fetched = fetch_all(store, plans, &LIST_KEYS, options.concurrency).await?;

    let mut order: Vec<String> = Vec::new();
    let mut states: HashMap<String, SiteState> = HashMap::new();
    let mut errors = Vec::new();

    for (plan, body) in fetched {
        let state = states.entry(plan.site_id.clone()).or_insert_with(|| {
            order.push(plan.site_id.clone());
            SiteState::default()
        });
        merge(state, &plan, body, options, &mut errors);
    }

    let mut grouped: Vec<(usize, usize, SiteRecord)> = order
        .into_iter()
        .filter_map(|id| {
            let state = states.remove(&id)?;
            finish(id, state, options)
        })
        .collect();

    grouped.sort_by_key(|(rank, anchor, _)| (*rank, *anchor));

    let sites: Vec<SiteRecord> = grouped.into_iter().map(|(_, _, site)| site).collect();

    info!(
        sites = sites.len(),
        geometry_errors = errors.len(),
        lang = %options.lang,
        "Aggregated site list"
    );

    Ok(SiteList { sites, errors })
}

fn merge(
    state: &mut SiteState,
    plan: &FetchPlan,
    body: Fetched,
    options: &AggregateOptions,
    errors: &mut Vec<GeometryError>,
) {
    if state.path_prefix.is_none() {
        state.path_prefix = plan.path_prefix;
    }
    if matches!(plan.role, AssetRole::Image | AssetRole::Geometry) && state.anchor.is_none() {
        state.anchor = Some(plan.position);
    }

    match body {
        Fetched::Url(url) => state.img = Some(url),
        Fetched::Geometry(result) => match result.and_then(|polygon| centroid(&polygon)) {
            Ok(point) => state.geometry = Some(point),
            Err(e) => {
                warn!(site_id = %plan.site_id, key = %plan.key, error = %e, "Error processing polygon");
                errors.push(GeometryError::polygon(&plan.site_id));
            }
        },
        Fetched::Info(record) => {
            if state.typology_prefix.is_none() {
                state.typology_prefix = record.typology_group(options.lang);
            }
            state.info = Some(record);
        }
        Fetched::Rows(rows) => state.time_series = Some(rows),
    }
}

/// Complete record with its sort key, or `None` when the site is incomplete
fn finish(id: String, state: SiteState, options: &AggregateOptions) -> Option<(usize, usize, SiteRecord)> {
    let prefix = effective_prefix(state.typology_prefix, state.path_prefix)?;
    let rank = GROUP_ORDER.iter().position(|g| *g == prefix)?;
    let (img, info, geometry) = match (state.img, state.info, state.geometry) {
        (Some(img), Some(info), Some(geometry)) => (img, info, geometry),
        _ => return None,
    };

    let rows = state.time_series.unwrap_or_default();
    let integrity_index = integrity_reading(&rows, INTEGRITY_COLUMN).map(str::to_string);

    let mut species = species_placeholders(prefix);
    let selection = select_richness(&rows, prefix, options.species_policy, options.current_year);
    fill_quantities(&mut species, prefix, selection.map(|s| s.row));

    let record = SiteRecord {
        icon: integrity_icon(integrity_index.as_deref()).to_string(),
        id,
        img,
        info,
        geometry,
        prefix,
        species,
        integrity_index,
    };

    Some((rank, state.anchor.unwrap_or(usize::MAX), record))
}
