//! Site detail
//!
//! Everything the bucket holds for one site id. Unlike the list, missing
//! pieces do not hide the site: the caller asked for this id, so whatever
//! exists is returned.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::species::{
    fill_indices, fill_quantities, select_index, select_richness, species_placeholders,
    SpeciesEntry,
};
use super::list::GeometryError;
use super::{effective_prefix, fetch_all, plan_fetches, AggregateOptions, Fetched};
use crate::classify::AssetRole;
use crate::groups::{legend_column, legend_icon, GroupPrefix, LEGEND, TOTAL_GROUPS};
use crate::store::ObjectStore;
use crate::text_record::{LocalizedRecord, DETAIL_KEYS};
use crate::time_series::{find_last_year_with_values, row_for_year, sum_key_groups, CsvRow};
use crate::{Error, Result};

/// Legend entry of the time-series chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub name: String,
    pub icon: String,
}

/// Chart data of a site
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesSummary {
    /// Sheet rows with the `*_total` columns added
    pub series: Vec<CsvRow>,
    /// Year of the species counts, falling back to [`Self::most_recent_year_line`]
    pub most_recent_year: Option<i32>,
    /// Last year with any charted value
    pub most_recent_year_line: Option<i32>,
    /// Year of the species index values
    pub index_year: Option<i32>,
    pub legend: Vec<LegendEntry>,
}

/// Detail page of one site
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<GroupPrefix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    /// Raw GeoJSON of the site polygon
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<LocalizedRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxa: Option<Vec<CsvRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeSeriesSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<Vec<SpeciesEntry>>,
    /// Polygons of this site that could not be read
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GeometryError>,
}

/// Gather every asset of site `id`
///
/// Returns [`Error::NotFound`] when no listed file carries the id.
pub async fn aggregate_detail(
    store: &dyn ObjectStore,
    id: &str,
    options: &AggregateOptions,
) -> Result<SiteDetail> {
    let listing = store.fetch_listing().await?;
    let plans = plan_fetches(&listing, |site_id, _| site_id == id);

    if plans.is_empty() {
        return Err(Error::NotFound(format!("Site {} not found", id)));
    }

    let fetched = fetch_all(store, plans, &DETAIL_KEYS, options.concurrency).await?;

    let mut detail = SiteDetail::default();
    let mut path_prefix = None;
    let mut typology_prefix = None;
    let mut time_series = None;

    for (plan, body) in fetched {
        if path_prefix.is_none() {
            path_prefix = plan.path_prefix;
        }

        match (plan.role, body) {
            (AssetRole::ReportPdf, Fetched::Url(url)) => detail.report = Some(url),
            (_, Fetched::Url(url)) => detail.img = Some(url),
            (_, Fetched::Geometry(Ok(geometry))) => detail.geometry = Some(geometry),
            (_, Fetched::Geometry(Err(e))) => {
                warn!(site_id = %id, key = %plan.key, error = %e, "Error processing polygon");
                detail.errors.push(GeometryError::polygon(id));
            }
            (_, Fetched::Info(record)) => {
                if typology_prefix.is_none() {
                    typology_prefix = record.typology_group(options.lang);
                }
                detail.info = Some(record);
            }
            (AssetRole::TaxaCsv, Fetched::Rows(rows)) => detail.taxa = Some(rows),
            (_, Fetched::Rows(rows)) => time_series = Some(rows),
        }
    }

    let prefix = effective_prefix(typology_prefix, path_prefix);
    detail.prefix = prefix;

    let mut species = prefix.map(species_placeholders);
    if let Some(rows) = time_series {
        detail.time = Some(summarize(&rows, prefix, species.as_deref_mut(), options));
    }
    detail.species = species;

    debug!(
        site_id = %id,
        prefix = ?detail.prefix,
        has_geometry = detail.geometry.is_some(),
        has_time_series = detail.time.is_some(),
        "Aggregated site detail"
    );

    Ok(detail)
}

/// Chart contract of a time-series sheet; fills `species` along the way
pub fn summarize(
    rows: &[CsvRow],
    group: Option<GroupPrefix>,
    species: Option<&mut [SpeciesEntry]>,
    options: &AggregateOptions,
) -> TimeSeriesSummary {
    let line_columns: Vec<String> = LEGEND.iter().map(|name| legend_column(name)).collect();
    let most_recent_year_line = find_last_year_with_values(rows, &line_columns);

    let richness = group
        .and_then(|g| select_richness(rows, g, options.species_policy, options.current_year));
    let most_recent_year = richness.map(|s| s.year).or(most_recent_year_line);

    let index = group.and_then(|g| select_index(rows, g, options.current_year));

    if let (Some(group), Some(entries)) = (group, species) {
        let row = richness
            .map(|s| s.row)
            .or_else(|| most_recent_year.and_then(|year| row_for_year(rows, year)));
        fill_quantities(entries, group, row);
        fill_indices(entries, index.map(|s| s.row));
    }

    TimeSeriesSummary {
        series: sum_key_groups(rows, TOTAL_GROUPS),
        most_recent_year,
        most_recent_year_line,
        index_year: index.map(|s| s.year),
        legend: LEGEND
            .iter()
            .map(|name| LegendEntry {
                name: name.to_string(),
                icon: legend_icon(name),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::store::StaticStore;

    fn options() -> AggregateOptions {
        AggregateOptions::new(Language::En).with_current_year(2022)
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = StaticStore::new("https://bucket.test").with_entry("ma_1234567/1234567.jpg", 10);
        let err = aggregate_detail(&store, "7654321", &options()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_partial_detail_is_returned() {
        let store = StaticStore::new("https://bucket.test")
            .with_entry("ma_1234567/1234567.jpg", 10)
            .with_entry("ma_1234567/1234567_report.pdf", 10);

        let detail = aggregate_detail(&store, "1234567", &options()).await.unwrap();
        assert_eq!(detail.prefix, Some(GroupPrefix::Marine));
        assert_eq!(detail.img.as_deref(), Some("https://bucket.test/ma_1234567/1234567.jpg"));
        assert_eq!(
            detail.report.as_deref(),
            Some("https://bucket.test/ma_1234567/1234567_report.pdf")
        );
        assert!(detail.geometry.is_none());
        assert!(detail.time.is_none());
        assert_eq!(detail.species.as_ref().unwrap()[0].quantity, "--");

        let json = serde_json::to_value(&detail).unwrap();
        assert!(json.get("geometry").is_none());
        assert!(json.get("errors").is_none());
        assert_eq!(json["prefix"], "ma");
    }

    #[tokio::test]
    async fn test_typology_overrides_path_prefix() {
        let store = StaticStore::new("https://bucket.test").with_object(
            "fw_1234567/1234567.txt",
            "EN\nTitle: Rhine\nDescription: Typology: Large river. Climate: temperate.\n",
        );
        let detail = aggregate_detail(&store, "1234567", &options()).await.unwrap();
        assert_eq!(detail.prefix, Some(GroupPrefix::FreshwaterRiver));
        let info = detail.info.unwrap();
        assert_eq!(
            info.section("en").unwrap().description_field("climate"),
            Some("temperate.")
        );
    }

    #[tokio::test]
    async fn test_malformed_geometry_left_unset() {
        let store = StaticStore::new("https://bucket.test")
            .with_object("ma_1234567/1234567.json", "<html>oops</html>")
            .with_entry("ma_1234567/1234567.jpg", 10);
        let detail = aggregate_detail(&store, "1234567", &options()).await.unwrap();
        assert!(detail.geometry.is_none());
        assert!(detail.img.is_some());
        assert_eq!(detail.errors, vec![GeometryError::polygon("1234567")]);

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["errors"][0]["error"], "Error processing polygon");
        assert_eq!(json["errors"][0]["id"], "1234567");
    }

    #[test]
    fn test_summary_without_group() {
        let rows = vec![
            CsvRow::new()
                .with("Year", "2020")
                .with("Climate_intercept", "0.1")
                .with("Climate_change", "0.2"),
            CsvRow::new().with("Year", "2021").with("Climate_intercept", "NA"),
        ];
        let summary = summarize(&rows, None, None, &options());
        assert_eq!(summary.most_recent_year_line, Some(2020));
        assert_eq!(summary.most_recent_year, Some(2020));
        assert_eq!(summary.index_year, None);
        assert_eq!(summary.series[0].get("Climate_total"), Some("0.300000"));
        assert_eq!(summary.series[1].get("Climate_total"), Some("NA"));
        assert_eq!(summary.legend.len(), 4);
        assert_eq!(
            summary.legend[3].icon,
            "/assets/icons/charts/legend/time-series-changes/integrity-index.svg"
        );

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["mostRecentYearLine"], 2020);
        assert!(json["indexYear"].is_null());
    }
}
