//! Country and site manifests
//!
//! The bucket root holds a list of country codes, one per line. Each country
//! may publish `<country>/monitoring/monitoring.txt` listing its sites.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::store::ObjectStore;
use crate::Result;

/// Default manifest of country codes
pub const COUNTRY_MANIFEST: &str = "bioms_country.txt";

/// Key of a country's site manifest
pub fn monitoring_key(country: &str) -> String {
    format!("{}/monitoring/monitoring.txt", country)
}

/// Sites of every country that answered
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountrySites {
    pub sites: Vec<String>,
    pub countries_not_found: Vec<String>,
    pub countries_with_response: Vec<String>,
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Collect the site manifests of every listed country
///
/// Countries without a manifest are reported in `countries_not_found`. Any
/// other failure is logged and yields an empty result.
pub async fn country_sites(store: &dyn ObjectStore, manifest: &str, concurrency: usize) -> CountrySites {
    match try_country_sites(store, manifest, concurrency).await {
        Ok(result) => result,
        Err(e) => {
            error!(manifest = %manifest, error = %e, "Failed to read country manifests");
            CountrySites::default()
        }
    }
}

async fn try_country_sites(
    store: &dyn ObjectStore,
    manifest: &str,
    concurrency: usize,
) -> Result<CountrySites> {
    let countries = non_empty_lines(&store.fetch_text(manifest).await?);

    let responses: Vec<(String, Result<String>)> = stream::iter(countries)
        .map(|country| async move {
            let body = store.fetch_text(&monitoring_key(&country)).await;
            (country, body)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut result = CountrySites::default();
    for (country, body) in responses {
        match body {
            Ok(text) => {
                result.sites.extend(non_empty_lines(&text));
                result.countries_with_response.push(country);
            }
            Err(e) if e.is_not_found() => {
                warn!(country = %country, "No monitoring manifest for country");
                result.countries_not_found.push(country);
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        sites = result.sites.len(),
        countries = result.countries_with_response.len(),
        missing = result.countries_not_found.len(),
        "Loaded country site manifests"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StaticStore;

    #[tokio::test]
    async fn test_countries_and_missing_manifests() {
        let store = StaticStore::new("https://bucket.test")
            .with_unlisted(COUNTRY_MANIFEST, "CH\n\nFR\nES\n")
            .with_unlisted("CH/monitoring/monitoring.txt", "ch_site_1\nch_site_2\n")
            .with_unlisted("ES/monitoring/monitoring.txt", "es_site_1\n");

        let result = country_sites(&store, COUNTRY_MANIFEST, 4).await;
        assert_eq!(result.sites, vec!["ch_site_1", "ch_site_2", "es_site_1"]);
        assert_eq!(result.countries_with_response, vec!["CH", "ES"]);
        assert_eq!(result.countries_not_found, vec!["FR"]);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["countriesNotFound"][0], "FR");
    }

    #[tokio::test]
    async fn test_unexpected_failure_yields_empty_result() {
        let store = StaticStore::new("https://bucket.test")
            .with_unlisted(COUNTRY_MANIFEST, "CH\nFR\n")
            .with_unlisted("CH/monitoring/monitoring.txt", "ch_site_1\n")
            .with_failure("FR/monitoring/monitoring.txt", 500);

        assert_eq!(country_sites(&store, COUNTRY_MANIFEST, 2).await, CountrySites::default());
    }

    #[tokio::test]
    async fn test_missing_country_manifest() {
        let store = StaticStore::new("https://bucket.test");
        let result = country_sites(&store, COUNTRY_MANIFEST, 2).await;
        assert!(result.sites.is_empty());
        assert!(result.countries_not_found.is_empty());
    }
}
