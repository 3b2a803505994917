//! Monitoring endpoints
//!
//! GET /api/external/monitoring/xml
//! GET /api/external/monitoring/list/:lang
//! GET /api/external/monitoring/list
//! GET /api/external/monitoring/details/:id/:lang

use axum::{
    extract::{OriginalUri, Path, State},
    routing::get,
    Json, Router,
};
use edna_common::aggregate::{aggregate_detail, aggregate_list, SiteDetail};
use edna_common::countries::country_sites;
use edna_common::listing::BucketListing;
use edna_common::Language;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

fn parse_language(lang: &str) -> ApiResult<Language> {
    lang.parse::<Language>()
        .map_err(|_| ApiError::BadRequest(format!("Unsupported language '{}' (expected en, fr or es)", lang)))
}

/// GET /xml
///
/// Raw bucket listing, parsed.
pub async fn get_listing(State(state): State<AppState>) -> ApiResult<Json<BucketListing>> {
    let listing = state.store.fetch_listing().await?;
    Ok(Json(listing))
}

/// GET /list/:lang
///
/// Ordered markers of every complete site. Cached per request URI.
pub async fn get_site_list(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(lang): Path<String>,
) -> ApiResult<Json<Value>> {
    let lang = parse_language(&lang)?;
    let cache_key = uri.to_string();

    if let Some(cached) = state.cache.get(&cache_key).await {
        return Ok(Json(cached));
    }

    let list = aggregate_list(state.store.as_ref(), &state.aggregate_options(lang)).await?;

    if !list.errors.is_empty() {
        warn!(
            count = list.errors.len(),
            ids = ?list.errors.iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
            "Site list built with geometry errors"
        );
    }

    let body = serde_json::to_value(&list.sites)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize site list: {}", e)))?;
    state.cache.put(&cache_key, body.clone()).await;

    info!(lang = %lang, sites = list.sites.len(), "Site list served");
    Ok(Json(body))
}

/// GET /list
///
/// Sites published by each country. Cached per request URI.
pub async fn get_country_sites(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult<Json<Value>> {
    let cache_key = uri.to_string();

    if let Some(cached) = state.cache.get(&cache_key).await {
        return Ok(Json(cached));
    }

    let sites = country_sites(
        state.store.as_ref(),
        &state.config.country_manifest,
        state.config.fetch_concurrency,
    )
    .await;

    let body = serde_json::to_value(&sites)
        .map_err(|e| ApiError::Internal(format!("Failed to serialize country sites: {}", e)))?;
    state.cache.put(&cache_key, body.clone()).await;

    Ok(Json(body))
}

/// GET /details/:id/:lang
pub async fn get_site_detail(
    State(state): State<AppState>,
    Path((id, lang)): Path<(String, String)>,
) -> ApiResult<Json<SiteDetail>> {
    let lang = parse_language(&lang)?;
    let detail = aggregate_detail(state.store.as_ref(), &id, &state.aggregate_options(lang)).await?;
    Ok(Json(detail))
}

/// Build monitoring routes
pub fn monitoring_routes() -> Router<AppState> {
    Router::new()
        .route("/xml", get(get_listing))
        .route("/list", get(get_country_sites))
        .route("/list/", get(get_country_sites))
        .route("/list/:lang", get(get_site_list))
        .route("/details/:id/:lang", get(get_site_detail))
}
