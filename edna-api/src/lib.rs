//! edna-api library - eDNA monitoring HTTP service
//!
//! Serves the site list, site details and country manifests aggregated from
//! the monitoring bucket, plus the static navigation menu.

use axum::Router;
use edna_common::aggregate::AggregateOptions;
use edna_common::{Language, ObjectStore};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod storage;

pub use cache::ResponseCache;
pub use config::ServiceConfig;
pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Bucket the pipeline reads from
    pub store: Arc<dyn ObjectStore>,
    /// Cache of list responses
    pub cache: Arc<ResponseCache>,
    pub config: Arc<ServiceConfig>,
    /// Server start, for uptime reporting
    pub startup_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Arc<dyn ObjectStore>, config: ServiceConfig) -> Self {
        Self {
            store,
            cache: Arc::new(ResponseCache::new(config.cache_ttl)),
            config: Arc::new(config),
            startup_time: Instant::now(),
        }
    }

    /// Aggregation settings for one request
    pub fn aggregate_options(&self, lang: Language) -> AggregateOptions {
        AggregateOptions::new(lang)
            .with_concurrency(self.config.fetch_concurrency)
            .with_species_policy(self.config.species_year_policy)
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/external/monitoring", api::monitoring_routes())
        .nest("/api/internal", api::menu_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
