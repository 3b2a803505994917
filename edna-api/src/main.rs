//! edna-api - eDNA monitoring aggregation service
//!
//! Turns the monitoring bucket (listing, info texts, CSV sheets, polygons)
//! into the JSON consumed by the biodiversity monitoring front end.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use edna_api::config::{config_path, Overrides, ServiceConfig, TomlConfig};
use edna_api::storage::HttpObjectStore;
use edna_api::{build_router, AppState};
use edna_common::aggregate::SpeciesYearPolicy;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for edna-api
#[derive(Parser, Debug)]
#[command(name = "edna-api")]
#[command(about = "eDNA biodiversity monitoring API")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(long, env = "EDNA_BIND_ADDRESS")]
    bind_address: Option<String>,

    /// Base URL of the monitoring bucket
    #[arg(long, env = "EDNA_BUCKET_URL")]
    bucket_url: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Default log filter (RUST_LOG takes precedence)
    #[arg(long, env = "EDNA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Year policy for species richness (all_groups or lead_group)
    #[arg(long, env = "EDNA_SPECIES_YEAR_POLICY")]
    species_year_policy: Option<SpeciesYearPolicy>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            port: self.port,
            bind_address: self.bind_address.clone(),
            bucket_url: self.bucket_url.clone(),
            log_level: self.log_level.clone(),
            species_year_policy: self.species_year_policy,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let path = config_path(args.config.as_deref());
    let (file, source) =
        TomlConfig::load_or_default(path.as_deref()).context("Failed to load configuration")?;
    let config = ServiceConfig::resolve(args.overrides(), file).context("Invalid configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("edna_api={0},edna_common={0},tower_http=info", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting eDNA monitoring API (edna-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    // the subscriber depends on the config, so report the file only now
    source.log();
    info!(
        bucket = %config.bucket_url,
        cache_ttl_ms = config.cache_ttl.as_millis() as u64,
        fetch_concurrency = config.fetch_concurrency,
        species_year_policy = %config.species_year_policy,
        "Configuration resolved"
    );

    let store = HttpObjectStore::new(&config.bucket_url, config.max_keys, config.request_timeout)
        .context("Failed to create bucket client")?;

    let addr = config.socket_addr()?;
    // interval() rejects a zero period
    let sweep_period = config.cache_ttl.max(Duration::from_secs(1));
    let state = AppState::new(Arc::new(store), config);
    let sweeper = state.cache.spawn_sweeper(sweep_period);
    let app = build_router(state);

    info!("Starting HTTP server on {}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    sweeper.abort();
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
