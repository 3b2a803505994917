//! Configuration for edna-api
//!
//! Settings are resolved in this order, first hit wins:
//! 1. Command-line arguments
//! 2. Environment variables (bound to the same arguments)
//! 3. TOML configuration file
//! 4. Built-in defaults
//!
//! The TOML file is located through `--config`, then `EDNA_CONFIG`, then
//! `<config dir>/edna/edna-api.toml`. A missing file is not an error: the
//! service starts on defaults and says so in the log.

use edna_common::aggregate::{SpeciesYearPolicy, DEFAULT_FETCH_CONCURRENCY};
use edna_common::countries::COUNTRY_MANIFEST;
use edna_common::{Error, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the TOML file
pub const CONFIG_ENV_VAR: &str = "EDNA_CONFIG";

/// Public endpoint of the monitoring bucket
pub const DEFAULT_BUCKET_URL: &str = "https://os.zhdk.cloud.switch.ch/edna";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Base URL of the object bucket, without trailing slash
    #[serde(default = "default_bucket_url")]
    pub bucket_url: String,

    /// `max-keys` sent with the listing request
    #[serde(default = "default_max_keys")]
    pub max_keys: u64,

    /// Key of the country code manifest
    #[serde(default = "default_country_manifest")]
    pub country_manifest: String,

    /// Lifetime of cached list responses
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,

    /// Asset fetches in flight per request
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub species_year_policy: SpeciesYearPolicy,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (trace, debug, info, warn, error); `RUST_LOG` wins
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_bucket_url() -> String {
    DEFAULT_BUCKET_URL.to_string()
}

fn default_max_keys() -> u64 {
    1_000_000_000
}

fn default_country_manifest() -> String {
    COUNTRY_MANIFEST.to_string()
}

fn default_cache_ttl_ms() -> u64 {
    36_000_000
}

fn default_fetch_concurrency() -> usize {
    DEFAULT_FETCH_CONCURRENCY
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            bucket_url: default_bucket_url(),
            max_keys: default_max_keys(),
            country_manifest: default_country_manifest(),
            cache_ttl_ms: default_cache_ttl_ms(),
            fetch_concurrency: default_fetch_concurrency(),
            request_timeout_secs: default_request_timeout_secs(),
            species_year_policy: SpeciesYearPolicy::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    /// Parse the file if there is one, defaults otherwise
    ///
    /// An unreadable or invalid file is an error; an absent one is not. Runs
    /// before logging is set up, so the outcome is returned for the caller
    /// to report with [`ConfigSource::log`].
    pub fn load_or_default(path: Option<&Path>) -> Result<(Self, ConfigSource)> {
        match path {
            Some(path) if path.exists() => {
                let config = Self::load(path)?;
                Ok((config, ConfigSource::File(path.to_path_buf())))
            }
            Some(path) => Ok((Self::default(), ConfigSource::Missing(path.to_path_buf()))),
            None => Ok((Self::default(), ConfigSource::Defaults)),
        }
    }
}

/// Where the bootstrap configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// A path was given but nothing exists there
    Missing(PathBuf),
    /// No path given and no file in the user config dir
    Defaults,
}

impl ConfigSource {
    pub fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded configuration from {}", path.display()),
            ConfigSource::Missing(path) => {
                warn!("Config file {} not found, using defaults", path.display())
            }
            ConfigSource::Defaults => warn!("No config file found, using defaults"),
        }
    }
}

/// Config file to read: explicit path, then `EDNA_CONFIG`, then the user config dir
pub fn config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|dir| dir.join("edna").join("edna-api.toml"))
        .filter(|path| path.exists())
}

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub bucket_url: Option<String>,
    pub log_level: Option<String>,
    pub species_year_policy: Option<SpeciesYearPolicy>,
}

/// Effective service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_address: String,
    pub port: u16,
    pub bucket_url: String,
    pub max_keys: u64,
    pub country_manifest: String,
    pub cache_ttl: Duration,
    pub fetch_concurrency: usize,
    pub request_timeout: Duration,
    pub species_year_policy: SpeciesYearPolicy,
    pub log_level: String,
}

impl ServiceConfig {
    /// Layer overrides on top of a file configuration
    pub fn resolve(overrides: Overrides, file: TomlConfig) -> Result<Self> {
        let config = Self {
            bind_address: overrides.bind_address.unwrap_or(file.bind_address),
            port: overrides.port.unwrap_or(file.port),
            bucket_url: overrides
                .bucket_url
                .unwrap_or(file.bucket_url)
                .trim_end_matches('/')
                .to_string(),
            max_keys: file.max_keys,
            country_manifest: file.country_manifest,
            cache_ttl: Duration::from_millis(file.cache_ttl_ms),
            fetch_concurrency: file.fetch_concurrency,
            request_timeout: Duration::from_secs(file.request_timeout_secs),
            species_year_policy: overrides
                .species_year_policy
                .unwrap_or(file.species_year_policy),
            log_level: overrides.log_level.unwrap_or(file.logging.level),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.bucket_url.is_empty() {
            return Err(Error::Config("bucket_url must not be empty".to_string()));
        }
        if self.fetch_concurrency == 0 {
            return Err(Error::Config("fetch_concurrency must be at least 1".to_string()));
        }
        if self.max_keys == 0 {
            return Err(Error::Config("max_keys must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Address to bind the HTTP listener to
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind_address, self.port)
            .parse()
            .map_err(|e| {
                Error::Config(format!(
                    "Invalid bind address {}:{}: {}",
                    self.bind_address, self.port, e
                ))
            })
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let file = TomlConfig::default();
        Self {
            bind_address: file.bind_address,
            port: file.port,
            bucket_url: file.bucket_url,
            max_keys: file.max_keys,
            country_manifest: file.country_manifest,
            cache_ttl: Duration::from_millis(file.cache_ttl_ms),
            fetch_concurrency: file.fetch_concurrency,
            request_timeout: Duration::from_secs(file.request_timeout_secs),
            species_year_policy: file.species_year_policy,
            log_level: file.logging.level,
        }
    }
}
