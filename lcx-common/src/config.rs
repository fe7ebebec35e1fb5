//! Configuration loading and resolution
//!
//! Priority order for every setting:
//! 1. Environment variable (highest priority)
//! 2. TOML config file
//! 3. Compiled default (fallback)
//!
//! A missing config file is not an error: a warning is logged and the
//! compiled defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "LCX_CONFIG";

/// Default report cache lifetime (24 hours)
pub const DEFAULT_REPORT_CACHE_MINUTES: u64 = 24 * 60;

/// Default lower bound for the amenity search radius
pub const DEFAULT_MIN_RADIUS_METERS: i32 = 200;

/// Default upper bound for the amenity search radius
pub const DEFAULT_MAX_RADIUS_METERS: i32 = 5000;

/// Top-level TOML configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TomlConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Context enrichment settings
    pub enrichment: EnrichmentConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Emit ANSI colours
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            ansi: true,
        }
    }
}

/// Settings for report building and the external data sources
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Lifetime of a cached context report
    pub report_cache_minutes: u64,
    /// Smallest accepted search radius; smaller requests are clamped up
    pub min_radius_meters: i32,
    /// Largest accepted search radius; larger requests are clamped down
    pub max_radius_meters: i32,
    /// Total timeout for one outbound HTTP request
    pub http_timeout_secs: u64,
    /// User-Agent sent to every public API
    pub user_agent: String,
    pub cbs_base_url: String,
    pub pdok_base_url: String,
    pub overpass_base_url: String,
    pub luchtmeetnet_base_url: String,
    /// Optional per-category weights for the composite score (empty = plain mean)
    pub category_weights: BTreeMap<String, f64>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            report_cache_minutes: DEFAULT_REPORT_CACHE_MINUTES,
            min_radius_meters: DEFAULT_MIN_RADIUS_METERS,
            max_radius_meters: DEFAULT_MAX_RADIUS_METERS,
            http_timeout_secs: 15,
            user_agent: get_user_agent(),
            cbs_base_url: "https://opendata.cbs.nl/ODataApi/odata".to_string(),
            pdok_base_url: "https://api.pdok.nl".to_string(),
            overpass_base_url: "https://overpass-api.de".to_string(),
            luchtmeetnet_base_url: "https://api.luchtmeetnet.nl".to_string(),
            category_weights: BTreeMap::new(),
        }
    }
}

impl EnrichmentConfig {
    /// Reject settings the report service cannot operate with
    pub fn validate(&self) -> Result<()> {
        if self.min_radius_meters <= 0 {
            return Err(Error::Config(format!(
                "min_radius_meters must be positive (got {})",
                self.min_radius_meters
            )));
        }

        if self.min_radius_meters > self.max_radius_meters {
            return Err(Error::Config(format!(
                "min_radius_meters ({}) exceeds max_radius_meters ({})",
                self.min_radius_meters, self.max_radius_meters
            )));
        }

        if self.report_cache_minutes == 0 {
            return Err(Error::Config(
                "report_cache_minutes must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Report cache lifetime as a `Duration`
    pub fn report_cache_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.report_cache_minutes * 60)
    }
}

impl TomlConfig {
    /// Load configuration from `explicit_path`, `$LCX_CONFIG` or the platform
    /// default location, then apply environment overrides and validate.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = explicit_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
            .or_else(default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                read_toml_config(&path)?
            }
            Some(path) => {
                warn!(
                    "Config file {} not found, using compiled defaults",
                    path.display()
                );
                TomlConfig::default()
            }
            None => {
                warn!("Could not determine config directory, using compiled defaults");
                TomlConfig::default()
            }
        };

        config.apply_env_overrides()?;
        config.enrichment.validate()?;
        Ok(config)
    }

    /// Environment variables take precedence over TOML values
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(minutes) = env_parse::<u64>("LCX_REPORT_CACHE_MINUTES")? {
            self.enrichment.report_cache_minutes = minutes;
        }
        if let Some(min) = env_parse::<i32>("LCX_MIN_RADIUS_METERS")? {
            self.enrichment.min_radius_meters = min;
        }
        if let Some(max) = env_parse::<i32>("LCX_MAX_RADIUS_METERS")? {
            self.enrichment.max_radius_meters = max;
        }
        if let Ok(level) = std::env::var("LCX_LOG_LEVEL") {
            if !level.trim().is_empty() {
                self.logging.level = level.trim().to_string();
            }
        }
        Ok(())
    }
}

/// Parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Write a TOML config file (creates parent directories)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Platform config location: `<config_dir>/lcx/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("lcx").join("config.toml"))
}

/// Standard User-Agent for outbound HTTP clients
pub fn get_user_agent() -> String {
    format!("lcx/{}", env!("CARGO_PKG_VERSION"))
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} has an invalid value: {}", name, raw))),
        _ => Ok(None),
    }
}
