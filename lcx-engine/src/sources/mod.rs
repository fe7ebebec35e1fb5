//! External data sources
//!
//! Each source wraps one public statistics API behind a uniform async
//! contract: given a resolved location, return an optional snapshot.
//! `Ok(None)` means "no data"; an `Err` is isolated by the
//! [`crate::provider::ContextDataProvider`] and turned into a warning,
//! except [`SourceError::Cancelled`] which aborts the whole request.

pub mod cbs_crime;
pub mod cbs_neighborhood;
pub mod luchtmeetnet;
pub mod overpass;
pub mod pdok;

pub use cbs_crime::CbsCrimeClient;
pub use cbs_neighborhood::CbsNeighborhoodClient;
pub use luchtmeetnet::LuchtmeetnetAirQualityClient;
pub use overpass::OverpassAmenityClient;
pub use pdok::PdokLocationResolver;

use crate::types::{AirQualitySnapshot, AmenityStats, CrimeStats, NeighborhoodStats, ResolvedLocation};
use lcx_common::config::EnrichmentConfig;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Source traits
// ============================================================================

/// Demographics, housing, mobility and proximity statistics
#[async_trait::async_trait]
pub trait NeighborhoodStatsSource: Send + Sync {
    async fn fetch(&self, location: &ResolvedLocation) -> Result<Option<NeighborhoodStats>, SourceError>;
}

/// Registered crime statistics
#[async_trait::async_trait]
pub trait CrimeStatsSource: Send + Sync {
    async fn fetch(&self, location: &ResolvedLocation) -> Result<Option<CrimeStats>, SourceError>;
}

/// Points of interest within a radius
#[async_trait::async_trait]
pub trait AmenitySource: Send + Sync {
    async fn fetch(
        &self,
        location: &ResolvedLocation,
        radius_meters: i32,
    ) -> Result<Option<AmenityStats>, SourceError>;
}

/// Air quality from the nearest measuring station
#[async_trait::async_trait]
pub trait AirQualitySource: Send + Sync {
    async fn fetch(&self, location: &ResolvedLocation) -> Result<Option<AirQualitySnapshot>, SourceError>;
}

/// Converts free text into a canonical location
#[async_trait::async_trait]
pub trait LocationResolver: Send + Sync {
    /// `Ok(None)` when the input does not match a supported address
    async fn resolve(&self, input: &str) -> Result<Option<ResolvedLocation>, SourceError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Source client errors
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// Request cancelled; never converted into a warning
    #[error("Source call cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SourceError::Parse(e.to_string())
        } else {
            SourceError::Network(e.to_string())
        }
    }
}

// ============================================================================
// Shared HTTP plumbing
// ============================================================================

/// HTTP client with the configured user agent and timeout
pub fn build_http_client(config: &EnrichmentConfig) -> Result<reqwest::Client, SourceError> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .connect_timeout(Duration::from_secs(config.http_timeout_secs.min(10)))
        .build()
        .map_err(|e| SourceError::Network(e.to_string()))
}

/// Turn a non-success response into `SourceError::Api`
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(SourceError::Api(status.as_u16(), body))
}

/// Read a number that may be encoded as a JSON number or a numeric string
pub(crate) fn json_f64(row: &Value, field: &str) -> Option<f64> {
    match row.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

/// Integer variant of [`json_f64`]; fractional values are rejected
pub(crate) fn json_i64(row: &Value, field: &str) -> Option<i64> {
    match row.get(field)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Trimmed, non-empty string field
pub(crate) fn json_str(row: &Value, field: &str) -> Option<String> {
    row.get(field)?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_numbers_accept_strings() {
        let row = json!({"a": 12.5, "b": "7", "c": " 3.25 ", "d": null, "e": "n/a"});
        assert_eq!(json_f64(&row, "a"), Some(12.5));
        assert_eq!(json_f64(&row, "c"), Some(3.25));
        assert_eq!(json_i64(&row, "b"), Some(7));
        assert_eq!(json_f64(&row, "d"), None);
        assert_eq!(json_f64(&row, "e"), None);
        assert_eq!(json_f64(&row, "missing"), None);
    }

    #[test]
    fn test_json_i64_rejects_fractions() {
        let row = json!({"a": 1.5});
        assert_eq!(json_i64(&row, "a"), None);
    }

    #[test]
    fn test_json_str_trims() {
        let row = json!({"code": "BU03630000  ", "blank": "   "});
        assert_eq!(json_str(&row, "code").as_deref(), Some("BU03630000"));
        assert_eq!(json_str(&row, "blank"), None);
    }
}
