//! CBS StatLine registered crime client (table 83765NED)

use super::cbs_neighborhood::candidate_codes;
use super::{check_status, json_i64, CrimeStatsSource, SourceError};
use crate::types::{CrimeStats, ResolvedLocation};
use chrono::Utc;
use lcx_common::config::EnrichmentConfig;
use serde_json::Value;
use tracing::debug;

pub const TABLE_ID: &str = "83765NED";

const SELECT_FIELDS: &str = "WijkenEnBuurten,AantalInwoners_5,TotaalDiefstalUitWoningSchuurED_106,\
VernielingMisdrijfTegenOpenbareOrde_107,GeweldsEnSeksueleMisdrijven_108";

/// CBS crime statistics client
pub struct CbsCrimeClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl CbsCrimeClient {
    pub fn new(config: &EnrichmentConfig) -> Result<Self, SourceError> {
        Ok(Self::with_client(
            super::build_http_client(config)?,
            &config.cbs_base_url,
        ))
    }

    pub fn with_client(http_client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_for_code(&self, region_code: &str) -> Result<Option<CrimeStats>, SourceError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/{}/TypedDataSet", self.base_url, TABLE_ID),
            &[
                ("$filter", format!("WijkenEnBuurten eq '{}'", region_code)),
                ("$top", "1".to_string()),
                ("$select", SELECT_FIELDS.to_string()),
            ],
        )
        .map_err(|e| SourceError::Network(format!("Invalid CBS URL: {}", e)))?;

        debug!(region = %region_code.trim(), url = %url, "Querying CBS crime statistics");

        let response = check_status(self.http_client.get(url).send().await?).await?;
        let body: Value = response.json().await?;

        Ok(parse_crime_response(&body))
    }
}

#[async_trait::async_trait]
impl CrimeStatsSource for CbsCrimeClient {
    async fn fetch(&self, location: &ResolvedLocation) -> Result<Option<CrimeStats>, SourceError> {
        for code in candidate_codes(location) {
            if let Some(stats) = self.fetch_for_code(&code).await? {
                return Ok(Some(stats));
            }
        }
        Ok(None)
    }
}

/// Convert a raw count into a rate per 1000 residents
///
/// Falls back to the raw count when the resident total is unknown or zero.
pub fn rate_per_1000(count: Option<i64>, residents: Option<i64>) -> Option<f64> {
    let count = count? as f64;
    match residents {
        Some(r) if r > 0 => Some((count * 1000.0 / r as f64).round()),
        _ => Some(count),
    }
}

/// Map the first OData row into crime rates
pub fn parse_crime_response(body: &Value) -> Option<CrimeStats> {
    let row = body.get("value")?.as_array()?.first()?;

    let residents = json_i64(row, "AantalInwoners_5");
    let theft = rate_per_1000(json_i64(row, "TotaalDiefstalUitWoningSchuurED_106"), residents);
    let vandalism = rate_per_1000(json_i64(row, "VernielingMisdrijfTegenOpenbareOrde_107"), residents);
    let violent = rate_per_1000(json_i64(row, "GeweldsEnSeksueleMisdrijven_108"), residents);

    let total = if theft.is_some() || vandalism.is_some() || violent.is_some() {
        Some(theft.unwrap_or(0.0) + vandalism.unwrap_or(0.0) + violent.unwrap_or(0.0))
    } else {
        None
    };

    Some(CrimeStats {
        total_per_1000: total,
        // Table 83765NED reports burglary and theft from homes as one figure
        burglary_per_1000: theft,
        violent_per_1000: violent,
        theft_per_1000: theft,
        vandalism_per_1000: vandalism,
        year_over_year_change: None,
        retrieved_at: Utc::now(),
    })
}
