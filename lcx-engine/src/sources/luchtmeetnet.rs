//! Luchtmeetnet (Dutch national air quality network) client
//!
//! The open API has no spatial search, so the full station list with
//! coordinates is discovered once and kept in memory for a day. Each lookup
//! then picks the nearest station and reads its latest measurements.

use super::{check_status, AirQualitySource, SourceError};
use crate::types::{AirQualitySnapshot, ResolvedLocation};
use chrono::{DateTime, NaiveDateTime, Utc};
use futures::stream::{self, StreamExt};
use lcx_common::config::EnrichmentConfig;
use lcx_common::geo::distance_meters;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Upper bound on station list pages to walk
const MAX_STATION_PAGES: u32 = 15;

/// Concurrent station detail requests during discovery
const DISCOVERY_CONCURRENCY: usize = 5;

/// Lifetime of the discovered station list
const STATION_LIST_TTL: Duration = Duration::from_secs(24 * 60 * 60);

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StationListResponse {
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub data: Vec<StationSummary>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub last_page: u32,
}

#[derive(Debug, Deserialize)]
pub struct StationSummary {
    pub number: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StationDetailResponse {
    pub data: Option<StationDetail>,
}

#[derive(Debug, Deserialize)]
pub struct StationDetail {
    pub location: Option<String>,
    pub geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    /// `[lon, lat]`
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Deserialize)]
pub struct MeasurementResponse {
    #[serde(default)]
    pub data: Vec<Measurement>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Measurement {
    pub formula: String,
    pub value: Option<f64>,
    pub timestamp_measured: Option<String>,
}

/// Station with known coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

struct StationCache {
    stations: Arc<Vec<Station>>,
    loaded_at: Instant,
}

// ============================================================================
// Client
// ============================================================================

/// Luchtmeetnet air quality client
pub struct LuchtmeetnetAirQualityClient {
    http_client: reqwest::Client,
    base_url: String,
    stations: RwLock<Option<StationCache>>,
}

impl LuchtmeetnetAirQualityClient {
    pub fn new(config: &EnrichmentConfig) -> Result<Self, SourceError> {
        Ok(Self::with_client(
            super::build_http_client(config)?,
            &config.luchtmeetnet_base_url,
        ))
    }

    pub fn with_client(http_client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            stations: RwLock::new(None),
        }
    }

    /// Cached station list, rediscovered after it expires
    async fn station_list(&self) -> Arc<Vec<Station>> {
        {
            let cache = self.stations.read().await;
            if let Some(cache) = cache.as_ref() {
                if cache.loaded_at.elapsed() < STATION_LIST_TTL {
                    return Arc::clone(&cache.stations);
                }
            }
        }

        let stations = Arc::new(self.discover_stations().await);
        if !stations.is_empty() {
            *self.stations.write().await = Some(StationCache {
                stations: Arc::clone(&stations),
                loaded_at: Instant::now(),
            });
        }
        stations
    }

    async fn discover_stations(&self) -> Vec<Station> {
        info!("Starting Luchtmeetnet station discovery");

        let ids = self.fetch_station_ids().await;
        let stations: Vec<Station> = stream::iter(ids)
            .map(|id| self.fetch_station_detail(id))
            .buffer_unordered(DISCOVERY_CONCURRENCY)
            .filter_map(|station| async move { station })
            .collect()
            .await;

        info!(count = stations.len(), "Discovered Luchtmeetnet stations with coordinates");
        stations
    }

    async fn fetch_station_ids(&self) -> BTreeSet<String> {
        let mut ids = BTreeSet::new();

        for page in 1..=MAX_STATION_PAGES {
            let url = format!("{}/open_api/stations?page={}", self.base_url, page);
            debug!(url = %url, "Fetching Luchtmeetnet station page");

            let response: StationListResponse = match self.get_json(&url).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(page, error = %e, "Luchtmeetnet station list lookup failed");
                    continue;
                }
            };

            let page_empty = response.data.is_empty();
            ids.extend(
                response
                    .data
                    .into_iter()
                    .filter_map(|s| s.number)
                    .map(|n| n.trim().to_string())
                    .filter(|n| !n.is_empty()),
            );

            let last_page_reached = response
                .pagination
                .map_or(false, |p| page >= p.last_page);
            if last_page_reached || page_empty {
                break;
            }
        }

        ids
    }

    async fn fetch_station_detail(&self, station_id: String) -> Option<Station> {
        let url = format!("{}/open_api/stations/{}", self.base_url, station_id);
        match self.get_json::<StationDetailResponse>(&url).await {
            Ok(response) => parse_station_detail(&station_id, response),
            Err(e) => {
                warn!(station = %station_id, error = %e, "Failed to fetch Luchtmeetnet station details");
                None
            }
        }
    }

    async fn fetch_latest_measurements(&self, station_id: &str) -> Result<Vec<Measurement>, SourceError> {
        let url = format!(
            "{}/open_api/stations/{}/measurements?order_by=timestamp_measured&order_direction=desc&page=1",
            self.base_url, station_id
        );
        debug!(station = %station_id, url = %url, "Fetching Luchtmeetnet measurements");

        let response: MeasurementResponse = self.get_json(&url).await?;
        Ok(response.data)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let response = check_status(self.http_client.get(url).send().await?).await?;
        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl AirQualitySource for LuchtmeetnetAirQualityClient {
    async fn fetch(&self, location: &ResolvedLocation) -> Result<Option<AirQualitySnapshot>, SourceError> {
        let stations = self.station_list().await;
        let Some((station, distance)) = nearest_station(&stations, location.latitude, location.longitude) else {
            warn!("No Luchtmeetnet stations available");
            return Ok(None);
        };

        let measurements = self.fetch_latest_measurements(&station.id).await?;
        let snapshot = build_snapshot(station, distance, &measurements);
        if snapshot.is_none() {
            warn!(station = %station.id, "Luchtmeetnet measurements did not include supported formulas");
        }
        Ok(snapshot)
    }
}

// ============================================================================
// Pure helpers
// ============================================================================

/// Station detail with `[lon, lat]` coordinates; name falls back to the id
pub fn parse_station_detail(station_id: &str, response: StationDetailResponse) -> Option<Station> {
    let detail = response.data?;
    let coordinates = detail.geometry?.coordinates;
    if coordinates.len() < 2 {
        return None;
    }

    let name = detail
        .location
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| station_id.to_string());

    Some(Station {
        id: station_id.to_string(),
        name,
        latitude: coordinates[1],
        longitude: coordinates[0],
    })
}

/// Closest station and its distance in meters
pub fn nearest_station(stations: &[Station], latitude: f64, longitude: f64) -> Option<(&Station, f64)> {
    stations
        .iter()
        .map(|s| (s, distance_meters(latitude, longitude, s.latitude, s.longitude)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

/// Extract PM2.5, PM10, NO2 and O3 from measurements in descending time order
///
/// The first occurrence of each formula wins. `None` when no supported
/// formula is present.
pub fn build_snapshot(station: &Station, distance_m: f64, measurements: &[Measurement]) -> Option<AirQualitySnapshot> {
    let first = |formula: &str| measurements.iter().find(|m| m.formula.eq_ignore_ascii_case(formula));

    let pm25 = first("PM25");
    let pm10 = first("PM10");
    let no2 = first("NO2");
    let o3 = first("O3");

    let latest = pm25.or(pm10).or(no2).or(o3)?;
    let measured_at = latest
        .timestamp_measured
        .as_deref()
        .and_then(parse_timestamp);

    Some(AirQualitySnapshot {
        station_id: station.id.clone(),
        station_name: station.name.clone(),
        station_distance_m: distance_m,
        pm25: pm25.and_then(|m| m.value),
        pm10: pm10.and_then(|m| m.value),
        no2: no2.and_then(|m| m.value),
        o3: o3.and_then(|m| m.value),
        measured_at,
        retrieved_at: Utc::now(),
    })
}

/// RFC 3339, or a naive timestamp assumed to be UTC
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}
