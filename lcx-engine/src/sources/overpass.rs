//! OpenStreetMap Overpass API amenity client
//!
//! One `around:` query per location returns every tracked point of interest
//! with its centroid; counting, nearest distance and diversity are computed
//! locally. The public Overpass instance enforces fair use, so requests pass
//! through a 1 request/second limiter.

use super::{check_status, AmenitySource, SourceError};
use crate::types::{AmenityStats, ResolvedLocation};
use chrono::Utc;
use governor::{Quota, RateLimiter};
use lcx_common::config::EnrichmentConfig;
use lcx_common::geo::distance_meters;
use serde::Deserialize;
use std::collections::HashMap;
use std::num::NonZeroU32;
use tracing::{debug, warn};

/// Number of amenity categories used for the diversity score
const CATEGORY_COUNT: f64 = 6.0;

/// Overpass response envelope
#[derive(Debug, Deserialize)]
pub struct OverpassResponse {
    pub elements: Option<Vec<OverpassElement>>,
}

/// Node, way or relation with tags
#[derive(Debug, Deserialize)]
pub struct OverpassElement {
    #[serde(default)]
    pub id: i64,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Centroid for ways and relations (`out center`)
    pub center: Option<OverpassCenter>,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct OverpassCenter {
    pub lat: f64,
    pub lon: f64,
}

impl OverpassElement {
    fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon, &self.center) {
            (Some(lat), Some(lon), _) => Some((lat, lon)),
            (_, _, Some(center)) => Some((center.lat, center.lon)),
            _ => None,
        }
    }

    fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Amenity category an OSM element is counted under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmenityCategory {
    School,
    Supermarket,
    Park,
    Healthcare,
    Transit,
    ChargingStation,
}

impl AmenityCategory {
    /// Classify an element by its tags; `None` for untracked elements
    pub fn classify(element: &OverpassElement) -> Option<Self> {
        match element.tag("amenity") {
            Some("school") => return Some(Self::School),
            Some("hospital" | "clinic" | "doctors" | "pharmacy") => return Some(Self::Healthcare),
            Some("charging_station") => return Some(Self::ChargingStation),
            _ => {}
        }

        if element.tag("shop") == Some("supermarket") {
            Some(Self::Supermarket)
        } else if element.tag("leisure") == Some("park") {
            Some(Self::Park)
        } else if element.tag("highway") == Some("bus_stop") || element.tag("railway") == Some("station") {
            Some(Self::Transit)
        } else {
            None
        }
    }
}

/// Overpass amenity client
pub struct OverpassAmenityClient {
    http_client: reqwest::Client,
    base_url: String,
    /// 1 request per second (Overpass fair-use policy)
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl OverpassAmenityClient {
    pub fn new(config: &EnrichmentConfig) -> Result<Self, SourceError> {
        Ok(Self::with_client(
            super::build_http_client(config)?,
            &config.overpass_base_url,
        ))
    }

    pub fn with_client(http_client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter: RateLimiter::direct(Quota::per_second(NonZeroU32::MIN)),
        }
    }
}

#[async_trait::async_trait]
impl AmenitySource for OverpassAmenityClient {
    async fn fetch(
        &self,
        location: &ResolvedLocation,
        radius_meters: i32,
    ) -> Result<Option<AmenityStats>, SourceError> {
        let query = build_amenity_query(location.latitude, location.longitude, radius_meters);
        let url = format!("{}/api/interpreter", self.base_url);

        self.rate_limiter.until_ready().await;
        debug!(url = %url, radius = radius_meters, "Querying Overpass amenities");

        let response = self
            .http_client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("data", query.as_str())])
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: OverpassResponse = response.json().await?;

        match body.elements {
            Some(elements) => Ok(Some(summarize_amenities(
                &elements,
                location.latitude,
                location.longitude,
            ))),
            None => {
                warn!("Overpass response was missing the elements array");
                Ok(None)
            }
        }
    }
}

/// Overpass QL query for every tracked amenity within `radius_meters`
pub fn build_amenity_query(latitude: f64, longitude: f64, radius_meters: i32) -> String {
    let around = format!("nwr(around:{},{},{})", radius_meters, latitude, longitude);
    let filters = [
        "[amenity=school]",
        "[shop=supermarket]",
        "[leisure=park]",
        "[amenity~\"hospital|clinic|doctors|pharmacy\"]",
        "[highway=bus_stop]",
        "[railway=station]",
        "[amenity=charging_station]",
    ];

    let mut query = String::from("[out:json][timeout:25];(");
    for filter in filters {
        query.push_str(&around);
        query.push_str(filter);
        query.push(';');
    }
    query.push_str(");out center tags;");
    query
}

/// Count categories, find the nearest element and compute diversity
pub fn summarize_amenities(elements: &[OverpassElement], latitude: f64, longitude: f64) -> AmenityStats {
    let mut stats = AmenityStats {
        school_count: 0,
        supermarket_count: 0,
        park_count: 0,
        healthcare_count: 0,
        transit_stop_count: 0,
        charging_station_count: 0,
        nearest_amenity_distance_m: None,
        diversity_score: 0.0,
        retrieved_at: Utc::now(),
    };

    for element in elements {
        let Some((lat, lon)) = element.coordinates() else {
            continue;
        };

        let distance = distance_meters(latitude, longitude, lat, lon);
        if stats.nearest_amenity_distance_m.map_or(true, |nearest| distance < nearest) {
            stats.nearest_amenity_distance_m = Some(distance);
        }

        match AmenityCategory::classify(element) {
            Some(AmenityCategory::School) => stats.school_count += 1,
            Some(AmenityCategory::Supermarket) => stats.supermarket_count += 1,
            Some(AmenityCategory::Park) => stats.park_count += 1,
            Some(AmenityCategory::Healthcare) => stats.healthcare_count += 1,
            Some(AmenityCategory::Transit) => stats.transit_stop_count += 1,
            Some(AmenityCategory::ChargingStation) => stats.charging_station_count += 1,
            None => {}
        }
    }

    let populated = [
        stats.school_count,
        stats.supermarket_count,
        stats.park_count,
        stats.healthcare_count,
        stats.transit_stop_count,
        stats.charging_station_count,
    ]
    .iter()
    .filter(|&&count| count > 0)
    .count();
    stats.diversity_score = populated as f64 / CATEGORY_COUNT * 100.0;

    stats
}
