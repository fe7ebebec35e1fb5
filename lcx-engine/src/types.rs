//! Core data model for context reports
//!
//! Everything here is built fresh per request and is immutable once built.
//! Numeric source fields are `Option`s: absence means "not published by the
//! source", never zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default search radius when a request does not specify one
pub const DEFAULT_RADIUS_METERS: i32 = 1000;

// ============================================================================
// Location
// ============================================================================

/// Canonical location produced by a [`crate::sources::LocationResolver`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLocation {
    /// Input text as received
    pub query: String,
    pub display_address: String,
    /// WGS84 latitude (decimal degrees)
    pub latitude: f64,
    /// WGS84 longitude (decimal degrees)
    pub longitude: f64,
    /// Rijksdriehoek (national grid) x coordinate
    pub rd_x: Option<f64>,
    /// Rijksdriehoek (national grid) y coordinate
    pub rd_y: Option<f64>,
    pub municipality_code: Option<String>,
    pub municipality_name: Option<String>,
    pub district_code: Option<String>,
    pub district_name: Option<String>,
    pub neighborhood_code: Option<String>,
    pub neighborhood_name: Option<String>,
    pub postal_code: Option<String>,
}

// ============================================================================
// Source snapshots
// ============================================================================

/// Demographics, housing, mobility and proximity indicators for one CBS region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodStats {
    pub region_code: String,
    pub region_type: String,
    pub residents: Option<i64>,
    /// Residents per km²
    pub population_density: Option<f64>,
    /// Average WOZ value in thousands of euros
    pub average_woz_k: Option<f64>,
    pub low_income_households_pct: Option<f64>,

    pub men: Option<i64>,
    pub women: Option<i64>,
    pub age_0_15: Option<i64>,
    pub age_15_25: Option<i64>,
    pub age_25_45: Option<i64>,
    pub age_45_65: Option<i64>,
    pub age_65_plus: Option<i64>,

    pub total_households: Option<i64>,
    pub single_households: Option<i64>,
    pub households_without_children: Option<i64>,
    pub households_with_children: Option<i64>,
    pub avg_household_size: Option<f64>,

    /// Raw CBS urbanity category (label or numeral)
    pub urbanity: Option<String>,
    /// Thousands of euros
    pub avg_income_per_recipient_k: Option<f64>,
    /// Thousands of euros
    pub avg_income_per_inhabitant_k: Option<f64>,
    pub education_low: Option<i64>,
    pub education_medium: Option<i64>,
    pub education_high: Option<i64>,

    pub pct_owner_occupied: Option<f64>,
    pub pct_rental: Option<f64>,
    pub pct_social_housing: Option<f64>,
    pub pct_private_rental: Option<f64>,
    pub pct_built_pre_2000: Option<f64>,
    pub pct_built_post_2000: Option<f64>,
    pub pct_multi_family: Option<f64>,

    pub cars_per_household: Option<f64>,
    /// Cars per km²
    pub car_density: Option<f64>,
    pub total_cars: Option<i64>,

    pub dist_gp_km: Option<f64>,
    pub dist_supermarket_km: Option<f64>,
    pub dist_daycare_km: Option<f64>,
    pub dist_school_km: Option<f64>,
    pub schools_within_3km: Option<f64>,

    pub retrieved_at: DateTime<Utc>,
}

impl NeighborhoodStats {
    /// Snapshot with every indicator absent
    pub fn empty(region_code: impl Into<String>, region_type: impl Into<String>) -> Self {
        Self {
            region_code: region_code.into(),
            region_type: region_type.into(),
            residents: None,
            population_density: None,
            average_woz_k: None,
            low_income_households_pct: None,
            men: None,
            women: None,
            age_0_15: None,
            age_15_25: None,
            age_25_45: None,
            age_45_65: None,
            age_65_plus: None,
            total_households: None,
            single_households: None,
            households_without_children: None,
            households_with_children: None,
            avg_household_size: None,
            urbanity: None,
            avg_income_per_recipient_k: None,
            avg_income_per_inhabitant_k: None,
            education_low: None,
            education_medium: None,
            education_high: None,
            pct_owner_occupied: None,
            pct_rental: None,
            pct_social_housing: None,
            pct_private_rental: None,
            pct_built_pre_2000: None,
            pct_built_post_2000: None,
            pct_multi_family: None,
            cars_per_household: None,
            car_density: None,
            total_cars: None,
            dist_gp_km: None,
            dist_supermarket_km: None,
            dist_daycare_km: None,
            dist_school_km: None,
            schools_within_3km: None,
            retrieved_at: Utc::now(),
        }
    }
}

/// Registered crime per 1000 residents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrimeStats {
    pub total_per_1000: Option<f64>,
    pub burglary_per_1000: Option<f64>,
    pub violent_per_1000: Option<f64>,
    pub theft_per_1000: Option<f64>,
    pub vandalism_per_1000: Option<f64>,
    /// Relative change against the previous year (%)
    pub year_over_year_change: Option<f64>,
    pub retrieved_at: DateTime<Utc>,
}

/// Points of interest found within the search radius
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmenityStats {
    pub school_count: u32,
    pub supermarket_count: u32,
    pub park_count: u32,
    pub healthcare_count: u32,
    pub transit_stop_count: u32,
    pub charging_station_count: u32,
    pub nearest_amenity_distance_m: Option<f64>,
    /// Share of populated amenity categories (0-100)
    pub diversity_score: f64,
    pub retrieved_at: DateTime<Utc>,
}

impl AmenityStats {
    pub fn total_count(&self) -> u32 {
        self.school_count
            + self.supermarket_count
            + self.park_count
            + self.healthcare_count
            + self.transit_stop_count
            + self.charging_station_count
    }
}

/// Latest measurements from the nearest air quality station (µg/m³)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualitySnapshot {
    pub station_id: String,
    pub station_name: String,
    pub station_distance_m: f64,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub no2: Option<f64>,
    pub o3: Option<f64>,
    pub measured_at: Option<DateTime<Utc>>,
    pub retrieved_at: DateTime<Utc>,
}

// ============================================================================
// Report building blocks
// ============================================================================

/// One normalized indicator with an optional 0-100 score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextMetric {
    pub key: String,
    pub label: String,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub score: Option<f64>,
    pub source: String,
    pub note: Option<String>,
}

impl ContextMetric {
    /// Build a metric; the score is dropped whenever the value is absent
    pub fn new(
        key: &str,
        label: &str,
        value: Option<f64>,
        unit: Option<&str>,
        score: Option<f64>,
        source: &str,
    ) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            value,
            unit: unit.map(str::to_string),
            score: value.and(score),
            source: source.to_string(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: Option<&str>) -> Self {
        self.note = note.map(str::to_string);
        self
    }
}

/// Where a piece of report data came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAttribution {
    pub source: String,
    pub url: String,
    pub license: String,
    pub retrieved_at: DateTime<Utc>,
}

impl SourceAttribution {
    pub fn new(source: &str, url: &str, license: &str, retrieved_at: DateTime<Utc>) -> Self {
        Self {
            source: source.to_string(),
            url: url.to_string(),
            license: license.to_string(),
            retrieved_at,
        }
    }
}

/// The four external statistics sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Neighborhood,
    Crime,
    Amenities,
    AirQuality,
}

impl SourceKind {
    /// Fan-out order; warnings and attributions follow it
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Neighborhood,
        SourceKind::Crime,
        SourceKind::Amenities,
        SourceKind::AirQuality,
    ];

    /// Name used in logs and warnings
    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::Neighborhood => "CBS",
            SourceKind::Crime => "CBS Crime",
            SourceKind::Amenities => "Overpass",
            SourceKind::AirQuality => "Luchtmeetnet",
        }
    }

    /// Warning recorded when the source call failed
    pub fn unavailable_warning(&self) -> String {
        format!("Source {} unavailable", self.name())
    }
}

/// Raw fan-out result: four optional snapshots plus provenance
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSourceData {
    pub neighborhood_stats: Option<NeighborhoodStats>,
    pub crime_stats: Option<CrimeStats>,
    pub amenity_stats: Option<AmenityStats>,
    pub air_quality: Option<AirQualitySnapshot>,
    pub sources: Vec<SourceAttribution>,
    pub warnings: Vec<String>,
    /// Sources whose call failed (as opposed to returning no data)
    pub failed_sources: Vec<SourceKind>,
}

impl ContextSourceData {
    pub fn has_failed(&self, kind: SourceKind) -> bool {
        self.failed_sources.contains(&kind)
    }
}

// ============================================================================
// Report
// ============================================================================

/// Fully scored context report for one location and radius
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextReport {
    pub location: ResolvedLocation,
    pub social_metrics: Vec<ContextMetric>,
    pub safety_metrics: Vec<ContextMetric>,
    pub demographics_metrics: Vec<ContextMetric>,
    pub housing_metrics: Vec<ContextMetric>,
    pub mobility_metrics: Vec<ContextMetric>,
    pub amenity_metrics: Vec<ContextMetric>,
    pub environment_metrics: Vec<ContextMetric>,
    /// 0-100, never absent
    pub composite_score: f64,
    /// Only categories with at least one scored metric appear
    pub category_scores: BTreeMap<String, f64>,
    pub sources: Vec<SourceAttribution>,
    pub warnings: Vec<String>,
}

/// Incoming report request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub input: String,
    #[serde(default = "default_radius")]
    pub radius_meters: i32,
}

impl ReportRequest {
    pub fn new(input: impl Into<String>, radius_meters: i32) -> Self {
        Self {
            input: input.into(),
            radius_meters,
        }
    }
}

fn default_radius() -> i32 {
    DEFAULT_RADIUS_METERS
}
