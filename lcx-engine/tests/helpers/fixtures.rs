//! Representative source snapshots for "Damrak 1 Amsterdam"

use chrono::{DateTime, TimeZone, Utc};
use lcx_engine::types::{AirQualitySnapshot, AmenityStats, CrimeStats, NeighborhoodStats, ResolvedLocation};

/// Fixed retrieval time so attributions can be compared exactly
pub fn retrieved_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().unwrap_or_else(Utc::now)
}

pub fn damrak_location() -> ResolvedLocation {
    location_at(52.37740, 4.89710)
}

pub fn location_at(latitude: f64, longitude: f64) -> ResolvedLocation {
    ResolvedLocation {
        query: "Damrak 1 Amsterdam".to_string(),
        display_address: "Damrak 1, 1012LG Amsterdam".to_string(),
        latitude,
        longitude,
        rd_x: Some(121601.5),
        rd_y: Some(487718.2),
        municipality_code: Some("GM0363".to_string()),
        municipality_name: Some("Amsterdam".to_string()),
        district_code: Some("WK036300".to_string()),
        district_name: Some("Burgwallen-Nieuwe Zijde".to_string()),
        neighborhood_code: Some("BU03630000".to_string()),
        neighborhood_name: Some("Kop Zeedijk".to_string()),
        postal_code: Some("1012LG".to_string()),
    }
}

pub fn neighborhood_stats() -> NeighborhoodStats {
    NeighborhoodStats {
        residents: Some(1100),
        population_density: Some(6500.0),
        average_woz_k: Some(380.0),
        low_income_households_pct: Some(9.0),
        men: Some(600),
        women: Some(500),
        age_0_15: Some(60),
        age_15_25: Some(200),
        age_25_45: Some(480),
        age_45_65: Some(250),
        age_65_plus: Some(110),
        total_households: Some(800),
        single_households: Some(560),
        households_without_children: Some(160),
        households_with_children: Some(80),
        avg_household_size: Some(1.4),
        urbanity: Some("Zeer sterk stedelijk".to_string()),
        avg_income_per_recipient_k: Some(36.5),
        avg_income_per_inhabitant_k: Some(29.0),
        education_low: Some(150),
        education_medium: Some(250),
        education_high: Some(500),
        pct_owner_occupied: Some(22.0),
        pct_rental: Some(78.0),
        pct_social_housing: Some(38.0),
        pct_private_rental: Some(40.0),
        pct_built_pre_2000: Some(88.0),
        pct_built_post_2000: Some(12.0),
        pct_multi_family: Some(98.0),
        cars_per_household: Some(0.2),
        car_density: Some(900.0),
        total_cars: Some(160),
        dist_gp_km: Some(0.4),
        dist_supermarket_km: Some(0.2),
        dist_daycare_km: Some(0.5),
        dist_school_km: Some(0.7),
        schools_within_3km: Some(42.0),
        retrieved_at: retrieved_at(),
        ..NeighborhoodStats::empty("BU03630000", "Buurt")
    }
}

pub fn crime_stats() -> CrimeStats {
    CrimeStats {
        total_per_1000: Some(140.0),
        burglary_per_1000: Some(12.0),
        violent_per_1000: Some(9.0),
        theft_per_1000: Some(12.0),
        vandalism_per_1000: Some(14.0),
        year_over_year_change: None,
        retrieved_at: retrieved_at(),
    }
}

pub fn amenity_stats() -> AmenityStats {
    AmenityStats {
        school_count: 6,
        supermarket_count: 9,
        park_count: 3,
        healthcare_count: 12,
        transit_stop_count: 40,
        charging_station_count: 7,
        nearest_amenity_distance_m: Some(35.0),
        diversity_score: 100.0,
        retrieved_at: retrieved_at(),
    }
}

pub fn air_quality() -> AirQualitySnapshot {
    AirQualitySnapshot {
        station_id: "NL49017".to_string(),
        station_name: "Amsterdam-Stadhouderskade".to_string(),
        station_distance_m: 1850.0,
        pm25: Some(9.5),
        pm10: Some(19.0),
        no2: Some(34.0),
        o3: Some(41.0),
        measured_at: Some(retrieved_at()),
        retrieved_at: retrieved_at(),
    }
}
