//! Metric scoring functions
//!
//! Every score is on a 0-100 scale. Bucket tables are ordered threshold
//! lookups: the first bucket whose threshold the value does not exceed
//! wins, and values above every threshold fall into the last bucket. There
//! is no interpolation between buckets.

pub mod urbanity;

pub use urbanity::Urbanity;

/// Ordered threshold table
#[derive(Debug, Clone, Copy)]
pub struct BucketTable {
    /// `(upper bound inclusive, score)`, ascending by bound
    buckets: &'static [(f64, f64)],
    /// Score above the highest bound
    otherwise: f64,
}

impl BucketTable {
    pub const fn new(buckets: &'static [(f64, f64)], otherwise: f64) -> Self {
        Self { buckets, otherwise }
    }

    pub fn score(&self, value: f64) -> f64 {
        self.buckets
            .iter()
            .find(|(bound, _)| value <= *bound)
            .map_or(self.otherwise, |(_, score)| *score)
    }
}

/// Total registered crime per 1000 residents
pub const TOTAL_CRIME: BucketTable = BucketTable::new(
    &[(20.0, 100.0), (35.0, 85.0), (50.0, 70.0), (75.0, 50.0), (100.0, 30.0)],
    15.0,
);

pub const BURGLARY: BucketTable =
    BucketTable::new(&[(2.0, 100.0), (5.0, 80.0), (10.0, 60.0), (15.0, 40.0)], 20.0);

pub const VIOLENT_CRIME: BucketTable =
    BucketTable::new(&[(2.0, 100.0), (5.0, 75.0), (10.0, 50.0)], 25.0);

/// Residents per km²; optimum is urban, not the extremes
pub const POPULATION_DENSITY: BucketTable = BucketTable::new(
    &[(500.0, 65.0), (1500.0, 85.0), (3500.0, 100.0), (7000.0, 70.0)],
    50.0,
);

/// Meters to the nearest amenity
pub const AMENITY_PROXIMITY: BucketTable = BucketTable::new(
    &[(250.0, 100.0), (500.0, 85.0), (1000.0, 70.0), (1500.0, 55.0), (2000.0, 40.0)],
    25.0,
);

pub const PM25: BucketTable = BucketTable::new(
    &[(5.0, 100.0), (10.0, 85.0), (15.0, 70.0), (25.0, 50.0), (35.0, 25.0)],
    10.0,
);

pub const PM10: BucketTable = BucketTable::new(
    &[(15.0, 100.0), (25.0, 85.0), (35.0, 70.0), (45.0, 50.0), (60.0, 30.0)],
    15.0,
);

pub const NO2: BucketTable = BucketTable::new(
    &[(20.0, 100.0), (30.0, 85.0), (40.0, 70.0), (60.0, 50.0), (80.0, 30.0)],
    15.0,
);

pub const O3: BucketTable = BucketTable::new(
    &[(60.0, 100.0), (90.0, 85.0), (120.0, 70.0), (150.0, 50.0), (180.0, 30.0)],
    15.0,
);

/// Share of privately rented homes (%)
pub const PRIVATE_RENTAL: BucketTable = BucketTable::new(
    &[(10.0, 70.0), (20.0, 85.0), (35.0, 100.0), (50.0, 80.0)],
    60.0,
);

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

/// Round to one decimal (half away from zero)
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn bucket(table: &BucketTable, value: Option<f64>) -> Option<f64> {
    value.map(|v| table.score(v))
}

pub fn score_total_crime(per_1000: Option<f64>) -> Option<f64> {
    bucket(&TOTAL_CRIME, per_1000)
}

pub fn score_burglary(per_1000: Option<f64>) -> Option<f64> {
    bucket(&BURGLARY, per_1000)
}

pub fn score_violent_crime(per_1000: Option<f64>) -> Option<f64> {
    bucket(&VIOLENT_CRIME, per_1000)
}

pub fn score_density(per_km2: Option<f64>) -> Option<f64> {
    bucket(&POPULATION_DENSITY, per_km2)
}

pub fn score_amenity_proximity(meters: Option<f64>) -> Option<f64> {
    bucket(&AMENITY_PROXIMITY, meters)
}

pub fn score_pm25(value: Option<f64>) -> Option<f64> {
    bucket(&PM25, value)
}

pub fn score_pm10(value: Option<f64>) -> Option<f64> {
    bucket(&PM10, value)
}

pub fn score_no2(value: Option<f64>) -> Option<f64> {
    bucket(&NO2, value)
}

pub fn score_o3(value: Option<f64>) -> Option<f64> {
    bucket(&O3, value)
}

pub fn score_private_rental(percent: Option<f64>) -> Option<f64> {
    bucket(&PRIVATE_RENTAL, percent)
}

/// 0% low-income households scores 100; 12.5% or more scores 0
pub fn score_low_income(percent: Option<f64>) -> Option<f64> {
    percent.map(|p| clamp_score(100.0 - p * 8.0))
}

/// Average WOZ in k€: 150k scores 0, 450k and up scores 100
pub fn score_woz(woz_k: Option<f64>) -> Option<f64> {
    woz_k.map(|w| clamp_score((w - 150.0) / 3.0))
}

/// Average income in k€: 18k scores 0, roughly 33k and up scores 100
pub fn score_income(income_k: Option<f64>) -> Option<f64> {
    income_k.map(|i| clamp_score((i - 18.0) * 6.5))
}

pub fn score_owner_occupied(percent: Option<f64>) -> Option<f64> {
    percent.map(|p| clamp_score(p * 1.25))
}

/// Amenity volume: 25 amenities in the radius is a full score
pub fn score_amenity_volume(total_count: u32) -> f64 {
    clamp_score(f64::from(total_count) * 4.0)
}

/// Distance (km) to a key facility against an optimal and acceptable bound
pub fn score_proximity_km(distance_km: Option<f64>, optimal_km: f64, acceptable_km: f64) -> Option<f64> {
    distance_km.map(|d| {
        if d <= optimal_km {
            100.0
        } else if d <= acceptable_km {
            70.0
        } else {
            40.0
        }
    })
}

/// Mix of old and new housing stock; a balanced mix scores highest
pub fn score_build_mix(pct_pre_2000: Option<f64>, pct_post_2000: Option<f64>) -> Option<f64> {
    match (pct_pre_2000, pct_post_2000) {
        (None, None) => None,
        (Some(pre), Some(post)) => Some((100.0 - (pre - post).abs() * 1.2).clamp(40.0, 100.0)),
        _ => Some(70.0),
    }
}

/// Family friendliness from family households %, children % and household size
///
/// Each absent input contributes nothing; `None` only when all are absent.
pub fn score_family_friendly(
    pct_family_households: Option<f64>,
    pct_children: Option<f64>,
    avg_household_size: Option<f64>,
) -> Option<f64> {
    if pct_family_households.is_none() && pct_children.is_none() && avg_household_size.is_none() {
        return None;
    }

    let score = 50.0
        + pct_family_households.map_or(0.0, |p| (p - 20.0) * 1.5)
        + pct_children.map_or(0.0, |p| (p - 15.0) * 2.0)
        + avg_household_size.map_or(0.0, |s| (s - 2.0) * 15.0);

    Some(clamp_score(score))
}

/// Share (%) of higher-educated residents, one decimal
pub fn education_share(low: Option<i64>, medium: Option<i64>, high: Option<i64>) -> Option<f64> {
    let (low, medium, high) = (low?, medium?, high?);
    let total = low + medium + high;
    if total <= 0 {
        return None;
    }
    Some(round1(high as f64 / total as f64 * 100.0))
}

pub fn score_education(share: Option<f64>) -> Option<f64> {
    share.map(|s| clamp_score(s * 1.4))
}

/// `count / denominator` as a percentage with one decimal
///
/// `None` when either side is absent or the denominator is not positive.
pub fn percentage(count: Option<i64>, denominator: Option<i64>) -> Option<f64> {
    let (count, denominator) = (count?, denominator?);
    if denominator <= 0 {
        return None;
    }
    Some(round1(count as f64 / denominator as f64 * 100.0))
}
