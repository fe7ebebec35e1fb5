//! Amenities in the search radius plus CBS walking distances

use super::{ReportWarnings, CBS_STATLINE, OPENSTREETMAP};
use crate::scoring;
use crate::types::{AmenityStats, ContextMetric, NeighborhoodStats, SourceKind};

pub const MISSING_WARNING: &str = "OSM amenities were unavailable; amenity score is partial.";

pub fn build(
    amenities: Option<&AmenityStats>,
    neighborhood: Option<&NeighborhoodStats>,
    warnings: &mut ReportWarnings,
) -> Vec<ContextMetric> {
    let mut metrics = Vec::new();

    match amenities {
        Some(osm) => {
            let count = |key: &str, label: &str, value: u32| {
                ContextMetric::new(key, label, Some(f64::from(value)), Some("count"), None, OPENSTREETMAP)
            };
            let volume_score = scoring::score_amenity_volume(osm.total_count());

            metrics.extend([
                count("schools", "Schools in Radius", osm.school_count),
                count("supermarkets", "Supermarkets in Radius", osm.supermarket_count),
                count("parks", "Parks in Radius", osm.park_count),
                count("healthcare", "Healthcare in Radius", osm.healthcare_count),
                count("transit_stops", "Transit Stops in Radius", osm.transit_stop_count),
                count("charging_stations", "Charging Stations in Radius", osm.charging_station_count),
                ContextMetric::new(
                    "amenity_diversity",
                    "Amenity Diversity",
                    Some(osm.diversity_score),
                    Some("score"),
                    Some(osm.diversity_score),
                    OPENSTREETMAP,
                ),
                ContextMetric::new(
                    "amenity_proximity",
                    "Nearest Amenity Distance",
                    osm.nearest_amenity_distance_m,
                    Some("m"),
                    scoring::score_amenity_proximity(osm.nearest_amenity_distance_m),
                    OPENSTREETMAP,
                ),
                ContextMetric::new(
                    "amenity_count_score",
                    "Amenity Volume Score",
                    Some(volume_score),
                    Some("score"),
                    Some(volume_score),
                    OPENSTREETMAP,
                ),
            ]);
        }
        None => warnings.source_missing(SourceKind::Amenities, MISSING_WARNING),
    }

    if let Some(cbs) = neighborhood {
        let km = |key: &str, label: &str, distance: Option<f64>, score: Option<f64>| {
            ContextMetric::new(key, label, distance, Some("km"), score, CBS_STATLINE)
        };

        metrics.extend([
            km(
                "dist_supermarket",
                "Dist. to Supermarket",
                cbs.dist_supermarket_km,
                scoring::score_proximity_km(cbs.dist_supermarket_km, 1.0, 2.5),
            ),
            km(
                "dist_gp",
                "Dist. to GP",
                cbs.dist_gp_km,
                scoring::score_proximity_km(cbs.dist_gp_km, 1.5, 3.0),
            ),
            km(
                "dist_school",
                "Dist. to School",
                cbs.dist_school_km,
                scoring::score_proximity_km(cbs.dist_school_km, 1.0, 3.0),
            ),
            km("dist_daycare", "Dist. to Daycare", cbs.dist_daycare_km, None),
            ContextMetric::new(
                "schools_3km",
                "Schools within 3km",
                cbs.schools_within_3km,
                Some("count"),
                None,
                CBS_STATLINE,
            ),
        ]);
    }

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::fixtures::{self, find};

    #[test]
    fn test_osm_and_cbs_metrics() {
        let mut warnings = ReportWarnings::default();
        let metrics = build(
            Some(&fixtures::amenities()),
            Some(&fixtures::neighborhood()),
            &mut warnings,
        );

        assert_eq!(metrics.len(), 14);
        assert_eq!(metrics[0].key, "schools");
        assert_eq!(metrics[9].key, "dist_supermarket");
        assert_eq!(find(&metrics, "amenity_proximity").score, Some(100.0));
        // 25 amenities * 4
        assert_eq!(find(&metrics, "amenity_count_score").score, Some(100.0));
        assert_eq!(find(&metrics, "amenity_diversity").score, Some(100.0));
        assert_eq!(find(&metrics, "dist_gp").score, Some(100.0));
        assert_eq!(find(&metrics, "dist_daycare").score, None);
        assert!(warnings.into_messages().is_empty());
    }

    #[test]
    fn test_cbs_proximity_without_osm() {
        let mut warnings = ReportWarnings::default();
        let metrics = build(None, Some(&fixtures::neighborhood()), &mut warnings);

        assert_eq!(metrics.len(), 5);
        assert_eq!(warnings.into_messages(), vec![MISSING_WARNING.to_string()]);
    }

    #[test]
    fn test_no_amenities_nearby() {
        let mut osm = fixtures::amenities();
        osm.school_count = 0;
        osm.supermarket_count = 0;
        osm.park_count = 0;
        osm.healthcare_count = 0;
        osm.transit_stop_count = 0;
        osm.charging_station_count = 0;
        osm.nearest_amenity_distance_m = None;
        osm.diversity_score = 0.0;

        let metrics = build(Some(&osm), None, &mut ReportWarnings::default());
        assert_eq!(find(&metrics, "amenity_proximity").score, None);
        assert_eq!(find(&metrics, "amenity_count_score").score, Some(0.0));
    }
}
