//! Air quality at the nearest measuring station

use super::{ReportWarnings, LUCHTMEETNET};
use crate::scoring;
use crate::types::{AirQualitySnapshot, ContextMetric, SourceKind};

pub const MISSING_WARNING: &str = "Air quality source was unavailable; environment score is partial.";

const UNIT: Option<&str> = Some("µg/m³");

pub fn build(snapshot: Option<&AirQualitySnapshot>, warnings: &mut ReportWarnings) -> Vec<ContextMetric> {
    let Some(air) = snapshot else {
        warnings.source_missing(SourceKind::AirQuality, MISSING_WARNING);
        return Vec::new();
    };

    vec![
        ContextMetric::new("pm25", "PM2.5", air.pm25, UNIT, scoring::score_pm25(air.pm25), LUCHTMEETNET),
        ContextMetric::new("pm10", "PM10", air.pm10, UNIT, scoring::score_pm10(air.pm10), LUCHTMEETNET),
        ContextMetric::new("no2", "NO2", air.no2, UNIT, scoring::score_no2(air.no2), LUCHTMEETNET),
        ContextMetric::new("o3", "O3", air.o3, UNIT, scoring::score_o3(air.o3), LUCHTMEETNET),
        ContextMetric::new("air_station", "Nearest Station", None, None, None, LUCHTMEETNET)
            .with_note(Some(&air.station_name)),
        ContextMetric::new(
            "air_station_distance",
            "Distance to Station",
            Some(air.station_distance_m),
            Some("m"),
            None,
            LUCHTMEETNET,
        ),
    ]
}
