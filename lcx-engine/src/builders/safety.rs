//! Registered crime rates

use super::{ReportWarnings, CBS_CRIME};
use crate::scoring;
use crate::types::{ContextMetric, CrimeStats, SourceKind};

pub const MISSING_WARNING: &str = "CBS crime statistics were unavailable; safety score is partial.";

const UNIT: Option<&str> = Some("per 1000");

pub fn build(stats: Option<&CrimeStats>, warnings: &mut ReportWarnings) -> Vec<ContextMetric> {
    let Some(crime) = stats else {
        warnings.source_missing(SourceKind::Crime, MISSING_WARNING);
        return Vec::new();
    };

    vec![
        ContextMetric::new(
            "total_crimes",
            "Total Crimes",
            crime.total_per_1000,
            UNIT,
            scoring::score_total_crime(crime.total_per_1000),
            CBS_CRIME,
        ),
        ContextMetric::new(
            "burglary",
            "Burglary Rate",
            crime.burglary_per_1000,
            UNIT,
            scoring::score_burglary(crime.burglary_per_1000),
            CBS_CRIME,
        ),
        ContextMetric::new(
            "violent_crime",
            "Violent Crime",
            crime.violent_per_1000,
            UNIT,
            scoring::score_violent_crime(crime.violent_per_1000),
            CBS_CRIME,
        ),
        ContextMetric::new("theft", "Theft Rate", crime.theft_per_1000, UNIT, None, CBS_CRIME),
        ContextMetric::new("vandalism", "Vandalism Rate", crime.vandalism_per_1000, UNIT, None, CBS_CRIME),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::fixtures::{self, find};

    #[test]
    fn test_crime_scores() {
        let mut warnings = ReportWarnings::default();
        let metrics = build(Some(&fixtures::crime()), &mut warnings);

        assert_eq!(metrics.len(), 5);
        assert_eq!(find(&metrics, "total_crimes").score, Some(70.0));
        assert_eq!(find(&metrics, "burglary").score, Some(80.0));
        assert_eq!(find(&metrics, "violent_crime").score, Some(50.0));
        assert_eq!(find(&metrics, "theft").score, None);
        assert!(warnings.into_messages().is_empty());
    }

    #[test]
    fn test_missing_totals_are_null() {
        let mut crime = fixtures::crime();
        crime.total_per_1000 = None;

        let metrics = build(Some(&crime), &mut ReportWarnings::default());
        let total = find(&metrics, "total_crimes");
        assert_eq!(total.value, None);
        assert_eq!(total.score, None);
    }

    #[test]
    fn test_missing_snapshot_suppressed_after_failure() {
        let mut warnings = ReportWarnings::new(Vec::new(), vec![SourceKind::Crime]);
        assert!(build(None, &mut warnings).is_empty());
        assert!(warnings.into_messages().is_empty());

        let mut warnings = ReportWarnings::default();
        build(None, &mut warnings);
        assert_eq!(warnings.into_messages(), vec![MISSING_WARNING.to_string()]);
    }
}
