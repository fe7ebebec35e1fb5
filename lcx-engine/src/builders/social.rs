//! Social indicators: population, income, property value, urbanity, education

use super::{ReportWarnings, CBS_STATLINE, LCX_COMPOSITE};
use crate::scoring::{self, Urbanity};
use crate::types::{ContextMetric, NeighborhoodStats, SourceKind};

pub const MISSING_WARNING: &str = "CBS neighborhood indicators were unavailable; social score is partial.";

pub fn build(stats: Option<&NeighborhoodStats>, warnings: &mut ReportWarnings) -> Vec<ContextMetric> {
    let Some(cbs) = stats else {
        warnings.source_missing(SourceKind::Neighborhood, MISSING_WARNING);
        return Vec::new();
    };

    let urbanity = cbs.urbanity.as_deref().map(Urbanity::parse);
    let urbanity_level = urbanity.and_then(Urbanity::level).map(f64::from);
    let urbanity_score = urbanity.and_then(Urbanity::score);

    let education_total = match (cbs.education_low, cbs.education_medium, cbs.education_high) {
        (Some(low), Some(medium), Some(high)) => Some(low + medium + high),
        _ => None,
    };
    let education_high_share = scoring::education_share(cbs.education_low, cbs.education_medium, cbs.education_high);

    vec![
        ContextMetric::new("residents", "Residents", cbs.residents.map(|r| r as f64), Some("people"), None, CBS_STATLINE),
        ContextMetric::new(
            "population_density",
            "Population Density",
            cbs.population_density,
            Some("people/km²"),
            scoring::score_density(cbs.population_density),
            CBS_STATLINE,
        ),
        ContextMetric::new(
            "low_income_households",
            "Low Income Households",
            cbs.low_income_households_pct,
            Some("%"),
            scoring::score_low_income(cbs.low_income_households_pct),
            CBS_STATLINE,
        ),
        ContextMetric::new(
            "average_woz",
            "Average WOZ Value",
            cbs.average_woz_k,
            Some("k€"),
            scoring::score_woz(cbs.average_woz_k),
            CBS_STATLINE,
        ),
        ContextMetric::new(
            "avg_income_recipient",
            "Avg Income per Recipient",
            cbs.avg_income_per_recipient_k,
            Some("k€"),
            None,
            CBS_STATLINE,
        ),
        ContextMetric::new(
            "avg_income_inhabitant",
            "Avg Income per Inhabitant",
            cbs.avg_income_per_inhabitant_k,
            Some("k€"),
            scoring::score_income(cbs.avg_income_per_inhabitant_k),
            CBS_STATLINE,
        ),
        ContextMetric::new("urbanity", "Urbanity", urbanity_level, Some("level"), urbanity_score, CBS_STATLINE)
            .with_note(cbs.urbanity.as_deref()),
        ContextMetric::new(
            "education_low",
            "Education: Low",
            scoring::percentage(cbs.education_low, education_total),
            Some("%"),
            None,
            CBS_STATLINE,
        ),
        ContextMetric::new(
            "education_medium",
            "Education: Medium",
            scoring::percentage(cbs.education_medium, education_total),
            Some("%"),
            None,
            CBS_STATLINE,
        ),
        ContextMetric::new(
            "education_high",
            "Education: High",
            education_high_share,
            Some("%"),
            scoring::score_education(education_high_share),
            LCX_COMPOSITE,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::fixtures::{self, find};

    #[test]
    fn test_metric_order_and_scores() {
        let mut warnings = ReportWarnings::default();
        let metrics = build(Some(&fixtures::neighborhood()), &mut warnings);

        let keys: Vec<_> = metrics.iter().map(|m| m.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "residents",
                "population_density",
                "low_income_households",
                "average_woz",
                "avg_income_recipient",
                "avg_income_inhabitant",
                "urbanity",
                "education_low",
                "education_medium",
                "education_high",
            ]
        );

        assert_eq!(find(&metrics, "population_density").score, Some(100.0));
        assert_eq!(find(&metrics, "low_income_households").score, Some(52.0));
        assert_eq!(find(&metrics, "average_woz").score, Some(90.0));
        assert_eq!(find(&metrics, "avg_income_inhabitant").score, Some(65.0));

        let urbanity = find(&metrics, "urbanity");
        assert_eq!(urbanity.value, Some(2.0));
        assert_eq!(urbanity.score, Some(85.0));
        assert_eq!(urbanity.note.as_deref(), Some("2"));

        let education = find(&metrics, "education_high");
        assert_eq!(education.value, Some(50.0));
        assert_eq!(education.score, Some(70.0));
        assert_eq!(find(&metrics, "education_low").value, Some(16.7));

        assert!(warnings.into_messages().is_empty());
    }

    #[test]
    fn test_unrecognized_urbanity_is_unscored() {
        let mut stats = fixtures::neighborhood();
        stats.urbanity = Some("metropolitan".to_string());

        let metrics = build(Some(&stats), &mut ReportWarnings::default());
        let urbanity = find(&metrics, "urbanity");
        assert_eq!(urbanity.value, None);
        assert_eq!(urbanity.score, None);
        assert_eq!(urbanity.note.as_deref(), Some("metropolitan"));
    }

    #[test]
    fn test_zero_education_total_is_null() {
        let mut stats = fixtures::neighborhood();
        stats.education_low = Some(0);
        stats.education_medium = Some(0);
        stats.education_high = Some(0);

        let metrics = build(Some(&stats), &mut ReportWarnings::default());
        assert_eq!(find(&metrics, "education_high").value, None);
        assert_eq!(find(&metrics, "education_low").value, None);
    }

    #[test]
    fn test_missing_snapshot_warns() {
        let mut warnings = ReportWarnings::default();
        assert!(build(None, &mut warnings).is_empty());
        assert_eq!(warnings.into_messages(), vec![MISSING_WARNING.to_string()]);
    }
}
