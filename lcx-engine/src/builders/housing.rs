//! Housing stock: tenure, age and building type

use super::{CBS_STATLINE, LCX_COMPOSITE};
use crate::scoring;
use crate::types::{ContextMetric, NeighborhoodStats};

pub fn build(stats: Option<&NeighborhoodStats>) -> Vec<ContextMetric> {
    let Some(cbs) = stats else {
        return Vec::new();
    };

    // Reported value is the post-2000 share, derived from the pre-2000 share when absent
    let build_mix_value = cbs
        .pct_built_post_2000
        .or_else(|| cbs.pct_built_pre_2000.map(|pre| (100.0 - pre).max(0.0)));

    let pct = |key: &str, label: &str, value: Option<f64>| {
        ContextMetric::new(key, label, value, Some("%"), None, CBS_STATLINE)
    };

    vec![
        ContextMetric::new(
            "housing_owner",
            "Owner-Occupied",
            cbs.pct_owner_occupied,
            Some("%"),
            scoring::score_owner_occupied(cbs.pct_owner_occupied),
            CBS_STATLINE,
        ),
        pct("housing_rental", "Rental Properties", cbs.pct_rental),
        pct("housing_social", "Social Housing", cbs.pct_social_housing),
        ContextMetric::new(
            "housing_private_rental",
            "Private Rental",
            cbs.pct_private_rental,
            Some("%"),
            scoring::score_private_rental(cbs.pct_private_rental),
            CBS_STATLINE,
        ),
        pct("housing_pre2000", "Built Pre-2000", cbs.pct_built_pre_2000),
        pct("housing_post2000", "Built Post-2000", cbs.pct_built_post_2000),
        ContextMetric::new(
            "housing_build_mix",
            "Build-Year Mix",
            build_mix_value,
            Some("%"),
            scoring::score_build_mix(cbs.pct_built_pre_2000, cbs.pct_built_post_2000),
            LCX_COMPOSITE,
        ),
        pct("housing_multifamily", "Multi-Family Homes", cbs.pct_multi_family),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::fixtures::{self, find};

    #[test]
    fn test_housing_scores() {
        let metrics = build(Some(&fixtures::neighborhood()));

        assert_eq!(metrics.len(), 8);
        assert_eq!(find(&metrics, "housing_owner").score, Some(50.0));
        assert_eq!(find(&metrics, "housing_private_rental").score, Some(100.0));

        // |70 - 30| * 1.2 = 48
        let mix = find(&metrics, "housing_build_mix");
        assert_eq!(mix.value, Some(30.0));
        assert_eq!(mix.score, Some(52.0));
        assert_eq!(find(&metrics, "housing_social").score, None);
    }

    #[test]
    fn test_build_mix_with_one_side_missing() {
        let mut stats = fixtures::neighborhood();
        stats.pct_built_post_2000 = None;

        let metrics = build(Some(&stats));
        let mix = find(&metrics, "housing_build_mix");
        assert_eq!(mix.value, Some(30.0));
        assert_eq!(mix.score, Some(70.0));
    }

    #[test]
    fn test_missing_snapshot() {
        assert!(build(None).is_empty());
    }
}
