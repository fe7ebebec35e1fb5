//! Demographic composition and family friendliness
//!
//! Shares the CBS neighborhood snapshot with the social builder, which
//! already reports a missing snapshot.

use super::{CBS_STATLINE, LCX_COMPOSITE};
use crate::scoring::{self, percentage};
use crate::types::{ContextMetric, NeighborhoodStats};

pub fn build(stats: Option<&NeighborhoodStats>) -> Vec<ContextMetric> {
    let Some(cbs) = stats else {
        return Vec::new();
    };

    let of_residents = |count: Option<i64>| percentage(count, cbs.residents);
    let of_households = |count: Option<i64>| percentage(count, cbs.total_households);

    let family_households = match (cbs.households_with_children, cbs.households_without_children) {
        (None, None) => None,
        (with, without) => Some(with.unwrap_or(0) + without.unwrap_or(0)),
    };
    let family_score = scoring::score_family_friendly(
        of_households(family_households),
        of_residents(cbs.age_0_15),
        cbs.avg_household_size,
    );

    let pct = |key: &str, label: &str, value: Option<f64>| {
        ContextMetric::new(key, label, value, Some("%"), None, CBS_STATLINE)
    };

    vec![
        pct("gender_men", "Men", of_residents(cbs.men)),
        pct("gender_women", "Women", of_residents(cbs.women)),
        pct("age_0_14", "Age 0-14", of_residents(cbs.age_0_15)),
        pct("age_15_24", "Age 15-24", of_residents(cbs.age_15_25)),
        pct("age_25_44", "Age 25-44", of_residents(cbs.age_25_45)),
        pct("age_45_64", "Age 45-64", of_residents(cbs.age_45_65)),
        pct("age_65_plus", "Age 65+", of_residents(cbs.age_65_plus)),
        pct("single_households", "Single Households", of_households(cbs.single_households)),
        pct(
            "households_without_children",
            "Households without Children",
            of_households(cbs.households_without_children),
        ),
        pct(
            "households_with_children",
            "Households with Children",
            of_households(cbs.households_with_children),
        ),
        ContextMetric::new(
            "avg_household_size",
            "Avg Household Size",
            cbs.avg_household_size,
            Some("people"),
            None,
            CBS_STATLINE,
        ),
        ContextMetric::new(
            "family_friendly",
            "Family-Friendly Score",
            family_score,
            Some("score"),
            family_score,
            LCX_COMPOSITE,
        ),
    ]
}
