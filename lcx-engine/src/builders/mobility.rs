//! Car ownership indicators (informational, unscored)

use super::CBS_STATLINE;
use crate::types::{ContextMetric, NeighborhoodStats};

pub fn build(stats: Option<&NeighborhoodStats>) -> Vec<ContextMetric> {
    let Some(cbs) = stats else {
        return Vec::new();
    };

    vec![
        ContextMetric::new(
            "mobility_cars_household",
            "Cars per Household",
            cbs.cars_per_household,
            Some("cars/hh"),
            None,
            CBS_STATLINE,
        ),
        ContextMetric::new(
            "mobility_car_density",
            "Car Density",
            cbs.car_density,
            Some("cars/km²"),
            None,
            CBS_STATLINE,
        ),
        ContextMetric::new(
            "mobility_total_cars",
            "Total Cars",
            cbs.total_cars.map(|c| c as f64),
            Some("cars"),
            None,
            CBS_STATLINE,
        ),
    ]
}
