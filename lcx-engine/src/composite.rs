//! Category and composite scoring
//!
//! A category score is the mean of its scored metrics. The composite is the
//! weighted mean of the category scores that exist. Weights come from
//! `[enrichment.category_weights]` and default to 1.0, which reduces to the
//! plain mean.

use crate::scoring::round1;
use crate::types::ContextMetric;
use std::collections::BTreeMap;
use tracing::warn;

/// Report category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Social,
    Safety,
    Demographics,
    Housing,
    Mobility,
    Amenities,
    Environment,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Social,
        Category::Safety,
        Category::Demographics,
        Category::Housing,
        Category::Mobility,
        Category::Amenities,
        Category::Environment,
    ];

    /// Key used in `category_scores`
    pub fn name(self) -> &'static str {
        match self {
            Category::Social => "Social",
            Category::Safety => "Safety",
            Category::Demographics => "Demographics",
            Category::Housing => "Housing",
            Category::Mobility => "Mobility",
            Category::Amenities => "Amenities",
            Category::Environment => "Environment",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Metric lists of one report, grouped by category
#[derive(Debug, Clone, Default)]
pub struct CategoryMetrics {
    pub social: Vec<ContextMetric>,
    pub safety: Vec<ContextMetric>,
    pub demographics: Vec<ContextMetric>,
    pub housing: Vec<ContextMetric>,
    pub mobility: Vec<ContextMetric>,
    pub amenities: Vec<ContextMetric>,
    pub environment: Vec<ContextMetric>,
}

impl CategoryMetrics {
    pub fn get(&self, category: Category) -> &[ContextMetric] {
        match category {
            Category::Social => &self.social,
            Category::Safety => &self.safety,
            Category::Demographics => &self.demographics,
            Category::Housing => &self.housing,
            Category::Mobility => &self.mobility,
            Category::Amenities => &self.amenities,
            Category::Environment => &self.environment,
        }
    }
}

/// Mean of the non-null scores, one decimal; `None` when nothing is scored
pub fn category_score(metrics: &[ContextMetric]) -> Option<f64> {
    let scores: Vec<f64> = metrics.iter().filter_map(|m| m.score).collect();
    if scores.is_empty() {
        return None;
    }
    Some(round1(scores.iter().sum::<f64>() / scores.len() as f64))
}

/// Weighted composite scorer; the default weighs every category equally
#[derive(Debug, Clone, Default)]
pub struct CompositeScorer {
    weights: BTreeMap<Category, f64>,
}

impl CompositeScorer {
    /// Build from configured weights keyed by category name
    ///
    /// Unknown names and non-positive weights are skipped with a warning;
    /// those categories keep weight 1.0.
    pub fn new(configured: &BTreeMap<String, f64>) -> Self {
        let mut weights = BTreeMap::new();
        for (name, &weight) in configured {
            let Some(category) = Category::from_name(name) else {
                warn!(category = %name, "Ignoring weight for unknown category");
                continue;
            };
            if !weight.is_finite() || weight <= 0.0 {
                warn!(category = %name, weight, "Ignoring non-positive category weight");
                continue;
            }
            weights.insert(category, weight);
        }
        Self { weights }
    }

    pub fn weight(&self, category: Category) -> f64 {
        self.weights.get(&category).copied().unwrap_or(1.0)
    }

    /// Scores per category name; categories without scored metrics are omitted
    pub fn category_scores(&self, metrics: &CategoryMetrics) -> BTreeMap<String, f64> {
        Category::ALL
            .into_iter()
            .filter_map(|c| category_score(metrics.get(c)).map(|s| (c.name().to_string(), s)))
            .collect()
    }

    /// Weighted mean of the present category scores, one decimal; 0 when empty
    pub fn composite_score(&self, category_scores: &BTreeMap<String, f64>) -> f64 {
        let (weighted, total_weight) = category_scores
            .iter()
            .filter_map(|(name, &score)| Category::from_name(name).map(|c| (self.weight(c), score)))
            .fold((0.0, 0.0), |(sum, weights), (w, s)| (sum + w * s, weights + w));

        if total_weight <= 0.0 {
            return 0.0;
        }
        round1(weighted / total_weight)
    }
}
