//! Metric builders
//!
//! Pure functions turning raw snapshots into ordered [`ContextMetric`] lists,
//! one module per report category. [`build_report`] runs them all and hands
//! the result to the [`CompositeScorer`].

pub mod amenities;
pub mod demographics;
pub mod environment;
pub mod housing;
pub mod mobility;
pub mod safety;
pub mod social;

use crate::composite::{CategoryMetrics, CompositeScorer};
use crate::types::{ContextReport, ContextSourceData, ResolvedLocation, SourceKind};
use std::sync::Arc;

/// Source label for CBS neighborhood indicators
pub const CBS_STATLINE: &str = "CBS StatLine 85618NED";
/// Source label for CBS crime statistics
pub const CBS_CRIME: &str = "CBS StatLine 83765NED";
pub const OPENSTREETMAP: &str = "OpenStreetMap / Overpass";
pub const LUCHTMEETNET: &str = "Luchtmeetnet Open API";
/// Source label for scores derived from several raw fields
pub const LCX_COMPOSITE: &str = "LCX Composite";

/// Ordered warning sink shared by the builders of one report
///
/// A source whose call failed was already reported by the provider, so its
/// builder's "unavailable" note is suppressed to keep one warning per source.
#[derive(Debug, Default)]
pub struct ReportWarnings {
    messages: Vec<String>,
    failed_sources: Vec<SourceKind>,
}

impl ReportWarnings {
    pub fn new(initial: Vec<String>, failed_sources: Vec<SourceKind>) -> Self {
        Self {
            messages: initial,
            failed_sources,
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Record that a primary source produced no snapshot
    pub fn source_missing(&mut self, source: SourceKind, message: &str) {
        if !self.failed_sources.contains(&source) {
            self.messages.push(message.to_string());
        }
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

/// Build and score a report from fan-out results
///
/// The result only depends on the location and source data, so it can be
/// cached and shared between requests. Provider warnings come before
/// builder warnings.
pub fn build_report(location: ResolvedLocation, data: ContextSourceData, scorer: &CompositeScorer) -> ContextReport {
    let ContextSourceData {
        neighborhood_stats,
        crime_stats,
        amenity_stats,
        air_quality,
        sources,
        warnings,
        failed_sources,
    } = data;

    let mut warnings = ReportWarnings::new(warnings, failed_sources);

    let cbs = neighborhood_stats.as_ref();
    let metrics = CategoryMetrics {
        social: social::build(cbs, &mut warnings),
        safety: safety::build(crime_stats.as_ref(), &mut warnings),
        demographics: demographics::build(cbs),
        housing: housing::build(cbs),
        mobility: mobility::build(cbs),
        amenities: amenities::build(amenity_stats.as_ref(), cbs, &mut warnings),
        environment: environment::build(air_quality.as_ref(), &mut warnings),
    };

    let category_scores = scorer.category_scores(&metrics);
    let composite_score = scorer.composite_score(&category_scores);

    ContextReport {
        location,
        social_metrics: metrics.social,
        safety_metrics: metrics.safety,
        demographics_metrics: metrics.demographics,
        housing_metrics: metrics.housing,
        mobility_metrics: metrics.mobility,
        amenity_metrics: metrics.amenities,
        environment_metrics: metrics.environment,
        composite_score,
        category_scores,
        sources,
        warnings: warnings.into_messages(),
    }
}

/// Attach warnings that belong to one request, such as a radius clamp note
///
/// They go after the provider warnings and before the builder warnings.
/// With nothing to attach the shared report is returned as is; otherwise
/// the copy is modified and `report` stays untouched.
pub fn with_request_warnings(report: &Arc<ContextReport>, request_warnings: Vec<String>) -> Arc<ContextReport> {
    if request_warnings.is_empty() {
        return Arc::clone(report);
    }

    let provider_warnings: Vec<String> = SourceKind::ALL.iter().map(|k| k.unavailable_warning()).collect();
    let at = report
        .warnings
        .iter()
        .take_while(|w| provider_warnings.contains(w))
        .count();

    let mut report = ContextReport::clone(report);
    let builder_warnings = report.warnings.split_off(at);
    report.warnings.extend(request_warnings);
    report.warnings.extend(builder_warnings);
    Arc::new(report)
}
