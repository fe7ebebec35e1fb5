//! Context report service
//!
//! Entry point for building a report: validate the request, resolve the
//! address, serve from cache when possible, otherwise fan out to the
//! sources, build and score the metrics, and cache the result.

use crate::builders::{build_report, with_request_warnings};
use crate::cache::{InMemoryReportCache, ReportCache, ReportCacheKey};
use crate::composite::CompositeScorer;
use crate::error::{ContextError, Result};
use crate::provider::{ContextDataProvider, ContextSources};
use crate::sources::{LocationResolver, PdokLocationResolver, SourceError};
use crate::types::{ContextReport, ReportRequest, ResolvedLocation};
use lcx_common::config::EnrichmentConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

pub const INPUT_REQUIRED: &str = "Input is required.";
pub const UNRESOLVED_INPUT: &str = "Could not resolve input to a supported address.";

/// Clamp a requested radius into `[min, max]`
///
/// Returns the effective radius and, when it changed, the warning to report.
pub fn clamp_radius(requested: i32, min: i32, max: i32) -> (i32, Option<String>) {
    let clamped = requested.max(min).min(max);
    if clamped == requested {
        (requested, None)
    } else {
        (
            clamped,
            Some(format!(
                "Radius clamped from {}m to {}m to respect system limits.",
                requested, clamped
            )),
        )
    }
}

/// Builds, scores and caches context reports
pub struct ContextReportService {
    resolver: Arc<dyn LocationResolver>,
    provider: ContextDataProvider,
    cache: Arc<dyn ReportCache>,
    scorer: CompositeScorer,
    min_radius_meters: i32,
    max_radius_meters: i32,
    cache_ttl: Duration,
}

impl ContextReportService {
    pub fn new(
        resolver: Arc<dyn LocationResolver>,
        provider: ContextDataProvider,
        cache: Arc<dyn ReportCache>,
        config: &EnrichmentConfig,
    ) -> Self {
        Self {
            resolver,
            provider,
            cache,
            scorer: CompositeScorer::new(&config.category_weights),
            min_radius_meters: config.min_radius_meters,
            max_radius_meters: config.max_radius_meters,
            cache_ttl: config.report_cache_ttl(),
        }
    }

    /// Service backed by the public HTTP APIs and an in-memory cache
    pub fn from_config(config: &EnrichmentConfig) -> Result<Self> {
        config.validate()?;

        let resolver = PdokLocationResolver::new(config).map_err(source_setup_error)?;
        let sources = ContextSources::from_config(config).map_err(source_setup_error)?;

        Ok(Self::new(
            Arc::new(resolver),
            ContextDataProvider::new(sources),
            Arc::new(InMemoryReportCache::new()),
            config,
        ))
    }

    /// Build the report for `request`, or return the cached one
    ///
    /// The cache holds the report without the radius clamp note. Requests
    /// that were not clamped share the stored `Arc`; a clamped request gets
    /// its own copy carrying the note.
    pub async fn build(&self, request: &ReportRequest, cancel: &CancellationToken) -> Result<Arc<ContextReport>> {
        let request_id = Uuid::new_v4();
        let span = info_span!("context_report", %request_id);
        self.run(request, cancel).instrument(span).await
    }

    async fn run(&self, request: &ReportRequest, cancel: &CancellationToken) -> Result<Arc<ContextReport>> {
        let input = request.input.trim();
        if input.is_empty() {
            return Err(ContextError::Validation(INPUT_REQUIRED.to_string()));
        }

        let (radius, clamp_warning) =
            clamp_radius(request.radius_meters, self.min_radius_meters, self.max_radius_meters);
        if let Some(warning) = &clamp_warning {
            warn!(requested = request.radius_meters, radius, "{}", warning);
        }

        let location = self.resolve(input, cancel).await?;
        let key = ReportCacheKey::from_coordinates(location.latitude, location.longitude, radius);

        let request_warnings: Vec<String> = clamp_warning.into_iter().collect();

        if let Some(report) = self.cache.get(&key).await {
            info!(key = %key, "Context report cache hit");
            return Ok(with_request_warnings(&report, request_warnings));
        }
        info!(key = %key, address = %location.display_address, "Context report cache miss");

        let data = self.provider.get_source_data(&location, radius, cancel).await?;
        let report = Arc::new(build_report(location, data, &self.scorer));

        self.cache.set(key, Arc::clone(&report), self.cache_ttl).await;
        info!(
            composite_score = report.composite_score,
            warnings = report.warnings.len() + request_warnings.len(),
            "Context report built"
        );

        Ok(with_request_warnings(&report, request_warnings))
    }

    async fn resolve(&self, input: &str, cancel: &CancellationToken) -> Result<ResolvedLocation> {
        let resolved = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ContextError::Cancelled),
            resolved = self.resolver.resolve(input) => resolved,
        };

        match resolved {
            Ok(Some(location)) => Ok(location),
            Ok(None) => Err(ContextError::Validation(UNRESOLVED_INPUT.to_string())),
            Err(SourceError::Cancelled) => Err(ContextError::Cancelled),
            Err(e) => {
                warn!(error = %e, "Location resolver failed");
                Err(ContextError::Validation(UNRESOLVED_INPUT.to_string()))
            }
        }
    }
}

fn source_setup_error(e: SourceError) -> ContextError {
    ContextError::Internal(format!("Failed to initialise source clients: {}", e))
}
