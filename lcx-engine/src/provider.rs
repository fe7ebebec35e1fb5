//! Context data provider
//!
//! Fans out to the four statistics sources concurrently and gathers their
//! snapshots. A failing source never fails the request: its error is logged
//! and becomes a warning. Cancellation is the one error that propagates, and
//! it aborts every call still in flight.

use crate::builders::{CBS_CRIME, CBS_STATLINE};
use crate::error::{ContextError, Result};
use crate::sources::{
    AirQualitySource, AmenitySource, CbsCrimeClient, CbsNeighborhoodClient, CrimeStatsSource,
    LuchtmeetnetAirQualityClient, NeighborhoodStatsSource, OverpassAmenityClient, SourceError,
};
use crate::types::{ContextSourceData, ResolvedLocation, SourceAttribution, SourceKind};
use chrono::{DateTime, Utc};
use lcx_common::config::EnrichmentConfig;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

const CBS_URL: &str = "https://opendata.cbs.nl";
const PUBLIC_LICENSE: &str = "Publiek";

/// The four source clients behind their traits
#[derive(Clone)]
pub struct ContextSources {
    pub neighborhood: Arc<dyn NeighborhoodStatsSource>,
    pub crime: Arc<dyn CrimeStatsSource>,
    pub amenities: Arc<dyn AmenitySource>,
    pub air_quality: Arc<dyn AirQualitySource>,
}

impl ContextSources {
    /// HTTP clients for the public APIs named in `config`
    pub fn from_config(config: &EnrichmentConfig) -> std::result::Result<Self, SourceError> {
        Ok(Self {
            neighborhood: Arc::new(CbsNeighborhoodClient::new(config)?),
            crime: Arc::new(CbsCrimeClient::new(config)?),
            amenities: Arc::new(OverpassAmenityClient::new(config)?),
            air_quality: Arc::new(LuchtmeetnetAirQualityClient::new(config)?),
        })
    }
}

/// Result of one isolated source call
enum Fetched<T> {
    Data(Option<T>),
    Failed,
}

/// Run one source call, turning any error except cancellation into [`Fetched::Failed`]
async fn isolate<T, F>(kind: SourceKind, call: F) -> Result<Fetched<T>>
where
    F: Future<Output = std::result::Result<Option<T>, SourceError>>,
{
    match call.await {
        Ok(snapshot) => {
            debug!(source = kind.name(), has_data = snapshot.is_some(), "Context source returned");
            Ok(Fetched::Data(snapshot))
        }
        Err(SourceError::Cancelled) => Err(ContextError::Cancelled),
        Err(e) => {
            error!(
                source = kind.name(),
                error = %e,
                "Context source failed; report will continue with partial data"
            );
            Ok(Fetched::Failed)
        }
    }
}

/// Accumulates snapshots, warnings and attributions in fan-out order
struct Collector {
    sources: Vec<SourceAttribution>,
    warnings: Vec<String>,
    failed_sources: Vec<SourceKind>,
}

impl Collector {
    fn new() -> Self {
        Self {
            sources: vec![SourceAttribution::new(
                "PDOK Locatieserver",
                "https://api.pdok.nl",
                PUBLIC_LICENSE,
                Utc::now(),
            )],
            warnings: Vec::new(),
            failed_sources: Vec::new(),
        }
    }

    fn take<T>(
        &mut self,
        kind: SourceKind,
        fetched: Fetched<T>,
        attribution: impl FnOnce(&T) -> SourceAttribution,
    ) -> Option<T> {
        match fetched {
            Fetched::Data(Some(snapshot)) => {
                self.sources.push(attribution(&snapshot));
                Some(snapshot)
            }
            Fetched::Data(None) => None,
            Fetched::Failed => {
                self.warnings.push(kind.unavailable_warning());
                self.failed_sources.push(kind);
                None
            }
        }
    }
}

fn attribution(source: &str, url: &str, license: &str, retrieved_at: DateTime<Utc>) -> SourceAttribution {
    SourceAttribution::new(source, url, license, retrieved_at)
}

/// Fan-out orchestrator over the four sources
pub struct ContextDataProvider {
    sources: ContextSources,
}

impl ContextDataProvider {
    pub fn new(sources: ContextSources) -> Self {
        Self { sources }
    }

    /// Fetch all four snapshots for `location`
    ///
    /// Partial or total source failure still yields `Ok`; only cancellation
    /// returns an error.
    pub async fn get_source_data(
        &self,
        location: &ResolvedLocation,
        radius_meters: i32,
        cancel: &CancellationToken,
    ) -> Result<ContextSourceData> {
        // A source reporting cancellation short-circuits and drops its siblings
        let fan_out = async {
            tokio::try_join!(
                isolate(SourceKind::Neighborhood, self.sources.neighborhood.fetch(location)),
                isolate(SourceKind::Crime, self.sources.crime.fetch(location)),
                isolate(SourceKind::Amenities, self.sources.amenities.fetch(location, radius_meters)),
                isolate(SourceKind::AirQuality, self.sources.air_quality.fetch(location)),
            )
        };

        // Dropping the fan-out future aborts the calls still in flight
        let (neighborhood, crime, amenities, air_quality) = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Context fan-out cancelled");
                return Err(ContextError::Cancelled);
            }
            results = fan_out => results?,
        };

        let mut collector = Collector::new();
        let neighborhood_stats = collector.take(SourceKind::Neighborhood, neighborhood, |s| {
            attribution(CBS_STATLINE, CBS_URL, PUBLIC_LICENSE, s.retrieved_at)
        });
        let crime_stats = collector.take(SourceKind::Crime, crime, |s| {
            attribution(CBS_CRIME, CBS_URL, PUBLIC_LICENSE, s.retrieved_at)
        });
        let amenity_stats = collector.take(SourceKind::Amenities, amenities, |s| {
            attribution("OpenStreetMap Overpass", "https://overpass-api.de", "ODbL", s.retrieved_at)
        });
        let air_quality = collector.take(SourceKind::AirQuality, air_quality, |s| {
            attribution("Luchtmeetnet", "https://api.luchtmeetnet.nl", PUBLIC_LICENSE, s.retrieved_at)
        });

        info!(
            sources = collector.sources.len() - 1,
            failed = collector.failed_sources.len(),
            "Context source fan-out complete"
        );

        Ok(ContextSourceData {
            neighborhood_stats,
            crime_stats,
            amenity_stats,
            air_quality,
            sources: collector.sources,
            warnings: collector.warnings,
            failed_sources: collector.failed_sources,
        })
    }
}
