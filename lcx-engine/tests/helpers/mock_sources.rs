//! In-memory sources and resolver for service and provider tests

use super::fixtures;
use lcx_common::config::EnrichmentConfig;
use lcx_engine::cache::InMemoryReportCache;
use lcx_engine::provider::{ContextDataProvider, ContextSources};
use lcx_engine::sources::{
    AirQualitySource, AmenitySource, CrimeStatsSource, LocationResolver, NeighborhoodStatsSource, SourceError,
};
use lcx_engine::types::{AirQualitySnapshot, AmenityStats, CrimeStats, NeighborhoodStats, ResolvedLocation};
use lcx_engine::ContextReportService;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Barrier;

/// How a mock responds when called
#[derive(Clone)]
pub enum Behavior {
    /// Return the configured snapshot
    Data,
    /// Return `Ok(None)`
    Empty,
    /// Return an API error
    Fail,
    /// Return `SourceError::Cancelled`
    Cancelled,
    /// Never complete
    Hang,
    /// Wait on the barrier, then return the snapshot
    Barrier(Arc<Barrier>),
}

/// Source returning a fixed snapshot according to its [`Behavior`]
pub struct MockSource<T> {
    data: T,
    behavior: Behavior,
    calls: AtomicUsize,
    last_radius: AtomicI32,
}

impl<T: Clone + Send + Sync> MockSource<T> {
    pub fn new(data: T, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            data,
            behavior,
            calls: AtomicUsize::new(0),
            last_radius: AtomicI32::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_radius(&self) -> i32 {
        self.last_radius.load(Ordering::SeqCst)
    }

    async fn respond(&self) -> Result<Option<T>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Data => Ok(Some(self.data.clone())),
            Behavior::Empty => Ok(None),
            Behavior::Fail => Err(SourceError::Api(503, "Service Unavailable".to_string())),
            Behavior::Cancelled => Err(SourceError::Cancelled),
            Behavior::Hang => std::future::pending().await,
            Behavior::Barrier(barrier) => {
                barrier.wait().await;
                Ok(Some(self.data.clone()))
            }
        }
    }
}

#[async_trait::async_trait]
impl NeighborhoodStatsSource for MockSource<NeighborhoodStats> {
    async fn fetch(&self, _location: &ResolvedLocation) -> Result<Option<NeighborhoodStats>, SourceError> {
        self.respond().await
    }
}

#[async_trait::async_trait]
impl CrimeStatsSource for MockSource<CrimeStats> {
    async fn fetch(&self, _location: &ResolvedLocation) -> Result<Option<CrimeStats>, SourceError> {
        self.respond().await
    }
}

#[async_trait::async_trait]
impl AmenitySource for MockSource<AmenityStats> {
    async fn fetch(&self, _location: &ResolvedLocation, radius_meters: i32) -> Result<Option<AmenityStats>, SourceError> {
        self.last_radius.store(radius_meters, Ordering::SeqCst);
        self.respond().await
    }
}

#[async_trait::async_trait]
impl AirQualitySource for MockSource<AirQualitySnapshot> {
    async fn fetch(&self, _location: &ResolvedLocation) -> Result<Option<AirQualitySnapshot>, SourceError> {
        self.respond().await
    }
}

/// Resolver answering from a queue of locations; the last one repeats
pub struct MockResolver {
    locations: Mutex<VecDeque<ResolvedLocation>>,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl MockResolver {
    pub fn new(locations: Vec<ResolvedLocation>, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            locations: Mutex::new(locations.into()),
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_location(&self) -> Option<ResolvedLocation> {
        let mut locations = self.locations.lock().unwrap();
        if locations.len() > 1 {
            locations.pop_front()
        } else {
            locations.front().cloned()
        }
    }
}

#[async_trait::async_trait]
impl LocationResolver for MockResolver {
    async fn resolve(&self, _input: &str) -> Result<Option<ResolvedLocation>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Data => Ok(self.next_location()),
            Behavior::Empty => Ok(None),
            Behavior::Fail => Err(SourceError::Network("connection refused".to_string())),
            Behavior::Cancelled => Err(SourceError::Cancelled),
            Behavior::Hang => std::future::pending().await,
            Behavior::Barrier(barrier) => {
                barrier.wait().await;
                Ok(self.next_location())
            }
        }
    }
}

/// Resolver parsing `"<latitude>,<longitude>"` inputs, for requests that
/// run concurrently and must not depend on call order
#[derive(Default)]
pub struct CoordinateResolver {
    calls: AtomicUsize,
}

impl CoordinateResolver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LocationResolver for CoordinateResolver {
    async fn resolve(&self, input: &str) -> Result<Option<ResolvedLocation>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let Some((lat, lon)) = input.split_once(',') else {
            return Ok(None);
        };
        match (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
            (Ok(lat), Ok(lon)) => Ok(Some(fixtures::location_at(lat, lon))),
            _ => Ok(None),
        }
    }
}

/// Mocks for every seam, with builders to swap single behaviors
pub struct Harness {
    pub resolver: Arc<MockResolver>,
    pub neighborhood: Arc<MockSource<NeighborhoodStats>>,
    pub crime: Arc<MockSource<CrimeStats>>,
    pub amenities: Arc<MockSource<AmenityStats>>,
    pub air_quality: Arc<MockSource<AirQualitySnapshot>>,
    pub config: EnrichmentConfig,
}

impl Harness {
    /// Every mock returns representative data for Damrak 1
    pub fn new() -> Self {
        Self {
            resolver: MockResolver::new(vec![fixtures::damrak_location()], Behavior::Data),
            neighborhood: MockSource::new(fixtures::neighborhood_stats(), Behavior::Data),
            crime: MockSource::new(fixtures::crime_stats(), Behavior::Data),
            amenities: MockSource::new(fixtures::amenity_stats(), Behavior::Data),
            air_quality: MockSource::new(fixtures::air_quality(), Behavior::Data),
            config: EnrichmentConfig::default(),
        }
    }

    pub fn with_resolver(mut self, locations: Vec<ResolvedLocation>, behavior: Behavior) -> Self {
        self.resolver = MockResolver::new(locations, behavior);
        self
    }

    pub fn with_neighborhood(mut self, behavior: Behavior) -> Self {
        self.neighborhood = MockSource::new(fixtures::neighborhood_stats(), behavior);
        self
    }

    pub fn with_crime(mut self, behavior: Behavior) -> Self {
        self.crime = MockSource::new(fixtures::crime_stats(), behavior);
        self
    }

    pub fn with_amenities(mut self, behavior: Behavior) -> Self {
        self.amenities = MockSource::new(fixtures::amenity_stats(), behavior);
        self
    }

    pub fn with_air_quality(mut self, behavior: Behavior) -> Self {
        self.air_quality = MockSource::new(fixtures::air_quality(), behavior);
        self
    }

    pub fn sources(&self) -> ContextSources {
        ContextSources {
            neighborhood: self.neighborhood.clone(),
            crime: self.crime.clone(),
            amenities: self.amenities.clone(),
            air_quality: self.air_quality.clone(),
        }
    }

    pub fn provider(&self) -> ContextDataProvider {
        ContextDataProvider::new(self.sources())
    }

    pub fn service(&self) -> ContextReportService {
        ContextReportService::new(
            self.resolver.clone(),
            self.provider(),
            Arc::new(InMemoryReportCache::new()),
            &self.config,
        )
    }

    /// Service over the harness sources with a caller-held resolver and cache
    pub fn service_with(
        &self,
        resolver: Arc<dyn LocationResolver>,
        cache: Arc<InMemoryReportCache>,
    ) -> ContextReportService {
        ContextReportService::new(resolver, self.provider(), cache, &self.config)
    }

    /// Total calls across the four sources
    pub fn source_calls(&self) -> usize {
        self.neighborhood.calls() + self.crime.calls() + self.amenities.calls() + self.air_quality.calls()
    }
}
