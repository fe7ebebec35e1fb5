//! Report cache
//!
//! Reports are cached per resolved coordinate pair and radius. The default
//! store is an in-process map split into shards so lookups for unrelated keys
//! never wait on each other.

use crate::types::ContextReport;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

const KEY_VERSION: &str = "v3";
const DEFAULT_SHARD_COUNT: usize = 16;

/// Cache key for one location and radius
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReportCacheKey(String);

impl ReportCacheKey {
    /// Coordinates are fixed to five decimals (about one meter)
    pub fn from_coordinates(latitude: f64, longitude: f64, radius_meters: i32) -> Self {
        Self(format!(
            "context-report:{}:{:.5}_{:.5}:{}",
            KEY_VERSION,
            normalize_zero(latitude),
            normalize_zero(longitude),
            radius_meters
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Values that round to zero at five decimals print as `0.00000`, never `-0.00000`
fn normalize_zero(value: f64) -> f64 {
    if (value * 100_000.0).round() == 0.0 {
        0.0
    } else {
        value
    }
}

/// Shared report store
#[async_trait::async_trait]
pub trait ReportCache: Send + Sync {
    /// Cached report, `None` when absent or expired
    async fn get(&self, key: &ReportCacheKey) -> Option<Arc<ContextReport>>;

    async fn set(&self, key: ReportCacheKey, report: Arc<ContextReport>, ttl: Duration);
}

struct CacheEntry {
    report: Arc<ContextReport>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Sharded in-memory cache with lazy expiry
///
/// There is no size bound; call [`InMemoryReportCache::purge_expired`]
/// periodically in long-running processes.
pub struct InMemoryReportCache {
    shards: Vec<RwLock<HashMap<ReportCacheKey, CacheEntry>>>,
}

impl InMemoryReportCache {
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARD_COUNT)
    }

    pub fn with_shards(shard_count: usize) -> Self {
        let shards = (0..shard_count.max(1))
            .map(|_| RwLock::new(HashMap::new()))
            .collect();
        Self { shards }
    }

    fn shard(&self, key: &ReportCacheKey) -> &RwLock<HashMap<ReportCacheKey, CacheEntry>> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() % self.shards.len() as u64) as usize;
        &self.shards[index]
    }

    /// Remove every expired entry; returns how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        for shard in &self.shards {
            let mut entries = shard.write().await;
            let before = entries.len();
            entries.retain(|_, entry| !entry.is_expired(now));
            removed += before - entries.len();
        }
        if removed > 0 {
            debug!(removed, "Purged expired context reports");
        }
        removed
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        let mut total = 0;
        for shard in &self.shards {
            total += shard.read().await.len();
        }
        total
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryReportCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ReportCache for InMemoryReportCache {
    async fn get(&self, key: &ReportCacheKey) -> Option<Arc<ContextReport>> {
        let shard = self.shard(key);
        let now = Instant::now();

        {
            let entries = shard.read().await;
            match entries.get(key) {
                None => return None,
                Some(entry) if !entry.is_expired(now) => return Some(Arc::clone(&entry.report)),
                Some(_) => {}
            }
        }

        // Expired: drop it unless a writer refreshed it in between
        let mut entries = shard.write().await;
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
        }
        None
    }

    async fn set(&self, key: ReportCacheKey, report: Arc<ContextReport>, ttl: Duration) {
        let entry = CacheEntry {
            report,
            expires_at: Instant::now() + ttl,
        };
        self.shard(&key).write().await.insert(key, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::fixtures;
    use std::collections::BTreeMap;

    fn report() -> Arc<ContextReport> {
        Arc::new(ContextReport {
            location: fixtures::location(),
            social_metrics: Vec::new(),
            safety_metrics: Vec::new(),
            demographics_metrics: Vec::new(),
            housing_metrics: Vec::new(),
            mobility_metrics: Vec::new(),
            amenity_metrics: Vec::new(),
            environment_metrics: Vec::new(),
            composite_score: 0.0,
            category_scores: BTreeMap::new(),
            sources: Vec::new(),
            warnings: Vec::new(),
        })
    }

    #[test]
    fn test_key_format() {
        let key = ReportCacheKey::from_coordinates(52.3774, 4.8971, 1000);
        assert_eq!(key.to_string(), "context-report:v3:52.37740_4.89710:1000");
    }

    #[test]
    fn test_key_negative_zero() {
        let key = ReportCacheKey::from_coordinates(-0.0, -0.000001, 200);
        assert_eq!(key.as_str(), "context-report:v3:0.00000_0.00000:200");

        let key = ReportCacheKey::from_coordinates(-33.5, 151.25, 200);
        assert_eq!(key.as_str(), "context-report:v3:-33.50000_151.25000:200");
    }

    #[test]
    fn test_nearby_coordinates_share_key() {
        let a = ReportCacheKey::from_coordinates(52.377401, 4.897101, 1000);
        let b = ReportCacheKey::from_coordinates(52.377404, 4.897099, 1000);
        assert_eq!(a, b);
        assert_ne!(a, ReportCacheKey::from_coordinates(52.377401, 4.897101, 1500));
    }

    #[tokio::test]
    async fn test_get_returns_same_arc() {
        let cache = InMemoryReportCache::new();
        let key = ReportCacheKey::from_coordinates(52.0, 4.0, 1000);
        let stored = report();

        cache.set(key.clone(), Arc::clone(&stored), Duration::from_secs(60)).await;
        let cached = cache.get(&key).await.unwrap();
        assert!(Arc::ptr_eq(&stored, &cached));
        assert!(cache.get(&ReportCacheKey::from_coordinates(51.0, 4.0, 1000)).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = InMemoryReportCache::with_shards(4);
        let key = ReportCacheKey::from_coordinates(52.0, 4.0, 1000);

        cache.set(key.clone(), report(), Duration::ZERO).await;
        assert!(cache.get(&key).await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let cache = InMemoryReportCache::new();
        for i in 0..5 {
            let key = ReportCacheKey::from_coordinates(52.0 + f64::from(i), 4.0, 1000);
            cache.set(key, report(), Duration::ZERO).await;
        }
        let fresh = ReportCacheKey::from_coordinates(10.0, 10.0, 1000);
        cache.set(fresh.clone(), report(), Duration::from_secs(60)).await;

        assert_eq!(cache.purge_expired().await, 5);
        assert_eq!(cache.len().await, 1);
        assert!(cache.get(&fresh).await.is_some());
    }
}
