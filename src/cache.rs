//! TTL caches for provider responses.

use mini_moka::sync::Cache;
use std::time::Duration;

/// How long a cached search page stays fresh. Short, because upstream
/// catalogs churn and stale counts confuse pagination.
pub const SEARCH_TTL: Duration = Duration::from_secs(60);

/// Filter-option lists change rarely; cache them far longer than searches.
pub const FILTER_TTL: Duration = Duration::from_secs(5 * 60);

/// Resolved preview images are immutable in practice.
pub const IMAGE_TTL: Duration = Duration::from_secs(10 * 60);

const DEFAULT_CAPACITY: u64 = 200;

/// TTL response cache shared across all sessions hitting one provider.
///
/// Entries are served until expiry and evicted once the cache grows past its
/// capacity. Keys must encode every request input that can change the
/// response, including entitlement bits such as "caller has an API key", so
/// gated content never leaks between sessions.
#[derive(Clone)]
pub struct ProviderCache<T: Clone + Send + Sync + 'static> {
    inner: Cache<String, T>,
}

impl<T: Clone + Send + Sync + 'static> ProviderCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(ttl: Duration, capacity: u64) -> Self {
        Self {
            inner: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(capacity)
                .build(),
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.inner.get(&key.to_string())
    }

    pub fn insert(&self, key: impl Into<String>, value: T) {
        self.inner.insert(key.into(), value);
    }
}
