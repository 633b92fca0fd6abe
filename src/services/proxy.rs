use crate::core::ranker::{SearchError, SearchFacade};
use crate::models::{FilterSpec, Origin, RankedResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Time source for TTL and rate-window arithmetic
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock used by the running service
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Outcome of a proxied search
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Found(RankedResult),
    NotFound,
    RateLimited { retry_after_secs: u64 },
}

struct CacheEntry {
    /// Full search result including "nothing matched"
    result: Option<RankedResult>,
    stored_at: Instant,
}

/// Access proxy in front of the search facade
///
/// Adds a time-windowed result cache keyed by rounded origin plus the
/// canonical filter set, and a per-identity rate limiter. Entries
/// expire lazily on read; there is no background sweep.
pub struct SearchProxy {
    inner: Arc<SearchFacade>,
    cache: Mutex<HashMap<String, CacheEntry>>,
    rate_windows: Mutex<HashMap<String, Instant>>,
    cache_ttl: Duration,
    rate_interval: Duration,
    clock: Arc<dyn Clock>,
}

impl SearchProxy {
    pub fn new(inner: Arc<SearchFacade>, cache_ttl: Duration, rate_interval: Duration) -> Self {
        Self::with_clock(inner, cache_ttl, rate_interval, Arc::new(SystemClock))
    }

    pub fn with_clock(
        inner: Arc<SearchFacade>,
        cache_ttl: Duration,
        rate_interval: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
            rate_windows: Mutex::new(HashMap::new()),
            cache_ttl,
            rate_interval,
            clock,
        }
    }

    /// Find the nearest lot, with caching and rate limiting
    ///
    /// Rate limiting applies only when an identity is supplied and is
    /// checked before the cache. The rate window is refreshed after the
    /// underlying call on every accepted request, cache hit or miss.
    pub fn find_nearest(
        &self,
        origin: Origin,
        filters: &FilterSpec,
        identity: Option<&str>,
    ) -> Result<SearchOutcome, SearchError> {
        if let Some(id) = identity {
            if self.is_rate_limited(id) {
                tracing::info!(identity = id, "Rate limit applied");
                return Ok(SearchOutcome::RateLimited {
                    retry_after_secs: self.rate_interval.as_secs(),
                });
            }
        }

        let key = cache_key(origin, filters);
        let outcome = match self.cached(&key) {
            Some(result) => {
                tracing::debug!(%key, "Serving search from cache");
                result
            }
            None => {
                tracing::debug!(%key, "Cache miss, delegating to facade");
                let result = self.inner.find_nearest(origin, filters)?;
                self.store(key, result.clone());
                result
            }
        };

        if let Some(id) = identity {
            self.touch(id);
        }

        Ok(match outcome {
            Some(result) => SearchOutcome::Found(result),
            None => SearchOutcome::NotFound,
        })
    }

    /// Clear the cache after an availability change
    ///
    /// The whole cache is dropped regardless of the lot id; any entry
    /// might reference the changed lot.
    pub fn invalidate(&self, lot_id: Option<&str>) {
        match lot_id {
            Some(id) => tracing::info!(lot_id = id, "Invalidating search cache"),
            None => tracing::info!("Invalidating entire search cache"),
        }
        recover(self.cache.lock()).clear();
    }

    fn is_rate_limited(&self, identity: &str) -> bool {
        let now = self.clock.now();
        let windows = recover(self.rate_windows.lock());
        match windows.get(identity) {
            // Clock anomaly (last ahead of now) degrades to not limited
            Some(last) => match now.checked_duration_since(*last) {
                Some(elapsed) => elapsed < self.rate_interval,
                None => false,
            },
            None => false,
        }
    }

    fn touch(&self, identity: &str) {
        recover(self.rate_windows.lock()).insert(identity.to_string(), self.clock.now());
    }

    fn cached(&self, key: &str) -> Option<Option<RankedResult>> {
        let now = self.clock.now();
        let cache = recover(self.cache.lock());
        let entry = cache.get(key)?;
        let age = now.checked_duration_since(entry.stored_at)?;
        if age < self.cache_ttl {
            Some(entry.result.clone())
        } else {
            None
        }
    }

    fn store(&self, key: String, result: Option<RankedResult>) {
        recover(self.cache.lock()).insert(
            key,
            CacheEntry {
                result,
                stored_at: self.clock.now(),
            },
        );
    }
}

/// Poisoned bookkeeping locks degrade to whatever state is inside
/// rather than failing the request path
fn recover<'a, T>(
    result: Result<MutexGuard<'a, T>, std::sync::PoisonError<MutexGuard<'a, T>>>,
) -> MutexGuard<'a, T> {
    result.unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Derive the cache key from the rounded origin and canonical filters
///
/// Origins are rounded to 4 decimal degrees (~11 m); requests differing
/// only beyond that precision collide on purpose. Filter fields render
/// in a fixed name order so that equal filter sets always share a key.
pub fn cache_key(origin: Origin, filters: &FilterSpec) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(d) = filters.max_distance_km {
        parts.push(format!("max_distance={}", d));
    }
    if let Some(p) = filters.max_price {
        parts.push(format!("max_price={}", p));
    }
    format!("{:.4}_{:.4}_{}", origin.lat, origin.lng, parts.join(";"))
}
