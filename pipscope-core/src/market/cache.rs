//! In-memory response cache with an explicit TTL.
//!
//! Entries are keyed by `{pair}_{timeframe}`. Failed fetches are never cached.
//! Time comes from an injected `Clock`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::{DataError, MarketDataSource, Timeframe};
use crate::domain::Bar;

/// Default time-to-live in seconds.
pub const DEFAULT_TTL_SECS: i64 = 300;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    bars: Vec<Bar>,
    fetched_at: DateTime<Utc>,
}

pub struct CachedSource<S, C = SystemClock> {
    inner: S,
    clock: C,
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl<S: MarketDataSource> CachedSource<S, SystemClock> {
    pub fn new(inner: S) -> Self {
        Self::with_clock(inner, SystemClock)
    }
}

impl<S: MarketDataSource, C: Clock> CachedSource<S, C> {
    pub fn with_clock(inner: S, clock: C) -> Self {
        Self {
            inner,
            clock,
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn cache_key(pair: &str, timeframe: Timeframe) -> String {
        format!("{pair}_{timeframe}")
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Number of cached entries, fresh or stale.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave a half-written entry.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: MarketDataSource, C: Clock> MarketDataSource for CachedSource<S, C> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch_bars(&self, pair: &str, timeframe: Timeframe) -> Result<Vec<Bar>, DataError> {
        let key = Self::cache_key(pair, timeframe);
        let now = self.clock.now();

        if let Some(entry) = self.entries().get(&key) {
            if now - entry.fetched_at < self.ttl {
                debug!(%key, "cache hit");
                return Ok(entry.bars.clone());
            }
            debug!(%key, "cache entry expired");
        }

        let bars = self.inner.fetch_bars(pair, timeframe)?;
        self.entries().insert(
            key,
            CacheEntry {
                bars: bars.clone(),
                fetched_at: now,
            },
        );
        Ok(bars)
    }
}
