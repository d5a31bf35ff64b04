//! Cache backends
//!
//! [`InMemoryCacheBackend`] keeps entries in a lock-guarded map with TTL
//! expiry and oldest-first eviction. [`NoopCacheBackend`] stores nothing.

use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use crate::cache::{CacheBackend, CachedReport, ReportKey};
use crate::error::{AnalyticsError, Result};

/// Backend that never stores anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCacheBackend;

impl CacheBackend for NoopCacheBackend {
    fn get(&self, _key: &ReportKey) -> Result<Option<CachedReport>> {
        Ok(None)
    }

    fn put(&self, _key: ReportKey, _report: CachedReport) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _key: &ReportKey) -> Result<bool> {
        Ok(false)
    }

    fn remove_where(&self, _predicate: &dyn Fn(&ReportKey) -> bool) -> Result<Option<usize>> {
        Ok(Some(0))
    }

    fn clear(&self) -> Result<usize> {
        Ok(0)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    report: CachedReport,
    inserted_at: Instant,
}

/// Process-local cache with TTL and a maximum entry count
#[derive(Debug)]
pub struct InMemoryCacheBackend {
    ttl: Duration,
    max_entries: usize,
    entries: RwLock<FxHashMap<ReportKey, CacheEntry>>,
}

fn poisoned<T>(_: PoisonError<T>) -> AnalyticsError {
    AnalyticsError::CacheUnavailable("cache lock poisoned".to_string())
}

impl InMemoryCacheBackend {
    /// Create a backend
    ///
    /// A `max_entries` of zero stores nothing.
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            ttl,
            max_entries,
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    /// Number of stored entries, including expired ones not yet purged
    ///
    /// # Errors
    /// Returns `CacheUnavailable` if the lock is poisoned.
    pub fn len(&self) -> Result<usize> {
        Ok(self.entries.read().map_err(poisoned)?.len())
    }

    /// Whether the backend holds no entries
    ///
    /// # Errors
    /// Returns `CacheUnavailable` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn is_live(&self, entry: &CacheEntry) -> bool {
        entry.inserted_at.elapsed() <= self.ttl
    }
}

impl CacheBackend for InMemoryCacheBackend {
    fn get(&self, key: &ReportKey) -> Result<Option<CachedReport>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries
            .get(key)
            .filter(|entry| self.is_live(entry))
            .map(|entry| entry.report.clone()))
    }

    fn put(&self, key: ReportKey, report: CachedReport) -> Result<()> {
        if self.max_entries == 0 {
            return Ok(());
        }

        let mut entries = self.entries.write().map_err(poisoned)?;
        entries.retain(|_, entry| self.is_live(entry));

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| *k)
            {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                report,
                inserted_at: Instant::now(),
            },
        );
        Ok(())
    }

    fn remove(&self, key: &ReportKey) -> Result<bool> {
        Ok(self.entries.write().map_err(poisoned)?.remove(key).is_some())
    }

    fn remove_where(&self, predicate: &dyn Fn(&ReportKey) -> bool) -> Result<Option<usize>> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        let before = entries.len();
        entries.retain(|key, _| !predicate(key));
        Ok(Some(before - entries.len()))
    }

    fn clear(&self) -> Result<usize> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        let removed = entries.len();
        entries.clear();
        Ok(removed)
    }
}
