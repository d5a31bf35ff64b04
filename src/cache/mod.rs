//! Report cache
//!
//! Memoizes computed reports under a typed [`ReportKey`]. The cache is an
//! optimization only: with the [`NoopCacheBackend`] every request is computed
//! and the results are identical. Backend failures are logged and absorbed so
//! a broken cache never fails a request.

pub mod memory;

use std::fmt;

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::algorithm::aggregation::SummaryReport;
use crate::algorithm::trend::{TrendFamily, TrendSeries};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::models::types::{PurokId, Role};
use crate::scope::Scope;

pub use memory::{InMemoryCacheBackend, NoopCacheBackend};

/// Which report a cache entry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportKind {
    /// Dashboard summary
    Summary,
    /// Monthly trend for a category family
    Trend {
        /// Category family
        family: TrendFamily,
        /// Window length in months
        months: u32,
    },
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Summary => f.write_str("summary"),
            Self::Trend { family, months } => write!(f, "trend:{family}:{months}"),
        }
    }
}

/// Cache key for one caller's view of one report on one day
///
/// `zone` is the purok the report is scoped to, `None` for unrestricted
/// reports. Two callers whose scopes differ never share an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportKey {
    /// Report kind
    pub kind: ReportKind,
    /// Caller role
    pub role: Role,
    /// Scoped purok, `None` when unrestricted
    pub zone: Option<PurokId>,
    /// Reference date the report was computed for
    pub as_of: NaiveDate,
}

impl ReportKey {
    /// Build a key from a caller's role and resolved scope
    #[must_use]
    pub const fn new(kind: ReportKind, role: Role, scope: Scope, as_of: NaiveDate) -> Self {
        Self {
            kind,
            role,
            zone: scope.zone(),
            as_of,
        }
    }

    /// Whether the entry aggregates every purok
    #[must_use]
    pub const fn is_unrestricted(&self) -> bool {
        self.zone.is_none()
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.zone {
            Some(zone) => write!(f, "{}@{}/purok-{zone}/{}", self.kind, self.role, self.as_of),
            None => write!(f, "{}@{}/all/{}", self.kind, self.role, self.as_of),
        }
    }
}

/// A report stored in the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CachedReport {
    /// A summary report
    Summary(SummaryReport),
    /// A trend series
    Trend(TrendSeries),
}

/// Reports that can be stored in and restored from the cache
pub trait CacheableReport: Sized {
    /// Wrap the report for storage
    fn into_cached(self) -> CachedReport;

    /// Unwrap a stored report, `None` if it is a different report type
    fn from_cached(cached: CachedReport) -> Option<Self>;
}

impl CacheableReport for SummaryReport {
    fn into_cached(self) -> CachedReport {
        CachedReport::Summary(self)
    }

    fn from_cached(cached: CachedReport) -> Option<Self> {
        match cached {
            CachedReport::Summary(report) => Some(report),
            CachedReport::Trend(_) => None,
        }
    }
}

impl CacheableReport for TrendSeries {
    fn into_cached(self) -> CachedReport {
        CachedReport::Trend(self)
    }

    fn from_cached(cached: CachedReport) -> Option<Self> {
        match cached {
            CachedReport::Trend(series) => Some(series),
            CachedReport::Summary(_) => None,
        }
    }
}

/// Storage behind a [`ReportCache`]
///
/// Errors should be `CacheUnavailable`; the cache logs and absorbs them.
pub trait CacheBackend: Send + Sync {
    /// Fetch a live entry
    fn get(&self, key: &ReportKey) -> Result<Option<CachedReport>>;

    /// Store an entry, replacing any previous one
    fn put(&self, key: ReportKey, report: CachedReport) -> Result<()>;

    /// Remove one entry, returning whether it existed
    fn remove(&self, key: &ReportKey) -> Result<bool>;

    /// Remove every entry matching `predicate`
    ///
    /// Returns `None` if the backend cannot enumerate its keys.
    fn remove_where(&self, predicate: &dyn Fn(&ReportKey) -> bool) -> Result<Option<usize>>;

    /// Remove every entry, returning how many were removed
    fn clear(&self) -> Result<usize>;
}

/// Typed report cache with explicit invalidation
pub struct ReportCache {
    backend: Box<dyn CacheBackend>,
}

impl fmt::Debug for ReportCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportCache").finish_non_exhaustive()
    }
}

impl Default for ReportCache {
    fn default() -> Self {
        Self::disabled()
    }
}

impl ReportCache {
    /// Create a cache over a backend
    #[must_use]
    pub fn new(backend: impl CacheBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// A cache that stores nothing
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(NoopCacheBackend)
    }

    /// Build the cache described by a configuration
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        if config.enabled {
            Self::new(InMemoryCacheBackend::new(config.ttl, config.max_entries))
        } else {
            Self::disabled()
        }
    }

    /// Return the cached report for `key`, or compute and store it
    ///
    /// Compute errors are returned and never cached. Backend errors are
    /// logged and the report is computed directly.
    ///
    /// # Errors
    /// Returns whatever `compute` returns.
    pub fn get_or_compute<T, F>(&self, key: ReportKey, compute: F) -> Result<T>
    where
        T: CacheableReport + Clone,
        F: FnOnce() -> Result<T>,
    {
        match self.backend.get(&key) {
            Ok(Some(cached)) => {
                if let Some(report) = T::from_cached(cached) {
                    debug!("Cache hit for {key}");
                    return Ok(report);
                }
                warn!("Cache entry for {key} holds a different report type; recomputing");
            }
            Ok(None) => debug!("Cache miss for {key}"),
            Err(e) => warn!("Cache lookup failed for {key}, computing directly: {e}"),
        }

        let report = compute()?;

        if let Err(e) = self.backend.put(key, report.clone().into_cached()) {
            warn!("Failed to store {key} in cache: {e}");
        }

        Ok(report)
    }

    /// Drop one entry
    pub fn invalidate(&self, key: &ReportKey) -> bool {
        match self.backend.remove(key) {
            Ok(removed) => removed,
            Err(e) => {
                warn!("Failed to invalidate {key}: {e}");
                false
            }
        }
    }

    /// Drop every entry
    pub fn invalidate_all(&self) -> usize {
        match self.backend.clear() {
            Ok(removed) => {
                debug!("Invalidated all {removed} cached reports");
                removed
            }
            Err(e) => {
                warn!("Failed to clear report cache: {e}");
                0
            }
        }
    }

    /// Drop entries affected by a change in one purok
    ///
    /// Removes entries scoped to `zone` and every unrestricted entry, since
    /// those aggregate all puroks. Falls back to clearing the whole cache
    /// when the backend cannot filter.
    pub fn invalidate_zone(&self, zone: PurokId) -> usize {
        self.remove_matching(&format!("purok {zone}"), &|key: &ReportKey| {
            key.is_unrestricted() || key.zone == Some(zone)
        })
    }

    /// Drop every entry computed for one caller identity
    pub fn invalidate_caller(&self, role: Role, scope: Scope) -> usize {
        let zone = scope.zone();
        self.remove_matching(&format!("{role} ({scope})"), &|key: &ReportKey| {
            key.role == role && key.zone == zone
        })
    }

    fn remove_matching(&self, subject: &str, predicate: &dyn Fn(&ReportKey) -> bool) -> usize {
        match self.backend.remove_where(predicate) {
            Ok(Some(removed)) => {
                debug!("Invalidated {removed} cached reports for {subject}");
                removed
            }
            Ok(None) => {
                debug!("Cache backend cannot filter keys; clearing for {subject}");
                self.invalidate_all()
            }
            Err(e) => {
                warn!("Failed to invalidate cached reports for {subject}: {e}");
                0
            }
        }
    }
}
