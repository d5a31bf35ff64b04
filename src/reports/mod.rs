//! Report service
//!
//! The entry point the reporting layer calls. A request carries the caller's
//! identity; the service resolves it to a scope once, consults the cache and
//! runs the aggregation pipeline or trend generator on a miss.
//!
//! Reports are computed as of the start of the request's day. Cache keys
//! carry that day, so a cached report is identical to a fresh one for any
//! instant on it.

use chrono::{NaiveDateTime, NaiveTime};
use log::info;
use serde::{Deserialize, Serialize};

use crate::algorithm::aggregation::{AggregationPipeline, SummaryReport};
use crate::algorithm::trend::{TrendFamily, TrendSeries, TrendSeriesGenerator};
use crate::cache::{ReportCache, ReportKey, ReportKind};
use crate::config::AnalyticsConfig;
use crate::error::{AnalyticsError, Result};
use crate::models::types::PurokId;
use crate::registry::RegistryStore;
use crate::scope::CallerContext;
use crate::utils::logging::log_operation_start;

/// Role-scoped summaries and trends over a registry
#[derive(Debug)]
pub struct ReportService<R: RegistryStore> {
    registry: R,
    cache: ReportCache,
    config: AnalyticsConfig,
}

impl<R: RegistryStore> ReportService<R> {
    /// Create a service with the cache described by `config`
    #[must_use]
    pub fn new(registry: R, config: AnalyticsConfig) -> Self {
        let cache = ReportCache::from_config(&config.cache);
        Self::with_cache(registry, cache, config)
    }

    /// Create a service with an explicit cache
    #[must_use]
    pub const fn with_cache(registry: R, cache: ReportCache, config: AnalyticsConfig) -> Self {
        Self {
            registry,
            cache,
            config,
        }
    }

    /// The underlying registry
    #[must_use]
    pub const fn registry(&self) -> &R {
        &self.registry
    }

    /// The report cache
    #[must_use]
    pub const fn cache(&self) -> &ReportCache {
        &self.cache
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Dashboard summary for a caller on `now`'s day
    ///
    /// # Errors
    /// Returns a scope error for an invalid caller and `RegistryUnavailable`
    /// if the registry cannot be read.
    pub fn summary(&self, caller: &CallerContext, now: NaiveDateTime) -> Result<SummaryReport> {
        let scope = caller.scope()?;
        let as_of = start_of_day(now);
        log_operation_start("Summary report", format!("{} ({scope})", caller.role));

        let key = ReportKey::new(ReportKind::Summary, caller.role, scope, as_of.date());
        self.cache.get_or_compute(key, || {
            AggregationPipeline::new(&self.registry).summarize(scope, as_of)
        })
    }

    /// Monthly trend for a category family ending at `now`'s month
    ///
    /// `months` falls back to the configured default for the family.
    ///
    /// # Errors
    /// Returns a scope error for an invalid caller, `InvalidTrendWindow` for a
    /// zero window and `RegistryUnavailable` if the registry cannot be read.
    pub fn trend(
        &self,
        caller: &CallerContext,
        family: TrendFamily,
        months: Option<u32>,
        now: NaiveDateTime,
    ) -> Result<TrendSeries> {
        let scope = caller.scope()?;
        let months = months.unwrap_or_else(|| self.default_months(family));
        if months == 0 {
            return Err(AnalyticsError::InvalidTrendWindow(months));
        }
        log_operation_start(
            "Trend report",
            format!("{family} over {months} months for {} ({scope})", caller.role),
        );

        let as_of = start_of_day(now);
        let key = ReportKey::new(ReportKind::Trend { family, months }, caller.role, scope, as_of.date());
        self.cache.get_or_compute(key, || {
            TrendSeriesGenerator::new(&self.registry).generate_trend(
                scope,
                family.categories(),
                months,
                as_of,
            )
        })
    }

    /// Vulnerable-population trend over the configured window
    ///
    /// # Errors
    /// See [`ReportService::trend`].
    pub fn vulnerable_trend(&self, caller: &CallerContext, now: NaiveDateTime) -> Result<TrendSeries> {
        self.trend(caller, TrendFamily::Vulnerable, None, now)
    }

    /// Registration trend over the configured window
    ///
    /// # Errors
    /// See [`ReportService::trend`].
    pub fn registration_trend(
        &self,
        caller: &CallerContext,
        now: NaiveDateTime,
    ) -> Result<TrendSeries> {
        self.trend(caller, TrendFamily::Registrations, None, now)
    }

    /// Drop cached reports affected by a change in one purok
    pub fn invalidate_zone(&self, zone: PurokId) -> usize {
        let removed = self.cache.invalidate_zone(zone);
        info!("Invalidated {removed} cached reports after change in purok {zone}");
        removed
    }

    /// Drop every cached report for one caller
    ///
    /// # Errors
    /// Returns a scope error if the caller is invalid.
    pub fn invalidate_caller(&self, caller: &CallerContext) -> Result<usize> {
        let scope = caller.scope()?;
        let removed = self.cache.invalidate_caller(caller.role, scope);
        info!("Invalidated {removed} cached reports for {} ({scope})", caller.role);
        Ok(removed)
    }

    /// Drop every cached report
    pub fn invalidate_all(&self) -> usize {
        let removed = self.cache.invalidate_all();
        info!("Invalidated all {removed} cached reports");
        removed
    }

    const fn default_months(&self, family: TrendFamily) -> u32 {
        match family {
            TrendFamily::Registrations => self.config.registration_trend_months,
            TrendFamily::Vulnerable => self.config.vulnerable_trend_months,
        }
    }
}

fn start_of_day(now: NaiveDateTime) -> NaiveDateTime {
    now.date().and_time(NaiveTime::MIN)
}

/// Outcome of a report request as shown to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Computed, with data
    Ok,
    /// Computed; the scoped registry holds nothing to report
    NoData,
    /// Could not be computed
    Failed,
}

/// Reports that can tell whether they contain anything
pub trait ReportData {
    /// Whether the report reflects any registry records
    fn has_data(&self) -> bool;
}

impl ReportData for SummaryReport {
    fn has_data(&self) -> bool {
        Self::has_data(self)
    }
}

impl ReportData for TrendSeries {
    fn has_data(&self) -> bool {
        !self.is_all_zero()
    }
}

/// Serializable envelope distinguishing "no data" from "could not compute"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportResponse<T> {
    /// Outcome
    pub status: ReportStatus,
    /// Whether retrying the request may succeed
    pub retryable: bool,
    /// Error message for failed requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The report, absent for failed requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<T>,
}

impl<T: ReportData> ReportResponse<T> {
    /// Wrap the result of a report request
    #[must_use]
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(report) => Self {
                status: if report.has_data() {
                    ReportStatus::Ok
                } else {
                    ReportStatus::NoData
                },
                retryable: false,
                message: None,
                report: Some(report),
            },
            Err(e) => Self {
                status: ReportStatus::Failed,
                retryable: e.is_retryable(),
                message: Some(e.to_string()),
                report: None,
            },
        }
    }
}
