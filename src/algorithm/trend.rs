//! Monthly trend series
//!
//! A trend is a fixed-length, oldest-first sequence of monthly counts. The
//! month grid is generated from the anchor instant rather than queried from
//! existing data, so months can never be missing or repeated, and months
//! without matching records are present with zero counts.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, TimeDelta};
use itertools::Itertools;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::algorithm::aggregation::AggregationPipeline;
use crate::algorithm::query::{QuerySpec, RegistrationWindow};
use crate::error::{AnalyticsError, Result};
use crate::registry::RegistryStore;
use crate::scope::Scope;

/// What a trend point counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendCategory {
    /// Resident registrations
    Residents,
    /// Household registrations
    Households,
    /// Registered residents who are seniors
    Seniors,
    /// Registered residents with disability
    Pwd,
    /// Registered residents who are infants
    Infants,
    /// Registered residents matching the placeholder pregnancy rule
    PregnantProxy,
}

/// A named group of categories reported together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendFamily {
    /// Raw resident and household registrations
    Registrations,
    /// Vulnerable-population registrations
    Vulnerable,
}

impl TrendFamily {
    /// Categories reported for this family
    #[must_use]
    pub const fn categories(self) -> &'static [TrendCategory] {
        match self {
            Self::Registrations => &[TrendCategory::Residents, TrendCategory::Households],
            Self::Vulnerable => &[
                TrendCategory::Seniors,
                TrendCategory::Pwd,
                TrendCategory::Infants,
                TrendCategory::PregnantProxy,
            ],
        }
    }
}

impl FromStr for TrendFamily {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "registrations" => Ok(Self::Registrations),
            "vulnerable" => Ok(Self::Vulnerable),
            other => Err(AnalyticsError::Config(format!("unknown trend family '{other}'"))),
        }
    }
}

impl fmt::Display for TrendFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registrations => f.write_str("registrations"),
            Self::Vulnerable => f.write_str("vulnerable"),
        }
    }
}

/// Counts for one month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Month label, `YYYY-MM`
    pub month_label: String,
    /// Count per requested category; every category is present
    pub counts_by_category: BTreeMap<TrendCategory, u64>,
}

impl TrendPoint {
    /// Count for a category, zero if it was not requested
    #[must_use]
    pub fn count(&self, category: TrendCategory) -> u64 {
        self.counts_by_category.get(&category).copied().unwrap_or(0)
    }
}

/// An ordered sequence of exactly `window_months` monthly points
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendSeries {
    /// Scope the series was computed for
    pub scope: Scope,
    /// Number of months covered
    pub window_months: u32,
    /// Categories counted in every point
    pub categories: SmallVec<[TrendCategory; 6]>,
    /// Points, oldest first
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    /// Month labels in order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.points.iter().map(|p| p.month_label.as_str())
    }

    /// Counts for one category in month order
    #[must_use]
    pub fn values(&self, category: TrendCategory) -> Vec<u64> {
        self.points.iter().map(|p| p.count(category)).collect()
    }

    /// Whether every point is zero in every category
    #[must_use]
    pub fn is_all_zero(&self) -> bool {
        self.points
            .iter()
            .all(|p| p.counts_by_category.values().all(|&c| c == 0))
    }
}

/// One month of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    /// First day of the month
    pub month_start: NaiveDate,
    /// Registrations counted in this month
    pub registrations: RegistrationWindow,
    /// Instant ages are computed at
    pub reference_instant: NaiveDateTime,
}

impl MonthWindow {
    /// `YYYY-MM` label, sortable as a string
    #[must_use]
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.month_start.year(), self.month_start.month())
    }
}

/// Build the month grid ending at the anchor's month, oldest first
///
/// Each month's reference instant is its last second, except the anchor's
/// own month which uses the anchor itself.
///
/// # Errors
/// Returns `InvalidTrendWindow` for a zero-length window or a grid that
/// falls outside the supported calendar range.
pub fn month_grid(window_months: u32, anchor: NaiveDateTime) -> Result<Vec<MonthWindow>> {
    if window_months == 0 {
        return Err(AnalyticsError::InvalidTrendWindow(window_months));
    }
    let out_of_range = || AnalyticsError::InvalidTrendWindow(window_months);

    let anchor_month = anchor.date().with_day(1).ok_or_else(out_of_range)?;

    (0..window_months)
        .rev()
        .map(|back| -> Result<MonthWindow> {
            let month_start = anchor_month
                .checked_sub_months(Months::new(back))
                .ok_or_else(out_of_range)?;
            let next_month = month_start
                .checked_add_months(Months::new(1))
                .ok_or_else(out_of_range)?;

            let start = month_start.and_time(chrono::NaiveTime::MIN);
            let end = next_month.and_time(chrono::NaiveTime::MIN);
            let reference_instant = if back == 0 {
                anchor
            } else {
                end - TimeDelta::seconds(1)
            };

            Ok(MonthWindow {
                month_start,
                registrations: RegistrationWindow::new(start, end),
                reference_instant,
            })
        })
        .collect()
}

/// Produces monthly series by counting one scoped load over a month grid
pub struct TrendSeriesGenerator<'a, R: RegistryStore + ?Sized> {
    pipeline: AggregationPipeline<'a, R>,
}

impl<'a, R: RegistryStore + ?Sized> TrendSeriesGenerator<'a, R> {
    /// Create a generator reading from `registry`
    #[must_use]
    pub const fn new(registry: &'a R) -> Self {
        Self {
            pipeline: AggregationPipeline::new(registry),
        }
    }

    /// Generate a series of `window_months` points ending at the anchor's month
    ///
    /// Duplicate categories are counted once. The result is identical for
    /// identical inputs and unchanged registry state.
    ///
    /// # Errors
    /// Returns `InvalidTrendWindow` for a zero window and `RegistryUnavailable`
    /// if the registry read fails.
    pub fn generate_trend(
        &self,
        scope: Scope,
        categories: &[TrendCategory],
        window_months: u32,
        anchor_instant: NaiveDateTime,
    ) -> Result<TrendSeries> {
        let categories: SmallVec<[TrendCategory; 6]> =
            categories.iter().copied().unique().collect();
        let grid = month_grid(window_months, anchor_instant)?;
        let base = QuerySpec::for_scope(scope);

        // One registry read per series; months are counted from the same load
        let visible = self.pipeline.load_visible(base)?;

        let points: Vec<TrendPoint> = grid
            .par_iter()
            .map(|month| {
                let spec = base.registered_within(month.registrations);
                TrendPoint {
                    month_label: month.label(),
                    counts_by_category: visible.count_registrations(
                        spec,
                        month.reference_instant,
                        &categories,
                    ),
                }
            })
            .collect();

        debug!(
            "Generated {window_months}-month trend for {scope} ending {}",
            anchor_instant.date()
        );

        Ok(TrendSeries {
            scope,
            window_months,
            categories,
            points,
        })
    }
}
