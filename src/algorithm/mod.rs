//! Reporting algorithms
//!
//! Classification rules, scoped aggregation and monthly trend generation.

pub mod aggregation;
pub mod classification;
pub mod query;
pub mod trend;

pub use aggregation::{
    AggregationPipeline, CohortCounts, SexCounts, SummaryReport, VulnerableCounts, ZoneBreakdown,
};
pub use classification::{
    Classification, Cohort, VulnerabilityFlags, classify, pregnancy_proxy_placeholder,
};
pub use query::{QuerySpec, RegistrationWindow};
pub use trend::{
    MonthWindow, TrendCategory, TrendFamily, TrendPoint, TrendSeries, TrendSeriesGenerator,
    month_grid,
};
