//! Demographic analytics for a municipal population registry.
//!
//! Turns a read-only registry of puroks, households and residents into
//! role-scoped summaries and monthly trend series. A purok leader only ever
//! sees their own purok; admins and secretaries see every purok.

pub mod algorithm;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod reports;
pub mod scope;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{AnalyticsConfig, CacheConfig};
pub use error::{AnalyticsError, Result};
pub use models::{Household, OccupationStatus, Purok, Resident, Role, Sex};
pub use scope::{CallerContext, Scope, ScopeResolver};

// Analytics
pub use algorithm::aggregation::{AggregationPipeline, SummaryReport, ZoneBreakdown};
pub use algorithm::classification::{Classification, Cohort, VulnerabilityFlags, classify};
pub use algorithm::query::{QuerySpec, RegistrationWindow};
pub use algorithm::trend::{
    TrendCategory, TrendFamily, TrendPoint, TrendSeries, TrendSeriesGenerator,
};

// Registry access
pub use registry::{InMemoryRegistry, ParquetRegistry, RegistryStore, ResidentQuery};

// Caching and the service facade
pub use cache::{
    CacheBackend, InMemoryCacheBackend, NoopCacheBackend, ReportCache, ReportKey, ReportKind,
};
pub use reports::{ReportResponse, ReportService, ReportStatus};
