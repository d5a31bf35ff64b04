//! Shared fixtures for integration tests

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{NaiveDate, NaiveDateTime};
use purok_analytics::cache::{CacheBackend, CachedReport, ReportKey};
use purok_analytics::models::types::PurokId;
use purok_analytics::{
    AnalyticsError, Household, InMemoryRegistry, OccupationStatus, Purok, RegistryStore, Resident,
    ResidentQuery, Result, Sex,
};

/// Build a date
#[must_use]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Build an instant
#[must_use]
pub fn at(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, mi, 0).unwrap()
}

/// Instant every scenario report is computed at
#[must_use]
pub fn reference_instant() -> NaiveDateTime {
    at(2024, 6, 15, 12, 0)
}

/// One purok, two households, three residents
///
/// * H1 (registered 2024-01-10): 65-year-old male, 6-month-old female with
///   occupation "other"
/// * H2 (registered 2024-04-05): 40-year-old male with disability
#[must_use]
pub fn scenario_registry() -> InMemoryRegistry {
    InMemoryRegistry::new()
        .with_purok(Purok::new(1, "Purok Uno", "P1"))
        .with_household(Household::new(1, 1, at(2024, 1, 10, 9, 0)))
        .with_household(Household::new(2, 1, at(2024, 4, 5, 14, 30)))
        .with_resident(
            Resident::new(1, 1, date(1959, 3, 10), at(2024, 1, 10, 9, 5)).with_sex(Sex::Male),
        )
        .with_resident(
            Resident::new(2, 1, date(2023, 12, 15), at(2024, 1, 10, 9, 10))
                .with_sex(Sex::Female)
                .with_occupation(OccupationStatus::Other),
        )
        .with_resident(
            Resident::new(3, 2, date(1984, 1, 20), at(2024, 4, 5, 14, 45))
                .with_sex(Sex::Male)
                .with_pwd(true)
                .with_occupation(OccupationStatus::Employed),
        )
}

/// The scenario registry plus a populated purok 2 and an empty purok 3
///
/// Purok 2 holds H3 (registered 2024-05-20) with a 30-year-old employed
/// female and a 10-year-old student.
#[must_use]
pub fn three_zone_registry() -> InMemoryRegistry {
    scenario_registry()
        .with_purok(Purok::new(2, "Purok Dos", "P2"))
        .with_purok(Purok::new(3, "Purok Tres", "P3"))
        .with_household(Household::new(3, 2, at(2024, 5, 20, 8, 0)))
        .with_resident(
            Resident::new(4, 3, date(1994, 2, 2), at(2024, 5, 20, 8, 10))
                .with_sex(Sex::Female)
                .with_occupation(OccupationStatus::Employed),
        )
        .with_resident(
            Resident::new(5, 3, date(2014, 3, 1), at(2024, 5, 20, 8, 15))
                .with_sex(Sex::Male)
                .with_occupation(OccupationStatus::Student),
        )
}

/// Registry whose every read fails
#[derive(Debug, Default)]
pub struct FailingRegistry;

impl RegistryStore for FailingRegistry {
    fn puroks(&self) -> Result<Vec<Purok>> {
        Err(AnalyticsError::registry_unavailable("puroks offline"))
    }

    fn households(&self, _purok: Option<PurokId>) -> Result<Vec<Household>> {
        Err(AnalyticsError::registry_unavailable("households offline"))
    }

    fn residents(&self, _query: &ResidentQuery) -> Result<Vec<Resident>> {
        Err(AnalyticsError::registry_unavailable("residents offline"))
    }
}

/// Registry wrapper counting resident reads
#[derive(Debug)]
pub struct CountingRegistry {
    inner: InMemoryRegistry,
    resident_reads: AtomicUsize,
}

impl CountingRegistry {
    #[must_use]
    pub fn new(inner: InMemoryRegistry) -> Self {
        Self {
            inner,
            resident_reads: AtomicUsize::new(0),
        }
    }

    pub fn resident_reads(&self) -> usize {
        self.resident_reads.load(Ordering::SeqCst)
    }
}

impl RegistryStore for CountingRegistry {
    fn puroks(&self) -> Result<Vec<Purok>> {
        self.inner.puroks()
    }

    fn households(&self, purok: Option<PurokId>) -> Result<Vec<Household>> {
        self.inner.households(purok)
    }

    fn residents(&self, query: &ResidentQuery) -> Result<Vec<Resident>> {
        self.resident_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.residents(query)
    }
}

/// Registry that ignores the purok filter and the resident query
///
/// Used to check that scoping is enforced even when the store does not.
#[derive(Debug)]
pub struct LeakyRegistry(pub InMemoryRegistry);

impl RegistryStore for LeakyRegistry {
    fn puroks(&self) -> Result<Vec<Purok>> {
        self.0.puroks()
    }

    fn households(&self, _purok: Option<PurokId>) -> Result<Vec<Household>> {
        self.0.households(None)
    }

    fn residents(&self, _query: &ResidentQuery) -> Result<Vec<Resident>> {
        self.0.residents(&ResidentQuery::default())
    }
}

/// Cache backend whose every operation fails
#[derive(Debug, Default)]
pub struct FailingCacheBackend;

impl CacheBackend for FailingCacheBackend {
    fn get(&self, _key: &ReportKey) -> Result<Option<CachedReport>> {
        Err(AnalyticsError::CacheUnavailable("backend down".into()))
    }

    fn put(&self, _key: ReportKey, _report: CachedReport) -> Result<()> {
        Err(AnalyticsError::CacheUnavailable("backend down".into()))
    }

    fn remove(&self, _key: &ReportKey) -> Result<bool> {
        Err(AnalyticsError::CacheUnavailable("backend down".into()))
    }

    fn remove_where(&self, _predicate: &dyn Fn(&ReportKey) -> bool) -> Result<Option<usize>> {
        Err(AnalyticsError::CacheUnavailable("backend down".into()))
    }

    fn clear(&self) -> Result<usize> {
        Err(AnalyticsError::CacheUnavailable("backend down".into()))
    }
}
