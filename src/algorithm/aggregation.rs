//! Scoped aggregation of registry records
//!
//! The pipeline applies a [`Scope`] to the registry, classifies every
//! visible resident exactly once and accumulates all tallies in a single
//! pass. Its output is a plain [`SummaryReport`] value with no behavior.
//!
//! A second entry point, [`AggregationPipeline::count_registrations`], counts
//! only records registered inside a window. The trend generator loads the
//! scoped records once and counts every month of its grid from that load.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::NaiveDateTime;
use log::debug;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::algorithm::classification::{Classification, Cohort, classify};
use crate::algorithm::query::QuerySpec;
use crate::algorithm::trend::TrendCategory;
use crate::error::Result;
use crate::models::types::{HouseholdId, PurokId, Sex};
use crate::models::{Household, Purok, Resident};
use crate::registry::{RegistryStore, ResidentQuery};
use crate::scope::Scope;
use crate::utils::logging::log_operation_complete;

/// Residents per age cohort
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortCounts {
    /// Younger than one year
    pub infants: u64,
    /// 1 to 17 years
    pub children: u64,
    /// 18 to 59 years
    pub adults: u64,
    /// 60 years and older
    pub seniors: u64,
}

/// Vulnerable-population breakdown
///
/// A resident can carry several flags, so the category counts may add up to
/// more than `total_vulnerable`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerableCounts {
    /// Residents aged 60 and older
    pub seniors: u64,
    /// Persons with disability
    pub pwd: u64,
    /// Placeholder pregnancy heuristic matches
    pub pregnant_proxy: u64,
    /// Residents younger than one year
    pub infants: u64,
    /// Residents with at least one flag
    pub total_vulnerable: u64,
}

/// Residents per recorded sex
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SexCounts {
    /// Male residents
    pub male: u64,
    /// Female residents
    pub female: u64,
    /// Residents with no recorded sex
    pub unknown: u64,
}

/// Household and resident counts for one purok
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneBreakdown {
    /// Purok identifier
    pub purok_id: PurokId,
    /// Purok name, if the purok is known to the registry
    pub name: Option<String>,
    /// Purok code, if the purok is known to the registry
    pub code: Option<String>,
    /// Households located in the purok
    pub households: u64,
    /// Residents of those households
    pub residents: u64,
}

impl ZoneBreakdown {
    fn empty(purok_id: PurokId, purok: Option<&Purok>) -> Self {
        Self {
            purok_id,
            name: purok.map(|p| p.name.clone()),
            code: purok.map(|p| p.code.clone()),
            households: 0,
            residents: 0,
        }
    }
}

/// Point-in-time counts for one scope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryReport {
    /// Scope the report was computed for
    pub scope: Scope,
    /// Instant ages were computed at
    pub reference_instant: NaiveDateTime,
    /// Visible households
    pub total_households: u64,
    /// Residents of visible households
    pub total_residents: u64,
    /// Residents per age cohort
    pub cohort_counts: CohortCounts,
    /// Vulnerable-population breakdown
    pub vulnerable_counts: VulnerableCounts,
    /// Residents per recorded sex
    pub sex_counts: SexCounts,
    /// Number of puroks in the breakdown
    pub zone_count: usize,
    /// Per-purok counts, ordered by purok id
    pub per_zone_breakdown: Vec<ZoneBreakdown>,
}

impl SummaryReport {
    /// Whether the scoped registry holds any records at all
    #[must_use]
    pub const fn has_data(&self) -> bool {
        self.total_households > 0 || self.total_residents > 0
    }
}

/// Single-pass accumulator over classified residents
#[derive(Debug, Default)]
struct Tally {
    residents: u64,
    cohorts: CohortCounts,
    vulnerable: VulnerableCounts,
    sex: SexCounts,
    residents_by_zone: FxHashMap<PurokId, u64>,
}

impl Tally {
    fn record(mut self, zone: PurokId, sex: Sex, c: &Classification) -> Self {
        self.residents += 1;
        *self.residents_by_zone.entry(zone).or_insert(0) += 1;

        match c.cohort {
            Cohort::Infant => self.cohorts.infants += 1,
            Cohort::Child => self.cohorts.children += 1,
            Cohort::Adult => self.cohorts.adults += 1,
            Cohort::Senior => self.cohorts.seniors += 1,
        }

        match sex {
            Sex::Male => self.sex.male += 1,
            Sex::Female => self.sex.female += 1,
            Sex::Unknown => self.sex.unknown += 1,
        }

        let flags = c.flags;
        self.vulnerable.seniors += u64::from(flags.is_senior);
        self.vulnerable.pwd += u64::from(flags.is_pwd);
        self.vulnerable.pregnant_proxy += u64::from(flags.is_pregnant_proxy);
        self.vulnerable.infants += u64::from(flags.is_infant);
        self.vulnerable.total_vulnerable += u64::from(flags.any());
        self
    }

    fn merge(mut self, other: Self) -> Self {
        self.residents += other.residents;

        self.cohorts.infants += other.cohorts.infants;
        self.cohorts.children += other.cohorts.children;
        self.cohorts.adults += other.cohorts.adults;
        self.cohorts.seniors += other.cohorts.seniors;

        self.vulnerable.seniors += other.vulnerable.seniors;
        self.vulnerable.pwd += other.vulnerable.pwd;
        self.vulnerable.pregnant_proxy += other.vulnerable.pregnant_proxy;
        self.vulnerable.infants += other.vulnerable.infants;
        self.vulnerable.total_vulnerable += other.vulnerable.total_vulnerable;

        self.sex.male += other.sex.male;
        self.sex.female += other.sex.female;
        self.sex.unknown += other.sex.unknown;

        for (zone, count) in other.residents_by_zone {
            *self.residents_by_zone.entry(zone).or_insert(0) += count;
        }
        self
    }
}

/// Households and residents visible under one query spec
pub(crate) struct VisibleRecords {
    households: Vec<Household>,
    zone_of: FxHashMap<HouseholdId, PurokId>,
    residents: Vec<Resident>,
}

impl VisibleRecords {
    /// Count the loaded records registered inside `spec`'s window
    pub(crate) fn count_registrations(
        &self,
        spec: QuerySpec,
        reference_instant: NaiveDateTime,
        categories: &[TrendCategory],
    ) -> BTreeMap<TrendCategory, u64> {
        let tally = tally_residents(&self.residents, &self.zone_of, spec, reference_instant);

        let households_registered = self
            .households
            .iter()
            .filter(|h| spec.admits_registration(h.created_at))
            .count() as u64;

        categories
            .iter()
            .map(|&category| {
                let count = match category {
                    TrendCategory::Residents => tally.residents,
                    TrendCategory::Households => households_registered,
                    TrendCategory::Seniors => tally.vulnerable.seniors,
                    TrendCategory::Pwd => tally.vulnerable.pwd,
                    TrendCategory::Infants => tally.vulnerable.infants,
                    TrendCategory::PregnantProxy => tally.vulnerable.pregnant_proxy,
                };
                (category, count)
            })
            .collect()
    }
}

/// Applies scopes to the registry and produces summary counts
pub struct AggregationPipeline<'a, R: RegistryStore + ?Sized> {
    registry: &'a R,
}

impl<'a, R: RegistryStore + ?Sized> AggregationPipeline<'a, R> {
    /// Create a pipeline reading from `registry`
    #[must_use]
    pub const fn new(registry: &'a R) -> Self {
        Self { registry }
    }

    /// Compute the point-in-time summary for a scope
    ///
    /// An empty registry yields an all-zero report. Registry failures are
    /// propagated; no partial report is ever returned.
    ///
    /// # Errors
    /// Returns `RegistryUnavailable` if any registry read fails.
    pub fn summarize(&self, scope: Scope, reference_instant: NaiveDateTime) -> Result<SummaryReport> {
        let start = Instant::now();
        let spec = QuerySpec::for_scope(scope);

        let puroks = self.registry.puroks()?;
        let visible = self.load_visible(spec)?;
        let tally = tally_residents(&visible.residents, &visible.zone_of, spec, reference_instant);
        let per_zone_breakdown = build_breakdown(scope, &puroks, &visible.households, &tally);

        let report = SummaryReport {
            scope,
            reference_instant,
            total_households: visible.households.len() as u64,
            total_residents: tally.residents,
            cohort_counts: tally.cohorts,
            vulnerable_counts: tally.vulnerable,
            sex_counts: tally.sex,
            zone_count: per_zone_breakdown.len(),
            per_zone_breakdown,
        };

        log_operation_complete(
            "summarized",
            &scope,
            report.total_residents as usize,
            Some(start.elapsed()),
        );
        Ok(report)
    }

    /// Count records registered inside the spec's window, per category
    ///
    /// Every requested category is present in the result, zero if nothing
    /// matched. Residents are classified at `reference_instant`. Without a
    /// window on the spec, every visible record counts.
    ///
    /// # Errors
    /// Returns `RegistryUnavailable` if any registry read fails.
    pub fn count_registrations(
        &self,
        spec: QuerySpec,
        reference_instant: NaiveDateTime,
        categories: &[TrendCategory],
    ) -> Result<BTreeMap<TrendCategory, u64>> {
        let visible = self.load_visible(spec)?;
        Ok(visible.count_registrations(spec, reference_instant, categories))
    }

    /// Read households and residents visible under `spec`
    ///
    /// Store-side filters are re-checked locally so a store that ignores a
    /// filter can never widen the scope. The household list is always the
    /// full scoped list; only residents are narrowed to the registration
    /// window.
    pub(crate) fn load_visible(&self, spec: QuerySpec) -> Result<VisibleRecords> {
        let scope = spec.scope;

        // Step 1: households in scope
        let households: Vec<Household> = self
            .registry
            .households(scope.zone())?
            .into_iter()
            .filter(|h| scope.admits(h.purok_id))
            .collect();

        let zone_of: FxHashMap<HouseholdId, PurokId> =
            households.iter().map(|h| (h.id, h.purok_id)).collect();

        // Step 2: residents of those households
        let household_ids: FxHashSet<HouseholdId> = zone_of.keys().copied().collect();
        let query =
            ResidentQuery::for_households(household_ids).created_within(spec.registered_within);
        let mut residents = self.registry.residents(&query)?;
        residents
            .retain(|r| zone_of.contains_key(&r.household_id) && spec.admits_registration(r.created_at));

        debug!(
            "Loaded {} households and {} residents for {}",
            households.len(),
            residents.len(),
            scope
        );

        Ok(VisibleRecords {
            households,
            zone_of,
            residents,
        })
    }
}

/// Classify every resident registered inside `spec`'s window once and
/// accumulate all counts
fn tally_residents(
    residents: &[Resident],
    zone_of: &FxHashMap<HouseholdId, PurokId>,
    spec: QuerySpec,
    reference_instant: NaiveDateTime,
) -> Tally {
    residents
        .par_iter()
        .filter(|resident| spec.admits_registration(resident.created_at))
        .fold(Tally::default, |tally, resident| {
            match zone_of.get(&resident.household_id) {
                Some(&zone) => {
                    let classification = classify(resident, reference_instant);
                    tally.record(zone, resident.sex, &classification)
                }
                None => tally,
            }
        })
        .reduce(Tally::default, Tally::merge)
}

/// Group household and resident counts by purok
fn build_breakdown(
    scope: Scope,
    puroks: &[Purok],
    households: &[Household],
    tally: &Tally,
) -> Vec<ZoneBreakdown> {
    let known: FxHashMap<PurokId, &Purok> = puroks.iter().map(|p| (p.id, p)).collect();
    let mut breakdown: BTreeMap<PurokId, ZoneBreakdown> = BTreeMap::new();

    // Seed with every zone the scope covers so empty zones are never dropped
    match scope {
        Scope::Unrestricted => {
            for purok in puroks {
                breakdown.insert(purok.id, ZoneBreakdown::empty(purok.id, Some(purok)));
            }
        }
        Scope::RestrictedToZone(zone) => {
            breakdown.insert(zone, ZoneBreakdown::empty(zone, known.get(&zone).copied()));
        }
    }

    for household in households {
        breakdown
            .entry(household.purok_id)
            .or_insert_with(|| {
                ZoneBreakdown::empty(household.purok_id, known.get(&household.purok_id).copied())
            })
            .households += 1;
    }

    for (zone, &count) in &tally.residents_by_zone {
        if let Some(entry) = breakdown.get_mut(zone) {
            entry.residents = count;
        }
    }

    breakdown.into_values().collect()
}
