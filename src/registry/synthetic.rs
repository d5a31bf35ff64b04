//! Synthetic registry generation
//!
//! Builds a plausible registry from a seed, for demos, benchmarks and
//! exercising the Parquet layout without real data.

use std::fmt;
use std::ops::RangeInclusive;

use chrono::{Months, NaiveDate, NaiveDateTime, TimeDelta};
use rand::prelude::*;

use crate::models::{Household, OccupationStatus, Purok, Resident, Sex};
use crate::registry::InMemoryRegistry;

/// Oldest age a synthetic resident can have
const MAX_AGE_YEARS: u32 = 95;

/// Settings for [`generate_synthetic_registry`]
#[derive(Debug, Clone)]
pub struct SyntheticRegistryConfig {
    /// Number of puroks to create
    pub puroks: usize,
    /// Number of households to create, spread over the puroks
    pub households: usize,
    /// Residents per household (inclusive range)
    pub residents_per_household: RangeInclusive<usize>,
    /// How many months before `anchor` registrations are spread over
    pub registration_span_months: u32,
    /// Share of residents flagged as persons with disability
    pub pwd_rate: f64,
    /// Random seed; the same seed always yields the same registry
    pub seed: u64,
    /// Latest registration instant
    pub anchor: NaiveDateTime,
}

impl Default for SyntheticRegistryConfig {
    fn default() -> Self {
        Self {
            puroks: 7,
            households: 400,
            residents_per_household: 1..=6,
            registration_span_months: 24,
            pwd_rate: 0.04,
            seed: 42,
            anchor: chrono::Utc::now().naive_utc(),
        }
    }
}

impl fmt::Display for SyntheticRegistryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Synthetic Registry Configuration:")?;
        writeln!(f, "  Puroks: {}", self.puroks)?;
        writeln!(f, "  Households: {}", self.households)?;
        writeln!(
            f,
            "  Residents per household: {}..={}",
            self.residents_per_household.start(),
            self.residents_per_household.end()
        )?;
        writeln!(
            f,
            "  Registration span: {} months",
            self.registration_span_months
        )?;
        writeln!(f, "  PWD rate: {:.2}", self.pwd_rate)?;
        writeln!(f, "  Seed: {}", self.seed)?;
        write!(f, "  Anchor: {}", self.anchor)
    }
}

/// Generate a registry from a seeded random source
///
/// # Arguments
/// * `config` - Sizes, rates and seed of the registry to generate
///
/// # Returns
/// An in-memory registry. Identifiers start at 1 and are dense.
#[must_use]
pub fn generate_synthetic_registry(config: &SyntheticRegistryConfig) -> InMemoryRegistry {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let anchor = config.anchor;
    let span_start = anchor
        .checked_sub_months(Months::new(config.registration_span_months))
        .unwrap_or(anchor);
    let span_seconds = (anchor - span_start).num_seconds().max(1);
    let pwd_rate = probability(config.pwd_rate);

    let puroks: Vec<Purok> = (1..=config.puroks)
        .map(|n| Purok::new(n as i64, format!("Purok {n}"), format!("P{n}")))
        .collect();

    let mut households = Vec::with_capacity(config.households);
    let mut residents = Vec::new();
    let mut next_resident_id = 1i64;

    for household_id in 1..=config.households as i64 {
        let purok_id = if puroks.is_empty() {
            0
        } else {
            puroks[rng.random_range(0..puroks.len())].id
        };
        let created_at = span_start + TimeDelta::seconds(rng.random_range(0..span_seconds));
        households.push(Household::new(household_id, purok_id, created_at));

        let (low, high) = (
            *config.residents_per_household.start(),
            *config.residents_per_household.end(),
        );
        let size = if low > high {
            0
        } else {
            rng.random_range(low..=high)
        };

        for _ in 0..size {
            let registered = created_at
                + TimeDelta::seconds(rng.random_range(0..=(anchor - created_at).num_seconds().max(0)));
            let resident = Resident::new(
                next_resident_id,
                household_id,
                random_birthdate(&mut rng, anchor.date()),
                registered,
            )
            .with_sex(random_sex(&mut rng))
            .with_pwd(rng.random_bool(pwd_rate))
            .with_occupation(random_occupation(&mut rng));

            residents.push(resident);
            next_resident_id += 1;
        }
    }

    log::info!(
        "Generated synthetic registry: {} puroks, {} households, {} residents",
        puroks.len(),
        households.len(),
        residents.len()
    );

    InMemoryRegistry::from_records(puroks, households, residents)
}

/// Clamp a configured rate into `[0, 1]`; NaN counts as zero
fn probability(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}

fn random_birthdate(rng: &mut StdRng, today: NaiveDate) -> NaiveDate {
    let days_back = rng.random_range(0..=i64::from(MAX_AGE_YEARS) * 365);
    today - TimeDelta::days(days_back)
}

fn random_sex(rng: &mut StdRng) -> Sex {
    match rng.random_range(0..100) {
        0..49 => Sex::Male,
        49..98 => Sex::Female,
        _ => Sex::Unknown,
    }
}

fn random_occupation(rng: &mut StdRng) -> OccupationStatus {
    match rng.random_range(0..10) {
        0..4 => OccupationStatus::Employed,
        4..6 => OccupationStatus::Unemployed,
        6..8 => OccupationStatus::Student,
        8 => OccupationStatus::Retired,
        _ => OccupationStatus::Other,
    }
}
