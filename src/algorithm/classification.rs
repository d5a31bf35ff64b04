//! Resident classification rules
//!
//! Pure functions mapping a resident and a reference instant to an age
//! cohort and a set of vulnerability flags. Nothing here touches shared
//! state, so classification is safe to run concurrently and in bulk.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::Resident;
use crate::models::types::{OccupationStatus, Sex};

/// Age (whole years) at which a resident stops being an infant
pub const CHILD_MIN_AGE: u32 = 1;
/// Age at which a resident becomes an adult
pub const ADULT_MIN_AGE: u32 = 18;
/// Age at which a resident becomes a senior
pub const SENIOR_MIN_AGE: u32 = 60;

/// Age-derived classification bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cohort {
    /// Younger than one year
    Infant,
    /// 1 to 17 years
    Child,
    /// 18 to 59 years
    Adult,
    /// 60 years and older
    Senior,
}

impl Cohort {
    /// Cohort for an age in whole years
    ///
    /// Lower bounds are inclusive: a resident turning 60 on the reference
    /// date is a senior from that date on.
    #[must_use]
    pub const fn from_age(age: u32) -> Self {
        if age >= SENIOR_MIN_AGE {
            Self::Senior
        } else if age >= ADULT_MIN_AGE {
            Self::Adult
        } else if age >= CHILD_MIN_AGE {
            Self::Child
        } else {
            Self::Infant
        }
    }
}

/// Per-resident vulnerability markers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityFlags {
    /// Cohort is senior
    pub is_senior: bool,
    /// Registered person with disability
    pub is_pwd: bool,
    /// Placeholder pregnancy indicator, see [`pregnancy_proxy_placeholder`]
    pub is_pregnant_proxy: bool,
    /// Cohort is infant
    pub is_infant: bool,
}

impl VulnerabilityFlags {
    /// Whether any flag is set
    #[must_use]
    pub const fn any(&self) -> bool {
        self.is_senior || self.is_pwd || self.is_pregnant_proxy || self.is_infant
    }
}

/// Result of classifying one resident
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Age in whole years at the reference instant
    pub age: u32,
    /// Age cohort
    pub cohort: Cohort,
    /// Vulnerability flags
    pub flags: VulnerabilityFlags,
}

/// Placeholder pregnancy rule: female residents with occupation "other".
///
/// The registry has no pregnancy field. This heuristic is a known
/// business-rule gap kept as-is until one exists; it is not a real
/// pregnancy indicator and also matches infants.
#[must_use]
pub fn pregnancy_proxy_placeholder(resident: &Resident) -> bool {
    resident.sex == Sex::Female && resident.occupation_status == OccupationStatus::Other
}

/// Classify a resident at a reference instant
#[must_use]
pub fn classify(resident: &Resident, reference_instant: NaiveDateTime) -> Classification {
    let age = resident.age_at(reference_instant.date());
    let cohort = Cohort::from_age(age);

    Classification {
        age,
        cohort,
        flags: VulnerabilityFlags {
            is_senior: cohort == Cohort::Senior,
            is_pwd: resident.is_pwd,
            is_pregnant_proxy: pregnancy_proxy_placeholder(resident),
            is_infant: cohort == Cohort::Infant,
        },
    }
}
