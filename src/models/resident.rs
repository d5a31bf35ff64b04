//! Resident entity model
//!
//! A resident is a person registered under a household. The analytics engine
//! treats residents as immutable, read-only records owned by the registry.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::types::{HouseholdId, OccupationStatus, ResidentId, Sex};

/// A registered resident
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resident {
    /// Registry identifier
    pub id: ResidentId,
    /// Household the resident belongs to
    pub household_id: HouseholdId,
    /// Date of birth
    pub birthdate: NaiveDate,
    /// Recorded sex
    pub sex: Sex,
    /// Whether the resident is registered as a person with disability
    pub is_pwd: bool,
    /// Recorded occupation status
    pub occupation_status: OccupationStatus,
    /// When the resident was registered
    pub created_at: NaiveDateTime,
}

impl Resident {
    /// Create a resident with default status fields
    ///
    /// Sex is `Unknown`, occupation `Unknown` and `is_pwd` false; use the
    /// `with_*` methods to fill them in.
    #[must_use]
    pub const fn new(
        id: ResidentId,
        household_id: HouseholdId,
        birthdate: NaiveDate,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            household_id,
            birthdate,
            sex: Sex::Unknown,
            is_pwd: false,
            occupation_status: OccupationStatus::Unknown,
            created_at,
        }
    }

    /// Set the recorded sex
    #[must_use]
    pub const fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = sex;
        self
    }

    /// Set the disability flag
    #[must_use]
    pub const fn with_pwd(mut self, is_pwd: bool) -> Self {
        self.is_pwd = is_pwd;
        self
    }

    /// Set the occupation status
    #[must_use]
    pub const fn with_occupation(mut self, status: OccupationStatus) -> Self {
        self.occupation_status = status;
        self
    }

    /// Age in whole years at a reference date
    ///
    /// The year is counted once the birthday has been reached on the
    /// reference date. A birthdate after the reference date yields 0.
    #[must_use]
    pub fn age_at(&self, reference_date: NaiveDate) -> u32 {
        if reference_date < self.birthdate {
            return 0;
        }

        let years = reference_date.year() - self.birthdate.year();
        // Adjust for birthday not yet reached in the reference year
        let years = if (reference_date.month(), reference_date.day())
            < (self.birthdate.month(), self.birthdate.day())
        {
            years - 1
        } else {
            years
        };

        u32::try_from(years).unwrap_or(0)
    }
}
