//! Common domain type definitions
//!
//! This module contains the enum types and identifiers shared by the registry
//! models and the reporting layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalyticsError;

/// Identifier of a purok (administrative zone)
pub type PurokId = i64;
/// Identifier of a household
pub type HouseholdId = i64;
/// Identifier of a resident
pub type ResidentId = i64;

/// Sex of a resident as recorded in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    /// Male
    Male,
    /// Female
    Female,
    /// Unknown or not specified
    Unknown,
}

impl From<&str> for Sex {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Self::Male,
            "f" | "female" => Self::Female,
            _ => Self::Unknown,
        }
    }
}

impl Sex {
    /// Registry spelling of the value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Unknown => "unknown",
        }
    }
}

/// Occupation status as recorded in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupationStatus {
    /// Employed or self-employed
    Employed,
    /// Without work
    Unemployed,
    /// Enrolled student
    Student,
    /// Retired
    Retired,
    /// The registry's explicit "other" option
    Other,
    /// Missing or unrecognized value
    Unknown,
}

impl From<&str> for OccupationStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "employed" | "self-employed" | "self_employed" => Self::Employed,
            "unemployed" => Self::Unemployed,
            "student" => Self::Student,
            "retired" => Self::Retired,
            "other" => Self::Other,
            _ => Self::Unknown,
        }
    }
}

impl OccupationStatus {
    /// Registry spelling of the value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employed => "employed",
            Self::Unemployed => "unemployed",
            Self::Student => "student",
            Self::Retired => "retired",
            Self::Other => "other",
            Self::Unknown => "unknown",
        }
    }
}

/// Caller role as resolved by the identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrator
    Admin,
    /// Municipal staff with registry-wide visibility
    Secretary,
    /// Leader of a single purok
    PurokLeader,
}

impl Role {
    /// Whether this role is limited to a single purok
    #[must_use]
    pub const fn is_zone_restricted(self) -> bool {
        matches!(self, Self::PurokLeader)
    }

    /// Identity-provider spelling of the role
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Secretary => "secretary",
            Self::PurokLeader => "purok_leader",
        }
    }
}

impl FromStr for Role {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "admin" => Ok(Self::Admin),
            "secretary" => Ok(Self::Secretary),
            "purok_leader" => Ok(Self::PurokLeader),
            _ => Err(AnalyticsError::UnknownRole(s.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
