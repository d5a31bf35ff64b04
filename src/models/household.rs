//! Household and purok models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::types::{HouseholdId, PurokId};

/// An administrative zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purok {
    /// Registry identifier
    pub id: PurokId,
    /// Display name
    pub name: String,
    /// Short code used on documents
    pub code: String,
}

impl Purok {
    /// Create a purok
    pub fn new(id: PurokId, name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            code: code.into(),
        }
    }
}

/// A registered household
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Household {
    /// Registry identifier
    pub id: HouseholdId,
    /// Purok the household is located in
    pub purok_id: PurokId,
    /// When the household was registered
    pub created_at: NaiveDateTime,
}

impl Household {
    /// Create a household
    #[must_use]
    pub const fn new(id: HouseholdId, purok_id: PurokId, created_at: NaiveDateTime) -> Self {
        Self {
            id,
            purok_id,
            created_at,
        }
    }
}
