//! In-memory registry snapshot
//!
//! Holds puroks, households and residents in plain vectors. Used to embed
//! the engine behind another persistence layer, and as the fixture store in
//! tests.

use crate::error::Result;
use crate::models::types::PurokId;
use crate::models::{Household, Purok, Resident};
use crate::registry::{RegistryStore, ResidentQuery};

/// A registry held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    puroks: Vec<Purok>,
    households: Vec<Household>,
    residents: Vec<Resident>,
}

impl InMemoryRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from existing records
    #[must_use]
    pub const fn from_records(
        puroks: Vec<Purok>,
        households: Vec<Household>,
        residents: Vec<Resident>,
    ) -> Self {
        Self {
            puroks,
            households,
            residents,
        }
    }

    /// Add a purok
    #[must_use]
    pub fn with_purok(mut self, purok: Purok) -> Self {
        self.puroks.push(purok);
        self
    }

    /// Add a household
    #[must_use]
    pub fn with_household(mut self, household: Household) -> Self {
        self.households.push(household);
        self
    }

    /// Add a resident
    #[must_use]
    pub fn with_resident(mut self, resident: Resident) -> Self {
        self.residents.push(resident);
        self
    }

    /// All puroks, without cloning
    #[must_use]
    pub fn all_puroks(&self) -> &[Purok] {
        &self.puroks
    }

    /// All households, without cloning
    #[must_use]
    pub fn all_households(&self) -> &[Household] {
        &self.households
    }

    /// All residents, without cloning
    #[must_use]
    pub fn all_residents(&self) -> &[Resident] {
        &self.residents
    }
}

impl RegistryStore for InMemoryRegistry {
    fn puroks(&self) -> Result<Vec<Purok>> {
        Ok(self.puroks.clone())
    }

    fn households(&self, purok: Option<PurokId>) -> Result<Vec<Household>> {
        Ok(self
            .households
            .iter()
            .filter(|h| purok.is_none_or(|p| h.purok_id == p))
            .cloned()
            .collect())
    }

    fn residents(&self, query: &ResidentQuery) -> Result<Vec<Resident>> {
        Ok(self
            .residents
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect())
    }
}
