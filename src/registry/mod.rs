//! Read-only access to the population registry
//!
//! The analytics engine never owns registry data. It reads through the
//! [`RegistryStore`] trait, whose implementations return an in-memory
//! snapshot consistent at the instant of each call. No cross-query
//! transactional consistency is assumed.

pub mod memory;
pub mod parquet;
pub mod synthetic;

use rustc_hash::FxHashSet;

use crate::algorithm::query::RegistrationWindow;
use crate::error::Result;
use crate::models::types::{HouseholdId, PurokId};
use crate::models::{Household, Purok, Resident};

pub use memory::InMemoryRegistry;
pub use self::parquet::{ParquetRegistry, write_registry};
pub use synthetic::{SyntheticRegistryConfig, generate_synthetic_registry};

/// Filter for resident listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidentQuery {
    /// Only residents of these households
    pub household_ids: Option<FxHashSet<HouseholdId>>,
    /// Only residents registered inside this window
    pub created_within: Option<RegistrationWindow>,
}

impl ResidentQuery {
    /// Residents of the given households
    #[must_use]
    pub fn for_households(household_ids: FxHashSet<HouseholdId>) -> Self {
        Self {
            household_ids: Some(household_ids),
            created_within: None,
        }
    }

    /// Narrow the query to a registration window
    #[must_use]
    pub fn created_within(mut self, window: Option<RegistrationWindow>) -> Self {
        self.created_within = window;
        self
    }

    /// Whether a resident passes the query
    #[must_use]
    pub fn matches(&self, resident: &Resident) -> bool {
        self.household_ids
            .as_ref()
            .is_none_or(|ids| ids.contains(&resident.household_id))
            && self
                .created_within
                .is_none_or(|window| window.contains(resident.created_at))
    }
}

/// Read-only registry queries consumed by the analytics engine
///
/// Failures must be reported as `RegistryUnavailable`; an implementation
/// must never return an empty listing in place of an error.
pub trait RegistryStore: Send + Sync {
    /// List all puroks
    fn puroks(&self) -> Result<Vec<Purok>>;

    /// List households, optionally limited to one purok
    fn households(&self, purok: Option<PurokId>) -> Result<Vec<Household>>;

    /// List residents matching a query
    fn residents(&self, query: &ResidentQuery) -> Result<Vec<Resident>>;
}

impl<T: RegistryStore + ?Sized> RegistryStore for std::sync::Arc<T> {
    fn puroks(&self) -> Result<Vec<Purok>> {
        (**self).puroks()
    }

    fn households(&self, purok: Option<PurokId>) -> Result<Vec<Household>> {
        (**self).households(purok)
    }

    fn residents(&self, query: &ResidentQuery) -> Result<Vec<Resident>> {
        (**self).residents(query)
    }
}
