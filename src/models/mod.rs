//! Registry domain models
//!
//! Read-only views of the records the analytics engine consumes: puroks,
//! households and residents, plus the shared enum types.

pub mod household;
pub mod resident;
pub mod types;

pub use household::{Household, Purok};
pub use resident::Resident;
pub use types::{HouseholdId, OccupationStatus, PurokId, ResidentId, Role, Sex};
