//! Caller visibility scope
//!
//! Every report operation is parameterized by a [`Scope`] built once per
//! request from the caller's role and assigned purok. Role-based branching
//! happens here and nowhere else.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AnalyticsError, Result};
use crate::models::types::{PurokId, Role};

/// Which registry records a caller may see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "purok_id", rename_all = "snake_case")]
pub enum Scope {
    /// Every purok is visible
    Unrestricted,
    /// Only the given purok is visible
    RestrictedToZone(PurokId),
}

impl Scope {
    /// The purok this scope is limited to, if any
    #[must_use]
    pub const fn zone(self) -> Option<PurokId> {
        match self {
            Self::Unrestricted => None,
            Self::RestrictedToZone(zone) => Some(zone),
        }
    }

    /// Whether records located in `purok_id` are visible under this scope
    #[must_use]
    pub fn admits(self, purok_id: PurokId) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::RestrictedToZone(zone) => zone == purok_id,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrestricted => write!(f, "all puroks"),
            Self::RestrictedToZone(zone) => write!(f, "purok {zone}"),
        }
    }
}

/// The `(role, assigned purok)` pair handed over by the identity provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallerContext {
    /// Resolved role
    pub role: Role,
    /// Purok assigned to the caller, if any
    pub assigned_zone: Option<PurokId>,
}

impl CallerContext {
    /// Create a caller context
    #[must_use]
    pub const fn new(role: Role, assigned_zone: Option<PurokId>) -> Self {
        Self {
            role,
            assigned_zone,
        }
    }

    /// Build a caller context from the identity provider's raw role string
    ///
    /// # Errors
    /// Returns `UnknownRole` if the role is not recognized.
    pub fn parse(role: &str, assigned_zone: Option<PurokId>) -> Result<Self> {
        Ok(Self::new(role.parse()?, assigned_zone))
    }

    /// Resolve this caller's scope
    ///
    /// # Errors
    /// See [`ScopeResolver::resolve`].
    pub fn scope(&self) -> Result<Scope> {
        ScopeResolver::resolve(self.role, self.assigned_zone)
    }
}

/// Maps caller roles to visibility scopes
pub struct ScopeResolver;

impl ScopeResolver {
    /// Resolve the scope for a role and its assigned purok
    ///
    /// Unrestricted roles ignore the assigned purok. A purok leader without
    /// an assignment is a configuration error and is never widened.
    ///
    /// # Errors
    /// Returns `InvalidScopeConfiguration` for a restricted role with no
    /// assigned purok.
    pub fn resolve(role: Role, assigned_zone: Option<PurokId>) -> Result<Scope> {
        if !role.is_zone_restricted() {
            return Ok(Scope::Unrestricted);
        }

        assigned_zone
            .map(Scope::RestrictedToZone)
            .ok_or(AnalyticsError::InvalidScopeConfiguration { role })
    }
}
