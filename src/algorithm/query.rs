//! Immutable query specifications
//!
//! Each aggregation step receives a [`QuerySpec`] by value. Narrowing a spec
//! returns a new value, so one metric can never leak a filter into another.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::scope::Scope;

/// Half-open registration window `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationWindow {
    /// Inclusive start
    pub start: NaiveDateTime,
    /// Exclusive end
    pub end: NaiveDateTime,
}

impl RegistrationWindow {
    /// Create a window; `end` before `start` yields an empty window
    #[must_use]
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Whether an instant falls inside the window
    #[must_use]
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// What a single aggregation step is allowed to see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuerySpec {
    /// Visibility scope of the caller
    pub scope: Scope,
    /// Only count records registered inside this window
    pub registered_within: Option<RegistrationWindow>,
}

impl QuerySpec {
    /// A spec covering everything visible under `scope`
    #[must_use]
    pub const fn for_scope(scope: Scope) -> Self {
        Self {
            scope,
            registered_within: None,
        }
    }

    /// A copy of this spec narrowed to a registration window
    #[must_use]
    pub const fn registered_within(self, window: RegistrationWindow) -> Self {
        Self {
            scope: self.scope,
            registered_within: Some(window),
        }
    }

    /// Whether a record registered at `created_at` passes the window filter
    #[must_use]
    pub fn admits_registration(&self, created_at: NaiveDateTime) -> bool {
        self.registered_within
            .is_none_or(|window| window.contains(created_at))
    }
}
