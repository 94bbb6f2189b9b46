//! Strongly-typed run and event identifiers.

use std::fmt;

/// Identifies one event within a run.
///
/// Assigned by the transport kernel in increasing order. `EventId(0)` is
/// the first event of a run and triggers header emission in persisted
/// tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub u64);

impl EventId {
    /// The first event of a run.
    pub const FIRST: Self = Self(0);

    /// Whether this is the first event of a run.
    pub fn is_first(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EventId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies a run (a batch of events sharing cumulative statistics).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(pub u32);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for RunId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
