//! Strongly-typed identifiers for states and actions.

use std::fmt;

/// Dense index of a state within a compiled model.
///
/// States are assigned sequential IDs at compile time in order of first
/// mention. `StateId(0)` is the first declared state and serves as the
/// default entry state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(pub u32);

impl StateId {
    /// The state ID as a table index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for StateId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// A discrete action in `[0, n_actions)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub u32);

impl ActionId {
    /// The action ID as a table index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ActionId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
