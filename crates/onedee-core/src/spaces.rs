//! Action and observation space descriptors.
//!
//! These describe the shapes an external training loop should expect.
//! Every space is batched over agents; FSM environments have exactly one
//! agent per instance.

use std::fmt;

/// Discrete action space: each agent picks one of `n_actions` actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionSpace {
    /// Agents acting per instance.
    pub n_agents: usize,
    /// Number of discrete actions per agent.
    pub n_actions: usize,
}

impl ActionSpace {
    /// Multi-agent discrete space.
    pub fn multi_discrete(n_agents: usize, n_actions: usize) -> Self {
        Self {
            n_agents,
            n_actions,
        }
    }

    /// Whether `action` is a legal action.
    pub fn contains(&self, action: u32) -> bool {
        (action as usize) < self.n_actions
    }
}

impl fmt::Display for ActionSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MultiDiscrete({}, {})", self.n_agents, self.n_actions)
    }
}

/// Observation space of a single instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObservationSpace {
    /// One `dim`-length vector per agent.
    MultiVector {
        /// Agents observing per instance.
        n_agents: usize,
        /// Observation length.
        dim: usize,
    },
    /// No observation content (zero-dimensional states).
    Empty,
}

impl ObservationSpace {
    /// Pick [`MultiVector`](Self::MultiVector) or [`Empty`](Self::Empty)
    /// depending on `dim`.
    pub fn for_dim(n_agents: usize, dim: usize) -> Self {
        if dim == 0 {
            Self::Empty
        } else {
            Self::MultiVector { n_agents, dim }
        }
    }

    /// Flat element count per instance.
    pub fn flat_len(&self) -> usize {
        match self {
            Self::MultiVector { n_agents, dim } => n_agents * dim,
            Self::Empty => 0,
        }
    }
}

impl fmt::Display for ObservationSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MultiVector { n_agents, dim } => write!(f, "MultiVector({n_agents}, {dim})"),
            Self::Empty => write!(f, "MultiEmpty"),
        }
    }
}
