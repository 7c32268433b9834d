//! Environment configuration, validation, and error types.
//!
//! [`EnvConfig`] is the construction input for [`FsmEnv`](crate::FsmEnv).
//! [`validate()`](EnvConfig::validate) checks it against the compiled
//! model before any per-instance state is allocated.

use std::error::Error;
use std::fmt;

use onedee_core::StateId;
use onedee_fsm::CompiledModel;

// ── TransitionMode ─────────────────────────────────────────────────

/// How the next state is chosen from a transition row.
///
/// Rows hold raw, unnormalized weights. A row whose weights are all zero
/// (no transition declared for that action) leaves the instance where it
/// is in both modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransitionMode {
    /// Sample destinations in proportion to their weights.
    #[default]
    Stochastic,
    /// Take the highest-weight destination; ties go to the lowest index.
    /// Never consumes randomness.
    Deterministic,
}

impl fmt::Display for TransitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stochastic => write!(f, "stochastic"),
            Self::Deterministic => write!(f, "deterministic"),
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`EnvConfig::validate()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `n_envs` is zero.
    ZeroEnvs,
    /// `entry_state` does not name a state of the model.
    EntryStateOutOfRange {
        /// The configured entry state.
        entry: StateId,
        /// Number of states in the model.
        n_states: usize,
    },
    /// `entry_state` has no outgoing transitions, so instances could
    /// never leave it.
    TerminalEntryState {
        /// The configured entry state.
        entry: StateId,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroEnvs => write!(f, "n_envs must be at least 1"),
            Self::EntryStateOutOfRange { entry, n_states } => {
                write!(f, "entry state {entry} out of range (n_states={n_states})")
            }
            Self::TerminalEntryState { entry } => {
                write!(f, "entry state {entry} is terminal")
            }
        }
    }
}

impl Error for ConfigError {}

// ── EnvConfig ──────────────────────────────────────────────────────

/// Complete configuration for a batched FSM environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvConfig {
    /// Number of parallel instances. Default: 1. Minimum: 1.
    pub n_envs: usize,
    /// Seed for the per-instance random streams. Default: 0.
    pub seed: u64,
    /// Next-state selection rule. Default: [`TransitionMode::Stochastic`].
    pub transition_mode: TransitionMode,
    /// State every instance starts in and returns to after a terminal
    /// state. Default: `StateId(0)`, the first declared state.
    pub entry_state: StateId,
    /// Random stream of instance 0; instance `i` draws from stream
    /// `stream_offset + i`. An `n_envs = 1` environment with
    /// `stream_offset = i` replays instance `i` of a batch with the same
    /// seed. Default: 0.
    pub stream_offset: u64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            n_envs: 1,
            seed: 0,
            transition_mode: TransitionMode::Stochastic,
            entry_state: StateId(0),
            stream_offset: 0,
        }
    }
}

impl EnvConfig {
    /// Default configuration with `n_envs` instances.
    pub fn new(n_envs: usize) -> Self {
        Self {
            n_envs,
            ..Self::default()
        }
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the transition mode.
    pub fn with_mode(mut self, mode: TransitionMode) -> Self {
        self.transition_mode = mode;
        self
    }

    /// Set the entry state.
    pub fn with_entry(mut self, entry: StateId) -> Self {
        self.entry_state = entry;
        self
    }

    /// Set the stream of instance 0.
    pub fn with_stream_offset(mut self, offset: u64) -> Self {
        self.stream_offset = offset;
        self
    }

    /// Validate against the model the environment will run.
    pub fn validate(&self, model: &CompiledModel) -> Result<(), ConfigError> {
        if self.n_envs == 0 {
            return Err(ConfigError::ZeroEnvs);
        }
        if self.entry_state.index() >= model.n_states() {
            return Err(ConfigError::EntryStateOutOfRange {
                entry: self.entry_state,
                n_states: model.n_states(),
            });
        }
        if model.is_terminal(self.entry_state) {
            return Err(ConfigError::TerminalEntryState {
                entry: self.entry_state,
            });
        }
        Ok(())
    }
}
