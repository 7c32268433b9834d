//! Error types for the onedee framework.
//!
//! Split by phase: [`DefinitionError`] for problems found while declaring
//! or compiling an FSM, [`UsageError`] for bad arguments handed to a
//! running environment. Neither is retryable; both leave the affected
//! object unchanged.

use std::error::Error;
use std::fmt;

/// Errors detected while declaring or compiling an FSM definition.
///
/// All variants are fatal: compilation never returns a partial model.
#[derive(Clone, Debug, PartialEq)]
pub enum DefinitionError {
    /// A state was declared with an observation twice.
    DuplicateState {
        /// Name of the state.
        name: String,
    },
    /// The builder holds no transitions, so the action set is empty.
    NoTransitions,
    /// Declared actions are not exactly `{0, ..., max}`.
    NonContiguousActions {
        /// The sorted, de-duplicated action IDs that were declared.
        declared: Vec<u32>,
    },
    /// Observation vectors differ in length.
    InconsistentObservationLength {
        /// Length of the first declared observation.
        expected: usize,
        /// The state whose observation disagrees.
        state: String,
        /// Length of that state's observation.
        found: usize,
    },
    /// A transition references a state that was never declared with an
    /// observation.
    MissingObservation {
        /// Name of the undeclared state.
        state: String,
    },
    /// A transition probability is negative, NaN, or infinite.
    InvalidProbability {
        /// Source state of the offending transition.
        state: String,
        /// Action of the offending transition.
        action: u32,
        /// The rejected value.
        value: f32,
    },
    /// A transition reward is NaN or infinite.
    InvalidReward {
        /// Source state of the offending transition.
        state: String,
        /// Action of the offending transition.
        action: u32,
        /// The rejected value.
        value: f32,
    },
    /// A model factory received an argument it cannot use.
    InvalidParameter {
        /// Description of the problem.
        reason: String,
    },
    /// More states than a [`StateId`](crate::StateId) can address.
    TooManyStates {
        /// Number of distinct state names.
        count: usize,
    },
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateState { name } => {
                write!(f, "state '{name}' already has an observation")
            }
            Self::NoTransitions => write!(f, "no transitions declared"),
            Self::NonContiguousActions { declared } => {
                write!(f, "action set {declared:?} is not contiguous from 0")
            }
            Self::InconsistentObservationLength {
                expected,
                state,
                found,
            } => write!(
                f,
                "state '{state}' has observation length {found}, expected {expected}"
            ),
            Self::MissingObservation { state } => {
                write!(f, "state '{state}' is referenced but has no observation")
            }
            Self::InvalidProbability {
                state,
                action,
                value,
            } => write!(
                f,
                "transition from '{state}' on action {action} has invalid probability {value}"
            ),
            Self::InvalidReward {
                state,
                action,
                value,
            } => write!(
                f,
                "transition from '{state}' on action {action} has non-finite reward {value}"
            ),
            Self::InvalidParameter { reason } => write!(f, "invalid parameter: {reason}"),
            Self::TooManyStates { count } => {
                write!(f, "{count} states exceeds the addressable maximum")
            }
        }
    }
}

impl Error for DefinitionError {}

/// Errors from invalid arguments passed to a running environment.
///
/// Returned before any instance is advanced, so the environment is
/// left exactly as it was before the call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UsageError {
    /// An action is outside `[0, n_actions)`.
    InvalidAction {
        /// Index of the instance that received the action.
        env_index: usize,
        /// The rejected action.
        action: u32,
        /// Number of actions the model defines.
        n_actions: usize,
    },
    /// The action vector length does not match `n_envs`.
    ActionCountMismatch {
        /// Number of parallel instances.
        expected: usize,
        /// Number of actions supplied.
        found: usize,
    },
    /// A caller-owned output buffer cannot hold the batch.
    BufferTooSmall {
        /// Required number of elements.
        expected: usize,
        /// Length of the supplied buffer.
        found: usize,
    },
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAction {
                env_index,
                action,
                n_actions,
            } => write!(
                f,
                "env {env_index}: action {action} out of range (n_actions={n_actions})"
            ),
            Self::ActionCountMismatch { expected, found } => {
                write!(f, "got {found} actions, expected {expected}")
            }
            Self::BufferTooSmall { expected, found } => {
                write!(f, "output buffer too small: {found} < {expected}")
            }
        }
    }
}

impl Error for UsageError {}
