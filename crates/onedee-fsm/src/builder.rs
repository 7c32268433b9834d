//! Declarative FSM builder.
//!
//! ```
//! use onedee_fsm::FsmBuilder;
//!
//! let mut b = FsmBuilder::new();
//! b.declare_state("start", 0.0).unwrap().rewarded("goal", 0, 1.0);
//! b.declare_state("goal", 1.0).unwrap();
//! let model = b.compile().unwrap();
//! assert_eq!(model.n_states(), 2);
//! assert!(model.is_terminal(model.index_of("goal").unwrap()));
//! ```

use std::collections::BTreeSet;

use indexmap::IndexSet;
use onedee_core::{DefinitionError, Observation};

use crate::model::CompiledModel;

/// One declared edge, with both endpoints interned.
#[derive(Clone, Debug)]
struct TransitionDef {
    prev: usize,
    action: u32,
    next: usize,
    reward: f32,
    probability: f32,
}

/// Collects states and transitions, then compiles them into a
/// [`CompiledModel`].
///
/// State names receive dense IDs in order of first mention, whether that
/// mention is a [`declare_state`](Self::declare_state) call or a
/// transition endpoint. The first declared state therefore gets ID 0,
/// which environments use as the entry state by default.
#[derive(Clone, Debug, Default)]
pub struct FsmBuilder {
    names: IndexSet<String>,
    /// Parallel to `names`; `None` until the state is declared.
    observations: Vec<Option<Observation>>,
    transitions: Vec<TransitionDef>,
}

/// Handle to a declared state, used to chain outgoing transitions.
///
/// Borrows the builder mutably, so it must be dropped before the next
/// `declare_state` call.
pub struct StateHandle<'b> {
    builder: &'b mut FsmBuilder,
    state: usize,
}

impl FsmBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, name: &str) -> usize {
        if let Some(idx) = self.names.get_index_of(name) {
            return idx;
        }
        let (idx, _) = self.names.insert_full(name.to_string());
        self.observations.push(None);
        idx
    }

    /// Register a state with its observation.
    ///
    /// Scalars become single-element observations and `()` the empty one.
    /// A state that was already mentioned by a transition can still be
    /// declared here.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::DuplicateState`] if `name` already has an
    /// observation.
    pub fn declare_state(
        &mut self,
        name: impl AsRef<str>,
        observation: impl Into<Observation>,
    ) -> Result<StateHandle<'_>, DefinitionError> {
        let name = name.as_ref();
        let state = self.intern(name);
        if self.observations[state].is_some() {
            return Err(DefinitionError::DuplicateState {
                name: name.to_string(),
            });
        }
        self.observations[state] = Some(observation.into());
        Ok(StateHandle {
            builder: self,
            state,
        })
    }

    /// Handle for adding transitions out of `name` without declaring its
    /// observation. The state must still be declared before compiling.
    pub fn transitions_from(&mut self, name: impl AsRef<str>) -> StateHandle<'_> {
        let state = self.intern(name.as_ref());
        StateHandle {
            builder: self,
            state,
        }
    }

    /// Number of distinct state names mentioned so far.
    pub fn state_count(&self) -> usize {
        self.names.len()
    }

    /// Number of transitions added so far.
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Validate the definition and build the dense tables.
    ///
    /// Checks, in order:
    /// 1. at least one transition exists;
    /// 2. the action set is exactly `{0, ..., max}`;
    /// 3. all observations share one length;
    /// 4. every mentioned state has an observation;
    /// 5. probabilities are finite and non-negative, rewards finite.
    ///
    /// Repeated `(prev, action, next)` edges overwrite the stored
    /// probability, and repeated `(prev, action)` pairs overwrite the
    /// stored reward; the last one added wins.
    pub fn compile(&self) -> Result<CompiledModel, DefinitionError> {
        if self.transitions.is_empty() {
            return Err(DefinitionError::NoTransitions);
        }

        let actions: BTreeSet<u32> = self.transitions.iter().map(|t| t.action).collect();
        let n_actions = actions.len();
        if actions.iter().enumerate().any(|(i, &a)| a as usize != i) {
            return Err(DefinitionError::NonContiguousActions {
                declared: actions.into_iter().collect(),
            });
        }

        let mut d_obs = None;
        for (idx, obs) in self.observations.iter().enumerate() {
            let Some(obs) = obs else { continue };
            match d_obs {
                None => d_obs = Some(obs.len()),
                Some(expected) if expected != obs.len() => {
                    return Err(DefinitionError::InconsistentObservationLength {
                        expected,
                        state: self.names[idx].clone(),
                        found: obs.len(),
                    });
                }
                Some(_) => {}
            }
        }

        if let Some(idx) = self.observations.iter().position(Option::is_none) {
            return Err(DefinitionError::MissingObservation {
                state: self.names[idx].clone(),
            });
        }
        // Every name has an observation from here on, and there is at least
        // one name because there is at least one transition.
        let d_obs = d_obs.unwrap_or(0);

        for t in &self.transitions {
            if !t.probability.is_finite() || t.probability < 0.0 {
                return Err(DefinitionError::InvalidProbability {
                    state: self.names[t.prev].clone(),
                    action: t.action,
                    value: t.probability,
                });
            }
            if !t.reward.is_finite() {
                return Err(DefinitionError::InvalidReward {
                    state: self.names[t.prev].clone(),
                    action: t.action,
                    value: t.reward,
                });
            }
        }

        let n_states = self.names.len();
        if u32::try_from(n_states).is_err() {
            return Err(DefinitionError::TooManyStates { count: n_states });
        }

        let mut obs = Vec::with_capacity(n_states * d_obs);
        for o in self.observations.iter().flatten() {
            obs.extend_from_slice(o.as_slice());
        }

        let mut trans = vec![0.0f32; n_states * n_actions * n_states];
        let mut reward = vec![0.0f32; n_states * n_actions];
        for t in &self.transitions {
            let row = t.prev * n_actions + t.action as usize;
            trans[row * n_states + t.next] = t.probability;
            reward[row] = t.reward;
        }

        let model = CompiledModel::from_tables(
            self.names.clone(),
            d_obs,
            n_actions,
            obs,
            trans,
            reward,
        );
        tracing::debug!(
            n_states,
            n_actions,
            d_obs,
            transitions = self.transitions.len(),
            terminal = model.terminal_states().len(),
            origin = model.origin_states().len(),
            "compiled FSM model"
        );
        Ok(model)
    }
}

impl StateHandle<'_> {
    /// Name of the state this handle adds transitions from.
    pub fn name(&self) -> &str {
        &self.builder.names[self.state]
    }

    /// Append `self --action--> to` with the given reward and probability.
    ///
    /// `probability` is a raw weight: weights sharing a `(state, action)`
    /// pair are not required to sum to 1.
    pub fn add_transition(
        self,
        to: impl AsRef<str>,
        action: u32,
        reward: f32,
        probability: f32,
    ) -> Self {
        let next = self.builder.intern(to.as_ref());
        self.builder.transitions.push(TransitionDef {
            prev: self.state,
            action,
            next,
            reward,
            probability,
        });
        self
    }

    /// Append a certain (probability 1), reward-free transition.
    pub fn to(self, to: impl AsRef<str>, action: u32) -> Self {
        self.add_transition(to, action, 0.0, 1.0)
    }

    /// Append a certain (probability 1) transition paying `reward`.
    pub fn rewarded(self, to: impl AsRef<str>, action: u32, reward: f32) -> Self {
        self.add_transition(to, action, reward, 1.0)
    }
}
