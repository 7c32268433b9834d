//! The compiled, immutable form of an FSM definition.

use std::fmt;

use indexmap::IndexSet;
use onedee_core::{ActionId, StateId};

/// Dense numeric tables produced by [`FsmBuilder::compile()`].
///
/// Layouts (row-major, flat):
///
/// | Table      | Shape                              |
/// |------------|------------------------------------|
/// | `obs`      | `[n_states, d_obs]`                |
/// | `trans`    | `[n_states, n_actions, n_states]`  |
/// | `reward`   | `[n_states, n_actions]`            |
/// | `terminal` | `[n_states]`                       |
/// | `origin`   | `[n_states]`                       |
///
/// Immutable after construction. Environments share one model through
/// an `Arc`.
///
/// [`FsmBuilder::compile()`]: crate::FsmBuilder::compile
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledModel {
    names: IndexSet<String>,
    d_obs: usize,
    n_actions: usize,
    obs: Vec<f32>,
    trans: Vec<f32>,
    reward: Vec<f32>,
    terminal: Vec<bool>,
    origin: Vec<bool>,
}

impl CompiledModel {
    /// Assemble a model from already-densified tables and derive the
    /// terminal and origin flags from `trans`.
    pub(crate) fn from_tables(
        names: IndexSet<String>,
        d_obs: usize,
        n_actions: usize,
        obs: Vec<f32>,
        trans: Vec<f32>,
        reward: Vec<f32>,
    ) -> Self {
        let n_states = names.len();
        debug_assert_eq!(obs.len(), n_states * d_obs);
        debug_assert_eq!(trans.len(), n_states * n_actions * n_states);
        debug_assert_eq!(reward.len(), n_states * n_actions);

        // Outgoing mass per source, incoming mass per destination.
        let mut outgoing = vec![0.0f64; n_states];
        let mut incoming = vec![0.0f64; n_states];
        for (row_idx, row) in trans.chunks(n_states.max(1)).enumerate() {
            let src = row_idx / n_actions;
            for (dst, &p) in row.iter().enumerate() {
                outgoing[src] += f64::from(p);
                incoming[dst] += f64::from(p);
            }
        }

        Self {
            names,
            d_obs,
            n_actions,
            obs,
            trans,
            reward,
            terminal: outgoing.iter().map(|&m| m == 0.0).collect(),
            origin: incoming.iter().map(|&m| m == 0.0).collect(),
        }
    }

    /// Number of states.
    pub fn n_states(&self) -> usize {
        self.names.len()
    }

    /// Number of discrete actions.
    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    /// Observation length shared by every state.
    pub fn d_obs(&self) -> usize {
        self.d_obs
    }

    /// Dense ID assigned to `name`, if the name was used.
    pub fn index_of(&self, name: &str) -> Option<StateId> {
        self.names.get_index_of(name).map(|i| StateId(i as u32))
    }

    /// Name of the state with the given ID.
    pub fn name_of(&self, id: StateId) -> Option<&str> {
        self.names.get_index(id.index()).map(String::as_str)
    }

    /// State names in ID order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Observation row for a state.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn observation(&self, id: StateId) -> &[f32] {
        let start = id.index() * self.d_obs;
        &self.obs[start..start + self.d_obs]
    }

    /// The flat `[n_states, d_obs]` observation table.
    pub fn obs_table(&self) -> &[f32] {
        &self.obs
    }

    /// Raw transition weights from `state` under `action`, one entry per
    /// destination state.
    ///
    /// # Panics
    ///
    /// Panics if `state` or `action` is out of range.
    pub fn transition_row(&self, state: StateId, action: ActionId) -> &[f32] {
        let n = self.n_states();
        let start = (state.index() * self.n_actions + action.index()) * n;
        &self.trans[start..start + n]
    }

    /// Stored probability of `from --action--> to`.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of range.
    pub fn probability(&self, from: StateId, action: ActionId, to: StateId) -> f32 {
        self.transition_row(from, action)[to.index()]
    }

    /// The flat `[n_states, n_actions, n_states]` transition tensor.
    pub fn trans_table(&self) -> &[f32] {
        &self.trans
    }

    /// Immediate reward for taking `action` in `state`.
    ///
    /// # Panics
    ///
    /// Panics if `state` or `action` is out of range.
    pub fn reward(&self, state: StateId, action: ActionId) -> f32 {
        self.reward[state.index() * self.n_actions + action.index()]
    }

    /// The flat `[n_states, n_actions]` reward table.
    pub fn reward_table(&self) -> &[f32] {
        &self.reward
    }

    /// Whether a state has zero outgoing probability mass.
    pub fn is_terminal(&self, id: StateId) -> bool {
        self.terminal[id.index()]
    }

    /// Whether a state has zero incoming probability mass.
    pub fn is_origin(&self, id: StateId) -> bool {
        self.origin[id.index()]
    }

    /// Per-state terminal flags in ID order.
    pub fn terminal_flags(&self) -> &[bool] {
        &self.terminal
    }

    /// Per-state origin flags in ID order.
    pub fn origin_flags(&self) -> &[bool] {
        &self.origin
    }

    /// IDs of all terminal states.
    pub fn terminal_states(&self) -> Vec<StateId> {
        flagged(&self.terminal)
    }

    /// IDs of all origin states.
    pub fn origin_states(&self) -> Vec<StateId> {
        flagged(&self.origin)
    }
}

fn flagged(flags: &[bool]) -> Vec<StateId> {
    flags
        .iter()
        .enumerate()
        .filter(|(_, f)| **f)
        .map(|(i, _)| StateId(i as u32))
        .collect()
}

impl fmt::Display for CompiledModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompiledModel({}s{}a)", self.n_states(), self.n_actions)
    }
}
