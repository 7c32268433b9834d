//! Reusable FSM model fixtures.
//!
//! Small models whose behavior is easy to predict by hand:
//!
//! - [`ring`]: `n` states in a cycle, never terminates.
//! - [`fork`]: one weighted branch, then back to the root.
//! - [`corridor`]: two actions (left/right) along a line to a terminal goal.

use onedee_core::Observation;
use onedee_fsm::{CompiledModel, FsmBuilder};

/// `n` states `"r0"`..`"r{n-1}"` where action 0 advances one position.
///
/// Wrapping from the last state to the first pays 1. No state is
/// terminal. State `i` observes `[i]`.
///
/// # Panics
///
/// Panics if `n == 0`.
pub fn ring(n: usize) -> CompiledModel {
    assert!(n > 0, "ring needs at least one state");
    let mut b = FsmBuilder::new();
    for i in 0..n {
        let next = (i + 1) % n;
        let reward = if next == 0 { 1.0 } else { 0.0 };
        b.declare_state(format!("r{i}"), i as f32)
            .expect("ring state names are unique")
            .rewarded(format!("r{next}"), 0, reward);
    }
    b.compile().expect("ring fixture compiles")
}

/// `root` goes to `left` or `right` on action 0 with the given raw
/// weights; both return to `root` on action 0 for free.
///
/// Observations: `root` 0, `left` -1, `right` +1. Nothing is terminal,
/// so the state reached after one step is visible in the observation.
pub fn fork(left_weight: f32, right_weight: f32) -> CompiledModel {
    let mut b = FsmBuilder::new();
    b.declare_state("root", 0.0)
        .expect("fresh builder")
        .add_transition("left", 0, 0.0, left_weight)
        .add_transition("right", 0, 0.0, right_weight);
    b.declare_state("left", -1.0).expect("fresh name").to("root", 0);
    b.declare_state("right", 1.0).expect("fresh name").to("root", 0);
    b.compile().expect("fork fixture compiles")
}

/// A line of `len` cells. Action 0 steps left (clamped at cell 0), action
/// 1 steps right; every move costs 0.1 and reaching the last cell pays 1.
///
/// The last cell is terminal. Observations are two-dimensional:
/// `[position / (len - 1), 1.0 if at the wall else 0.0]`.
///
/// # Panics
///
/// Panics if `len < 2`.
pub fn corridor(len: usize) -> CompiledModel {
    assert!(len >= 2, "corridor needs at least two cells");
    let last = len - 1;
    let name = |i: usize| format!("c{i}");
    let mut b = FsmBuilder::new();
    for i in 0..len {
        let obs: Observation = [i as f32 / last as f32, if i == 0 { 1.0 } else { 0.0 }].into();
        let handle = b.declare_state(name(i), obs).expect("cell names are unique");
        if i == last {
            continue;
        }
        let left = i.saturating_sub(1);
        let right_reward = if i + 1 == last { 1.0 } else { -0.1 };
        handle
            .rewarded(name(left), 0, -0.1)
            .rewarded(name(i + 1), 1, right_reward);
    }
    b.compile().expect("corridor fixture compiles")
}

#[cfg(test)]
mod tests {
    use super::*;
    use onedee_core::StateId;

    #[test]
    fn ring_has_no_terminals() {
        let m = ring(4);
        assert_eq!(m.n_states(), 4);
        assert!(m.terminal_states().is_empty());
    }

    #[test]
    fn fork_shape() {
        let m = fork(1.0, 3.0);
        assert_eq!(m.n_states(), 3);
        assert_eq!(m.observation(StateId(1)), &[-1.0]);
    }

    #[test]
    fn corridor_goal_is_terminal() {
        let m = corridor(3);
        assert_eq!(m.n_actions(), 2);
        assert_eq!(m.d_obs(), 2);
        assert!(m.is_terminal(StateId(2)));
        assert!(!m.is_terminal(StateId(0)));
    }
}
