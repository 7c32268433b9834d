//! Reference FSM models.
//!
//! Small, well-understood models for smoke-testing training loops:
//!
//! - [`unit_reward`]: one state, reward 1 forever.
//! - [`chain`]: walk down a line of `n` states, reward 1 at the end.
//! - [`coin_flip`]: one stochastic branch worth +1 or -1.

use onedee_core::DefinitionError;

use crate::builder::FsmBuilder;
use crate::model::CompiledModel;

/// Single state `start` with a self-loop on action 0 paying 1.
///
/// Never terminates. Observations are empty.
pub fn unit_reward() -> Result<CompiledModel, DefinitionError> {
    let mut b = FsmBuilder::new();
    b.declare_state("start", ())?.rewarded("start", 0, 1.0);
    b.compile()
}

/// A line of `n` states named `"0"` to `"n-1"`.
///
/// Action 0 moves state `i` to `i + 1`. Entering the last state pays 1;
/// every other move pays 0. The last state has no outgoing transitions,
/// so it is terminal and an episode lasts `n - 1` steps. State `i`
/// observes `i / n`.
///
/// # Errors
///
/// Returns [`DefinitionError::InvalidParameter`] if `n < 2`.
pub fn chain(n: usize) -> Result<CompiledModel, DefinitionError> {
    if n < 2 {
        return Err(DefinitionError::InvalidParameter {
            reason: format!("chain needs at least 2 states, got {n}"),
        });
    }
    let mut b = FsmBuilder::new();
    for i in 0..n {
        let h = b.declare_state(i.to_string(), i as f32 / n as f32)?;
        if i + 2 < n {
            h.to((i + 1).to_string(), 0);
        } else if i + 2 == n {
            h.rewarded((i + 1).to_string(), 0, 1.0);
        }
    }
    b.compile()
}

/// `start` branches on action 0 to `heads` or `tails` with equal weight.
///
/// `heads` then pays +1 and `tails` pays -1 on the way to the terminal
/// `end` state. Observations: `start` 0, `heads` +1, `tails` -1, `end` 0.
pub fn coin_flip() -> Result<CompiledModel, DefinitionError> {
    let mut b = FsmBuilder::new();
    b.declare_state("start", 0.0)?
        .add_transition("heads", 0, 0.0, 0.5)
        .add_transition("tails", 0, 0.0, 0.5);
    b.declare_state("heads", 1.0)?.rewarded("end", 0, 1.0);
    b.declare_state("tails", -1.0)?.rewarded("end", 0, -1.0);
    b.declare_state("end", 0.0)?;
    b.compile()
}

#[cfg(test)]
mod tests {
    use super::*;
    use onedee_core::{ActionId, StateId};

    #[test]
    fn unit_reward_shape() {
        let m = unit_reward().unwrap();
        assert_eq!(m.n_states(), 1);
        assert_eq!(m.n_actions(), 1);
        assert_eq!(m.d_obs(), 0);
        assert!(!m.is_terminal(StateId(0)));
        assert_eq!(m.reward(StateId(0), ActionId(0)), 1.0);
    }

    #[test]
    fn chain_structure() {
        let m = chain(4).unwrap();
        assert_eq!(m.n_states(), 4);
        assert_eq!(m.terminal_states(), vec![StateId(3)]);
        assert_eq!(m.origin_states(), vec![StateId(0)]);
        assert_eq!(m.reward(StateId(1), ActionId(0)), 0.0);
        assert_eq!(m.reward(StateId(2), ActionId(0)), 1.0);
        assert_eq!(m.observation(StateId(2)), &[0.5]);
        for i in 0..3 {
            assert_eq!(
                m.probability(StateId(i), ActionId(0), StateId(i + 1)),
                1.0
            );
        }
    }

    #[test]
    fn chain_of_two_pays_immediately() {
        let m = chain(2).unwrap();
        assert_eq!(m.reward(StateId(0), ActionId(0)), 1.0);
        assert!(m.is_terminal(StateId(1)));
    }

    #[test]
    fn chain_too_short() {
        assert!(matches!(
            chain(1),
            Err(DefinitionError::InvalidParameter { .. })
        ));
        assert!(chain(0).is_err());
    }

    #[test]
    fn coin_flip_branches() {
        let m = coin_flip().unwrap();
        let start = m.index_of("start").unwrap();
        let heads = m.index_of("heads").unwrap();
        let tails = m.index_of("tails").unwrap();
        let end = m.index_of("end").unwrap();
        assert_eq!(start, StateId(0));
        assert_eq!(m.probability(start, ActionId(0), heads), 0.5);
        assert_eq!(m.probability(start, ActionId(0), tails), 0.5);
        assert_eq!(m.reward(heads, ActionId(0)), 1.0);
        assert_eq!(m.reward(tails, ActionId(0)), -1.0);
        assert!(m.is_terminal(end));
        assert_eq!(m.origin_states(), vec![start]);
    }
}
