//! Instances in one batch must not influence each other.

use std::sync::Arc;

use onedee_engine::{EnvConfig, FsmEnv, TransitionMode};
use onedee_fsm::{library, CompiledModel};
use onedee_test_utils::{fixtures, rollout, Rollout};
use proptest::prelude::*;

/// Run each column of `actions` (`[step][env]`) through its own
/// single-instance environment on the matching random stream.
fn solo_runs(model: &Arc<CompiledModel>, config: &EnvConfig, actions: &[Vec<u32>]) -> Vec<Rollout> {
    let n = actions.first().map_or(0, Vec::len);
    (0..n)
        .map(|i| {
            let solo = EnvConfig {
                n_envs: 1,
                stream_offset: config.stream_offset + i as u64,
                ..config.clone()
            };
            let mut env = FsmEnv::new(model.clone(), solo).unwrap();
            rollout(&mut env, actions.len(), |t, _| actions[t][i]).unwrap()
        })
        .collect()
}

fn batched_run(model: &Arc<CompiledModel>, config: &EnvConfig, actions: &[Vec<u32>]) -> Rollout {
    let mut env = FsmEnv::new(model.clone(), config.clone()).unwrap();
    rollout(&mut env, actions.len(), |t, i| actions[t][i]).unwrap()
}

fn assert_column_matches(batched: &Rollout, solo: &Rollout, i: usize, d_obs: usize) {
    assert_eq!(batched.rewards_of(i), solo.rewards_of(0));
    assert_eq!(batched.resets_of(i), solo.resets_of(0));
    for (b, s) in batched.observations.iter().zip(&solo.observations) {
        assert_eq!(&b[i * d_obs..(i + 1) * d_obs], s.as_slice());
    }
}

#[test]
fn stochastic_batches_match_solo_runs() {
    let model = Arc::new(library::coin_flip().unwrap());
    let config = EnvConfig::new(6).with_seed(99);
    let actions = vec![vec![0u32; 6]; 40];
    let batched = batched_run(&model, &config, &actions);
    for (i, solo) in solo_runs(&model, &config, &actions).iter().enumerate() {
        assert_column_matches(&batched, solo, i, 1);
    }
}

#[test]
fn two_instances_match_two_single_envs() {
    let model = Arc::new(library::coin_flip().unwrap());
    let mut pair = FsmEnv::new(model.clone(), EnvConfig::new(2).with_seed(1)).unwrap();
    let mut singles: Vec<FsmEnv> = (0..2)
        .map(|i| {
            let config = EnvConfig::new(1).with_seed(1).with_stream_offset(i);
            FsmEnv::new(model.clone(), config).unwrap()
        })
        .collect();
    for _ in 0..40 {
        let snap = pair.step(&[0, 0]).unwrap().clone();
        for (i, single) in singles.iter_mut().enumerate() {
            let solo = single.step(&[0]).unwrap();
            assert_eq!(snap.observation(i), solo.observation(0));
            assert_eq!(snap.rewards()[i], solo.rewards()[0]);
            assert_eq!(snap.resets()[i], solo.resets()[0]);
        }
    }
}

#[test]
fn offset_batch_continues_the_stream_sequence() {
    // Instances 2..4 of a 4-wide batch equal a 2-wide batch starting at stream 2.
    let model = Arc::new(fixtures::fork(1.0, 1.0));
    let actions = vec![vec![0u32; 4]; 30];
    let wide = batched_run(&model, &EnvConfig::new(4).with_seed(8), &actions);
    let tail_actions: Vec<Vec<u32>> = actions.iter().map(|a| a[2..].to_vec()).collect();
    let tail = batched_run(
        &model,
        &EnvConfig::new(2).with_seed(8).with_stream_offset(2),
        &tail_actions,
    );
    for (w, t) in wide.observations.iter().zip(&tail.observations) {
        assert_eq!(&w[2..], t.as_slice());
    }
}

#[test]
fn deterministic_mode_batches_match_solo_runs() {
    let model = Arc::new(fixtures::fork(2.0, 1.0));
    let config = EnvConfig::new(5)
        .with_seed(3)
        .with_mode(TransitionMode::Deterministic);
    let actions = vec![vec![0u32; 5]; 12];
    let batched = batched_run(&model, &config, &actions);
    for (i, solo) in solo_runs(&model, &config, &actions).iter().enumerate() {
        assert_column_matches(&batched, solo, i, 1);
    }
}

fn action_grid(n_actions: u32) -> impl Strategy<Value = Vec<Vec<u32>>> {
    (1usize..6, 1usize..30).prop_flat_map(move |(n_envs, steps)| {
        prop::collection::vec(prop::collection::vec(0..n_actions, n_envs), steps)
    })
}

proptest! {
    #[test]
    fn corridor_batches_match_solo_runs(actions in action_grid(2)) {
        // Every corridor row has a single outcome, so each instance is a
        // pure function of its own actions.
        let model = Arc::new(fixtures::corridor(5));
        let config = EnvConfig::new(actions[0].len());
        let batched = batched_run(&model, &config, &actions);
        for (i, solo) in solo_runs(&model, &config, &actions).iter().enumerate() {
            assert_column_matches(&batched, solo, i, model.d_obs());
        }
    }

    #[test]
    fn fork_batches_match_solo_runs(actions in action_grid(1), seed in any::<u64>()) {
        let model = Arc::new(fixtures::fork(1.0, 2.0));
        let config = EnvConfig::new(actions[0].len()).with_seed(seed);
        let batched = batched_run(&model, &config, &actions);
        for (i, solo) in solo_runs(&model, &config, &actions).iter().enumerate() {
            assert_column_matches(&batched, solo, i, 1);
        }
    }

    #[test]
    fn no_token_rests_on_a_terminal(actions in action_grid(2), seed in any::<u64>()) {
        let model = Arc::new(fixtures::corridor(4));
        let mut env = FsmEnv::new(model.clone(), EnvConfig::new(actions[0].len()).with_seed(seed)).unwrap();
        for step in &actions {
            let snap = env.step(step).unwrap().clone();
            prop_assert_eq!(snap.resets(), snap.terminals());
            for (i, &token) in env.tokens().iter().enumerate() {
                prop_assert!(!model.is_terminal(token.into()));
                if snap.resets()[i] {
                    prop_assert_eq!(token, env.config().entry_state.0);
                }
            }
        }
    }

    #[test]
    fn coin_flip_invariants_hold_for_any_seed(seed in any::<u64>(), n_envs in 1usize..16) {
        let model = Arc::new(library::coin_flip().unwrap());
        let mut env = FsmEnv::new(model.clone(), EnvConfig::new(n_envs).with_seed(seed)).unwrap();
        let actions = vec![0u32; n_envs];
        for _ in 0..10 {
            let snap = env.step(&actions).unwrap();
            for (r, &reset) in snap.rewards().iter().zip(snap.resets()) {
                // Only the move into `end` pays, and `end` is terminal.
                prop_assert_eq!(*r != 0.0, reset);
            }
        }
    }
}
