//! Test fixtures and rollout helpers for onedee development.
//!
//! [`fixtures`] holds hand-checkable models beyond the reference library.
//! [`rollout`] drives any [`VecEnvironment`] through its buffer interface
//! and records every step, so integration tests can compare trajectories
//! without caring which environment produced them.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use onedee_core::{UsageError, VecEnvironment};

/// Per-step outputs of a rollout, indexed `[step][env]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rollout {
    pub observations: Vec<Vec<f32>>,
    pub rewards: Vec<Vec<f32>>,
    pub terminals: Vec<Vec<bool>>,
    pub resets: Vec<Vec<bool>>,
}

impl Rollout {
    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.rewards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Reward sequence of one instance.
    pub fn rewards_of(&self, env: usize) -> Vec<f32> {
        self.rewards.iter().map(|r| r[env]).collect()
    }

    /// Reset-flag sequence of one instance.
    pub fn resets_of(&self, env: usize) -> Vec<bool> {
        self.resets.iter().map(|r| r[env]).collect()
    }

    /// Sum of all rewards earned by one instance.
    pub fn total_reward(&self, env: usize) -> f32 {
        self.rewards.iter().map(|r| r[env]).sum()
    }

    /// Number of completed episodes for one instance.
    pub fn episodes(&self, env: usize) -> usize {
        self.terminals.iter().filter(|t| t[env]).count()
    }
}

/// Reset `env`, then step it `steps` times.
///
/// `policy(step, env_index)` picks each action. The reset itself is not
/// recorded.
pub fn rollout<E, P>(env: &mut E, steps: usize, mut policy: P) -> Result<Rollout, UsageError>
where
    E: VecEnvironment,
    P: FnMut(usize, usize) -> u32,
{
    let n = env.num_envs();
    let mut obs = vec![0.0f32; n * env.observation_size()];
    let mut rew = vec![0.0f32; n];
    let mut flags = vec![0u8; n];
    let mut actions = vec![0u32; n];
    let mut out = Rollout::default();

    env.reset_batch();
    for step in 0..steps {
        for (i, a) in actions.iter_mut().enumerate() {
            *a = policy(step, i);
        }
        env.step_batch(&actions)?;

        env.write_observations(&mut obs)?;
        env.write_rewards(&mut rew)?;
        out.observations.push(obs.clone());
        out.rewards.push(rew.clone());
        env.write_terminals(&mut flags)?;
        out.terminals.push(flags.iter().map(|&f| f != 0).collect());
        env.write_resets(&mut flags)?;
        out.resets.push(flags.iter().map(|&f| f != 0).collect());
    }
    Ok(out)
}

/// Rollout with the same action for every instance on every step.
pub fn constant_rollout<E: VecEnvironment>(
    env: &mut E,
    steps: usize,
    action: u32,
) -> Result<Rollout, UsageError> {
    rollout(env, steps, |_, _| action)
}
