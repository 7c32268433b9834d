//! End-to-end lockstep RL loop example.
//!
//! Demonstrates: build profile → FsmEnv → choose actions → step → read
//! observations/rewards through the `VecEnvironment` buffers → reset →
//! repeat, with a tabular Q-learning agent per state.

use onedee_bench::stress_profile;
use onedee_core::VecEnvironment;
use onedee_engine::FsmEnv;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const EPISODE_STEPS: usize = 200;
const EPISODES: usize = 5;
const ALPHA: f32 = 0.1;
const GAMMA: f32 = 0.95;
const EPSILON: f64 = 0.1;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== onedee Lockstep RL Example ===\n");

    let (model, config) = stress_profile(42)?;
    let n_states = model.n_states();
    let mut env = FsmEnv::new(model, config)?;
    let n_envs = env.num_envs();
    let n_actions = env.num_actions();
    println!(
        "Environment: {env}, {n_envs} instances, action space {}, observation space {}\n",
        env.action_space(),
        env.observation_space(),
    );

    let mut q = vec![0.0f32; n_states * n_actions];
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut actions = vec![0u32; n_envs];
    let mut rewards = vec![0.0f32; n_envs];
    let mut resets = vec![0u8; n_envs];

    for episode in 0..EPISODES {
        env.reset_batch();
        let mut total_reward = 0.0f64;

        for _ in 0..EPISODE_STEPS {
            let before = env.tokens().to_vec();
            for (a, &s) in actions.iter_mut().zip(&before) {
                *a = if rng.random_bool(EPSILON) {
                    rng.random_range(0..n_actions as u32)
                } else {
                    greedy(&q[s as usize * n_actions..][..n_actions])
                };
            }

            env.step_batch(&actions)?;
            env.write_rewards(&mut rewards)?;
            env.write_resets(&mut resets)?;

            for i in 0..n_envs {
                let s = before[i] as usize;
                let a = actions[i] as usize;
                let target = if resets[i] != 0 {
                    rewards[i]
                } else {
                    let next = env.tokens()[i] as usize;
                    let best = q[next * n_actions..][..n_actions]
                        .iter()
                        .copied()
                        .fold(f32::NEG_INFINITY, f32::max);
                    rewards[i] + GAMMA * best
                };
                let cell = &mut q[s * n_actions + a];
                *cell += ALPHA * (target - *cell);
                total_reward += f64::from(rewards[i]);
            }
        }

        let metrics = env.last_metrics();
        println!(
            "  episode {}: mean_return={:>8.3}, episodes_so_far={:>6}, last_step={:>5}μs",
            episode + 1,
            total_reward / n_envs as f64,
            metrics.total_episodes,
            metrics.total_us,
        );
    }

    println!("\nDone.");
    Ok(())
}

fn greedy(row: &[f32]) -> u32 {
    let mut best = 0;
    for (a, &v) in row.iter().enumerate() {
        if v > row[best] {
            best = a;
        }
    }
    best as u32
}
