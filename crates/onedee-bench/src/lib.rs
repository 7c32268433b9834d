//! Benchmark profiles and utilities for the onedee FSM engine.
//!
//! Provides pre-built model/config pairs for benchmarking and examples:
//!
//! - [`reference_profile`]: `Chain(16)` across 1024 instances
//! - [`stress_profile`]: 512-state random branching model across 4096 instances
//! - [`random_model`]: seeded random FSM with a fixed branching factor
//! - [`policy_actions`]: deterministic per-step action vectors

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Arc;

use onedee_core::DefinitionError;
use onedee_engine::EnvConfig;
use onedee_fsm::{library, CompiledModel, FsmBuilder};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Build the reference benchmark profile: `Chain(16)` × 1024 instances.
///
/// Every row has one outcome, so the step loop never draws randomness.
pub fn reference_profile(seed: u64) -> Result<(Arc<CompiledModel>, EnvConfig), DefinitionError> {
    let model = library::chain(16)?;
    Ok((Arc::new(model), EnvConfig::new(1024).with_seed(seed)))
}

/// Build the stress profile: 512 states, 4 actions, 4 outcomes per row,
/// × 4096 instances.
pub fn stress_profile(seed: u64) -> Result<(Arc<CompiledModel>, EnvConfig), DefinitionError> {
    let model = random_model(512, 4, 4, seed)?;
    Ok((Arc::new(model), EnvConfig::new(4096).with_seed(seed)))
}

/// Generate a random FSM.
///
/// Each `(state, action)` pair gets `branching` outcomes with random
/// weights and a reward in `[-1, 1)`. The last state is left without
/// outgoing edges so episodes terminate. Observations are
/// `[i / n_states]`.
pub fn random_model(
    n_states: usize,
    n_actions: u32,
    branching: usize,
    seed: u64,
) -> Result<CompiledModel, DefinitionError> {
    random_builder(n_states, n_actions, branching, seed)?.compile()
}

/// The uncompiled builder behind [`random_model`].
pub fn random_builder(
    n_states: usize,
    n_actions: u32,
    branching: usize,
    seed: u64,
) -> Result<FsmBuilder, DefinitionError> {
    if n_states < 2 || n_actions == 0 || branching == 0 {
        return Err(DefinitionError::InvalidParameter {
            reason: format!(
                "random model needs n_states >= 2, n_actions >= 1, branching >= 1 \
                 (got {n_states}, {n_actions}, {branching})"
            ),
        });
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut b = FsmBuilder::new();
    for i in 0..n_states {
        b.declare_state(format!("s{i}"), i as f32 / n_states as f32)?;
    }
    for i in 0..n_states - 1 {
        for action in 0..n_actions {
            let reward: f32 = rng.random_range(-1.0..1.0);
            let mut handle = b.transitions_from(format!("s{i}"));
            for _ in 0..branching {
                let to = rng.random_range(0..n_states);
                let weight: f32 = rng.random_range(0.1..1.0);
                handle = handle.add_transition(format!("s{to}"), action, reward, weight);
            }
        }
    }
    Ok(b)
}

/// Deterministic action vector for step `t`.
///
/// A cheap hash of `(seed, t, i)` so benchmarks spend their time in the
/// engine, not in action generation.
pub fn policy_actions(n_envs: usize, n_actions: u32, seed: u64, t: u64) -> Vec<u32> {
    (0..n_envs as u64)
        .map(|i| {
            let h = seed
                .wrapping_mul(0x9E37_79B9_7F4A_7C15)
                .wrapping_add(t.wrapping_mul(0xBF58_476D_1CE4_E5B9))
                .wrapping_add(i.wrapping_mul(0x94D0_49BB_1331_11EB));
            ((h >> 33) % u64::from(n_actions)) as u32
        })
        .collect()
}
