//! onedee Quickstart: define a small FSM and drive a batch of it.
//!
//! Demonstrates:
//!   1. Declaring states and transitions with `FsmBuilder`
//!   2. Compiling and inspecting the model
//!   3. Building a batched `FsmEnv` and stepping it with per-instance actions
//!   4. Auto-reset on terminal states, metrics, and explicit reset
//!   5. Creating a reference environment through the registry
//!
//! Run with:
//!   cargo run --example quickstart

use std::sync::Arc;

use onedee_engine::{EnvConfig, EnvRegistry, FsmEnv, ModelArgs};
use onedee_fsm::FsmBuilder;

// ─── Batch parameters ───────────────────────────────────────────

const N_ENVS: usize = 4;
const STEPS: usize = 12;

// Action labels for the tiny maze below.
const WAIT: u32 = 0;
const GO: u32 = 1;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== onedee Quickstart ===\n");

    // A three-room maze: waiting in the hall costs a little, going
    // forward from the hall is a gamble, and the vault ends the episode.
    let mut builder = FsmBuilder::new();
    builder
        .declare_state("hall", [0.0, 0.0])?
        .rewarded("hall", WAIT, -0.01)
        .add_transition("vault", GO, 0.0, 0.3)
        .add_transition("pit", GO, 0.0, 0.7);
    builder
        .declare_state("pit", [1.0, 0.0])?
        .rewarded("hall", WAIT, -1.0)
        .rewarded("hall", GO, -1.0);
    builder.declare_state("vault", [0.0, 1.0])?;
    let model = builder.compile()?;

    println!("Model: {model}");
    println!(
        "  states={}, actions={}, d_obs={}",
        model.n_states(),
        model.n_actions(),
        model.d_obs()
    );
    for id in model.terminal_states() {
        println!("  terminal: {}", model.name_of(id).unwrap_or("?"));
    }

    let mut env = FsmEnv::new(Arc::new(model), EnvConfig::new(N_ENVS).with_seed(42))?;
    println!("\nEnvironment: {env}, seed {}", env.config().seed);

    // Instance i waits on every (i+1)-th step and goes otherwise.
    for t in 0..STEPS {
        let actions: Vec<u32> = (0..N_ENVS)
            .map(|i| if t % (i + 1) == 0 { WAIT } else { GO })
            .collect();
        let snap = env.step(&actions)?;
        println!(
            "  step {:>2}: actions={:?} rewards={:?} resets={:?}",
            t,
            actions,
            snap.rewards(),
            snap.resets(),
        );
    }
    let metrics = env.last_metrics();
    println!(
        "\nEpisodes completed: {} over {} steps (last step {}μs)",
        metrics.total_episodes, metrics.total_steps, metrics.total_us,
    );

    let snap = env.reset();
    println!("After reset: observations={:?}", snap.observations());

    println!("\nRegistry: {:?}", EnvRegistry::with_builtins());
    let mut chain = EnvRegistry::with_builtins().make(
        "Chain",
        &ModelArgs::new().with("length", 4),
        EnvConfig::new(1),
    )?;
    let rewards: Vec<f32> = (0..6)
        .map(|_| chain.step(&[0]).map(|s| s.rewards()[0]))
        .collect::<Result<_, _>>()?;
    println!("Chain(4) rewards over 6 steps: {rewards:?}");

    println!("Done.");
    Ok(())
}
