//! Batched FSM environment engine.
//!
//! [`FsmEnv`] runs `n_envs` instances of one [`CompiledModel`] in
//! lockstep: every [`step()`](FsmEnv::step) applies one action per
//! instance, samples next states, and auto-resets any instance that
//! reaches a terminal state within the same call. [`EnvRegistry`] builds
//! environments by name.
//!
//! [`CompiledModel`]: onedee_fsm::CompiledModel

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod env;
pub mod metrics;
pub mod registry;
pub mod snapshot;
mod table;

pub use config::{ConfigError, EnvConfig, TransitionMode};
pub use env::FsmEnv;
pub use metrics::StepMetrics;
pub use registry::{EnvRegistry, ModelArgs, ModelFactory, RegistryError};
pub use snapshot::Snapshot;
