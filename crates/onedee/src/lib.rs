//! onedee: batched finite-state-machine environments for reinforcement learning.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! onedee sub-crates. For most users, adding `onedee` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use onedee::prelude::*;
//!
//! // Two rooms: stepping from "door" into "exit" pays 1 and ends the episode.
//! let mut builder = FsmBuilder::new();
//! builder
//!     .declare_state("door", [1.0, 0.0])
//!     .unwrap()
//!     .rewarded("exit", 0, 1.0)
//!     .to("door", 1);
//! builder.declare_state("exit", [0.0, 1.0]).unwrap();
//! let model = Arc::new(builder.compile().unwrap());
//!
//! let mut env = FsmEnv::new(model, EnvConfig::new(2)).unwrap();
//! env.reset();
//! let snap = env.step(&[0, 1]).unwrap();
//! assert_eq!(snap.rewards(), &[1.0, 0.0]);
//! assert_eq!(snap.resets(), &[true, false]);
//! // Instance 0 was auto-reset back into "door".
//! assert_eq!(snap.observations(), &[1.0, 0.0, 1.0, 0.0]);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `onedee-core` | IDs, observations, spaces, errors, `VecEnvironment` |
//! | [`fsm`] | `onedee-fsm` | FSM builder, compiled model, reference models |
//! | [`engine`] | `onedee-engine` | Batched environment, config, registry |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`onedee-core`).
///
/// Contains state/action IDs, [`types::Observation`], action and observation
/// spaces, error types, and the [`types::VecEnvironment`] trait.
pub use onedee_core as types;

/// FSM definition and compilation (`onedee-fsm`).
///
/// [`fsm::FsmBuilder`] collects states and transitions;
/// [`fsm::CompiledModel`] holds the dense tables; [`fsm::library`] has the
/// reference models.
pub use onedee_fsm as fsm;

/// Batched environments (`onedee-engine`).
///
/// [`engine::FsmEnv`] steps many instances in lockstep;
/// [`engine::EnvRegistry`] builds them by name.
pub use onedee_engine as engine;

/// Common imports for typical onedee usage.
///
/// ```rust
/// use onedee::prelude::*;
/// ```
///
/// This imports the builder, compiled model, environment, config, registry,
/// core IDs and spaces, and the error types.
pub mod prelude {
    // Core types and traits
    pub use onedee_core::{
        ActionId, ActionSpace, Observation, ObservationSpace, StateId, VecEnvironment,
    };

    // Errors
    pub use onedee_core::{DefinitionError, UsageError};
    pub use onedee_engine::{ConfigError, RegistryError};

    // FSM
    pub use onedee_fsm::{library, CompiledModel, FsmBuilder};

    // Engine
    pub use onedee_engine::{
        EnvConfig, EnvRegistry, FsmEnv, ModelArgs, Snapshot, StepMetrics, TransitionMode,
    };
}
