//! Declarative FSM definitions for onedee environments.
//!
//! An [`FsmBuilder`] collects states (each with an observation vector)
//! and labelled transitions, then [`compile()`](FsmBuilder::compile)s
//! them into an immutable [`CompiledModel`]: dense observation, transition
//! probability, and reward tables plus inferred terminal/origin flags.
//!
//! The [`library`] module holds the reference models (`unit_reward`,
//! `chain`, `coin_flip`) used by the environment registry.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod builder;
pub mod library;
pub mod model;

pub use builder::{FsmBuilder, StateHandle};
pub use model::CompiledModel;
