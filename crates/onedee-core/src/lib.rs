//! Core types and traits for the onedee FSM environment framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the onedee workspace:
//! state and action IDs, observation vectors, error types, space
//! descriptors, and the [`VecEnvironment`] trait.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod observation;
pub mod spaces;
pub mod traits;

pub use error::{DefinitionError, UsageError};
pub use id::{ActionId, StateId};
pub use observation::Observation;
pub use spaces::{ActionSpace, ObservationSpace};
pub use traits::VecEnvironment;
