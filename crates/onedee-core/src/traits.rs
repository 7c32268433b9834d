//! Core abstraction trait for batched environments.

use crate::error::UsageError;
use crate::spaces::{ActionSpace, ObservationSpace};

/// A batch of environment instances advanced in lockstep.
///
/// Implementors keep their latest batch results internally; the
/// `write_*` methods copy them into caller-owned, structure-of-arrays
/// buffers laid out as `[num_envs, ...]`.
pub trait VecEnvironment {
    /// Number of parallel instances.
    fn num_envs(&self) -> usize;

    /// Observation length per instance.
    fn observation_size(&self) -> usize;

    /// Number of discrete actions.
    fn num_actions(&self) -> usize;

    /// Shape of the action input.
    fn action_space(&self) -> ActionSpace;

    /// Shape of the observation output.
    fn observation_space(&self) -> ObservationSpace;

    /// Return every instance to its entry state.
    fn reset_batch(&mut self);

    /// Advance every instance one step (includes auto-reset).
    ///
    /// Must validate `actions` fully before advancing any instance.
    fn step_batch(&mut self, actions: &[u32]) -> Result<(), UsageError>;

    /// Write observations, `num_envs * observation_size` elements.
    fn write_observations(&self, buffer: &mut [f32]) -> Result<(), UsageError>;

    /// Write rewards, `num_envs` elements.
    fn write_rewards(&self, buffer: &mut [f32]) -> Result<(), UsageError>;

    /// Write terminal flags as 0/1 bytes, `num_envs` elements.
    fn write_terminals(&self, buffer: &mut [u8]) -> Result<(), UsageError>;

    /// Write reset flags as 0/1 bytes, `num_envs` elements.
    fn write_resets(&self, buffer: &mut [u8]) -> Result<(), UsageError>;
}

/// Check that `buffer_len` can hold `expected` elements.
pub fn check_buffer(expected: usize, buffer_len: usize) -> Result<(), UsageError> {
    if buffer_len < expected {
        return Err(UsageError::BufferTooSmall {
            expected,
            found: buffer_len,
        });
    }
    Ok(())
}
