//! Batched per-call output.

use onedee_core::traits::check_buffer;
use onedee_core::UsageError;
use onedee_fsm::CompiledModel;

/// The result of one `reset` or `step` call across all instances.
///
/// All arrays are aligned on the instance index. Observations are stored
/// flat as `[n_envs, d_obs]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    d_obs: usize,
    observations: Vec<f32>,
    rewards: Vec<f32>,
    resets: Vec<bool>,
    terminals: Vec<bool>,
}

impl Snapshot {
    pub(crate) fn new(n_envs: usize, d_obs: usize) -> Self {
        Self {
            d_obs,
            observations: vec![0.0; n_envs * d_obs],
            rewards: vec![0.0; n_envs],
            resets: vec![true; n_envs],
            terminals: vec![true; n_envs],
        }
    }

    /// Number of instances in the batch.
    pub fn num_envs(&self) -> usize {
        self.rewards.len()
    }

    /// Observation length per instance.
    pub fn d_obs(&self) -> usize {
        self.d_obs
    }

    /// Flat `[n_envs, d_obs]` observations.
    pub fn observations(&self) -> &[f32] {
        &self.observations
    }

    /// Observation of instance `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= num_envs()`.
    pub fn observation(&self, i: usize) -> &[f32] {
        assert!(i < self.num_envs(), "instance {i} out of range");
        &self.observations[i * self.d_obs..(i + 1) * self.d_obs]
    }

    /// Rewards earned this call.
    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    /// Whether each instance was (re)started this call.
    pub fn resets(&self) -> &[bool] {
        &self.resets
    }

    /// Whether each instance reached a terminal state this call.
    pub fn terminals(&self) -> &[bool] {
        &self.terminals
    }

    /// Mark every instance as freshly reset at its current token.
    pub(crate) fn fill_reset(&mut self, model: &CompiledModel, tokens: &[u32]) {
        self.rewards.fill(0.0);
        self.resets.fill(true);
        self.terminals.fill(true);
        self.fill_observations(model, tokens);
    }

    /// Record one instance's step outcome. Observations are filled
    /// separately once all tokens are final.
    pub(crate) fn record(&mut self, i: usize, reward: f32, terminal: bool) {
        self.rewards[i] = reward;
        self.resets[i] = terminal;
        self.terminals[i] = terminal;
    }

    pub(crate) fn fill_observations(&mut self, model: &CompiledModel, tokens: &[u32]) {
        if self.d_obs == 0 {
            return;
        }
        let table = model.obs_table();
        for (out, &token) in self.observations.chunks_mut(self.d_obs).zip(tokens) {
            let start = token as usize * self.d_obs;
            out.copy_from_slice(&table[start..start + self.d_obs]);
        }
    }

    pub(crate) fn write_observations(&self, buffer: &mut [f32]) -> Result<(), UsageError> {
        check_buffer(self.observations.len(), buffer.len())?;
        buffer[..self.observations.len()].copy_from_slice(&self.observations);
        Ok(())
    }

    pub(crate) fn write_rewards(&self, buffer: &mut [f32]) -> Result<(), UsageError> {
        check_buffer(self.rewards.len(), buffer.len())?;
        buffer[..self.rewards.len()].copy_from_slice(&self.rewards);
        Ok(())
    }

    pub(crate) fn write_flags(flags: &[bool], buffer: &mut [u8]) -> Result<(), UsageError> {
        check_buffer(flags.len(), buffer.len())?;
        for (out, &f) in buffer.iter_mut().zip(flags) {
            *out = u8::from(f);
        }
        Ok(())
    }
}
