//! Batched FSM environment.
//!
//! [`FsmEnv`] advances `n_envs` independent instances of one compiled
//! model in lockstep. Each call to [`step()`](FsmEnv::step) validates the
//! whole action vector, advances every instance exactly once, auto-resets
//! any instance that landed on a terminal state, and returns a
//! [`Snapshot`] of the batch.
//!
//! # Ownership model
//!
//! `FsmEnv` is [`Send`] but is driven through `&mut self`. The returned
//! `&Snapshot` borrows the environment, so the borrow checker rules out
//! stepping again while a snapshot is still being read. The model is
//! shared read-only through an [`Arc`] and may back any number of
//! environments.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use onedee_core::{ActionSpace, ObservationSpace, StateId, UsageError, VecEnvironment};
use onedee_fsm::CompiledModel;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::{ConfigError, EnvConfig};
use crate::metrics::StepMetrics;
use crate::snapshot::Snapshot;
use crate::table::TransitionTable;

// Fails to compile if any field is !Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<FsmEnv>();
    }
};

/// One independent random stream per instance: same seed, stream =
/// `stream_offset + index`.
fn instance_rngs(config: &EnvConfig) -> Vec<ChaCha8Rng> {
    (0..config.n_envs as u64)
        .map(|i| {
            let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
            rng.set_stream(config.stream_offset.wrapping_add(i));
            rng
        })
        .collect()
}

/// Batched FSM environment over a shared [`CompiledModel`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use onedee_engine::{EnvConfig, FsmEnv};
/// use onedee_fsm::library;
///
/// let model = Arc::new(library::chain(3).unwrap());
/// let mut env = FsmEnv::new(model, EnvConfig::new(4)).unwrap();
/// env.reset();
/// let snap = env.step(&[0, 0, 0, 0]).unwrap();
/// assert_eq!(snap.rewards(), &[0.0; 4]);
/// let snap = env.step(&[0, 0, 0, 0]).unwrap();
/// assert_eq!(snap.rewards(), &[1.0; 4]);
/// assert!(snap.resets().iter().all(|&r| r));
/// ```
pub struct FsmEnv {
    model: Arc<CompiledModel>,
    table: TransitionTable,
    config: EnvConfig,
    tokens: Vec<u32>,
    rngs: Vec<ChaCha8Rng>,
    snapshot: Snapshot,
    metrics: StepMetrics,
}

impl FsmEnv {
    /// Create an environment with every instance in the entry state.
    ///
    /// The initial snapshot is identical to the one [`reset()`](Self::reset)
    /// returns.
    pub fn new(model: Arc<CompiledModel>, config: EnvConfig) -> Result<Self, ConfigError> {
        config.validate(&model)?;

        let n = config.n_envs;
        let tokens = vec![config.entry_state.0; n];
        let mut snapshot = Snapshot::new(n, model.d_obs());
        snapshot.fill_reset(&model, &tokens);

        tracing::info!(
            model = %model,
            n_envs = n,
            seed = config.seed,
            stream_offset = config.stream_offset,
            mode = %config.transition_mode,
            entry = %config.entry_state,
            "created FSM environment"
        );

        Ok(Self {
            table: TransitionTable::from_model(&model),
            rngs: instance_rngs(&config),
            model,
            config,
            tokens,
            snapshot,
            metrics: StepMetrics::default(),
        })
    }

    /// Return every instance to the entry state.
    ///
    /// Observations are the entry state's, rewards are zero, and every
    /// reset/terminal flag is set. Random streams are not rewound; use
    /// [`reseed()`](Self::reseed) for that.
    pub fn reset(&mut self) -> &Snapshot {
        self.tokens.fill(self.config.entry_state.0);
        self.snapshot.fill_reset(&self.model, &self.tokens);
        &self.snapshot
    }

    /// Rebuild every instance's random stream from `seed`.
    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = seed;
        self.rngs = instance_rngs(&self.config);
    }

    /// Advance every instance one step.
    ///
    /// For instance `i` in state `s` taking action `a`: the reward is
    /// `reward[s, a]`; the next state is chosen from `trans[s, a, :]`
    /// according to the configured [`TransitionMode`]; if that state is
    /// terminal the instance is put back in the entry state before this
    /// call returns and its reset/terminal flags are set.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError`] if `actions.len() != n_envs` or any action
    /// is outside `[0, n_actions)`. Validation happens before any
    /// instance moves, so a failed call changes nothing.
    ///
    /// [`TransitionMode`]: crate::TransitionMode
    pub fn step(&mut self, actions: &[u32]) -> Result<&Snapshot, UsageError> {
        self.validate_actions(actions)?;
        let start = Instant::now();

        let Self {
            model,
            table,
            config,
            tokens,
            rngs,
            snapshot,
            ..
        } = self;
        let entry = config.entry_state.0;
        let mode = config.transition_mode;

        let mut episodes = 0u32;
        for (i, ((token, &action), rng)) in tokens
            .iter_mut()
            .zip(actions)
            .zip(rngs.iter_mut())
            .enumerate()
        {
            let state = StateId(*token);
            let reward = model.reward(state, action.into());
            let next = table.select(*token, action, mode, rng);
            let terminal = model.is_terminal(StateId(next));
            *token = if terminal { entry } else { next };
            snapshot.record(i, reward, terminal);
            if terminal {
                episodes += 1;
                tracing::trace!(env = i, terminal_state = next, "episode complete");
            }
        }
        snapshot.fill_observations(model, tokens);

        let elapsed_us = start.elapsed().as_micros() as u64;
        self.metrics.record_step(elapsed_us, episodes);
        Ok(&self.snapshot)
    }

    fn validate_actions(&self, actions: &[u32]) -> Result<(), UsageError> {
        let n = self.config.n_envs;
        if actions.len() != n {
            return Err(UsageError::ActionCountMismatch {
                expected: n,
                found: actions.len(),
            });
        }
        let n_actions = self.model.n_actions();
        if let Some((env_index, &action)) = actions
            .iter()
            .enumerate()
            .find(|(_, a)| **a as usize >= n_actions)
        {
            return Err(UsageError::InvalidAction {
                env_index,
                action,
                n_actions,
            });
        }
        Ok(())
    }

    /// The most recent snapshot (from construction, `reset`, or `step`).
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Current state of every instance.
    pub fn tokens(&self) -> &[u32] {
        &self.tokens
    }

    /// Current state of instance `i`, if it exists.
    pub fn state_of(&self, i: usize) -> Option<StateId> {
        self.tokens.get(i).map(|&t| StateId(t))
    }

    /// The shared model.
    pub fn model(&self) -> &Arc<CompiledModel> {
        &self.model
    }

    /// The active configuration.
    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Metrics from the most recent step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.metrics
    }

    /// Number of parallel instances.
    pub fn n_envs(&self) -> usize {
        self.config.n_envs
    }
}

impl VecEnvironment for FsmEnv {
    fn num_envs(&self) -> usize {
        self.config.n_envs
    }

    fn observation_size(&self) -> usize {
        self.model.d_obs()
    }

    fn num_actions(&self) -> usize {
        self.model.n_actions()
    }

    fn action_space(&self) -> ActionSpace {
        ActionSpace::multi_discrete(1, self.model.n_actions())
    }

    fn observation_space(&self) -> ObservationSpace {
        ObservationSpace::for_dim(1, self.model.d_obs())
    }

    fn reset_batch(&mut self) {
        self.reset();
    }

    fn step_batch(&mut self, actions: &[u32]) -> Result<(), UsageError> {
        self.step(actions).map(|_| ())
    }

    fn write_observations(&self, buffer: &mut [f32]) -> Result<(), UsageError> {
        self.snapshot.write_observations(buffer)
    }

    fn write_rewards(&self, buffer: &mut [f32]) -> Result<(), UsageError> {
        self.snapshot.write_rewards(buffer)
    }

    fn write_terminals(&self, buffer: &mut [u8]) -> Result<(), UsageError> {
        Snapshot::write_flags(self.snapshot.terminals(), buffer)
    }

    fn write_resets(&self, buffer: &mut [u8]) -> Result<(), UsageError> {
        Snapshot::write_flags(self.snapshot.resets(), buffer)
    }
}

impl fmt::Display for FsmEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FsmEnv({}s{}a)",
            self.model.n_states(),
            self.model.n_actions()
        )
    }
}

impl fmt::Debug for FsmEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FsmEnv")
            .field("model", &format_args!("{}", self.model))
            .field("n_envs", &self.config.n_envs)
            .field("mode", &self.config.transition_mode)
            .field("total_steps", &self.metrics.total_steps)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransitionMode;
    use onedee_fsm::{library, FsmBuilder};

    fn env(model: CompiledModel, n: usize) -> FsmEnv {
        FsmEnv::new(Arc::new(model), EnvConfig::new(n)).unwrap()
    }

    #[test]
    fn new_starts_in_reset_state() {
        let mut e = env(library::chain(4).unwrap(), 3);
        let initial = e.snapshot().clone();
        assert_eq!(e.tokens(), &[0, 0, 0]);
        assert_eq!(&initial, e.reset());
    }

    #[test]
    fn reset_snapshot_contents() {
        let mut e = env(library::chain(4).unwrap(), 2);
        let snap = e.reset();
        assert_eq!(snap.num_envs(), 2);
        assert_eq!(snap.observations(), &[0.0, 0.0]);
        assert_eq!(snap.rewards(), &[0.0, 0.0]);
        assert_eq!(snap.resets(), &[true, true]);
        assert_eq!(snap.terminals(), &[true, true]);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut e = env(library::coin_flip().unwrap(), 5);
        let first = e.reset().clone();
        e.step(&[0; 5]).unwrap();
        let second = e.reset().clone();
        let third = e.reset().clone();
        assert_eq!(first, second);
        assert_eq!(second, third);
    }

    #[test]
    fn wrong_action_count_leaves_tokens() {
        let mut e = env(library::chain(4).unwrap(), 2);
        e.step(&[0, 0]).unwrap();
        let before = e.tokens().to_vec();
        let err = e.step(&[0]).unwrap_err();
        assert_eq!(
            err,
            UsageError::ActionCountMismatch {
                expected: 2,
                found: 1
            }
        );
        assert_eq!(e.tokens(), before.as_slice());
        assert_eq!(e.last_metrics().total_steps, 1);
    }

    #[test]
    fn out_of_range_action_is_atomic() {
        let mut e = env(library::chain(4).unwrap(), 3);
        let err = e.step(&[0, 0, 1]).unwrap_err();
        assert_eq!(
            err,
            UsageError::InvalidAction {
                env_index: 2,
                action: 1,
                n_actions: 1
            }
        );
        // Instances 0 and 1 had valid actions but must not have moved.
        assert_eq!(e.tokens(), &[0, 0, 0]);
    }

    #[test]
    fn terminal_state_never_held_as_token() {
        let mut e = env(library::chain(3).unwrap(), 1);
        e.reset();
        e.step(&[0]).unwrap();
        assert_eq!(e.tokens(), &[1]);
        let snap = e.step(&[0]).unwrap();
        assert!(snap.resets()[0]);
        assert_eq!(e.tokens(), &[0]);
        assert_eq!(e.state_of(0), Some(StateId(0)));
    }

    #[test]
    fn observation_after_auto_reset_is_entry() {
        let mut e = env(library::chain(3).unwrap(), 1);
        e.step(&[0]).unwrap();
        let snap = e.step(&[0]).unwrap();
        assert_eq!(snap.observation(0), &[0.0]);
    }

    #[test]
    fn undeclared_action_is_a_self_loop() {
        let mut b = FsmBuilder::new();
        b.declare_state("a", 0.0).unwrap().to("b", 0);
        b.declare_state("b", 1.0).unwrap().rewarded("c", 1, 2.0);
        b.declare_state("c", 2.0).unwrap();
        let mut e = env(b.compile().unwrap(), 1);
        e.step(&[0]).unwrap();
        // "a" has nothing on action 1: stays put, zero reward.
        e.reset();
        let snap = e.step(&[1]).unwrap();
        assert_eq!(snap.rewards(), &[0.0]);
        assert!(!snap.resets()[0]);
        assert_eq!(e.tokens(), &[0]);
    }

    #[test]
    fn custom_entry_state() {
        let model = Arc::new(library::chain(4).unwrap());
        let config = EnvConfig::new(2).with_entry(StateId(2));
        let mut e = FsmEnv::new(model, config).unwrap();
        assert_eq!(e.reset().observations(), &[0.5, 0.5]);
        let snap = e.step(&[0, 0]).unwrap();
        assert_eq!(snap.rewards(), &[1.0, 1.0]);
        assert_eq!(e.tokens(), &[2, 2]);
    }

    #[test]
    fn invalid_config_rejected() {
        let model = Arc::new(library::unit_reward().unwrap());
        assert!(matches!(
            FsmEnv::new(model.clone(), EnvConfig::new(0)),
            Err(ConfigError::ZeroEnvs)
        ));
        assert!(matches!(
            FsmEnv::new(model, EnvConfig::new(1).with_entry(StateId(1))),
            Err(ConfigError::EntryStateOutOfRange { .. })
        ));

        // "end" is mentioned first, so it would be the default entry.
        let mut b = FsmBuilder::new();
        b.declare_state("end", 0.0).unwrap();
        b.declare_state("start", 1.0).unwrap().to("end", 0);
        let model = Arc::new(b.compile().unwrap());
        assert!(matches!(
            FsmEnv::new(model.clone(), EnvConfig::new(1)),
            Err(ConfigError::TerminalEntryState { entry: StateId(0) })
        ));
        let start = model.index_of("start").unwrap();
        let mut e = FsmEnv::new(model.clone(), EnvConfig::new(1).with_entry(start)).unwrap();
        for _ in 0..3 {
            let snap = e.step(&[0]).unwrap();
            assert_eq!(snap.rewards(), &[0.0]);
            assert!(snap.resets()[0]);
            assert!(!model.is_terminal(StateId(e.tokens()[0])));
        }
    }

    #[test]
    fn metrics_count_episodes() {
        let mut e = env(library::chain(2).unwrap(), 3);
        e.step(&[0, 0, 0]).unwrap();
        e.step(&[0, 0, 0]).unwrap();
        let m = e.last_metrics();
        assert_eq!(m.episodes_completed, 3);
        assert_eq!(m.total_steps, 2);
        assert_eq!(m.total_episodes, 6);
    }

    #[test]
    fn same_seed_same_trajectory() {
        let model = Arc::new(library::coin_flip().unwrap());
        let run = |seed| {
            let mut e = FsmEnv::new(model.clone(), EnvConfig::new(16).with_seed(seed)).unwrap();
            (0..10)
                .map(|_| e.step(&[0; 16]).unwrap().rewards().to_vec())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(5), run(5));
        assert_ne!(run(5), run(6));
    }

    #[test]
    fn reseed_rewinds_streams() {
        let model = Arc::new(library::coin_flip().unwrap());
        let mut e = FsmEnv::new(model, EnvConfig::new(8).with_seed(3)).unwrap();
        let first: Vec<Vec<u32>> = (0..4)
            .map(|_| {
                e.step(&[0; 8]).unwrap();
                e.tokens().to_vec()
            })
            .collect();
        e.reseed(3);
        e.reset();
        let second: Vec<Vec<u32>> = (0..4)
            .map(|_| {
                e.step(&[0; 8]).unwrap();
                e.tokens().to_vec()
            })
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn single_env_with_offset_replays_batch_instance() {
        let model = Arc::new(library::coin_flip().unwrap());
        let mut batch = FsmEnv::new(model.clone(), EnvConfig::new(3).with_seed(4)).unwrap();
        let config = EnvConfig::new(1).with_seed(4).with_stream_offset(2);
        let mut single = FsmEnv::new(model, config).unwrap();
        for _ in 0..20 {
            batch.step(&[0; 3]).unwrap();
            single.step(&[0]).unwrap();
            assert_eq!(batch.tokens()[2], single.tokens()[0]);
        }
        // Reseeding keeps the offset.
        batch.reseed(9);
        single.reseed(9);
        batch.reset();
        single.reset();
        for _ in 0..20 {
            batch.step(&[0; 3]).unwrap();
            single.step(&[0]).unwrap();
            assert_eq!(batch.tokens()[2], single.tokens()[0]);
        }
    }

    #[test]
    fn deterministic_mode_ignores_seed() {
        let model = Arc::new(library::coin_flip().unwrap());
        let config = |seed| {
            EnvConfig::new(4)
                .with_seed(seed)
                .with_mode(TransitionMode::Deterministic)
        };
        let mut a = FsmEnv::new(model.clone(), config(1)).unwrap();
        let mut b = FsmEnv::new(model, config(2)).unwrap();
        for _ in 0..6 {
            let ra = a.step(&[0; 4]).unwrap().clone();
            let rb = b.step(&[0; 4]).unwrap().clone();
            assert_eq!(ra, rb);
        }
        // Ties resolve to the lowest index: always heads.
        assert_eq!(a.tokens(), &[0; 4]);
    }

    #[test]
    fn vec_environment_buffers() {
        let mut e = env(library::chain(3).unwrap(), 2);
        assert_eq!(e.num_envs(), 2);
        assert_eq!(e.observation_size(), 1);
        assert_eq!(e.num_actions(), 1);
        assert_eq!(e.action_space(), ActionSpace::multi_discrete(1, 1));
        assert_eq!(
            e.observation_space(),
            ObservationSpace::MultiVector { n_agents: 1, dim: 1 }
        );

        e.reset_batch();
        e.step_batch(&[0, 0]).unwrap();
        e.step_batch(&[0, 0]).unwrap();

        let mut obs = [9.0f32; 2];
        let mut rew = [9.0f32; 2];
        let mut term = [9u8; 2];
        let mut reset = [9u8; 2];
        e.write_observations(&mut obs).unwrap();
        e.write_rewards(&mut rew).unwrap();
        e.write_terminals(&mut term).unwrap();
        e.write_resets(&mut reset).unwrap();
        assert_eq!(obs, [0.0, 0.0]);
        assert_eq!(rew, [1.0, 1.0]);
        assert_eq!(term, [1, 1]);
        assert_eq!(reset, [1, 1]);

        let mut short = [0.0f32; 1];
        assert_eq!(
            e.write_rewards(&mut short),
            Err(UsageError::BufferTooSmall {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn empty_observation_space() {
        let e = env(library::unit_reward().unwrap(), 1);
        assert_eq!(e.observation_space(), ObservationSpace::Empty);
        assert!(e.snapshot().observation(0).is_empty());
    }

    #[test]
    fn display_shows_shape() {
        let e = env(library::coin_flip().unwrap(), 1);
        assert_eq!(e.to_string(), "FsmEnv(4s1a)");
        assert!(format!("{e:?}").contains("CompiledModel(4s1a)"));
    }
}
