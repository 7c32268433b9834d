//! Named environment construction.
//!
//! [`EnvRegistry`] maps a name to a factory closure that builds a
//! [`CompiledModel`] from integer arguments. Factories are registered
//! explicitly at startup; [`EnvRegistry::with_builtins()`] pre-registers
//! the reference models.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use onedee_core::DefinitionError;
use onedee_fsm::{library, CompiledModel};

use crate::config::{ConfigError, EnvConfig};
use crate::env::FsmEnv;

// ── ModelArgs ──────────────────────────────────────────────────────

/// Ordered integer arguments passed to a model factory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelArgs {
    values: IndexMap<String, i64>,
}

impl ModelArgs {
    /// Empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an argument.
    pub fn with(mut self, key: impl Into<String>, value: i64) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Look up an argument.
    pub fn get(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    /// Look up a required non-negative argument.
    pub fn require_usize(&self, key: &str) -> Result<usize, DefinitionError> {
        let value = self
            .get(key)
            .ok_or_else(|| DefinitionError::InvalidParameter {
                reason: format!("missing required argument '{key}'"),
            })?;
        usize::try_from(value).map_err(|_| DefinitionError::InvalidParameter {
            reason: format!("argument '{key}' must be non-negative, got {value}"),
        })
    }

    /// Iterate arguments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.values.iter().map(|(k, &v)| (k.as_str(), v))
    }
}

// ── RegistryError ──────────────────────────────────────────────────

/// Errors from registering or instantiating a named environment.
#[derive(Clone, Debug, PartialEq)]
pub enum RegistryError {
    /// No factory is registered under this name.
    UnknownEnv {
        /// The requested name.
        name: String,
    },
    /// A factory is already registered under this name.
    DuplicateName {
        /// The conflicting name.
        name: String,
    },
    /// The factory rejected its arguments or produced an invalid model.
    Definition(DefinitionError),
    /// The environment configuration was rejected.
    Config(ConfigError),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEnv { name } => write!(f, "no environment registered as '{name}'"),
            Self::DuplicateName { name } => {
                write!(f, "an environment is already registered as '{name}'")
            }
            Self::Definition(e) => write!(f, "model definition failed: {e}"),
            Self::Config(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Definition(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DefinitionError> for RegistryError {
    fn from(e: DefinitionError) -> Self {
        Self::Definition(e)
    }
}

impl From<ConfigError> for RegistryError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ── EnvRegistry ────────────────────────────────────────────────────

/// Factory closure that builds a model from arguments.
pub type ModelFactory =
    Box<dyn Fn(&ModelArgs) -> Result<CompiledModel, DefinitionError> + Send + Sync>;

/// Name → model factory table.
///
/// # Example
///
/// ```
/// use onedee_engine::{EnvConfig, EnvRegistry, ModelArgs};
///
/// let registry = EnvRegistry::with_builtins();
/// let args = ModelArgs::new().with("length", 5);
/// let env = registry.make("Chain", &args, EnvConfig::new(2)).unwrap();
/// assert_eq!(env.to_string(), "FsmEnv(5s1a)");
/// ```
#[derive(Default)]
pub struct EnvRegistry {
    factories: IndexMap<String, ModelFactory>,
}

impl EnvRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with `UnitReward`, `Chain` (argument
    /// `length`), and `CoinFlip`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let builtins: [(&str, ModelFactory); 3] = [
            ("UnitReward", Box::new(|_: &ModelArgs| library::unit_reward())),
            (
                "Chain",
                Box::new(|args: &ModelArgs| library::chain(args.require_usize("length")?)),
            ),
            ("CoinFlip", Box::new(|_: &ModelArgs| library::coin_flip())),
        ];
        for (name, factory) in builtins {
            registry.factories.insert(name.to_string(), factory);
        }
        registry
    }

    /// Register a factory under `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> Result<(), RegistryError>
    where
        F: Fn(&ModelArgs) -> Result<CompiledModel, DefinitionError> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(RegistryError::DuplicateName { name });
        }
        self.factories.insert(name, Box::new(factory));
        Ok(())
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build only the model for `name`.
    pub fn build_model(&self, name: &str, args: &ModelArgs) -> Result<CompiledModel, RegistryError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RegistryError::UnknownEnv {
                name: name.to_string(),
            })?;
        Ok(factory(args)?)
    }

    /// Build the model for `name` and wrap it in a new environment.
    pub fn make(
        &self,
        name: &str,
        args: &ModelArgs,
        config: EnvConfig,
    ) -> Result<FsmEnv, RegistryError> {
        let model = self.build_model(name, args)?;
        tracing::info!(env = name, model = %model, n_envs = config.n_envs, "make");
        Ok(FsmEnv::new(Arc::new(model), config)?)
    }
}

impl fmt::Debug for EnvRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}
