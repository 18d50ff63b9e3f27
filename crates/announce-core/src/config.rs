//! Configuration and settings management
//!
//! Loads settings from config files and environment variables.

use crate::cache::DEFAULT_CAPACITY;
use crate::policy::{GuildPolicy, PolicyStore};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Build the layered configuration shared by all crates.
///
/// Sources, later ones overriding earlier ones:
/// `config/default`, `config/{RUN_MODE}`, `config/local`, `APP__*`
/// environment variables, then plain environment variables.
///
/// # Errors
///
/// Returns a `ConfigError` if a present source cannot be read.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Not checked into git
        .add_source(File::with_name("config/local").required(false))
        // Eg. `APP__CACHE_CAPACITY=10`
        .add_source(Environment::with_prefix("APP").separator("__"))
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

const fn default_cache_capacity() -> usize {
    DEFAULT_CAPACITY
}

/// Core announce settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CoreSettings {
    /// Number of announcements remembered for edit propagation
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Per-guild policies keyed by guild id
    #[serde(default)]
    pub guilds: HashMap<String, GuildPolicy>,
}

impl Default for CoreSettings {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            guilds: HashMap::new(),
        }
    }
}

impl CoreSettings {
    /// Create new settings by loading from environment and files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        build_config()?.try_deserialize()
    }

    /// Cache capacity, never below one.
    #[must_use]
    pub fn effective_cache_capacity(&self) -> usize {
        self.cache_capacity.max(1)
    }

    /// Policy store built from the configured guilds.
    #[must_use]
    pub fn policy_store(&self) -> PolicyStore {
        PolicyStore::from_config(&self.guilds)
    }
}
