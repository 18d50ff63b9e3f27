//! Discord transport settings.

use announce_core::config::CoreSettings;
use config::ConfigError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Prefix used when none is configured.
pub const DEFAULT_COMMAND_PREFIX: &str = "!";

fn default_command_prefix() -> String {
    DEFAULT_COMMAND_PREFIX.to_string()
}

/// Discord transport settings loaded from environment variables.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DiscordSettings {
    /// Discord bot token.
    pub discord_token: String,
    /// Prefix that marks a chat message as a command.
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
}

impl Default for DiscordSettings {
    fn default() -> Self {
        Self {
            discord_token: String::new(),
            command_prefix: default_command_prefix(),
        }
    }
}

impl DiscordSettings {
    /// Create new settings by loading from environment and files.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or the token is missing.
    pub fn new() -> Result<Self, ConfigError> {
        announce_core::config::build_config()?.try_deserialize()
    }

    /// The configured prefix, or the default one if it is blank.
    #[must_use]
    pub fn prefix(&self) -> &str {
        let prefix = self.command_prefix.trim();
        if prefix.is_empty() {
            DEFAULT_COMMAND_PREFIX
        } else {
            prefix
        }
    }
}

/// Combined settings used by the Discord transport layer.
#[derive(Clone)]
pub struct BotSettings {
    /// Core settings shared across handlers.
    pub core: Arc<CoreSettings>,
    /// Discord-specific settings.
    pub discord: Arc<DiscordSettings>,
}

impl BotSettings {
    /// Create a new combined settings bundle.
    #[must_use]
    pub fn new(core: CoreSettings, discord: DiscordSettings) -> Self {
        Self {
            core: Arc::new(core),
            discord: Arc::new(discord),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    fn from_toml(raw: &str) -> Result<DiscordSettings, ConfigError> {
        Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_prefix_defaults_to_bang() -> Result<(), ConfigError> {
        let settings = from_toml(r#"discord_token = "abc""#)?;
        assert_eq!(settings.discord_token, "abc");
        assert_eq!(settings.prefix(), "!");
        Ok(())
    }

    #[test]
    fn test_custom_prefix() -> Result<(), ConfigError> {
        let settings = from_toml(
            r#"
            discord_token = "abc"
            command_prefix = "?? "
            "#,
        )?;
        assert_eq!(settings.prefix(), "??");
        Ok(())
    }

    #[test]
    fn test_missing_token_is_an_error() {
        assert!(from_toml("command_prefix = \"!\"").is_err());
    }

    #[test]
    fn test_blank_prefix_falls_back() {
        let settings = DiscordSettings {
            command_prefix: "   ".to_string(),
            ..DiscordSettings::default()
        };
        assert_eq!(settings.prefix(), DEFAULT_COMMAND_PREFIX);
    }
}
