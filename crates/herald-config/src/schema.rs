//! Configuration schema definitions.

use herald_common::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for a Herald bot.
///
/// Every section is optional in the file; missing values take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bot identity and privileged users.
    pub bot: BotConfig,
    /// Prefixed message commands.
    pub chat_commands: ChatCommandsConfig,
    /// Slash commands.
    pub application_commands: ApplicationCommandsConfig,
    /// Translations.
    pub i18n: I18nConfig,
    /// Paginator defaults.
    pub pagination: PaginationConfig,
    /// Logging output.
    pub logging: LoggingConfig,
}

/// Bot identity configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Discord bot token.
    pub token: String,
    /// Users treated as bot owners, in addition to the application owner.
    pub owners: Vec<u64>,
    /// Users treated as bot administrators.
    pub admins: Vec<u64>,
}

/// Chat command configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatCommandsConfig {
    /// Whether chat commands are processed at all.
    pub enabled: bool,
    /// Prefix used when no per-guild prefix applies.
    pub default_prefix: String,
    /// Whether mentioning the bot works as a prefix.
    pub invoke_on_mention: bool,
    /// Whether the bot ignores its own messages.
    pub ignore_self: bool,
    /// Default for commands that don't choose whether to accept
    /// `--name value` and `name=value` arguments.
    pub allow_keyword_arguments: bool,
}

/// Application command configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationCommandsConfig {
    /// Whether slash commands are processed at all.
    pub enabled: bool,
    /// Register commands to this guild instead of globally, which makes
    /// changes show up immediately during development.
    pub default_guild: Option<u64>,
    /// Whether commands are registered with Discord on startup.
    pub register: bool,
}

/// Translation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Locale used when the user's locale has no translation.
    pub default_locale: String,
    /// Directory of `<locale>/*.ftl` files with the bot's own translations.
    pub translations_directory: Option<PathBuf>,
}

/// Paginator defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Seconds of inactivity before a paginator stops listening.
    pub timeout_seconds: u64,
    /// Whether the message is kept (without buttons) when a paginator ends.
    pub keep_embed: bool,
}

impl Config {
    /// Validates the configuration, reporting every problem at once.
    pub fn validate(&self) -> herald_common::Result<()> {
        crate::ConfigValidator::validate(self)
    }
}
