//! Default values for every configuration section.

use crate::schema::*;
use herald_common::LoggingConfig;

/// Default chat command prefix.
pub const DEFAULT_PREFIX: &str = "!";

/// Default paginator inactivity timeout.
pub const DEFAULT_PAGINATOR_TIMEOUT_SECONDS: u64 = 120;

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig::default(),
            chat_commands: ChatCommandsConfig::default(),
            application_commands: ApplicationCommandsConfig::default(),
            i18n: I18nConfig::default(),
            pagination: PaginationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            owners: Vec::new(),
            admins: Vec::new(),
        }
    }
}

impl Default for ChatCommandsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_prefix: DEFAULT_PREFIX.to_string(),
            invoke_on_mention: true,
            ignore_self: true,
            allow_keyword_arguments: true,
        }
    }
}

impl Default for ApplicationCommandsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_guild: None,
            register: true,
        }
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale: "en-US".to_string(),
            translations_directory: None,
        }
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_PAGINATOR_TIMEOUT_SECONDS,
            keep_embed: true,
        }
    }
}
