//! Runtime validation of loaded configuration.

use crate::schema::Config;
use herald_common::{FrameworkError, Result};

/// Longest paginator timeout Discord allows, since interaction tokens expire
/// after fifteen minutes.
pub const MAX_PAGINATOR_TIMEOUT_SECONDS: u64 = 15 * 60;

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates a configuration, reporting every problem in one error.
    pub fn validate(config: &Config) -> Result<()> {
        let problems = Self::problems(config);

        if problems.is_empty() {
            Ok(())
        } else {
            Err(FrameworkError::config(problems.join("; ")))
        }
    }

    /// Lists every problem with the configuration.
    pub fn problems(config: &Config) -> Vec<String> {
        let mut problems = Vec::new();

        if config.bot.token.trim().is_empty() {
            problems.push("bot.token must be set".to_string());
        } else if config.bot.token.chars().any(char::is_whitespace) {
            problems.push("bot.token must not contain whitespace".to_string());
        }

        let chat = &config.chat_commands;

        if chat.enabled && chat.default_prefix.is_empty() && !chat.invoke_on_mention {
            problems.push(
                "chat_commands.default_prefix must be set unless invoke_on_mention is enabled".to_string(),
            );
        }

        if chat.default_prefix.chars().any(char::is_whitespace) {
            problems.push("chat_commands.default_prefix must not contain whitespace".to_string());
        }

        let locale = &config.i18n.default_locale;

        if locale.is_empty() || !locale.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            problems.push(format!("i18n.default_locale `{locale}` is not a locale tag"));
        }

        let timeout = config.pagination.timeout_seconds;

        if timeout == 0 || timeout > MAX_PAGINATOR_TIMEOUT_SECONDS {
            problems.push(format!(
                "pagination.timeout_seconds must be between 1 and {MAX_PAGINATOR_TIMEOUT_SECONDS}"
            ));
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        let mut config = Config::default();
        config.bot.token = "token".to_string();
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(ConfigValidator::validate(&valid()).is_ok());
    }

    #[test]
    fn test_all_problems_reported() {
        let mut config = Config::default();
        config.chat_commands.default_prefix = "a b".to_string();
        config.pagination.timeout_seconds = 0;

        let problems = ConfigValidator::problems(&config);
        assert_eq!(problems.len(), 3);
    }

    #[test]
    fn test_empty_prefix_needs_mentions() {
        let mut config = valid();
        config.chat_commands.default_prefix.clear();
        assert!(ConfigValidator::validate(&config).is_ok());

        config.chat_commands.invoke_on_mention = false;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn test_bad_locale() {
        let mut config = valid();
        config.i18n.default_locale = "en US".to_string();
        assert!(ConfigValidator::validate(&config).is_err());
    }
}
