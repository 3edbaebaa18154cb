//! Test utilities and shared test helpers for the Herald workspace.
//!
//! This module provides common testing utilities, fixtures, and helper functions
//! that can be used across all crates in the workspace for unit and integration testing.

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Create a temporary directory for tests that automatically cleans up.
#[cfg(feature = "tempfile")]
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Discord-related test fixtures.
pub mod discord_fixtures {
    /// Id used for the bot's own user.
    pub const BOT_USER_ID: u64 = 111_111_111_111_111_111;

    /// Id used for the invoking user.
    pub const TEST_USER_ID: u64 = 987_654_321_098_765_432;

    /// Id used for the bot owner.
    pub const OWNER_USER_ID: u64 = 222_222_222_222_222_222;

    /// Id used for the test guild.
    pub const TEST_GUILD_ID: u64 = 333_333_333_333_333_333;

    /// Id used for the test channel.
    pub const TEST_CHANNEL_ID: u64 = 123_456_789_012_345_678;

    /// Id used for the test channel's category.
    pub const TEST_CATEGORY_ID: u64 = 444_444_444_444_444_444;

    /// Create multiple distinct user ids.
    pub fn test_user_ids(count: usize) -> Vec<u64> {
        (0..count as u64)
            .map(|i| 100_000_000_000_000_000 + i)
            .collect()
    }
}

/// Configuration-related test fixtures.
pub mod config_fixtures {
    /// A minimal valid configuration as TOML.
    pub fn minimal_config_toml() -> &'static str {
        r#"
[bot]
token = "test_token"
"#
    }

    /// A full configuration as YAML.
    pub fn full_config_yaml() -> &'static str {
        concat!(
            "bot:\n",
            "  token: \"test_token_full\"\n",
            "  owners: [222222222222222222]\n",
            "  admins: [555555555555555555]\n",
            "\n",
            "chat_commands:\n",
            "  enabled: true\n",
            "  default_prefix: \"?\"\n",
            "  invoke_on_mention: false\n",
            "  ignore_self: true\n",
            "  allow_keyword_arguments: true\n",
            "\n",
            "application_commands:\n",
            "  enabled: true\n",
            "  default_guild: 333333333333333333\n",
            "  register: true\n",
            "\n",
            "i18n:\n",
            "  default_locale: \"en-US\"\n",
            "\n",
            "pagination:\n",
            "  timeout_seconds: 120\n",
            "  keep_embed: false\n",
            "\n",
            "logging:\n",
            "  level: \"debug\"\n",
            "  format: \"json\"\n"
        )
    }
}

/// Property-based testing utilities using proptest.
#[cfg(feature = "proptest")]
pub mod property_testing {
    use proptest::prelude::*;

    /// Strategy for generating valid Discord snowflakes.
    pub fn snowflake_strategy() -> impl Strategy<Value = u64> {
        100_000_000_000_000_000u64..=999_999_999_999_999_999u64
    }

    /// Strategy for generating plain words with no quotes, spaces or flags.
    pub fn word_strategy() -> impl Strategy<Value = String> {
        r"[a-zA-Z0-9_]{1,16}".prop_map(|s| s.to_string())
    }

    /// Strategy for generating command names.
    pub fn command_name_strategy() -> impl Strategy<Value = String> {
        r"[a-z][a-z0-9-]{0,31}".prop_map(|s| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_multiple_calls() {
        // Should not panic when called multiple times
        init_test_logging();
        init_test_logging();
        init_test_logging();
    }

    #[test]
    fn test_user_ids_are_distinct() {
        let ids = discord_fixtures::test_user_ids(5);
        assert_eq!(ids.len(), 5);
        assert!(ids.windows(2).all(|w| w[0] != w[1]));
    }

    #[cfg(feature = "proptest")]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_property_snowflake_display(id in property_testing::snowflake_strategy()) {
                let parsed = crate::parse_snowflake(&id.to_string());
                prop_assert_eq!(parsed, Some(id));
            }

            #[test]
            fn test_property_command_name_valid(name in property_testing::command_name_strategy()) {
                prop_assert!(!name.is_empty());
                prop_assert!(name.len() <= 32);
                prop_assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            }
        }
    }
}
