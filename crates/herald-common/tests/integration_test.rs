//! Integration tests for herald-common crate.

use herald_common::{
    parse_channel_mention, parse_user_mention, split_first_word, truncate_string,
    ArgumentParsingError, DatePeriod, DiscordRelayedError, ExtensionState, FrameworkError,
    LogFormat, LoggingConfig,
};
use std::time::Duration;

#[test]
fn test_relayed_error_round_trips_through_framework_error() {
    let error = FrameworkError::from(DiscordRelayedError::new("Nope"));

    match error {
        FrameworkError::Relayed(inner) => assert_eq!(inner.reason, "Nope"),
        other => panic!("unexpected variant: {other:?}"),
    }
}

#[test]
fn test_argument_parsing_error_keeps_argument() {
    let error = ArgumentParsingError::for_argument("Invalid value", "count");
    assert_eq!(error.argument.as_deref(), Some("count"));
    assert_eq!(error.to_string(), "Invalid value");
}

#[test]
fn test_extension_state_display() {
    assert_eq!(ExtensionState::FailedLoading.to_string(), "failed loading");
    assert_eq!(ExtensionState::Loaded.to_string(), "loaded");
}

#[test]
fn test_period_formats_cooldown_remaining() {
    let remaining = DatePeriod::from_std(Duration::from_secs(125));
    assert_eq!(remaining.to_string(), "2m 5s");
}

#[test]
fn test_mention_helpers() {
    assert_eq!(parse_user_mention("<@!42>"), Some(42));
    assert_eq!(parse_channel_mention("<#42>"), Some(42));
    assert_eq!(split_first_word("help ping"), ("help", "ping"));
}

#[test]
fn test_truncate_string() {
    assert_eq!(truncate_string("abcdefghij", 6), "abc...");
}

#[test]
fn test_logging_config_from_yaml_like_json() {
    let config: LoggingConfig = serde_json::from_str(r#"{ "level": "debug", "format": "pretty" }"#).unwrap();
    assert_eq!(config.level, "debug");
    assert_eq!(config.format, LogFormat::Pretty);
}
