//! Integration tests for herald-i18n crate.
//!
//! These tests verify Fluent integration, locale fallback and directory loading.

use herald_common::test_utils::{create_temp_dir, init_test_logging};
use herald_i18n::{parse_locale, FluentArgs, Translations, DEFAULT_LOCALE};
use std::fs;

#[test]
fn test_fluent_integration() {
    init_test_logging();

    let translations = Translations::with_builtin(DEFAULT_LOCALE.clone()).unwrap();
    let mut args = FluentArgs::new();
    args.set("name", "count");
    args.set("type", "number");

    assert_eq!(
        translations.translate_with("argument-parser-error-invalid-value", &DEFAULT_LOCALE, &args),
        "Invalid value for argument `count` (which accepts: number)"
    );
}

#[test]
fn test_fallback_language() {
    let german = parse_locale("de").unwrap();
    let translations = Translations::with_builtin(german.clone()).unwrap();
    let french = parse_locale("fr").unwrap();

    // French isn't loaded, so the German default is used
    assert_eq!(translations.translate("paginator-button-done", &french), "Fertig");
}

#[test]
fn test_bot_translations_from_directory() {
    let dir = create_temp_dir();
    let en = dir.path().join("en-US");
    fs::create_dir(&en).unwrap();
    fs::write(en.join("bot.ftl"), "greeting = Hello, { $user }!\n").unwrap();

    let mut translations = Translations::with_builtin(DEFAULT_LOCALE.clone()).unwrap();
    translations.load_directory(dir.path()).unwrap();

    let mut args = FluentArgs::new();
    args.set("user", "Herald");

    assert_eq!(translations.translate_with("greeting", &DEFAULT_LOCALE, &args), "Hello, Herald!");
    assert!(translations.has_key("checks-is-bot-failed", &DEFAULT_LOCALE));
}

#[test]
fn test_loaded_locales() {
    let translations = Translations::with_builtin(DEFAULT_LOCALE.clone()).unwrap();
    let mut locales: Vec<String> = translations.locales().map(ToString::to_string).collect();
    locales.sort();

    assert_eq!(locales, vec!["de", "en-US"]);
}
