//! Translation lookup with locale fallback.

use crate::loader::{new_bundle, parse_resource, Bundle, BUILTIN_RESOURCES};
use crate::DEFAULT_LOCALE;
use fluent_bundle::{FluentArgs, FluentResource};
use herald_common::Result;
use std::collections::HashMap;
use std::path::Path;
use tracing::{trace, warn};
use unic_langid::LanguageIdentifier;

/// All loaded translations, keyed by locale.
///
/// Lookups try the requested locale, then any loaded locale sharing its
/// language, then the default locale. A key missing everywhere is returned
/// unchanged so the gap is visible rather than silently blank.
pub struct Translations {
    default_locale: LanguageIdentifier,
    bundles: HashMap<LanguageIdentifier, Bundle>,
}

impl std::fmt::Debug for Translations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translations")
            .field("default_locale", &self.default_locale)
            .field("locales", &self.bundles.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for Translations {
    fn default() -> Self {
        Self::empty(DEFAULT_LOCALE.clone())
    }
}

impl Translations {
    /// Create a translation store with no resources.
    pub fn empty(default_locale: LanguageIdentifier) -> Self {
        Self {
            default_locale,
            bundles: HashMap::new(),
        }
    }

    /// Create a translation store holding the framework's built-in strings.
    pub fn with_builtin(default_locale: LanguageIdentifier) -> Result<Self> {
        let mut translations = Self::empty(default_locale);

        for (locale, source) in BUILTIN_RESOURCES {
            translations.add_source(&crate::parse_locale(locale)?, *source)?;
        }

        Ok(translations)
    }

    /// The locale used as the last fallback.
    pub const fn default_locale(&self) -> &LanguageIdentifier {
        &self.default_locale
    }

    /// Every locale with at least one resource loaded.
    pub fn locales(&self) -> impl Iterator<Item = &LanguageIdentifier> {
        self.bundles.keys()
    }

    /// Parse Fluent source and add it for `locale`.
    pub fn add_source(&mut self, locale: &LanguageIdentifier, source: impl Into<String>) -> Result<()> {
        let resource = parse_resource(source)?;
        self.add_resource(locale.clone(), resource);
        Ok(())
    }

    /// Add a parsed resource for `locale`. Messages that already exist are
    /// replaced, so bots can override framework strings.
    pub fn add_resource(&mut self, locale: LanguageIdentifier, resource: FluentResource) {
        self.bundles
            .entry(locale.clone())
            .or_insert_with(|| new_bundle(locale))
            .add_resource_overriding(resource);
    }

    /// Load every `<locale>/*.ftl` file below `directory`.
    pub fn load_directory(&mut self, directory: &Path) -> Result<()> {
        for (locale, resource) in crate::load_directory(directory)? {
            self.add_resource(locale, resource);
        }

        Ok(())
    }

    /// Whether `key` resolves in `locale` or one of its fallbacks.
    pub fn has_key(&self, key: &str, locale: &LanguageIdentifier) -> bool {
        self.candidates(locale)
            .any(|bundle| bundle.get_message(key).and_then(|m| m.value()).is_some())
    }

    /// Translate `key` without arguments.
    pub fn translate(&self, key: &str, locale: &LanguageIdentifier) -> String {
        self.format(key, locale, None)
    }

    /// Translate `key`, substituting `args`.
    pub fn translate_with(&self, key: &str, locale: &LanguageIdentifier, args: &FluentArgs<'_>) -> String {
        self.format(key, locale, Some(args))
    }

    fn format(&self, key: &str, locale: &LanguageIdentifier, args: Option<&FluentArgs<'_>>) -> String {
        for bundle in self.candidates(locale) {
            let Some(pattern) = bundle.get_message(key).and_then(|m| m.value()) else {
                continue;
            };

            let mut errors = Vec::new();
            let value = bundle.format_pattern(pattern, args, &mut errors);

            if !errors.is_empty() {
                warn!(key, locale = %locale, ?errors, "Errors while formatting translation");
            }

            return value.into_owned();
        }

        trace!(key, locale = %locale, "Missing translation");
        key.to_string()
    }

    fn candidates<'a>(&'a self, locale: &'a LanguageIdentifier) -> impl Iterator<Item = &'a Bundle> + 'a {
        let exact = self.bundles.get(locale);

        let same_language = self
            .bundles
            .iter()
            .filter(move |(other, _)| *other != locale && other.language == locale.language)
            .map(|(_, bundle)| bundle);

        let default = self.bundles.get(&self.default_locale);

        exact.into_iter().chain(same_language).chain(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_locale;

    fn builtin() -> Translations {
        Translations::with_builtin(DEFAULT_LOCALE.clone()).unwrap()
    }

    #[test]
    fn test_simple_translation() {
        let translations = builtin();
        assert_eq!(
            translations.translate("checks-any-guild-failed", &DEFAULT_LOCALE),
            "Must be in a server"
        );
    }

    #[test]
    fn test_arguments_are_substituted() {
        let translations = builtin();
        let mut args = FluentArgs::new();
        args.set("page", 2);
        args.set("total", 5);

        assert_eq!(
            translations.translate_with("paginator-footer-page", &DEFAULT_LOCALE, &args),
            "Page 2/5"
        );
    }

    #[test]
    fn test_plural_selection() {
        let translations = builtin();

        let mut one = FluentArgs::new();
        one.set("count", 1);
        one.set("arguments", "`name`");

        let mut many = FluentArgs::new();
        many.set("count", 2);
        many.set("arguments", "`name`, `count`");

        assert_eq!(
            translations.translate_with("argument-parser-error-no-filled-arguments", &DEFAULT_LOCALE, &one),
            "This command has 1 required argument: `name`"
        );
        assert_eq!(
            translations.translate_with("argument-parser-error-no-filled-arguments", &DEFAULT_LOCALE, &many),
            "This command has 2 required arguments: `name`, `count`"
        );
    }

    #[test]
    fn test_language_and_default_fallback() {
        let translations = builtin();
        let austrian = parse_locale("de-AT").unwrap();

        assert_eq!(
            translations.translate("checks-any-guild-failed", &austrian),
            "Muss auf einem Server sein"
        );
        assert_eq!(
            translations.translate("checks-is-bot-failed", &austrian),
            "Must be a bot"
        );
    }

    #[test]
    fn test_missing_key_returns_key() {
        let translations = builtin();
        assert_eq!(translations.translate("no-such-key", &DEFAULT_LOCALE), "no-such-key");
        assert!(!translations.has_key("no-such-key", &DEFAULT_LOCALE));
        assert!(translations.has_key("paginator-button-done", &DEFAULT_LOCALE));
    }

    #[test]
    fn test_overriding_builtin_strings() {
        let mut translations = builtin();
        translations
            .add_source(&DEFAULT_LOCALE, "paginator-button-done = Close\n")
            .unwrap();

        assert_eq!(translations.translate("paginator-button-done", &DEFAULT_LOCALE), "Close");
    }
}
