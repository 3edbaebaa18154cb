//! Translation access for a single invocation.

use herald_i18n::{FluentArgs, LanguageIdentifier, Translations};
use std::sync::Arc;

/// Translations bound to the locale of the user being answered.
#[derive(Debug, Clone)]
pub struct Localizer {
    translations: Arc<Translations>,
    locale: LanguageIdentifier,
}

impl Localizer {
    /// Binds `translations` to `locale`.
    pub const fn new(translations: Arc<Translations>, locale: LanguageIdentifier) -> Self {
        Self { translations, locale }
    }

    /// Binds `translations` to their default locale.
    pub fn default_for(translations: Arc<Translations>) -> Self {
        let locale = translations.default_locale().clone();
        Self::new(translations, locale)
    }

    /// The locale messages are translated into.
    pub const fn locale(&self) -> &LanguageIdentifier {
        &self.locale
    }

    /// The underlying translation bundles.
    pub const fn translations(&self) -> &Arc<Translations> {
        &self.translations
    }

    /// Translates `key`.
    pub fn translate(&self, key: &str) -> String {
        self.translations.translate(key, &self.locale)
    }

    /// Translates `key` with placeholders.
    pub fn translate_with(&self, key: &str, args: &FluentArgs<'_>) -> String {
        self.translations.translate_with(key, &self.locale, args)
    }

    /// Translates `text` when it names a known key, otherwise returns it
    /// unchanged. Command and argument descriptions go through this.
    pub fn translate_text(&self, text: &str) -> String {
        if self.translations.has_key(text, &self.locale) {
            self.translate(text)
        } else {
            text.to_string()
        }
    }

    /// Translates `key` into the bot's default locale.
    pub fn translate_default(&self, key: &str) -> String {
        self.translations.translate(key, self.translations.default_locale())
    }

    /// Same localizer, different locale.
    #[must_use]
    pub fn with_locale(&self, locale: LanguageIdentifier) -> Self {
        Self::new(Arc::clone(&self.translations), locale)
    }
}

/// Builds [`FluentArgs`] from `name => value` pairs.
///
/// ```
/// use herald_core::fluent_args;
///
/// let args = fluent_args!("name" => "count", "total" => 3);
/// assert!(args.get("total").is_some());
/// ```
#[macro_export]
macro_rules! fluent_args {
    ($($name:literal => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut args = $crate::FluentArgs::new();
        $(args.set($name, $value);)*
        args
    }};
}
