//! Locale parsing helpers.

use herald_common::{FrameworkError, Result};
use once_cell::sync::Lazy;
use unic_langid::LanguageIdentifier;

/// The locale used when nothing better is known.
pub static DEFAULT_LOCALE: Lazy<LanguageIdentifier> =
    Lazy::new(|| "en-US".parse().unwrap_or_default());

/// Parse a BCP 47 locale tag such as `en-US` or `de`.
///
/// Discord reports some locales with an underscore, so that is accepted too.
pub fn parse_locale(tag: &str) -> Result<LanguageIdentifier> {
    tag.trim()
        .replace('_', "-")
        .parse()
        .map_err(|_| FrameworkError::localization(format!("Unknown locale `{tag}`"), Some(tag)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locale() {
        assert_eq!(DEFAULT_LOCALE.to_string(), "en-US");
    }

    #[test]
    fn test_parse_locale() {
        assert_eq!(parse_locale("de").unwrap().to_string(), "de");
        assert_eq!(parse_locale("pt_BR").unwrap().to_string(), "pt-BR");
        assert!(parse_locale("not a locale!").is_err());
    }
}
