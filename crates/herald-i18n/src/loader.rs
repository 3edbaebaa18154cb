//! Fluent resource loading.

use crate::parse_locale;
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::FluentResource;
use herald_common::{FrameworkError, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use unic_langid::LanguageIdentifier;

/// Thread-safe bundle type used throughout the framework.
pub type Bundle = FluentBundle<FluentResource>;

/// The framework's own translations, embedded at compile time.
pub const BUILTIN_RESOURCES: &[(&str, &str)] = &[
    ("en-US", include_str!("../locales/en-US/herald.ftl")),
    ("de", include_str!("../locales/de/herald.ftl")),
];

/// Parse Fluent source into a resource.
///
/// Syntax errors are fatal: a partially parsed resource would silently drop
/// messages.
pub fn parse_resource(source: impl Into<String>) -> Result<FluentResource> {
    FluentResource::try_new(source.into()).map_err(|(_, errors)| {
        FrameworkError::localization(format!("Invalid Fluent resource: {errors:?}"), None)
    })
}

/// Create an empty bundle for `locale`, with Unicode isolation marks disabled
/// so that placeables render cleanly in Discord.
pub fn new_bundle(locale: LanguageIdentifier) -> Bundle {
    let mut bundle = Bundle::new_concurrent(vec![locale]);
    bundle.set_use_isolating(false);
    bundle
}

/// Load every `<locale>/*.ftl` file below `directory`.
///
/// Directories whose names are not valid locales are skipped with a warning.
pub fn load_directory(directory: &Path) -> Result<Vec<(LanguageIdentifier, FluentResource)>> {
    let mut resources = Vec::new();

    for entry in fs::read_dir(directory)? {
        let path = entry?.path();

        if !path.is_dir() {
            continue;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        let locale = match parse_locale(name) {
            Ok(locale) => locale,
            Err(e) => {
                warn!(directory = %path.display(), error = %e, "Skipping non-locale directory");
                continue;
            }
        };

        for file in fs::read_dir(&path)? {
            let file = file?.path();

            if file.extension().is_some_and(|ext| ext == "ftl") {
                debug!(file = %file.display(), locale = %locale, "Loading translations");

                let resource = parse_resource(fs::read_to_string(&file)?)?;
                resources.push((locale.clone(), resource));
            }
        }
    }

    Ok(resources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_resources_parse() {
        for (locale, source) in BUILTIN_RESOURCES {
            assert!(parse_locale(locale).is_ok());
            assert!(parse_resource(*source).is_ok(), "{locale} failed to parse");
        }
    }

    #[test]
    fn test_invalid_resource_is_rejected() {
        assert!(parse_resource("this is = not { valid").is_err());
    }

    #[test]
    fn test_load_directory() {
        let dir = herald_common::test_utils::create_temp_dir();
        let locale_dir = dir.path().join("fr");
        fs::create_dir(&locale_dir).unwrap();
        fs::write(locale_dir.join("bot.ftl"), "greeting = Bonjour\n").unwrap();
        fs::create_dir(dir.path().join("not a locale!")).unwrap();

        let resources = load_directory(dir.path()).unwrap();

        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].0.to_string(), "fr");
    }
}
