//! Configuration loading and persistence.

use crate::schema::Config;
use herald_common::{FrameworkError, Result};
use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable pointing at the configuration file.
pub const CONFIG_PATH_VAR: &str = "HERALD_CONFIG_PATH";

/// Files tried, in order, when no path is given.
pub const DEFAULT_CONFIG_FILES: &[&str] = &["herald.toml", "herald.yaml", "herald.yml", "herald.json"];

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML, the default.
    Toml,
    /// YAML.
    Yaml,
    /// JSON.
    Json,
}

impl ConfigFormat {
    /// Picks the format from a file extension, defaulting to TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            Some("json") => Self::Json,
            _ => Self::Toml,
        }
    }

    /// Parses configuration text in this format.
    pub fn parse(self, content: &str) -> Result<Config> {
        match self {
            Self::Toml => toml::from_str(content)
                .map_err(|e| FrameworkError::config_with_source("Failed to parse TOML configuration", e)),
            Self::Yaml => serde_yaml::from_str(content)
                .map_err(|e| FrameworkError::config_with_source("Failed to parse YAML configuration", e)),
            Self::Json => serde_json::from_str(content)
                .map_err(|e| FrameworkError::config_with_source("Failed to parse JSON configuration", e)),
        }
    }

    /// Serializes a configuration in this format.
    pub fn render(self, config: &Config) -> Result<String> {
        match self {
            Self::Toml => toml::to_string_pretty(config).map_err(|e| FrameworkError::Serialization(e.to_string())),
            Self::Yaml => serde_yaml::to_string(config).map_err(|e| FrameworkError::Serialization(e.to_string())),
            Self::Json => serde_json::to_string_pretty(config).map_err(|e| FrameworkError::Serialization(e.to_string())),
        }
    }
}

/// Configuration loader for a Herald bot.
pub struct ConfigLoader {
    path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Creates a loader for a specific file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Creates a loader that finds its file via [`CONFIG_PATH_VAR`] or
    /// [`DEFAULT_CONFIG_FILES`], falling back to defaults when none exists.
    pub fn discover() -> Self {
        let path = env::var(CONFIG_PATH_VAR).map(PathBuf::from).ok().or_else(|| {
            DEFAULT_CONFIG_FILES
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
        });

        Self { path }
    }

    /// The file this loader reads, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads, overrides from the process environment, and validates.
    pub fn load(&self) -> Result<Config> {
        self.load_with_env(|name| env::var(name).ok())
    }

    /// Loads, overrides from `lookup`, and validates.
    pub fn load_with_env(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<Config> {
        let mut config = match &self.path {
            Some(path) => {
                info!(path = %path.display(), "Loading configuration");
                Self::read_file(path)?
            }
            None => {
                info!("No configuration file found, using defaults");
                Config::default()
            }
        };

        apply_env_overrides(&mut config, lookup)?;
        config.validate()?;

        Ok(config)
    }

    /// Reads and parses a file without overrides or validation.
    pub fn read_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)?;
        ConfigFormat::from_path(path).parse(&content)
    }

    /// Saves configuration to the loader's file atomically, by writing a
    /// temporary file next to it and renaming it into place.
    pub fn save(&self, config: &Config) -> Result<()> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| FrameworkError::config("No configuration file to save to"))?;

        let rendered = ConfigFormat::from_path(path).render(config)?;
        let directory = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut file = tempfile::NamedTempFile::new_in(directory)?;
        file.write_all(rendered.as_bytes())?;
        file.persist(path).map_err(|e| FrameworkError::Io(e.error))?;

        debug!(path = %path.display(), "Configuration saved");
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .map_err(|e| FrameworkError::config_with_source(format!("Failed to parse environment variable `{name}`"), e))
}

/// Applies environment overrides to `config`.
///
/// Recognised variables: `DISCORD_TOKEN`, `HERALD_PREFIX`,
/// `HERALD_DEFAULT_GUILD`, `HERALD_OWNERS` (comma separated ids),
/// `HERALD_LOCALE` and `HERALD_LOG_LEVEL`.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(token) = lookup("DISCORD_TOKEN") {
        config.bot.token = token;
    }

    if let Some(prefix) = lookup("HERALD_PREFIX") {
        config.chat_commands.default_prefix = prefix;
    }

    if let Some(guild) = lookup("HERALD_DEFAULT_GUILD") {
        config.application_commands.default_guild = Some(parse_var("HERALD_DEFAULT_GUILD", &guild)?);
    }

    if let Some(owners) = lookup("HERALD_OWNERS") {
        config.bot.owners = owners
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| parse_var("HERALD_OWNERS", s))
            .collect::<Result<_>>()?;
    }

    if let Some(locale) = lookup("HERALD_LOCALE") {
        config.i18n.default_locale = locale;
    }

    if let Some(level) = lookup("HERALD_LOG_LEVEL") {
        config.logging.level = level;
    }

    Ok(())
}
