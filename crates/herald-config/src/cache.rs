//! Thread-safe configuration caching with arc-swap for lock-free reads.

use crate::loader::ConfigLoader;
use crate::schema::Config;
use arc_swap::ArcSwap;
use herald_common::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Thread-safe configuration cache using arc-swap for lock-free reads.
///
/// Readers hold an `Arc<Config>` snapshot, so a reload never changes a
/// configuration that a running command is looking at.
pub struct ConfigCache {
    config: ArcSwap<Config>,
}

impl ConfigCache {
    /// Creates a new configuration cache with the given initial configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
        }
    }

    /// Gets the current configuration.
    pub fn get(&self) -> Arc<Config> {
        self.config.load_full()
    }

    /// Updates the configuration atomically.
    pub fn update(&self, config: Config) {
        self.config.store(Arc::new(config));
    }

    /// Applies `change` to a copy of the current configuration and stores it
    /// if it still validates.
    pub fn update_with(&self, change: impl FnOnce(&mut Config)) -> Result<()> {
        let mut next = Config::clone(&self.get());
        change(&mut next);
        next.validate()?;
        self.update(next);
        Ok(())
    }

    /// Reloads from `loader`. On failure the previous configuration is kept.
    pub fn reload(&self, loader: &ConfigLoader) -> Result<()> {
        match loader.load() {
            Ok(config) => {
                self.update(config);
                info!("Configuration reloaded");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Configuration reload failed, keeping previous configuration");
                Err(e)
            }
        }
    }
}

impl Default for ConfigCache {
    fn default() -> Self {
        Self::new(Config::default())
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
    fn test_snapshots_survive_updates() {
        let cache = ConfigCache::new(valid());
        let before = cache.get();

        cache.update_with(|c| c.chat_commands.default_prefix = "?".to_string()).unwrap();

        assert_eq!(before.chat_commands.default_prefix, "!");
        assert_eq!(cache.get().chat_commands.default_prefix, "?");
    }

    #[test]
    fn test_invalid_update_rejected() {
        let cache = ConfigCache::new(valid());

        assert!(cache.update_with(|c| c.pagination.timeout_seconds = 0).is_err());
        assert_eq!(cache.get().pagination.timeout_seconds, 120);
    }
}
