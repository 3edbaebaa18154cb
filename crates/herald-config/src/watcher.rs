//! Hot-reloading of the configuration file.

use crate::cache::ConfigCache;
use crate::loader::ConfigLoader;
use herald_common::{FrameworkError, Result};
use notify::{Config as NotifyConfig, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Watches a configuration file and reloads it into a [`ConfigCache`]
/// whenever it changes. Dropping the watcher stops it.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl ConfigWatcher {
    /// Starts watching `path`.
    ///
    /// The parent directory is watched rather than the file, since editors
    /// and [`ConfigLoader::save`] replace the file instead of writing to it.
    pub fn start(path: impl Into<PathBuf>, cache: Arc<ConfigCache>) -> Result<Self> {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(ToOwned::to_owned)
            .ok_or_else(|| FrameworkError::config(format!("`{}` is not a file path", path.display())))?;
        let directory = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let loader = ConfigLoader::new(path.clone());

        let mut watcher = RecommendedWatcher::new(
            move |res: std::result::Result<notify::Event, notify::Error>| {
                let Ok(event) = res else { return };

                if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                    return;
                }

                if !event.paths.iter().any(|p| p.file_name() == Some(file_name.as_os_str())) {
                    return;
                }

                debug!(kind = ?event.kind, "Configuration file changed");
                if let Err(e) = cache.reload(&loader) {
                    warn!(file = ?file_name, error = %e, "Ignoring configuration change");
                }
            },
            NotifyConfig::default(),
        )
        .map_err(|e| FrameworkError::config_with_source("Failed to create configuration watcher", e))?;

        watcher
            .watch(&directory, RecursiveMode::NonRecursive)
            .map_err(|e| FrameworkError::config_with_source("Failed to watch configuration directory", e))?;

        info!(path = %path.display(), "Watching configuration file");

        Ok(Self {
            _watcher: watcher,
            path,
        })
    }

    /// The file being watched.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
