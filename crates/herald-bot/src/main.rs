//! Main entry point for Herald Bot.

use anyhow::Context;
use herald_bot::build_bot;
use herald_common::init_logging;
use herald_config::{ConfigLoader, ConfigWatcher};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loader = ConfigLoader::discover();
    let config = loader.load().context("Failed to load configuration")?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(&config.logging).context("Failed to initialize logging")?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Herald Bot");

    let bot = build_bot(config).await.context("Failed to set up the bot")?;

    let _watcher = loader.path().and_then(|path| {
        ConfigWatcher::start(path, Arc::clone(bot.framework().config_cache()))
            .map_err(|e| warn!(error = %e, "Configuration changes will not be picked up"))
            .ok()
    });

    if let Err(e) = bot.start().await {
        error!(error = %e, "Bot stopped with an error");
        return Err(e.into());
    }

    info!("Bot stopped");
    Ok(())
}
