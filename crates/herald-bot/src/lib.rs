//! # Herald Bot
//!
//! A Discord bot assembled from Herald extensions: the built-in help
//! command plus a handful of small demo extensions.
//!
//! This is the main binary crate that loads configuration, initializes
//! logging and runs the bot until it is stopped.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extensions;

pub use error::*;

use extensions::{AboutExtension, EchoExtension, EventLogExtension, PingExtension};
use herald_config::Config;
use herald_core::{ExtensibleBot, HelpExtension};
use tracing::info;

/// Builds the bot from `config` with every bundled extension loaded.
pub async fn build_bot(config: Config) -> BotResult<ExtensibleBot> {
    let bot = ExtensibleBot::from_config(config)?;

    bot.load_extension(EventLogExtension::new()).await?;
    bot.load_extension(HelpExtension::new()).await?;
    bot.load_extension(PingExtension).await?;
    bot.load_extension(EchoExtension::new()).await?;
    bot.load_extension(AboutExtension::new()).await?;

    info!(extensions = ?bot.extension_names().await, "Extensions loaded");
    Ok(bot)
}
