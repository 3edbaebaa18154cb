//! # Herald Core
//!
//! An extension and command framework for Discord bots on serenity.
//!
//! Bots are assembled from [`Extension`]s. Each extension registers chat
//! commands, slash and context menu commands, checks and event listeners
//! through an [`ExtensionBuilder`]. The [`ExtensibleBot`] routes incoming messages and
//! interactions to those commands, which parse typed arguments with
//! converters, run their checks and usage limits, and reply through a
//! [`Responder`]. Every user-facing string is translated with Fluent.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod arguments;
pub mod bot;
pub mod checks;
pub mod commands;
pub mod components;
pub mod context;
pub mod converters;
pub mod event;
pub mod events;
pub mod extensions;
pub mod framework;
pub mod i18n;
pub mod listeners;
pub mod pagination;
pub mod parser;
pub mod registry;
pub mod respond;
pub mod usage_limits;

pub use arguments::{Arg, Arguments, ParsedArguments};
pub use bot::{ExtensibleBot, intents, load_translations};
pub use checks::{Check, CheckContext};
pub use commands::{ChatCommand, CommandOutcome, CommandResult, MenuTarget, MessageCommand, SlashCommand, UserCommand};
pub use context::CommandContext;
pub use event::EventContext;
pub use events::{CommandEvent, Invocation};
pub use extensions::{Extension, ExtensionBuilder, HelpExtension};
pub use framework::Framework;
pub use herald_common::{BoxError, DiscordRelayedError, ExtensionState, FrameworkError, Result};
pub use herald_i18n::FluentArgs;
pub use i18n::Localizer;
pub use listeners::{EventListener, GatewayEvent, ListenerContext};
pub use pagination::{Page, Pages, PaginatorOptions};
pub use respond::Responder;
pub use usage_limits::CooldownScope;
