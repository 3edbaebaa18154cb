//! What a command action gets to work with.

use crate::arguments::{Arg, ParsedArguments};
use crate::commands::MenuTarget;
use crate::event::EventContext;
use crate::framework::Framework;
use crate::i18n::Localizer;
use crate::pagination::{ButtonPaginator, Pages, PaginatorOptions};
use crate::respond::Responder;
use herald_common::{CommandKind, Result};
use herald_i18n::FluentArgs;
use serenity::all::{ChannelId, CommandInteraction, Context, GuildId, Message, UserId};
use std::fmt;
use std::sync::Arc;

/// Where an invocation came from.
#[derive(Clone, Default)]
pub enum Source {
    /// A chat command message.
    Message {
        /// Serenity's context for the event.
        ctx: Context,
        /// The invoking message.
        message: Box<Message>,
    },
    /// An application command interaction.
    Interaction {
        /// Serenity's context for the event.
        ctx: Context,
        /// The interaction.
        interaction: Box<CommandInteraction>,
    },
    /// No gateway event, as in tests.
    #[default]
    Detached,
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message { message, .. } => f.debug_tuple("Message").field(&message.id).finish(),
            Self::Interaction { interaction, .. } => f.debug_tuple("Interaction").field(&interaction.id).finish(),
            Self::Detached => f.write_str("Detached"),
        }
    }
}

/// One invocation before its command has run: who, where, and how to reply.
#[derive(Clone)]
pub struct CommandCall {
    /// What checks see.
    pub event: EventContext,
    /// Translations in the invoking user's locale.
    pub localizer: Localizer,
    /// Sends replies.
    pub responder: Arc<dyn Responder>,
    /// Shared framework state.
    pub framework: Arc<Framework>,
    /// The serenity event behind the call.
    pub source: Source,
}

impl CommandCall {
    /// A call without a serenity event behind it.
    pub fn new(
        event: EventContext,
        localizer: Localizer,
        responder: Arc<dyn Responder>,
        framework: Arc<Framework>,
    ) -> Self {
        Self {
            event,
            localizer,
            responder,
            framework,
            source: Source::Detached,
        }
    }

    /// Attaches the serenity event.
    #[must_use]
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }
}

impl fmt::Debug for CommandCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandCall")
            .field("event", &self.event)
            .field("locale", &self.localizer.locale().to_string())
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Handed to a command's action.
pub struct CommandContext {
    call: CommandCall,
    command: String,
    kind: CommandKind,
    arguments: ParsedArguments,
    prefix: Option<String>,
    target: Option<MenuTarget>,
}

impl CommandContext {
    pub(crate) fn new(
        call: CommandCall,
        command: String,
        kind: CommandKind,
        arguments: ParsedArguments,
        prefix: Option<String>,
    ) -> Self {
        Self {
            call,
            command,
            kind,
            arguments,
            prefix,
            target: None,
        }
    }

    pub(crate) fn with_target(mut self, target: Option<MenuTarget>) -> Self {
        self.target = target;
        self
    }

    /// Full name of the running command, parent first for subcommands.
    pub fn command_name(&self) -> &str {
        &self.command
    }

    /// Which surface invoked the command.
    pub const fn kind(&self) -> CommandKind {
        self.kind
    }

    /// What a context menu command was used on.
    pub const fn target(&self) -> Option<&MenuTarget> {
        self.target.as_ref()
    }

    /// The prefix used, for chat commands.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// The event snapshot checks saw.
    pub const fn event(&self) -> &EventContext {
        &self.call.event
    }

    /// The invoking user.
    pub const fn author(&self) -> UserId {
        self.call.event.author
    }

    /// The channel the command was used in.
    pub const fn channel(&self) -> ChannelId {
        self.call.event.channel
    }

    /// The guild, unless this is a direct message.
    pub const fn guild(&self) -> Option<GuildId> {
        self.call.event.guild
    }

    /// Shared framework state.
    pub const fn framework(&self) -> &Arc<Framework> {
        &self.call.framework
    }

    /// Translations in the invoking user's locale.
    pub const fn localizer(&self) -> &Localizer {
        &self.call.localizer
    }

    /// The reply channel.
    pub fn responder(&self) -> Arc<dyn Responder> {
        Arc::clone(&self.call.responder)
    }

    /// The serenity event behind the call.
    pub const fn source(&self) -> &Source {
        &self.call.source
    }

    /// Serenity's context, when there is a gateway event.
    pub const fn serenity(&self) -> Option<&Context> {
        match &self.call.source {
            Source::Message { ctx, .. } | Source::Interaction { ctx, .. } => Some(ctx),
            Source::Detached => None,
        }
    }

    /// The value of a parsed argument.
    pub fn arg<T: 'static>(&self, arg: Arg<T>) -> Result<&T> {
        self.arguments.get(arg)
    }

    /// Every parsed argument.
    pub const fn arguments(&self) -> &ParsedArguments {
        &self.arguments
    }

    /// Translates `key` for the invoking user.
    pub fn translate(&self, key: &str) -> String {
        self.call.localizer.translate(key)
    }

    /// Translates `key` with placeholders for the invoking user.
    pub fn translate_with(&self, key: &str, args: &FluentArgs<'_>) -> String {
        self.call.localizer.translate_with(key, args)
    }

    /// Replies with plain text.
    pub async fn respond(&self, content: impl Into<String> + Send) -> Result<()> {
        self.call.responder.respond(content.into()).await
    }

    /// A paginator over `pages`, owned by the invoking user and configured
    /// from the pagination settings.
    pub fn paginator(&self, pages: Pages) -> Result<ButtonPaginator> {
        let options = PaginatorOptions {
            owner: Some(self.author()),
            ..PaginatorOptions::from_config(&self.framework().config().pagination)
        };

        self.paginator_with(pages, &options)
    }

    /// A paginator over `pages` with explicit options.
    pub fn paginator_with(&self, pages: Pages, options: &PaginatorOptions) -> Result<ButtonPaginator> {
        ButtonPaginator::new(
            pages,
            options,
            self.call.localizer.clone(),
            self.responder(),
            Arc::clone(self.framework().components()),
        )
    }
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("command", &self.command)
            .field("kind", &self.kind)
            .field("arguments", &self.arguments)
            .field("call", &self.call)
            .finish_non_exhaustive()
    }
}
