//! Chat command lookup and message dispatch.

use crate::commands::{ChatCommand, CommandOutcome};
use crate::context::{CommandCall, Source};
use crate::event::EventContext;
use crate::framework::Framework;
use crate::respond::MessageResponder;
use herald_common::{split_first_word, FrameworkError, Result};
use herald_parser::StringParser;
use parking_lot::RwLock;
use serenity::all::{Context, Message, UserId};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Registered chat commands.
#[derive(Debug, Default)]
pub struct ChatCommandRegistry {
    commands: RwLock<Vec<Arc<ChatCommand>>>,
}

impl ChatCommandRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `command`.
    ///
    /// Fails when the command is invalid or its name is taken. Aliases that
    /// collide with other commands only produce a warning, since lookups
    /// prefer names over aliases.
    pub fn add(&self, command: ChatCommand) -> Result<Arc<ChatCommand>> {
        command.validate()?;

        let mut commands = self.commands.write();

        if commands.iter().any(|existing| existing.name().eq_ignore_ascii_case(command.name())) {
            return Err(FrameworkError::registration(
                command.name(),
                "A chat command with this name is already registered",
            ));
        }

        for alias in command.aliases() {
            if let Some(existing) = commands.iter().find(|existing| existing.matches(alias)) {
                warn!(
                    command = command.name(),
                    alias,
                    shadowed_by = existing.name(),
                    "Alias is shadowed by another command"
                );
            }
        }

        for existing in commands.iter() {
            if existing.aliases().iter().any(|alias| alias.eq_ignore_ascii_case(command.name())) {
                warn!(
                    command = existing.name(),
                    alias = command.name(),
                    shadowed_by = command.name(),
                    "Alias is shadowed by another command"
                );
            }
        }

        debug!(command = command.name(), extension = command.base().extension(), "Registered chat command");

        let command = Arc::new(command);
        commands.push(Arc::clone(&command));

        Ok(command)
    }

    /// Unregisters the command called `name`.
    pub fn remove(&self, name: &str) -> Option<Arc<ChatCommand>> {
        let mut commands = self.commands.write();
        let index = commands.iter().position(|command| command.name().eq_ignore_ascii_case(name))?;

        debug!(command = name, "Removed chat command");
        Some(commands.remove(index))
    }

    /// Unregisters every command `extension` added. Returns how many went.
    pub fn remove_extension(&self, extension: &str) -> usize {
        let mut commands = self.commands.write();
        let before = commands.len();

        commands.retain(|command| command.base().extension() != Some(extension));
        before - commands.len()
    }

    /// The command called `name`, by name first, then by alias.
    pub fn get_command(&self, name: &str) -> Option<Arc<ChatCommand>> {
        let commands = self.commands.read();

        commands
            .iter()
            .find(|command| command.name().eq_ignore_ascii_case(name))
            .or_else(|| commands.iter().find(|command| command.matches(name)))
            .cloned()
    }

    /// Every registered command, in registration order.
    pub fn commands(&self) -> Vec<Arc<ChatCommand>> {
        self.commands.read().clone()
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.read().len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.read().is_empty()
    }

    /// Splits a message into the lowercased command name and a parser over
    /// its arguments.
    ///
    /// A leading mention of the bot counts as a prefix when `invoke_on_mention`
    /// is set. Returns `None` when the message isn't addressed to the bot.
    pub fn resolve(content: &str, prefix: &str, bot: UserId, invoke_on_mention: bool) -> Option<(String, StringParser)> {
        let mentioned = invoke_on_mention
            .then(|| {
                [format!("<@{bot}>"), format!("<@!{bot}>")]
                    .into_iter()
                    .find_map(|mention| content.strip_prefix(mention.as_str()).map(ToString::to_string))
            })
            .flatten();

        let rest = match mentioned {
            Some(rest) => rest,
            None if !prefix.is_empty() => content.strip_prefix(prefix)?.to_string(),
            None => return None,
        };

        let (name, arguments) = split_first_word(rest.trim());

        if name.is_empty() {
            return None;
        }

        Some((name.to_lowercase(), StringParser::new(arguments)))
    }

    /// The enabled command a message invokes, with a parser over its
    /// arguments.
    pub fn find(
        &self,
        content: &str,
        prefix: &str,
        bot: UserId,
        invoke_on_mention: bool,
    ) -> Option<(Arc<ChatCommand>, StringParser)> {
        let (name, parser) = Self::resolve(content, prefix, bot, invoke_on_mention)?;

        match self.get_command(&name) {
            Some(command) if command.is_enabled() => Some((command, parser)),
            Some(_) => {
                trace!(command = name, "Ignoring disabled command");
                None
            }
            None => {
                trace!(command = name, "No such command");
                None
            }
        }
    }

    /// Runs the command `message` invokes, if any.
    pub async fn handle_message(
        &self,
        framework: &Arc<Framework>,
        ctx: &Context,
        message: &Message,
    ) -> Option<CommandOutcome> {
        let config = framework.config();
        let settings = &config.chat_commands;

        if !settings.enabled || message.content.trim().is_empty() {
            return None;
        }

        let bot = ctx.cache.current_user().id;

        if settings.ignore_self && message.author.id == bot {
            return None;
        }

        let prefix = framework.prefix_for(message).await;
        let (command, parser) = self.find(&message.content, &prefix, bot, settings.invoke_on_mention)?;

        let event = EventContext::from_message(ctx, message, framework.privileged()).await;
        let responder = MessageResponder::new(Arc::clone(&ctx.http), message.channel_id, message.id);

        let call = CommandCall::new(event, framework.localizer(None), Arc::new(responder), Arc::clone(framework))
            .with_source(Source::Message {
                ctx: ctx.clone(),
                message: Box::new(message.clone()),
            });

        let outcome = command.call(call, parser, &prefix).await;
        debug!(command = command.name(), ?outcome, "Chat command finished");

        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_common::test_utils::discord_fixtures::BOT_USER_ID;

    fn noop(name: &str) -> ChatCommand {
        ChatCommand::new(name).action(|_| async { Ok(()) })
    }

    #[test]
    fn test_duplicates_rejected() {
        let registry = ChatCommandRegistry::new();
        registry.add(noop("ping")).unwrap();

        let error = registry.add(noop("PING")).unwrap_err();
        assert!(matches!(error, FrameworkError::CommandRegistration { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_invalid_commands_rejected() {
        let registry = ChatCommandRegistry::new();

        assert!(matches!(
            registry.add(ChatCommand::new("empty")).unwrap_err(),
            FrameworkError::InvalidCommand { .. }
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lookup_prefers_names() {
        let registry = ChatCommandRegistry::new();
        registry.add(noop("help").alias("h")).unwrap();
        registry.add(noop("history").alias("help")).unwrap();

        assert_eq!(registry.get_command("HELP").unwrap().name(), "help");
        assert_eq!(registry.get_command("h").unwrap().name(), "help");
        assert!(registry.get_command("nothing").is_none());
    }

    #[test]
    fn test_remove_extension() {
        let registry = ChatCommandRegistry::new();

        let mut owned = noop("owned");
        owned.set_extension("tools", &[]);
        registry.add(owned).unwrap();
        registry.add(noop("free")).unwrap();

        assert_eq!(registry.remove_extension("tools"), 1);
        assert!(registry.get_command("owned").is_none());
        assert!(registry.remove("free").is_some());
        assert!(registry.remove("free").is_none());
    }

    #[test]
    fn test_resolve_prefix() {
        let bot = UserId::new(BOT_USER_ID);

        let (name, mut parser) = ChatCommandRegistry::resolve("!Ping  one two", "!", bot, true).unwrap();
        assert_eq!(name, "ping");
        assert_eq!(parser.consume_remaining(), "one two");

        assert!(ChatCommandRegistry::resolve("ping", "!", bot, true).is_none());
        assert!(ChatCommandRegistry::resolve("!", "!", bot, true).is_none());
    }

    #[test]
    fn test_resolve_mention() {
        let bot = UserId::new(BOT_USER_ID);

        let plain = format!("<@{BOT_USER_ID}> ping now");
        let (name, _) = ChatCommandRegistry::resolve(&plain, "!", bot, true).unwrap();
        assert_eq!(name, "ping");

        let nick = format!("<@!{BOT_USER_ID}>ping");
        assert_eq!(ChatCommandRegistry::resolve(&nick, "!", bot, true).unwrap().0, "ping");

        assert!(ChatCommandRegistry::resolve(&plain, "!", bot, false).is_none());
    }

    #[test]
    fn test_find_skips_disabled() {
        let registry = ChatCommandRegistry::new();
        registry.add(noop("off").enabled(false)).unwrap();
        registry.add(noop("on")).unwrap();

        let bot = UserId::new(BOT_USER_ID);
        assert!(registry.find("!off", "!", bot, false).is_none());
        assert!(registry.find("!on", "!", bot, false).is_some());
    }
}
