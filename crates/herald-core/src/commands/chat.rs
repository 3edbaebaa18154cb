//! Prefixed message commands.

use super::{command_builder, CommandBase, CommandOutcome, Input};
use crate::checks::CheckFn;
use crate::context::CommandCall;
use herald_common::{CommandKind, FrameworkError, Result};
use herald_parser::StringParser;
use std::fmt;
use tracing::trace;

/// A command invoked by a message starting with the prefix or a mention.
///
/// ```ignore
/// let mut args = Arguments::new();
/// let target = args.single("target", "Who to greet", UserConverter::new());
///
/// let greet = ChatCommand::new("greet")
///     .description("Says hello")
///     .alias("hi")
///     .arguments(args)
///     .action(move |ctx| async move {
///         let target = *ctx.arg(target)?;
///         ctx.respond(format!("Hello, <@{target}>!")).await?;
///         Ok(())
///     });
/// ```
pub struct ChatCommand {
    base: CommandBase,
    aliases: Vec<String>,
    enabled: bool,
    hidden: bool,
    allow_keyword_arguments: Option<bool>,
    subcommands: Vec<ChatCommand>,
}

impl ChatCommand {
    /// A command called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: CommandBase::new(name),
            aliases: Vec::new(),
            enabled: true,
            hidden: false,
            allow_keyword_arguments: None,
            subcommands: Vec::new(),
        }
    }

    command_builder!();

    /// Adds an alias.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Disabled commands are never invoked.
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Hidden commands are left out of help listings.
    #[must_use]
    pub const fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Overrides the configured keyword argument setting.
    #[must_use]
    pub const fn keyword_arguments(mut self, allow: bool) -> Self {
        self.allow_keyword_arguments = Some(allow);
        self
    }

    /// Adds a subcommand, selected by the first word after the command.
    #[must_use]
    pub fn subcommand(mut self, subcommand: Self) -> Self {
        if subcommand.enabled {
            self.base.subcommand_names.push(subcommand.name().to_string());
        }

        self.subcommands.push(subcommand);
        self
    }

    /// Aliases, as given.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Whether the command can be invoked.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether help listings skip the command.
    pub const fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Subcommands, in the order they were added.
    pub fn subcommands(&self) -> &[Self] {
        &self.subcommands
    }

    /// Whether `name` is this command's name or one of its aliases,
    /// ignoring case.
    pub fn matches(&self, name: &str) -> bool {
        self.name().eq_ignore_ascii_case(name) || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    }

    /// The enabled subcommand called `name`, by name first, then by alias.
    pub fn get_subcommand(&self, name: &str) -> Option<&Self> {
        let mut enabled = self.subcommands.iter().filter(|command| command.enabled);

        enabled
            .clone()
            .find(|command| command.name().eq_ignore_ascii_case(name))
            .or_else(|| enabled.find(|command| command.matches(name)))
    }

    /// Checks the command can be registered.
    pub fn validate(&self) -> Result<()> {
        self.base.validate(CommandKind::Chat, !self.subcommands.is_empty())?;

        if self.aliases.iter().any(|alias| alias.trim().is_empty() || alias.contains(char::is_whitespace)) {
            return Err(FrameworkError::invalid_command(
                Some(self.name()),
                "Aliases must be single words",
            ));
        }

        for subcommand in &self.subcommands {
            if !subcommand.subcommands.is_empty() {
                return Err(FrameworkError::invalid_command(
                    Some(subcommand.name()),
                    "Subcommands can't have subcommands of their own",
                ));
            }

            subcommand.validate()?;
        }

        Ok(())
    }

    pub(crate) fn set_extension(&mut self, extension: &str, checks: &[CheckFn]) {
        self.base.set_extension(extension, checks);

        for subcommand in &mut self.subcommands {
            subcommand.set_extension(extension, checks);
        }
    }

    /// Runs the command, or the subcommand named by the next token, over the
    /// rest of the message.
    pub async fn call(&self, call: CommandCall, mut parser: StringParser, prefix: &str) -> CommandOutcome {
        let keyword_arguments = self
            .allow_keyword_arguments
            .unwrap_or_else(|| call.framework.config().chat_commands.allow_keyword_arguments);

        let selected = parser
            .peek_next()
            .and_then(|token| self.get_subcommand(&token.data));

        if let Some(subcommand) = selected {
            parser.parse_next();

            let name = format!("{} {}", self.name(), subcommand.name());
            trace!(command = name, "Selected subcommand");

            let keyword_arguments = subcommand.allow_keyword_arguments.unwrap_or(keyword_arguments);
            let input = Input::Chat {
                parser,
                keyword_arguments,
                prefix: prefix.to_string(),
            };

            return subcommand.base.execute(call, &name, &self.base.checks, input).await;
        }

        let input = Input::Chat {
            parser,
            keyword_arguments,
            prefix: prefix.to_string(),
        };

        self.base.execute(call, self.name(), &[], input).await
    }
}

impl fmt::Debug for ChatCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCommand")
            .field("base", &self.base)
            .field("aliases", &self.aliases)
            .field("enabled", &self.enabled)
            .field("hidden", &self.hidden)
            .field("allow_keyword_arguments", &self.allow_keyword_arguments)
            .field("subcommands", &self.subcommands)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::Arguments;
    use crate::checks::test_events::{direct_message, guild_message};
    use crate::checks::CheckContext;
    use crate::commands::test_calls::call;
    use crate::converters::{IntConverter, StringConverter};
    use crate::events::CommandEvent;
    use crate::respond::MockResponder;
    use crate::test_support::framework;
    use crate::usage_limits::CooldownScope;
    use herald_common::{BoxError, DiscordRelayedError};
    use herald_config::Config;
    use mockall::predicate::eq;
    use serenity::all::Permissions;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn counting(counter: &Arc<AtomicUsize>) -> ChatCommand {
        let counter = Arc::clone(counter);

        ChatCommand::new("count").action(move |_| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
    }

    fn silent() -> MockResponder {
        let mut responder = MockResponder::new();
        responder.expect_respond().never();
        responder
    }

    fn replying(message: &str) -> MockResponder {
        let mut responder = MockResponder::new();
        responder
            .expect_respond()
            .with(eq(message.to_string()))
            .times(1)
            .returning(|_| Ok(()));
        responder
    }

    #[test]
    fn test_validate() {
        assert!(ChatCommand::new("").validate().is_err());
        assert!(ChatCommand::new("two words").action(|_| async { Ok(()) }).validate().is_err());
        assert!(ChatCommand::new("ping").validate().is_err());
        assert!(ChatCommand::new("ping").action(|_| async { Ok(()) }).validate().is_ok());

        let group = ChatCommand::new("config").subcommand(ChatCommand::new("get").action(|_| async { Ok(()) }));
        assert!(group.validate().is_ok());

        let nested = ChatCommand::new("a").subcommand(
            ChatCommand::new("b").subcommand(ChatCommand::new("c").action(|_| async { Ok(()) })),
        );
        assert!(nested.validate().is_err());
    }

    #[test]
    fn test_matches_aliases_ignoring_case() {
        let command = ChatCommand::new("help").alias("h");

        assert!(command.matches("HELP"));
        assert!(command.matches("h"));
        assert!(!command.matches("hello"));
    }

    #[tokio::test]
    async fn test_successful_call_publishes_events() {
        let framework = framework(Config::default());
        let mut events = framework.events().subscribe();
        let counter = Arc::new(AtomicUsize::new(0));

        let outcome = counting(&counter)
            .call(call(direct_message(), silent(), &framework), StringParser::new(""), "!")
            .await;

        assert_eq!(outcome, CommandOutcome::Succeeded);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(matches!(events.recv().await.unwrap(), CommandEvent::Invoked(_)));
        assert!(matches!(events.recv().await.unwrap(), CommandEvent::Succeeded(_)));
    }

    #[tokio::test]
    async fn test_check_chain_order_and_relay() {
        let framework = framework(Config::default());
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let global = Arc::clone(&order);
        framework.add_chat_check(move |_: &mut CheckContext<'_>| global.lock().push("global"));

        let own = Arc::clone(&order);
        let command = ChatCommand::new("guarded")
            .check(move |ctx: &mut CheckContext<'_>| {
                own.lock().push("command");
                ctx.any_guild();
            })
            .action(|_| async { Ok(()) });

        let outcome = command
            .call(
                call(direct_message(), replying("**Error:** Must be in a server"), &framework),
                StringParser::new(""),
                "!",
            )
            .await;

        assert_eq!(outcome, CommandOutcome::FailedChecks);
        assert_eq!(*order.lock(), vec!["global", "command"]);
    }

    #[tokio::test]
    async fn test_silent_check_failure() {
        let framework = framework(Config::default());
        let command = ChatCommand::new("quiet")
            .check(|ctx: &mut CheckContext<'_>| ctx.fail())
            .action(|_| async { Ok(()) });

        let outcome = command
            .call(call(direct_message(), silent(), &framework), StringParser::new(""), "!")
            .await;

        assert_eq!(outcome, CommandOutcome::FailedChecks);
    }

    #[tokio::test]
    async fn test_parsing_error_includes_signature() {
        let framework = framework(Config::default());

        let mut args = Arguments::new();
        args.single("count", "", IntConverter::new());
        let command = ChatCommand::new("repeat").arguments(args).action(|_| async { Ok(()) });

        let mut responder = MockResponder::new();
        responder
            .expect_respond()
            .withf(|message: &String| {
                message.contains("not a valid number") && message.ends_with("\n\n**Signature:** `!repeat <count: number>`")
            })
            .times(1)
            .returning(|_| Ok(()));

        let outcome = command
            .call(call(direct_message(), responder, &framework), StringParser::new("many"), "!")
            .await;

        assert_eq!(outcome, CommandOutcome::FailedParsing);
    }

    #[tokio::test]
    async fn test_relayed_action_error_is_sent_as_is() {
        let framework = framework(Config::default());
        let command =
            ChatCommand::new("fail").action(|_| async {
            let error: BoxError = Box::new(DiscordRelayedError::new("Not today"));
            Err(error)
        });

        let outcome = command
            .call(call(direct_message(), replying("Not today"), &framework), StringParser::new(""), "!")
            .await;

        assert_eq!(outcome, CommandOutcome::Errored);
    }

    #[tokio::test]
    async fn test_other_action_errors_get_generic_message() {
        let framework = framework(Config::default());
        let mut events = framework.events().subscribe();
        let command = ChatCommand::new("fail").action(|_| async {
            let error: BoxError = "database is down".into();
            Err(error)
        });

        let outcome = command
            .call(
                call(
                    direct_message(),
                    replying(
                        "Unfortunately, **an error occurred** while running this command. Please let a staff member know.",
                    ),
                    &framework,
                ),
                StringParser::new(""),
                "!",
            )
            .await;

        assert_eq!(outcome, CommandOutcome::Errored);

        events.recv().await.unwrap();
        match events.recv().await.unwrap() {
            CommandEvent::FailedWithError { error, .. } => assert_eq!(error, "database is down"),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_subcommand_selection() {
        let framework = framework(Config::default());

        let mut args = Arguments::new();
        let key = args.single("key", "", StringConverter::new());
        let seen = Arc::new(parking_lot::Mutex::new(String::new()));
        let store = Arc::clone(&seen);

        let group = ChatCommand::new("config").subcommand(ChatCommand::new("get").arguments(args).action(
            move |ctx| {
                let store = Arc::clone(&store);
                async move {
                    *store.lock() = format!("{} {}", ctx.command_name(), ctx.arg(key)?);
                    Ok(())
                }
            },
        ));

        let outcome = group
            .call(call(direct_message(), silent(), &framework), StringParser::new("GET prefix"), "!")
            .await;

        assert_eq!(outcome, CommandOutcome::Succeeded);
        assert_eq!(*seen.lock(), "config get prefix");
    }

    #[tokio::test]
    async fn test_group_without_subcommand() {
        let framework = framework(Config::default());
        let group = ChatCommand::new("config")
            .subcommand(ChatCommand::new("get").action(|_| async { Ok(()) }))
            .subcommand(ChatCommand::new("set").action(|_| async { Ok(()) }));

        let outcome = group
            .call(
                call(direct_message(), replying("Please pick a subcommand: `get`, `set`"), &framework),
                StringParser::new("unknown"),
                "!",
            )
            .await;

        assert_eq!(outcome, CommandOutcome::FailedParsing);
    }

    #[tokio::test]
    async fn test_disabled_subcommand_is_not_found() {
        let framework = framework(Config::default());
        let counter = Arc::new(AtomicUsize::new(0));
        let group = ChatCommand::new("admin")
            .subcommand(counting(&counter).enabled(false))
            .subcommand(ChatCommand::new("status").action(|_| async { Ok(()) }));

        assert!(group.get_subcommand("count").is_none());
        assert!(group.get_subcommand("status").is_some());

        let outcome = group
            .call(
                call(direct_message(), replying("Please pick a subcommand: `status`"), &framework),
                StringParser::new("count"),
                "!",
            )
            .await;

        assert_eq!(outcome, CommandOutcome::FailedParsing);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cooldown_blocks_second_call() {
        let framework = framework(Config::default());
        let counter = Arc::new(AtomicUsize::new(0));
        let command = counting(&counter).cooldown(CooldownScope::User, Duration::from_secs(60));

        let first = command
            .call(call(direct_message(), silent(), &framework), StringParser::new(""), "!")
            .await;
        assert_eq!(first, CommandOutcome::Succeeded);

        let mut responder = MockResponder::new();
        responder
            .expect_respond()
            .withf(|message: &String| message.starts_with("You're using this command too quickly"))
            .times(1)
            .returning(|_| Ok(()));

        let second = command
            .call(call(direct_message(), responder, &framework), StringParser::new(""), "!")
            .await;

        assert!(matches!(second, CommandOutcome::Limited(_)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_bot_permissions() {
        let framework = framework(Config::default());
        let command = ChatCommand::new("purge")
            .bot_permissions(Permissions::MANAGE_MESSAGES | Permissions::SEND_MESSAGES)
            .action(|_| async { Ok(()) });

        let mut event = guild_message();
        event.bot_permissions = Some(Permissions::SEND_MESSAGES);

        let mut responder = MockResponder::new();
        responder
            .expect_respond()
            .withf(|message: &String| message.ends_with("Missing permissions: Manage Messages"))
            .times(1)
            .returning(|_| Ok(()));

        let outcome = command
            .call(call(event, responder, &framework), StringParser::new(""), "!")
            .await;

        assert_eq!(outcome, CommandOutcome::MissingBotPermissions(Permissions::MANAGE_MESSAGES));
    }
}
