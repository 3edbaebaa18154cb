//! Chat, slash and context menu commands, and the pipeline they run
//! through.
//!
//! An invocation is announced on the event bus, then has to pass the check
//! chain (global, extension, parent, command), the usage limits and the bot
//! permission check before its arguments are parsed and its action runs.
//! Problems meant for the user are relayed to them; anything else is logged
//! and answered with a generic message.

use crate::arguments::{Arguments, ParsedArguments};
use crate::checks::{permission_names, run_checks, CheckFn, CheckOutcome};
use crate::context::{CommandCall, CommandContext};
use crate::converters::OptionValue;
use crate::event::EventContext;
use crate::events::{CommandEvent, EventBus, Invocation};
use crate::fluent_args;
use crate::framework::Framework;
use crate::i18n::Localizer;
use crate::parser::{signature, ChatCommandParser, SlashCommandParser};
use crate::respond::Responder;
use crate::usage_limits::{LimitHit, UsageLimits};
use dashmap::DashMap;
use futures::future::BoxFuture;
use herald_common::{BoxError, CommandKind, DiscordRelayedError, FrameworkError, Result};
use herald_parser::StringParser;
use serenity::all::Permissions;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info_span, trace, warn, Instrument};

mod chat;
mod context_menu;
mod slash;

pub use chat::ChatCommand;
pub use context_menu::{MenuTarget, MessageCommand, UserCommand};
pub use slash::{SlashCommand, SlashInput};

/// What a command action returns. Any error type works; errors that should
/// reach the user as-is are [`DiscordRelayedError`]s.
pub type CommandResult = std::result::Result<(), BoxError>;

/// The body of a command.
pub type CommandAction = Arc<dyn Fn(CommandContext) -> BoxFuture<'static, CommandResult> + Send + Sync>;

/// How an invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The action ran to completion.
    Succeeded,
    /// A check failed.
    FailedChecks,
    /// A cooldown or rate limit was hit.
    Limited(LimitHit),
    /// The bot lacks permissions the command needs.
    MissingBotPermissions(Permissions),
    /// The arguments couldn't be parsed, or a group got no subcommand.
    FailedParsing,
    /// The action returned an error.
    Errored,
}

impl CommandOutcome {
    /// Whether the action ran to completion.
    pub const fn succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// Input a command's arguments are parsed from.
pub(crate) enum Input {
    Chat {
        parser: StringParser,
        keyword_arguments: bool,
        prefix: String,
    },
    Slash {
        options: HashMap<String, OptionValue>,
        auto_ack: bool,
    },
    Menu {
        kind: CommandKind,
        target: MenuTarget,
        auto_ack: bool,
    },
}

impl Input {
    const fn kind(&self) -> CommandKind {
        match self {
            Self::Chat { .. } => CommandKind::Chat,
            Self::Slash { .. } => CommandKind::Slash,
            Self::Menu { kind, .. } => *kind,
        }
    }
}

/// Properties every kind of command shares.
#[derive(Default)]
pub struct CommandBase {
    name: String,
    description: String,
    checks: Vec<CheckFn>,
    extension_checks: Vec<CheckFn>,
    extension: Option<String>,
    bot_permissions: Permissions,
    lock: Option<Mutex<()>>,
    limits: UsageLimits,
    arguments: Arguments,
    action: Option<CommandAction>,
    subcommand_names: Vec<String>,
    signatures: DashMap<String, String>,
}

impl CommandBase {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The command's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The description, possibly a translation key.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The description in the localizer's locale.
    pub fn description_in(&self, localizer: &Localizer) -> String {
        localizer.translate_text(&self.description)
    }

    /// The command's own checks.
    pub fn checks(&self) -> &[CheckFn] {
        &self.checks
    }

    /// The extension that registered the command.
    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }

    /// Permissions the bot needs to run the command.
    pub const fn bot_permissions(&self) -> Permissions {
        self.bot_permissions
    }

    /// Whether executions wait for each other.
    pub const fn is_locking(&self) -> bool {
        self.lock.is_some()
    }

    /// Cooldowns and rate limits.
    pub const fn limits(&self) -> &UsageLimits {
        &self.limits
    }

    /// Declared arguments.
    pub const fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// Whether an action is set.
    pub const fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// The argument signature in the localizer's locale, cached per locale.
    pub fn signature(&self, localizer: &Localizer) -> String {
        let locale = localizer.locale().to_string();

        if let Some(cached) = self.signatures.get(&locale) {
            return cached.clone();
        }

        let built = signature(&self.arguments, localizer);
        self.signatures.insert(locale, built.clone());
        built
    }

    pub(crate) fn set_extension(&mut self, extension: &str, checks: &[CheckFn]) {
        self.extension = Some(extension.to_string());
        self.extension_checks = checks.to_vec();
    }

    pub(crate) fn validate(&self, kind: CommandKind, has_subcommands: bool) -> Result<()> {
        let invalid = |reason: &str| FrameworkError::invalid_command(Some(&self.name), reason);

        if self.name.trim().is_empty() {
            return Err(FrameworkError::invalid_command(None, "No name set"));
        }

        if !kind.is_context_menu() && self.name.chars().any(char::is_whitespace) {
            return Err(invalid("Names can't contain whitespace"));
        }

        if kind == CommandKind::Slash && self.description.trim().is_empty() {
            return Err(invalid("Slash commands need a description"));
        }

        if kind.is_context_menu() && !self.arguments.is_empty() {
            return Err(invalid("Context menu commands can't take arguments"));
        }

        if self.action.is_none() && !has_subcommands {
            return Err(invalid("No action set"));
        }

        self.arguments.validate()
    }

    /// Whether every check in front of this command passes for `event`.
    pub async fn checks_pass(
        &self,
        framework: &Framework,
        kind: CommandKind,
        inherited: &[CheckFn],
        event: &EventContext,
        localizer: &Localizer,
    ) -> bool {
        let chain = self.check_chain(framework, kind, inherited);
        run_checks(&chain, event, localizer).await.passed()
    }

    /// Global, extension, inherited and own checks, in the order they run.
    ///
    /// Context menu commands share the global and extension checks of slash
    /// commands.
    fn check_chain(&self, framework: &Framework, kind: CommandKind, inherited: &[CheckFn]) -> Vec<CheckFn> {
        let mut chain = match kind {
            CommandKind::Chat => framework.chat_checks(),
            CommandKind::Slash | CommandKind::Message | CommandKind::User => framework.slash_checks(),
        };

        chain.extend(self.extension_checks.iter().cloned());
        chain.extend(inherited.iter().cloned());
        chain.extend(self.checks.iter().cloned());
        chain
    }

    /// Permissions the bot lacks, when they are known and something is
    /// missing.
    fn missing_bot_permissions(&self, event: &EventContext) -> Option<Permissions> {
        if self.bot_permissions.is_empty() || event.guild.is_none() {
            return None;
        }

        let Some(granted) = event.bot_permissions else {
            debug!(command = self.name, "Bot permissions unknown, skipping check");
            return None;
        };

        let missing = self.bot_permissions.difference(granted);
        (!missing.is_empty()).then_some(missing)
    }

    pub(crate) async fn execute(
        &self,
        call: CommandCall,
        full_name: &str,
        inherited: &[CheckFn],
        input: Input,
    ) -> CommandOutcome {
        let kind = input.kind();
        let invocation = Invocation::new(full_name, kind, call.event.author);
        let span = info_span!("command", command = full_name, %kind, id = %invocation.id);

        self.run(call, invocation, inherited, input).instrument(span).await
    }

    async fn run(&self, call: CommandCall, invocation: Invocation, inherited: &[CheckFn], input: Input) -> CommandOutcome {
        let framework = Arc::clone(&call.framework);
        let events = framework.events();
        let responder = Arc::clone(&call.responder);
        let localizer = call.localizer.clone();
        let kind = input.kind();

        trace!("Command invoked");
        events.publish(CommandEvent::Invoked(invocation.clone()));

        let chain = self.check_chain(&framework, kind, inherited);

        if let CheckOutcome::Failed(reason) = run_checks(&chain, &call.event, &localizer).await {
            debug!(relayed = reason.is_some(), "Command checks failed");

            if let Some(reason) = &reason {
                reply(responder.as_ref(), reason.clone()).await;
            }

            events.publish(CommandEvent::FailedChecks { invocation, reason });
            return CommandOutcome::FailedChecks;
        }

        if let Some(hit) = self.limits.check(&call.event) {
            let message = localizer.translate_with(
                hit.translation_key(),
                &fluent_args!("remaining" => hit.remaining_display()),
            );

            debug!(?hit, "Usage limit reached");
            reply(responder.as_ref(), message.clone()).await;

            events.publish(CommandEvent::FailedChecks {
                invocation,
                reason: Some(message),
            });
            return CommandOutcome::Limited(hit);
        }

        if let Some(missing) = self.missing_bot_permissions(&call.event) {
            let message = localizer.translate_with(
                "commands-error-missing-bot-permissions",
                &fluent_args!("permissions" => permission_names(missing)),
            );

            debug!(?missing, "Bot is missing permissions");
            reply(responder.as_ref(), message.clone()).await;

            events.publish(CommandEvent::FailedChecks {
                invocation,
                reason: Some(message),
            });
            return CommandOutcome::MissingBotPermissions(missing);
        }

        let (parsed, prefix, auto_ack, target) = match input {
            Input::Chat {
                mut parser,
                keyword_arguments,
                prefix,
            } => {
                let parsed = ChatCommandParser::parse(&self.arguments, &mut parser, keyword_arguments, &localizer);
                (parsed, Some(prefix), false, None)
            }
            Input::Slash { options, auto_ack } => (
                SlashCommandParser::parse(&self.arguments, &options, &localizer),
                None,
                auto_ack,
                None,
            ),
            Input::Menu { target, auto_ack, .. } => (Ok(ParsedArguments::empty()), None, auto_ack, Some(target)),
        };

        let arguments = match parsed {
            Ok(arguments) => arguments,
            Err(e) => {
                return self
                    .parsing_failed(e, &invocation, prefix.as_deref(), responder.as_ref(), &localizer, events)
                    .await;
            }
        };

        let Some(action) = self.action.clone() else {
            return self.missing_subcommand(invocation, responder.as_ref(), &localizer, events).await;
        };

        if auto_ack {
            if let Err(e) = responder.acknowledge().await {
                warn!(error = %e, "Failed to acknowledge interaction");
            }
        }

        let limit_event = (!self.limits.is_empty()).then(|| call.event.clone());
        let context = CommandContext::new(call, invocation.command.clone(), kind, arguments, prefix).with_target(target);

        let result = {
            let _guard = match &self.lock {
                Some(lock) => Some(lock.lock().await),
                None => None,
            };

            action(context).await
        };

        match result {
            Ok(()) => {
                if let Some(event) = &limit_event {
                    self.limits.apply(event);
                }

                trace!("Command succeeded");
                events.publish(CommandEvent::Succeeded(invocation));
                CommandOutcome::Succeeded
            }
            Err(e) => {
                let message = match relayed_message(e.as_ref()) {
                    Some(message) => {
                        debug!(reason = message, "Command relayed an error");
                        message.to_string()
                    }
                    None => {
                        error!(error = %e, "Command action failed");
                        localizer.translate("commands-error-user")
                    }
                };

                reply(responder.as_ref(), message).await;

                events.publish(CommandEvent::FailedWithError {
                    invocation,
                    error: e.to_string(),
                });
                CommandOutcome::Errored
            }
        }
    }

    async fn parsing_failed(
        &self,
        error: FrameworkError,
        invocation: &Invocation,
        prefix: Option<&str>,
        responder: &dyn Responder,
        localizer: &Localizer,
        events: &EventBus,
    ) -> CommandOutcome {
        match error {
            FrameworkError::ArgumentParsing(e) => {
                let mut message = e.reason;
                let signature = self.signature(localizer);

                if let (Some(prefix), false) = (prefix, signature.is_empty()) {
                    let usage = format!("{prefix}{} {signature}", invocation.command);
                    message.push_str("\n\n");
                    message.push_str(&localizer.translate_with("commands-signature", &fluent_args!("signature" => usage)));
                }

                debug!(reason = message, "Argument parsing failed");
                reply(responder, message.clone()).await;

                events.publish(CommandEvent::FailedParsing {
                    invocation: invocation.clone(),
                    reason: message,
                });
                CommandOutcome::FailedParsing
            }
            FrameworkError::Relayed(e) => {
                reply(responder, e.reason.clone()).await;

                events.publish(CommandEvent::FailedParsing {
                    invocation: invocation.clone(),
                    reason: e.reason,
                });
                CommandOutcome::FailedParsing
            }
            e => {
                error!(error = %e, "Failed to parse arguments");
                reply(responder, localizer.translate("commands-error-user")).await;

                events.publish(CommandEvent::FailedWithError {
                    invocation: invocation.clone(),
                    error: e.to_string(),
                });
                CommandOutcome::Errored
            }
        }
    }

    async fn missing_subcommand(
        &self,
        invocation: Invocation,
        responder: &dyn Responder,
        localizer: &Localizer,
        events: &EventBus,
    ) -> CommandOutcome {
        if self.subcommand_names.is_empty() {
            error!("Command has no action");
            reply(responder, localizer.translate("commands-error-user")).await;

            events.publish(CommandEvent::FailedWithError {
                invocation,
                error: FrameworkError::invalid_command(Some(&self.name), "No action set").to_string(),
            });
            return CommandOutcome::Errored;
        }

        let subcommands = self
            .subcommand_names
            .iter()
            .map(|name| format!("`{name}`"))
            .collect::<Vec<_>>()
            .join(", ");

        let message =
            localizer.translate_with("commands-error-missing-subcommand", &fluent_args!("subcommands" => subcommands));

        reply(responder, message.clone()).await;

        events.publish(CommandEvent::FailedParsing {
            invocation,
            reason: message,
        });
        CommandOutcome::FailedParsing
    }
}

impl fmt::Debug for CommandBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBase")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("checks", &self.checks.len())
            .field("extension", &self.extension)
            .field("bot_permissions", &self.bot_permissions)
            .field("locking", &self.is_locking())
            .field("limits", &self.limits)
            .field("arguments", &self.arguments)
            .field("has_action", &self.has_action())
            .finish_non_exhaustive()
    }
}

/// The message to show the user for an action error, if it's meant for them.
fn relayed_message<'a>(error: &'a (dyn std::error::Error + Send + Sync + 'static)) -> Option<&'a str> {
    if let Some(relayed) = error.downcast_ref::<DiscordRelayedError>() {
        return Some(&relayed.reason);
    }

    error
        .downcast_ref::<FrameworkError>()
        .and_then(FrameworkError::user_message)
}

async fn reply(responder: &dyn Responder, content: String) {
    if let Err(e) = responder.respond(content).await {
        warn!(error = %e, "Failed to send response");
    }
}

/// Generates the builder methods every kind of command shares.
macro_rules! command_builder {
    () => {
        /// Sets the description. A translation key is translated per user.
        #[must_use]
        pub fn description(mut self, description: impl Into<String>) -> Self {
            self.base.description = description.into();
            self
        }

        /// Adds a check, run after the global and extension checks.
        #[must_use]
        pub fn check(mut self, check: impl $crate::checks::Check + 'static) -> Self {
            self.base.checks.push(std::sync::Arc::new(check));
            self
        }

        /// Requires the bot to hold `permissions` in the guild.
        #[must_use]
        pub fn bot_permissions(mut self, permissions: serenity::all::Permissions) -> Self {
            self.base.bot_permissions |= permissions;
            self
        }

        /// Runs one execution at a time.
        #[must_use]
        pub fn locking(mut self, locking: bool) -> Self {
            self.base.lock = locking.then(|| tokio::sync::Mutex::new(()));
            self
        }

        /// Adds a cooldown.
        #[must_use]
        pub fn cooldown(mut self, scope: $crate::usage_limits::CooldownScope, duration: std::time::Duration) -> Self {
            self.base.limits = std::mem::take(&mut self.base.limits).cooldown(scope, duration);
            self
        }

        /// Allows each user `uses` invocations per `window`.
        #[must_use]
        pub fn rate_limit(mut self, uses: std::num::NonZeroU32, window: std::time::Duration) -> Self {
            self.base.limits = std::mem::take(&mut self.base.limits).rate_limit(uses, window);
            self
        }

        /// Sets the arguments.
        #[must_use]
        pub fn arguments(mut self, arguments: $crate::arguments::Arguments) -> Self {
            self.base.arguments = arguments;
            self.base.signatures.clear();
            self
        }

        /// Sets the action.
        #[must_use]
        pub fn action<F, Fut>(mut self, action: F) -> Self
        where
            F: Fn($crate::context::CommandContext) -> Fut + Send + Sync + 'static,
            Fut: std::future::Future<Output = $crate::commands::CommandResult> + Send + 'static,
        {
            use futures::FutureExt;

            self.base.action = Some(std::sync::Arc::new(move |ctx| action(ctx).boxed()));
            self
        }

        /// Shared command properties.
        pub const fn base(&self) -> &$crate::commands::CommandBase {
            &self.base
        }

        /// The command's name.
        pub fn name(&self) -> &str {
            self.base.name()
        }
    };
}

pub(crate) use command_builder;

#[cfg(test)]
pub(crate) mod test_calls {
    use crate::context::CommandCall;
    use crate::event::EventContext;
    use crate::framework::Framework;
    use crate::respond::Responder;
    use crate::test_support::localizer;
    use std::sync::Arc;

    pub fn call(event: EventContext, responder: impl Responder + 'static, framework: &Arc<Framework>) -> CommandCall {
        CommandCall::new(event, localizer(), Arc::new(responder), Arc::clone(framework))
    }
}
