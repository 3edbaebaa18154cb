//! Application (slash) commands.

use super::{command_builder, CommandBase, CommandOutcome, Input};
use crate::checks::CheckFn;
use crate::context::CommandCall;
use crate::converters::OptionValue;
use crate::i18n::Localizer;
use crate::parser::SlashCommandParser;
use herald_common::{truncate_string, CommandKind, FrameworkError, Result};
use serenity::all::{CommandOptionType, CreateCommand, CreateCommandOption, GuildId};
use std::collections::HashMap;
use std::fmt;
use tracing::trace;

const MAX_DESCRIPTION_LENGTH: usize = 100;
const MAX_NAME_LENGTH: usize = 32;

/// Discord accepts up to 32 lowercase letters, digits, dashes and
/// underscores.
fn is_valid_name(name: &str) -> bool {
    (1..=MAX_NAME_LENGTH).contains(&name.chars().count())
        && name
            .chars()
            .all(|c| !c.is_uppercase() && (c.is_alphanumeric() || c == '-' || c == '_'))
}

/// What an interaction handed a slash command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlashInput {
    /// The chosen subcommand, if any.
    pub subcommand: Option<String>,
    /// Option values by lowercase name.
    pub options: HashMap<String, OptionValue>,
}

/// A command invoked through Discord's slash command interface.
pub struct SlashCommand {
    base: CommandBase,
    ephemeral: bool,
    guild: Option<GuildId>,
    auto_ack: bool,
    subcommands: Vec<SlashCommand>,
}

impl SlashCommand {
    /// A command called `name`. Discord requires lowercase names.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            base: CommandBase::new(name),
            ephemeral: false,
            guild: None,
            auto_ack: true,
            subcommands: Vec::new(),
        }
    }

    command_builder!();

    /// Replies only to the invoking user.
    #[must_use]
    pub const fn ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    /// Registers the command in `guild` only.
    #[must_use]
    pub const fn guild(mut self, guild: GuildId) -> Self {
        self.guild = Some(guild);
        self
    }

    /// Whether the interaction is deferred before the action runs.
    #[must_use]
    pub const fn auto_ack(mut self, auto_ack: bool) -> Self {
        self.auto_ack = auto_ack;
        self
    }

    /// Adds a subcommand.
    #[must_use]
    pub fn subcommand(mut self, subcommand: Self) -> Self {
        self.base.subcommand_names.push(subcommand.name().to_string());
        self.subcommands.push(subcommand);
        self
    }

    /// Whether replies are private.
    pub const fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    /// Whether replies to `subcommand`, or to the command itself, are
    /// private.
    pub fn is_ephemeral_for(&self, subcommand: Option<&str>) -> bool {
        self.ephemeral
            || subcommand
                .and_then(|name| self.get_subcommand(name))
                .is_some_and(Self::is_ephemeral)
    }

    /// The guild the command is limited to.
    pub const fn guild_id(&self) -> Option<GuildId> {
        self.guild
    }

    /// Subcommands, in the order they were added.
    pub fn subcommands(&self) -> &[Self] {
        &self.subcommands
    }

    /// The subcommand called `name`.
    pub fn get_subcommand(&self, name: &str) -> Option<&Self> {
        self.subcommands.iter().find(|command| command.name() == name)
    }

    /// Checks the command can be registered with Discord.
    pub fn validate(&self) -> Result<()> {
        self.base.validate(CommandKind::Slash, !self.subcommands.is_empty())?;

        if !is_valid_name(self.name()) {
            return Err(FrameworkError::invalid_command(
                Some(self.name()),
                "Slash command names must be 1 to 32 lowercase letters, digits, dashes or underscores",
            ));
        }

        if !self.subcommands.is_empty() && !self.base.arguments().is_empty() {
            return Err(FrameworkError::invalid_command(
                Some(self.name()),
                "Slash commands with subcommands can't take arguments",
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

    /// The definition sent to Discord, with descriptions in the localizer's
    /// locale.
    pub fn create_command(&self, localizer: &Localizer) -> Result<CreateCommand> {
        let command = CreateCommand::new(self.name()).description(self.short_description(localizer));

        if self.subcommands.is_empty() {
            return Ok(command.set_options(SlashCommandParser::options(self.base.arguments())?));
        }

        let options = self
            .subcommands
            .iter()
            .map(|subcommand| -> Result<CreateCommandOption> {
                let option = CreateCommandOption::new(
                    CommandOptionType::SubCommand,
                    subcommand.name(),
                    subcommand.short_description(localizer),
                );

                Ok(SlashCommandParser::options(subcommand.base.arguments())?
                    .into_iter()
                    .fold(option, CreateCommandOption::add_sub_option))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(command.set_options(options))
    }

    fn short_description(&self, localizer: &Localizer) -> String {
        truncate_string(&self.base.description_in(localizer), MAX_DESCRIPTION_LENGTH)
    }

    /// Runs the command, or its selected subcommand.
    pub async fn call(&self, call: CommandCall, input: SlashInput) -> CommandOutcome {
        let selected = input.subcommand.as_deref().and_then(|name| self.get_subcommand(name));

        if let Some(subcommand) = selected {
            let name = format!("{} {}", self.name(), subcommand.name());
            trace!(command = name, "Selected subcommand");

            let input = Input::Slash {
                options: input.options,
                auto_ack: subcommand.auto_ack,
            };

            return subcommand.base.execute(call, &name, &self.base.checks, input).await;
        }

        let input = Input::Slash {
            options: input.options,
            auto_ack: self.auto_ack,
        };

        self.base.execute(call, self.name(), &[], input).await
    }
}

impl fmt::Debug for SlashCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlashCommand")
            .field("base", &self.base)
            .field("ephemeral", &self.ephemeral)
            .field("guild", &self.guild)
            .field("auto_ack", &self.auto_ack)
            .field("subcommands", &self.subcommands)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arguments::Arguments;
    use crate::checks::test_events::direct_message;
    use crate::commands::test_calls::call;
    use crate::converters::{IntConverter, StringConverter};
    use crate::respond::MockResponder;
    use crate::test_support::{framework, localizer};
    use herald_config::Config;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    fn add() -> (SlashCommand, Arc<AtomicI64>) {
        let total = Arc::new(AtomicI64::new(0));
        let store = Arc::clone(&total);

        let mut args = Arguments::new();
        let amount = args.single("amount", "How much to add", IntConverter::new());

        let command = SlashCommand::new("add")
            .description("Adds to the total")
            .arguments(args)
            .action(move |ctx| {
                let store = Arc::clone(&store);
                async move {
                    store.fetch_add(*ctx.arg(amount)?, Ordering::SeqCst);
                    Ok(())
                }
            });

        (command, total)
    }

    #[test]
    fn test_validate() {
        assert!(SlashCommand::new("ping").action(|_| async { Ok(()) }).validate().is_err());
        assert!(SlashCommand::new("Ping").description("d").action(|_| async { Ok(()) }).validate().is_err());
        assert!(SlashCommand::new("ping").description("d").action(|_| async { Ok(()) }).validate().is_ok());

        let mut args = Arguments::new();
        args.list("numbers", "", IntConverter::new(), true);
        let lists = SlashCommand::new("sum").description("d").arguments(args).action(|_| async { Ok(()) });
        assert!(lists.create_command(&localizer()).is_err());
    }

    #[test]
    fn test_create_command_with_subcommands() {
        let mut args = Arguments::new();
        args.single("key", "Setting to read", StringConverter::new());

        let command = SlashCommand::new("config")
            .description("Manage settings")
            .subcommand(SlashCommand::new("get").description("Read a setting").arguments(args).action(|_| async { Ok(()) }));

        let json = serde_json::to_value(command.create_command(&localizer()).unwrap()).unwrap();

        assert_eq!(json["name"], "config");
        assert_eq!(json["options"][0]["type"], 1);
        assert_eq!(json["options"][0]["name"], "get");
        assert_eq!(json["options"][0]["options"][0]["name"], "key");
        assert_eq!(json["options"][0]["options"][0]["required"], true);
    }

    #[tokio::test]
    async fn test_call_acknowledges_before_action() {
        let framework = framework(Config::default());
        let (command, total) = add();

        let mut responder = MockResponder::new();
        responder.expect_acknowledge().times(1).returning(|| Ok(()));

        let input = SlashInput {
            subcommand: None,
            options: HashMap::from([("amount".to_string(), OptionValue::Integer(5))]),
        };

        let outcome = command.call(call(direct_message(), responder, &framework), input).await;

        assert_eq!(outcome, CommandOutcome::Succeeded);
        assert_eq!(total.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_missing_option_is_relayed_without_signature() {
        let framework = framework(Config::default());
        let (command, _) = add();

        let mut responder = MockResponder::new();
        responder
            .expect_respond()
            .withf(|message: &String| message == "Invalid value for argument `amount` (which accepts: number)")
            .times(1)
            .returning(|_| Ok(()));

        let outcome = command
            .call(call(direct_message(), responder, &framework), SlashInput::default())
            .await;

        assert_eq!(outcome, CommandOutcome::FailedParsing);
    }

    #[tokio::test]
    async fn test_subcommand_dispatch() {
        let framework = framework(Config::default());
        let (add, total) = add();
        let group = SlashCommand::new("math").description("Maths").subcommand(add.auto_ack(false));

        let input = SlashInput {
            subcommand: Some("add".to_string()),
            options: HashMap::from([("amount".to_string(), OptionValue::Integer(2))]),
        };

        let mut responder = MockResponder::new();
        responder.expect_acknowledge().never();

        let outcome = group.call(call(direct_message(), responder, &framework), input).await;

        assert_eq!(outcome, CommandOutcome::Succeeded);
        assert_eq!(total.load(Ordering::SeqCst), 2);
        assert!(group.is_ephemeral_for(Some("add")) == group.is_ephemeral());
    }
}
