//! Application command registration with Discord and interaction
//! dispatch.

use crate::commands::{CommandOutcome, MenuTarget, MessageCommand, SlashCommand, SlashInput, UserCommand};
use crate::components::{ComponentRouter, PressReply};
use crate::context::{CommandCall, Source};
use crate::event::EventContext;
use crate::framework::Framework;
use crate::i18n::Localizer;
use crate::parser::{collect_options, selected_subcommand};
use crate::respond::InteractionResponder;
use herald_common::{FrameworkError, Result};
use parking_lot::RwLock;
use serenity::all::{
    Command, CommandInteraction, CommandType, ComponentInteraction, Context, CreateCommand, CreateInteractionResponse,
    CreateInteractionResponseMessage, GuildId, Http,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

/// Registered slash and context menu commands.
#[derive(Debug)]
pub struct ApplicationCommandRegistry {
    commands: RwLock<Vec<Arc<SlashCommand>>>,
    message_commands: RwLock<Vec<Arc<MessageCommand>>>,
    user_commands: RwLock<Vec<Arc<UserCommand>>>,
    components: Arc<ComponentRouter>,
}

impl ApplicationCommandRegistry {
    /// An empty registry routing component presses through `components`.
    pub fn new(components: Arc<ComponentRouter>) -> Self {
        Self {
            commands: RwLock::new(Vec::new()),
            message_commands: RwLock::new(Vec::new()),
            user_commands: RwLock::new(Vec::new()),
            components,
        }
    }

    /// Registers `command` locally. Nothing reaches Discord until
    /// [`ApplicationCommandRegistry::register`].
    pub fn add(&self, command: SlashCommand) -> Result<Arc<SlashCommand>> {
        command.validate()?;

        let mut commands = self.commands.write();

        if commands.iter().any(|existing| existing.name() == command.name()) {
            return Err(FrameworkError::registration(
                command.name(),
                "A slash command with this name is already registered",
            ));
        }

        debug!(command = command.name(), extension = command.base().extension(), "Registered slash command");

        let command = Arc::new(command);
        commands.push(Arc::clone(&command));

        Ok(command)
    }

    /// Registers a message context menu command. Names only need to be
    /// unique among message commands.
    pub fn add_message(&self, command: MessageCommand) -> Result<Arc<MessageCommand>> {
        command.validate()?;

        let mut commands = self.message_commands.write();

        if commands.iter().any(|existing| existing.name() == command.name()) {
            return Err(FrameworkError::registration(
                command.name(),
                "A message command with this name is already registered",
            ));
        }

        debug!(command = command.name(), extension = command.base().extension(), "Registered message command");

        let command = Arc::new(command);
        commands.push(Arc::clone(&command));

        Ok(command)
    }

    /// Registers a user context menu command. Names only need to be unique
    /// among user commands.
    pub fn add_user(&self, command: UserCommand) -> Result<Arc<UserCommand>> {
        command.validate()?;

        let mut commands = self.user_commands.write();

        if commands.iter().any(|existing| existing.name() == command.name()) {
            return Err(FrameworkError::registration(
                command.name(),
                "A user command with this name is already registered",
            ));
        }

        debug!(command = command.name(), extension = command.base().extension(), "Registered user command");

        let command = Arc::new(command);
        commands.push(Arc::clone(&command));

        Ok(command)
    }

    /// Unregisters the command called `name`.
    pub fn remove(&self, name: &str) -> Option<Arc<SlashCommand>> {
        let mut commands = self.commands.write();
        let index = commands.iter().position(|command| command.name() == name)?;

        debug!(command = name, "Removed slash command");
        Some(commands.remove(index))
    }

    /// Unregisters every command `extension` added, of every type. Returns
    /// how many went.
    pub fn remove_extension(&self, extension: &str) -> usize {
        let before = self.len();
        let owned = |owner: Option<&str>| owner == Some(extension);

        self.commands.write().retain(|command| !owned(command.base().extension()));
        self.message_commands.write().retain(|command| !owned(command.base().extension()));
        self.user_commands.write().retain(|command| !owned(command.base().extension()));

        before - self.len()
    }

    /// The slash command called `name`.
    pub fn get_command(&self, name: &str) -> Option<Arc<SlashCommand>> {
        self.commands.read().iter().find(|command| command.name() == name).cloned()
    }

    /// The message command called `name`.
    pub fn get_message_command(&self, name: &str) -> Option<Arc<MessageCommand>> {
        self.message_commands.read().iter().find(|command| command.name() == name).cloned()
    }

    /// The user command called `name`.
    pub fn get_user_command(&self, name: &str) -> Option<Arc<UserCommand>> {
        self.user_commands.read().iter().find(|command| command.name() == name).cloned()
    }

    /// Every registered slash command, in registration order.
    pub fn commands(&self) -> Vec<Arc<SlashCommand>> {
        self.commands.read().clone()
    }

    /// Every registered message command, in registration order.
    pub fn message_commands(&self) -> Vec<Arc<MessageCommand>> {
        self.message_commands.read().clone()
    }

    /// Every registered user command, in registration order.
    pub fn user_commands(&self) -> Vec<Arc<UserCommand>> {
        self.user_commands.read().clone()
    }

    /// Number of registered commands of every type.
    pub fn len(&self) -> usize {
        self.commands.read().len() + self.message_commands.read().len() + self.user_commands.read().len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Definitions grouped by where they get registered. `None` is global.
    ///
    /// Commands without a guild of their own go to `default_guild` when one
    /// is set, which makes them show up instantly while testing.
    pub fn definitions(
        &self,
        localizer: &Localizer,
        default_guild: Option<GuildId>,
    ) -> Result<BTreeMap<Option<GuildId>, Vec<CreateCommand>>> {
        let mut grouped: BTreeMap<Option<GuildId>, Vec<CreateCommand>> = BTreeMap::new();

        for command in self.commands.read().iter() {
            let target = command.guild_id().or(default_guild);
            grouped.entry(target).or_default().push(command.create_command(localizer)?);
        }

        for command in self.message_commands.read().iter() {
            let target = command.guild_id().or(default_guild);
            grouped.entry(target).or_default().push(command.create_command());
        }

        for command in self.user_commands.read().iter() {
            let target = command.guild_id().or(default_guild);
            grouped.entry(target).or_default().push(command.create_command());
        }

        Ok(grouped)
    }

    /// Replaces the bot's commands on Discord with the registered ones.
    pub async fn register(&self, http: &Http, localizer: &Localizer, default_guild: Option<GuildId>) -> Result<()> {
        let grouped = self.definitions(localizer, default_guild)?;

        if !grouped.contains_key(&None) {
            trace!("No global commands, clearing any registered earlier");
        }

        let globals = grouped.get(&None).cloned().unwrap_or_default();
        let count = globals.len();

        Command::set_global_commands(http, globals)
            .await
            .map_err(|e| FrameworkError::discord_with_source("Failed to register global commands", e))?;

        info!(count, "Registered global application commands");

        for (guild, commands) in grouped {
            let Some(guild) = guild else { continue };
            let count = commands.len();

            guild
                .set_commands(http, commands)
                .await
                .map_err(|e| FrameworkError::discord_with_source(format!("Failed to register commands in {guild}"), e))?;

            info!(%guild, count, "Registered guild application commands");
        }

        Ok(())
    }

    /// Runs the command an interaction invokes, picking the registry list
    /// by the interaction's command type.
    pub async fn handle_command(
        &self,
        framework: &Arc<Framework>,
        ctx: &Context,
        interaction: &CommandInteraction,
    ) -> Option<CommandOutcome> {
        let name = interaction.data.name.as_str();

        let outcome = match interaction.data.kind {
            CommandType::ChatInput => {
                let Some(command) = self.get_command(name) else {
                    warn!(command = name, "Received an unknown slash command");
                    return None;
                };

                let input = SlashInput {
                    subcommand: selected_subcommand(&interaction.data.options).map(ToString::to_string),
                    options: collect_options(&interaction.data.options),
                };

                let ephemeral = command.is_ephemeral_for(input.subcommand.as_deref());
                let call = Self::command_call(framework, ctx, interaction, ephemeral).await;
                command.call(call, input).await
            }
            CommandType::Message => {
                let Some(command) = self.get_message_command(name) else {
                    warn!(command = name, "Received an unknown message command");
                    return None;
                };

                let target = Self::target(interaction)?;
                let call = Self::command_call(framework, ctx, interaction, command.is_ephemeral()).await;
                command.call(call, target).await
            }
            CommandType::User => {
                let Some(command) = self.get_user_command(name) else {
                    warn!(command = name, "Received an unknown user command");
                    return None;
                };

                let target = Self::target(interaction)?;
                let call = Self::command_call(framework, ctx, interaction, command.is_ephemeral()).await;
                command.call(call, target).await
            }
            other => {
                debug!(command = name, kind = ?other, "Ignoring unsupported command type");
                return None;
            }
        };

        debug!(command = name, ?outcome, "Application command finished");
        Some(outcome)
    }

    fn target(interaction: &CommandInteraction) -> Option<MenuTarget> {
        let target = MenuTarget::from_data(&interaction.data);

        if target.is_none() {
            warn!(command = interaction.data.name, "Context menu interaction has no resolved target");
        }

        target
    }

    async fn command_call(
        framework: &Arc<Framework>,
        ctx: &Context,
        interaction: &CommandInteraction,
        ephemeral: bool,
    ) -> CommandCall {
        let event = EventContext::from_command(ctx, interaction, framework.privileged()).await;
        let responder = InteractionResponder::new(Arc::clone(&ctx.http), interaction.clone(), ephemeral);

        CommandCall::new(
            event,
            framework.localizer(Some(interaction.locale.as_str())),
            Arc::new(responder),
            Arc::clone(framework),
        )
        .with_source(Source::Interaction {
            ctx: ctx.clone(),
            interaction: Box::new(interaction.clone()),
        })
    }

    /// Hands a component press to its listener and answers Discord with the
    /// listener's reply. Presses nobody listens for are left alone.
    pub async fn handle_component(&self, ctx: &Context, interaction: &ComponentInteraction) {
        let Some(reply) = self.components.route(&interaction.data.custom_id, interaction.user.id).await else {
            trace!(custom_id = interaction.data.custom_id, "No listener for component");
            return;
        };

        let response = match reply {
            PressReply::Acknowledge => CreateInteractionResponse::Acknowledge,
            PressReply::Deny(message) => CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new().content(message).ephemeral(true),
            ),
        };

        if let Err(e) = interaction.create_response(&ctx.http, response).await {
            error!(error = %e, custom_id = interaction.data.custom_id, "Failed to answer component interaction");
        }
    }
}
