//! Context menu commands, listed under "Apps" when right-clicking a message
//! or a user.

use super::{command_builder, CommandBase, CommandOutcome, Input};
use crate::checks::CheckFn;
use crate::context::CommandCall;
use herald_common::{CommandKind, FrameworkError, Result};
use serenity::all::{CommandData, CommandType, CreateCommand, GuildId, Message, ResolvedTarget, User};
use std::fmt;

const MAX_NAME_LENGTH: usize = 32;

/// What a context menu command was used on.
#[derive(Debug, Clone)]
pub enum MenuTarget {
    /// The user that was clicked.
    User(Box<User>),
    /// The message that was clicked.
    Message(Box<Message>),
}

impl MenuTarget {
    /// The target Discord resolved for an interaction, if it carries one.
    pub fn from_data(data: &CommandData) -> Option<Self> {
        match data.target()? {
            ResolvedTarget::User(user, _) => Some(Self::User(Box::new(user.clone()))),
            ResolvedTarget::Message(message) => Some(Self::Message(Box::new(message.clone()))),
            _ => None,
        }
    }

    /// The clicked user.
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::User(user) => Some(user),
            Self::Message(_) => None,
        }
    }

    /// The clicked message.
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::Message(message) => Some(message),
            Self::User(_) => None,
        }
    }
}

macro_rules! menu_command {
    ($(#[$meta:meta])* $name:ident, $kind:expr, $command_type:expr) => {
        $(#[$meta])*
        pub struct $name {
            base: CommandBase,
            ephemeral: bool,
            guild: Option<GuildId>,
            auto_ack: bool,
        }

        impl $name {
            /// A command called `name`, as shown in the menu. Spaces and
            /// capitals are allowed.
            pub fn new(name: impl Into<String>) -> Self {
                Self {
                    base: CommandBase::new(name),
                    ephemeral: false,
                    guild: None,
                    auto_ack: true,
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

            /// Whether replies are private.
            pub const fn is_ephemeral(&self) -> bool {
                self.ephemeral
            }

            /// The guild the command is limited to.
            pub const fn guild_id(&self) -> Option<GuildId> {
                self.guild
            }

            /// Checks the command can be registered with Discord.
            pub fn validate(&self) -> Result<()> {
                self.base.validate($kind, false)?;

                if self.name().chars().count() > MAX_NAME_LENGTH {
                    return Err(FrameworkError::invalid_command(
                        Some(self.name()),
                        "Context menu command names can't be longer than 32 characters",
                    ));
                }

                Ok(())
            }

            pub(crate) fn set_extension(&mut self, extension: &str, checks: &[CheckFn]) {
                self.base.set_extension(extension, checks);
            }

            /// The definition sent to Discord.
            pub fn create_command(&self) -> CreateCommand {
                CreateCommand::new(self.name()).kind($command_type)
            }

            /// Runs the command on `target`.
            pub async fn call(&self, call: CommandCall, target: MenuTarget) -> CommandOutcome {
                let input = Input::Menu {
                    kind: $kind,
                    target,
                    auto_ack: self.auto_ack,
                };

                self.base.execute(call, self.name(), &[], input).await
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("base", &self.base)
                    .field("ephemeral", &self.ephemeral)
                    .field("guild", &self.guild)
                    .field("auto_ack", &self.auto_ack)
                    .finish()
            }
        }
    };
}

menu_command!(
    /// A command run on a message from its context menu.
    MessageCommand,
    CommandKind::Message,
    CommandType::Message
);

menu_command!(
    /// A command run on a user from their context menu.
    UserCommand,
    CommandKind::User,
    CommandType::User
);
