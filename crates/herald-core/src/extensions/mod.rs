//! Extensions bundle commands, checks and listeners under one name, so they
//! can be loaded and unloaded together.

use crate::checks::{Check, CheckFn};
use crate::commands::{ChatCommand, MessageCommand, SlashCommand, UserCommand};
use crate::events::CommandEvent;
use crate::framework::{Framework, MessageListener};
use crate::listeners::{EventListener, GatewayEvent, GatewayHandler};
use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use herald_common::{BoxError, ExtensionState, FrameworkError, Result};
use serenity::all::{Context, Message};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

mod help;

pub use help::HelpExtension;

/// A named bundle of commands.
///
/// `setup` declares what the extension contributes through the builder;
/// nothing is registered if it fails.
#[async_trait]
pub trait Extension: Send + Sync {
    /// Unique name of the extension.
    fn name(&self) -> &str;

    /// Declares the extension's commands, checks and listeners.
    async fn setup(&mut self, builder: &mut ExtensionBuilder) -> std::result::Result<(), BoxError>;

    /// Releases anything `setup` acquired. Runs before the extension's
    /// commands are removed.
    async fn unload(&mut self) -> std::result::Result<(), BoxError> {
        Ok(())
    }
}

/// Collects what an extension contributes during setup.
pub struct ExtensionBuilder {
    name: String,
    framework: Arc<Framework>,
    chat_commands: Vec<ChatCommand>,
    slash_commands: Vec<SlashCommand>,
    message_commands: Vec<MessageCommand>,
    user_commands: Vec<UserCommand>,
    chat_checks: Vec<CheckFn>,
    slash_checks: Vec<CheckFn>,
    message_listeners: Vec<MessageListener>,
    event_listeners: Vec<Result<GatewayHandler>>,
}

impl ExtensionBuilder {
    pub(crate) fn new(name: impl Into<String>, framework: Arc<Framework>) -> Self {
        Self {
            name: name.into(),
            framework,
            chat_commands: Vec::new(),
            slash_commands: Vec::new(),
            message_commands: Vec::new(),
            user_commands: Vec::new(),
            chat_checks: Vec::new(),
            slash_checks: Vec::new(),
            message_listeners: Vec::new(),
            event_listeners: Vec::new(),
        }
    }

    /// Name of the extension being set up.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shared framework state, for configuration and translations.
    pub const fn framework(&self) -> &Arc<Framework> {
        &self.framework
    }

    /// Adds a chat command.
    pub fn chat_command(&mut self, command: ChatCommand) -> &mut Self {
        self.chat_commands.push(command);
        self
    }

    /// Adds a slash command.
    pub fn slash_command(&mut self, command: SlashCommand) -> &mut Self {
        self.slash_commands.push(command);
        self
    }

    /// Adds a message context menu command.
    pub fn message_command(&mut self, command: MessageCommand) -> &mut Self {
        self.message_commands.push(command);
        self
    }

    /// Adds a user context menu command.
    pub fn user_command(&mut self, command: UserCommand) -> &mut Self {
        self.user_commands.push(command);
        self
    }

    /// Adds a check run before each of this extension's chat commands.
    pub fn chat_check(&mut self, check: impl Check + 'static) -> &mut Self {
        self.chat_checks.push(Arc::new(check));
        self
    }

    /// Adds a check run before each of this extension's slash and context
    /// menu commands.
    pub fn slash_check(&mut self, check: impl Check + 'static) -> &mut Self {
        self.slash_checks.push(Arc::new(check));
        self
    }

    /// Adds a listener seeing every message the bot receives.
    pub fn message_listener<F, Fut>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(Context, Message) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let listener: MessageListener = Arc::new(move |ctx, message| -> BoxFuture<'static, ()> {
            listener(ctx, message).boxed()
        });

        self.message_listeners.push(listener);
        self
    }

    /// Adds a listener for gateway events of type `E`. A listener without
    /// an action fails the extension's setup.
    pub fn event_listener<E: GatewayEvent>(&mut self, listener: EventListener<E>) -> &mut Self {
        self.event_listeners.push(listener.into_handler());
        self
    }

    /// Receives command events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<CommandEvent> {
        self.framework.events().subscribe()
    }

    /// Registers everything collected. On failure nothing stays registered.
    fn register(self) -> Result<()> {
        let Self {
            name,
            framework,
            chat_commands,
            slash_commands,
            message_commands,
            user_commands,
            chat_checks,
            slash_checks,
            message_listeners,
            event_listeners,
        } = self;

        let event_listeners = event_listeners.into_iter().collect::<Result<Vec<_>>>()?;

        let registered = (|| -> Result<()> {
            for mut command in chat_commands {
                command.set_extension(&name, &chat_checks);
                framework.chat_commands().add(command)?;
            }

            for mut command in slash_commands {
                command.set_extension(&name, &slash_checks);
                framework.application_commands().add(command)?;
            }

            for mut command in message_commands {
                command.set_extension(&name, &slash_checks);
                framework.application_commands().add_message(command)?;
            }

            for mut command in user_commands {
                command.set_extension(&name, &slash_checks);
                framework.application_commands().add_user(command)?;
            }

            Ok(())
        })();

        if let Err(e) = registered {
            framework.remove_extension(&name);
            return Err(e);
        }

        for listener in message_listeners {
            framework.add_message_listener(Some(&name), listener);
        }

        for handler in event_listeners {
            framework.add_gateway_handler(Some(&name), handler);
        }

        Ok(())
    }
}

impl fmt::Debug for ExtensionBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionBuilder")
            .field("name", &self.name)
            .field("chat_commands", &self.chat_commands.len())
            .field("slash_commands", &self.slash_commands.len())
            .field("message_commands", &self.message_commands.len())
            .field("user_commands", &self.user_commands.len())
            .field("chat_checks", &self.chat_checks.len())
            .field("slash_checks", &self.slash_checks.len())
            .field("message_listeners", &self.message_listeners.len())
            .field("event_listeners", &self.event_listeners.len())
            .finish_non_exhaustive()
    }
}

/// An extension and where it is in its lifecycle.
pub struct LoadedExtension {
    extension: Box<dyn Extension>,
    state: ExtensionState,
}

impl LoadedExtension {
    /// Wraps an extension that hasn't been set up.
    pub fn new(extension: Box<dyn Extension>) -> Self {
        Self {
            extension,
            state: ExtensionState::Unloaded,
        }
    }

    /// The extension's name.
    pub fn name(&self) -> &str {
        self.extension.name()
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> ExtensionState {
        self.state
    }

    /// Runs setup and registers what it declared.
    pub async fn do_setup(&mut self, framework: &Arc<Framework>) -> Result<()> {
        let name = self.name().to_string();
        self.state = ExtensionState::Loading;
        debug!(extension = name, "Setting up extension");

        let mut builder = ExtensionBuilder::new(name.clone(), Arc::clone(framework));

        let result = match self.extension.setup(&mut builder).await {
            Ok(()) => builder.register(),
            Err(e) => Err(FrameworkError::invalid_extension(&name, format!("Setup failed: {e}"))),
        };

        match result {
            Ok(()) => {
                self.state = ExtensionState::Loaded;
                info!(extension = name, "Extension loaded");
                Ok(())
            }
            Err(e) => {
                self.state = ExtensionState::FailedLoading;
                error!(extension = name, error = %e, "Extension failed to load");
                Err(e)
            }
        }
    }

    /// Runs the extension's unload hook and removes everything it
    /// registered. The contributions go even when the hook fails.
    pub async fn do_unload(&mut self, framework: &Framework) -> Result<()> {
        let name = self.name().to_string();
        self.state = ExtensionState::Unloading;
        debug!(extension = name, "Unloading extension");

        let result = self.extension.unload().await;
        framework.remove_extension(&name);

        match result {
            Ok(()) => {
                self.state = ExtensionState::Unloaded;
                info!(extension = name, "Extension unloaded");
                Ok(())
            }
            Err(e) => {
                self.state = ExtensionState::FailedUnloading;
                error!(extension = name, error = %e, "Extension failed to unload");
                Err(FrameworkError::invalid_extension(name, format!("Unload failed: {e}")))
            }
        }
    }
}

impl fmt::Debug for LoadedExtension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedExtension")
            .field("name", &self.name())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_extensions {
    use super::*;

    /// Registers one chat and one slash command, optionally failing.
    pub struct Sample {
        pub name: &'static str,
        pub fail_setup: bool,
        pub fail_unload: bool,
    }

    impl Sample {
        pub const fn new(name: &'static str) -> Self {
            Self {
                name,
                fail_setup: false,
                fail_unload: false,
            }
        }
    }

    #[async_trait]
    impl Extension for Sample {
        fn name(&self) -> &str {
            self.name
        }

        async fn setup(&mut self, builder: &mut ExtensionBuilder) -> std::result::Result<(), BoxError> {
            builder
                .chat_command(ChatCommand::new(format!("{}-chat", self.name)).action(|_| async { Ok(()) }))
                .slash_command(
                    SlashCommand::new(format!("{}-slash", self.name))
                        .description("Sample")
                        .action(|_| async { Ok(()) }),
                )
                .message_listener(|_, _| async {});

            if self.fail_setup {
                return Err("setup broke".into());
            }

            Ok(())
        }

        async fn unload(&mut self) -> std::result::Result<(), BoxError> {
            if self.fail_unload {
                return Err("unload broke".into());
            }

            Ok(())
        }
    }
}
