//! `echo`: repeats text back, with a per-user cooldown. Also offers an
//! "Echo message" entry in message context menus.

use async_trait::async_trait;
use herald_core::converters::StringCoalescingConverter;
use herald_core::{
    Arg, Arguments, BoxError, ChatCommand, CooldownScope, DiscordRelayedError, Extension, ExtensionBuilder, MenuTarget,
    MessageCommand, SlashCommand,
};
use std::time::Duration;

/// Longest message Discord accepts.
const MAX_MESSAGE_LENGTH: usize = 2000;

/// Repeats whatever follows the command.
#[derive(Debug, Clone, Copy)]
pub struct EchoExtension {
    cooldown: Duration,
}

impl EchoExtension {
    /// Echo with a five second cooldown per user.
    pub const fn new() -> Self {
        Self {
            cooldown: Duration::from_secs(5),
        }
    }

    /// Changes the per-user cooldown.
    #[must_use]
    pub const fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }
}

impl Default for EchoExtension {
    fn default() -> Self {
        Self::new()
    }
}

fn arguments() -> (Arguments, Arg<String>) {
    let mut arguments = Arguments::new();
    let text = arguments.coalescing(
        "text",
        "Text to repeat",
        StringCoalescingConverter::new().max_length(MAX_MESSAGE_LENGTH),
    );

    (arguments, text)
}

#[async_trait]
impl Extension for EchoExtension {
    fn name(&self) -> &str {
        "echo"
    }

    async fn setup(&mut self, builder: &mut ExtensionBuilder) -> Result<(), BoxError> {
        let (chat_arguments, chat_text) = arguments();
        let (slash_arguments, slash_text) = arguments();

        builder
            .chat_command(
                ChatCommand::new("echo")
                    .alias("say")
                    .description("Repeats your message")
                    .cooldown(CooldownScope::User, self.cooldown)
                    .arguments(chat_arguments)
                    .action(move |ctx| async move {
                        let text = ctx.arg(chat_text)?.clone();
                        ctx.respond(text).await?;
                        Ok(())
                    }),
            )
            .slash_command(
                SlashCommand::new("echo")
                    .description("Repeats your message")
                    .ephemeral(true)
                    .cooldown(CooldownScope::User, self.cooldown)
                    .arguments(slash_arguments)
                    .action(move |ctx| async move {
                        let text = ctx.arg(slash_text)?.clone();
                        ctx.respond(text).await?;
                        Ok(())
                    }),
            )
            .message_command(
                MessageCommand::new("Echo message")
                    .ephemeral(true)
                    .cooldown(CooldownScope::User, self.cooldown)
                    .action(|ctx| async move {
                        let text = ctx
                            .target()
                            .and_then(MenuTarget::message)
                            .map(|message| message.content.clone())
                            .unwrap_or_default();

                        if text.trim().is_empty() {
                            return Err(DiscordRelayedError::new("That message has no text to repeat").into());
                        }

                        ctx.respond(text).await?;
                        Ok(())
                    }),
            );

        Ok(())
    }
}
