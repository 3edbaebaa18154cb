//! `ping`, as both a chat and a slash command.

use async_trait::async_trait;
use herald_core::{BoxError, ChatCommand, Extension, ExtensionBuilder, SlashCommand};

/// Replies with "Pong!".
#[derive(Debug, Clone, Copy, Default)]
pub struct PingExtension;

#[async_trait]
impl Extension for PingExtension {
    fn name(&self) -> &str {
        "ping"
    }

    async fn setup(&mut self, builder: &mut ExtensionBuilder) -> Result<(), BoxError> {
        builder
            .chat_command(
                ChatCommand::new("ping")
                    .description("Checks that the bot is responding")
                    .action(|ctx| async move {
                        ctx.respond("Pong!").await?;
                        Ok(())
                    }),
            )
            .slash_command(
                SlashCommand::new("ping")
                    .description("Checks that the bot is responding")
                    .auto_ack(false)
                    .action(|ctx| async move {
                        ctx.respond("Pong!").await?;
                        Ok(())
                    }),
            );

        Ok(())
    }
}
