//! Sending replies to whoever invoked a command.
//!
//! Commands and paginators talk to a [`Responder`] instead of serenity, so
//! the same code answers messages and interactions, and tests can swap in a
//! mock.

use async_trait::async_trait;
use herald_common::{FrameworkError, Result};
use serenity::all::{
    ChannelId, CommandInteraction, CreateActionRow, CreateAllowedMentions, CreateEmbed,
    CreateInteractionResponseFollowup, CreateMessage, EditMessage, Http, MessageId,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Replies to an invocation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Responder: Send + Sync {
    /// Sends a plain text reply.
    async fn respond(&self, content: String) -> Result<()>;

    /// Sends an embed with component rows, returning the new message.
    async fn send_embed(&self, embed: CreateEmbed, components: Vec<CreateActionRow>) -> Result<MessageId>;

    /// Replaces the embed and components of a message sent with
    /// [`Responder::send_embed`].
    async fn edit_embed(&self, message: MessageId, embed: CreateEmbed, components: Vec<CreateActionRow>)
        -> Result<()>;

    /// Deletes a message sent with [`Responder::send_embed`].
    async fn delete(&self, message: MessageId) -> Result<()>;

    /// Tells Discord the invocation was received, before any reply is ready.
    async fn acknowledge(&self) -> Result<()> {
        Ok(())
    }
}

fn discord_error(action: &str) -> impl FnOnce(serenity::Error) -> FrameworkError + '_ {
    move |e| FrameworkError::discord_with_source(format!("Failed to {action}"), e)
}

/// Replies to a chat command by answering its message.
pub struct MessageResponder {
    http: Arc<Http>,
    channel: ChannelId,
    reply_to: MessageId,
}

impl MessageResponder {
    /// A responder replying to `reply_to` in `channel`.
    pub const fn new(http: Arc<Http>, channel: ChannelId, reply_to: MessageId) -> Self {
        Self {
            http,
            channel,
            reply_to,
        }
    }

    fn message(&self) -> CreateMessage {
        CreateMessage::new()
            .reference_message((self.channel, self.reply_to))
            .allowed_mentions(CreateAllowedMentions::new())
    }
}

#[async_trait]
impl Responder for MessageResponder {
    async fn respond(&self, content: String) -> Result<()> {
        trace!(channel = %self.channel, "Replying to message");

        self.channel
            .send_message(&self.http, self.message().content(content))
            .await
            .map_err(discord_error("send reply"))?;

        Ok(())
    }

    async fn send_embed(&self, embed: CreateEmbed, components: Vec<CreateActionRow>) -> Result<MessageId> {
        let message = self
            .channel
            .send_message(&self.http, self.message().embed(embed).components(components))
            .await
            .map_err(discord_error("send embed"))?;

        Ok(message.id)
    }

    async fn edit_embed(
        &self,
        message: MessageId,
        embed: CreateEmbed,
        components: Vec<CreateActionRow>,
    ) -> Result<()> {
        self.channel
            .edit_message(&self.http, message, EditMessage::new().embed(embed).components(components))
            .await
            .map_err(discord_error("edit embed"))?;

        Ok(())
    }

    async fn delete(&self, message: MessageId) -> Result<()> {
        self.channel
            .delete_message(&self.http, message)
            .await
            .map_err(discord_error("delete message"))
    }
}

/// Replies to a slash command through follow-up messages.
///
/// The interaction is deferred first when nothing acknowledged it yet. The
/// first follow-up then takes the place of Discord's loading message.
pub struct InteractionResponder {
    http: Arc<Http>,
    interaction: CommandInteraction,
    ephemeral: bool,
    acknowledged: AtomicBool,
}

impl InteractionResponder {
    /// A responder for `interaction`, replying privately when `ephemeral`.
    pub const fn new(http: Arc<Http>, interaction: CommandInteraction, ephemeral: bool) -> Self {
        Self {
            http,
            interaction,
            ephemeral,
            acknowledged: AtomicBool::new(false),
        }
    }

    /// Whether replies are only shown to the invoking user.
    pub const fn is_ephemeral(&self) -> bool {
        self.ephemeral
    }

    /// Acknowledges the interaction so replies can take their time. Only the
    /// first call does anything.
    pub async fn defer(&self) -> Result<()> {
        if self.acknowledged.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        trace!(interaction = %self.interaction.id, ephemeral = self.ephemeral, "Deferring interaction");

        let deferred = if self.ephemeral {
            self.interaction.defer_ephemeral(&self.http).await
        } else {
            self.interaction.defer(&self.http).await
        };

        deferred.map_err(|e| {
            self.acknowledged.store(false, Ordering::Release);
            discord_error("defer interaction")(e)
        })
    }

    fn followup(&self) -> CreateInteractionResponseFollowup {
        CreateInteractionResponseFollowup::new()
            .ephemeral(self.ephemeral)
            .allowed_mentions(CreateAllowedMentions::new())
    }
}

#[async_trait]
impl Responder for InteractionResponder {
    async fn respond(&self, content: String) -> Result<()> {
        self.defer().await?;

        self.interaction
            .create_followup(&self.http, self.followup().content(content))
            .await
            .map_err(discord_error("send follow-up"))?;

        Ok(())
    }

    async fn send_embed(&self, embed: CreateEmbed, components: Vec<CreateActionRow>) -> Result<MessageId> {
        self.defer().await?;

        let message = self
            .interaction
            .create_followup(&self.http, self.followup().embed(embed).components(components))
            .await
            .map_err(discord_error("send follow-up embed"))?;

        Ok(message.id)
    }

    async fn edit_embed(
        &self,
        message: MessageId,
        embed: CreateEmbed,
        components: Vec<CreateActionRow>,
    ) -> Result<()> {
        self.interaction
            .edit_followup(
                &self.http,
                message,
                CreateInteractionResponseFollowup::new().embed(embed).components(components),
            )
            .await
            .map_err(discord_error("edit follow-up"))?;

        Ok(())
    }

    async fn delete(&self, message: MessageId) -> Result<()> {
        self.interaction
            .delete_followup(&self.http, message)
            .await
            .map_err(discord_error("delete follow-up"))
    }

    async fn acknowledge(&self) -> Result<()> {
        self.defer().await
    }
}
