//! Typed listeners for gateway events.
//!
//! An [`EventListener`] subscribes to one [`GatewayEvent`] type. Its checks
//! run against a snapshot of who caused the event and where; listeners never
//! reply, so a failed check just skips the action.

use crate::checks::{run_checks, Check, CheckFn};
use crate::commands::CommandResult;
use crate::event::{ChannelKind, EventContext, PrivilegedUsers};
use crate::framework::Framework;
use crate::i18n::Localizer;
use futures::future::BoxFuture;
use futures::FutureExt;
use herald_common::{FrameworkError, Result};
use serenity::all::{ChannelId, Context, GuildId, UserId};
use serenity::model::event::{
    Event, GuildMemberAddEvent, MessageCreateEvent, MessageDeleteEvent, ReactionAddEvent, ReactionRemoveEvent,
    ReadyEvent, TypingStartEvent,
};
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{error, trace};

/// Who caused an event and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSubject {
    /// The user behind the event.
    pub user: UserId,
    /// Whether that user is a bot.
    pub bot: bool,
    /// The channel it happened in.
    pub channel: ChannelId,
    /// The guild, unless it happened in a direct message.
    pub guild: Option<GuildId>,
}

impl EventSubject {
    fn snapshot(self, privileged: Arc<PrivilegedUsers>) -> EventContext {
        let mut event = EventContext::new(self.user, self.channel);
        event.author_is_bot = self.bot;
        event.guild = self.guild;
        event.privileged = privileged;

        if self.guild.is_some() {
            event.channel_kind = ChannelKind::Text;
        }

        event
    }
}

/// A gateway event listeners can subscribe to.
pub trait GatewayEvent: Clone + Send + Sync + 'static {
    /// Name used in logs.
    const NAME: &'static str;

    /// The event, when `event` is one of this type.
    fn extract(event: &Event) -> Option<Self>;

    /// Who caused the event and where. Events without both a user and a
    /// channel have none.
    fn subject(&self) -> Option<EventSubject>;
}

macro_rules! gateway_event {
    ($event:ident, $variant:ident, |$this:ident| $subject:expr) => {
        impl GatewayEvent for $event {
            const NAME: &'static str = stringify!($variant);

            fn extract(event: &Event) -> Option<Self> {
                match event {
                    Event::$variant(inner) => Some(inner.clone()),
                    _ => None,
                }
            }

            fn subject(&self) -> Option<EventSubject> {
                let $this = self;
                $subject
            }
        }
    };
}

gateway_event!(MessageCreateEvent, MessageCreate, |this| Some(EventSubject {
    user: this.message.author.id,
    bot: this.message.author.bot,
    channel: this.message.channel_id,
    guild: this.message.guild_id,
}));

gateway_event!(ReactionAddEvent, ReactionAdd, |this| Some(EventSubject {
    user: this.reaction.user_id?,
    bot: false,
    channel: this.reaction.channel_id,
    guild: this.reaction.guild_id,
}));

gateway_event!(ReactionRemoveEvent, ReactionRemove, |this| Some(EventSubject {
    user: this.reaction.user_id?,
    bot: false,
    channel: this.reaction.channel_id,
    guild: this.reaction.guild_id,
}));

gateway_event!(TypingStartEvent, TypingStart, |this| Some(EventSubject {
    user: this.user_id,
    bot: false,
    channel: this.channel_id,
    guild: this.guild_id,
}));

gateway_event!(GuildMemberAddEvent, GuildMemberAdd, |_this| None);

gateway_event!(MessageDeleteEvent, MessageDelete, |_this| None);

gateway_event!(ReadyEvent, Ready, |_this| None);

/// Handed to a listener's action.
pub struct ListenerContext<E> {
    event: E,
    serenity: Option<Context>,
    framework: Arc<Framework>,
    snapshot: Option<EventContext>,
}

impl<E> ListenerContext<E> {
    /// The event.
    pub const fn event(&self) -> &E {
        &self.event
    }

    /// Takes the event out of the context.
    pub fn into_event(self) -> E {
        self.event
    }

    /// Serenity's context. Missing when the event was dispatched without a
    /// gateway session, as in tests.
    pub const fn serenity(&self) -> Option<&Context> {
        self.serenity.as_ref()
    }

    /// Shared framework state.
    pub const fn framework(&self) -> &Arc<Framework> {
        &self.framework
    }

    /// What the checks saw, for events with a user and a channel.
    pub const fn snapshot(&self) -> Option<&EventContext> {
        self.snapshot.as_ref()
    }

    /// Translations in the default locale.
    pub fn localizer(&self) -> Localizer {
        self.framework.localizer(None)
    }
}

impl<E: fmt::Debug> fmt::Debug for ListenerContext<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerContext")
            .field("event", &self.event)
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

type ListenerAction<E> = Arc<dyn Fn(ListenerContext<E>) -> BoxFuture<'static, CommandResult> + Send + Sync>;

/// Receives a raw gateway event. Returns the work to do when the event is
/// the type the listener wants.
pub(crate) type GatewayHandler =
    Arc<dyn Fn(&Arc<Framework>, Option<Context>, &Event) -> Option<BoxFuture<'static, ()>> + Send + Sync>;

/// A listener for gateway events of type `E`.
pub struct EventListener<E: GatewayEvent> {
    checks: Vec<CheckFn>,
    action: Option<ListenerAction<E>>,
    _event: PhantomData<fn(E)>,
}

impl<E: GatewayEvent> EventListener<E> {
    /// A listener with no checks and no action yet.
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            action: None,
            _event: PhantomData,
        }
    }

    /// Adds a check. Checks run in the order they were added.
    ///
    /// Events without a user and a channel have nothing to check, so a
    /// listener with checks skips them.
    #[must_use]
    pub fn check(mut self, check: impl Check + 'static) -> Self {
        self.checks.push(Arc::new(check));
        self
    }

    /// Sets the action.
    #[must_use]
    pub fn action<F, Fut>(mut self, action: F) -> Self
    where
        F: Fn(ListenerContext<E>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = CommandResult> + Send + 'static,
    {
        self.action = Some(Arc::new(move |ctx| action(ctx).boxed()));
        self
    }

    /// Checks the listener has an action.
    pub fn validate(&self) -> Result<()> {
        if self.action.is_none() {
            return Err(FrameworkError::registration(E::NAME, "Event listeners need an action"));
        }

        Ok(())
    }

    pub(crate) fn into_handler(self) -> Result<GatewayHandler> {
        let Some(action) = self.action else {
            return Err(FrameworkError::registration(E::NAME, "Event listeners need an action"));
        };
        let checks: Arc<[CheckFn]> = self.checks.into();

        let handler: GatewayHandler = Arc::new(
            move |framework: &Arc<Framework>, ctx: Option<Context>, event: &Event| -> Option<BoxFuture<'static, ()>> {
                let event = E::extract(event)?;
                let framework = Arc::clone(framework);
                let checks = Arc::clone(&checks);
                let action = Arc::clone(&action);

                Some(async move { run_listener(framework, ctx, event, &checks, action).await }.boxed())
            },
        );

        Ok(handler)
    }
}

impl<E: GatewayEvent> Default for EventListener<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: GatewayEvent> fmt::Debug for EventListener<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListener")
            .field("event", &E::NAME)
            .field("checks", &self.checks.len())
            .field("has_action", &self.action.is_some())
            .finish()
    }
}

async fn run_listener<E: GatewayEvent>(
    framework: Arc<Framework>,
    serenity: Option<Context>,
    event: E,
    checks: &[CheckFn],
    action: ListenerAction<E>,
) {
    let snapshot = event.subject().map(|subject| subject.snapshot(framework.privileged()));

    if !checks.is_empty() {
        let Some(snapshot) = &snapshot else {
            trace!(event = E::NAME, "Nothing to check, skipping listener");
            return;
        };

        if !run_checks(checks, snapshot, &framework.localizer(None)).await.passed() {
            trace!(event = E::NAME, "Listener checks failed");
            return;
        }
    }

    let context = ListenerContext {
        event,
        serenity,
        framework,
        snapshot,
    };

    if let Err(e) = action(context).await {
        error!(event = E::NAME, error = %e, "Event listener failed");
    }
}
