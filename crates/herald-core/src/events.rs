//! Command lifecycle events.

use chrono::{DateTime, Utc};
use herald_common::CommandKind;
use serenity::all::UserId;
use tokio::sync::broadcast;
use tracing::trace;
use uuid::Uuid;

/// Events kept for slow subscribers before they start lagging.
pub const EVENT_BUFFER: usize = 256;

/// One run of a command, shared by every event it produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Unique id of this run.
    pub id: Uuid,
    /// Name of the command, including the parent for subcommands.
    pub command: String,
    /// Chat or slash.
    pub kind: CommandKind,
    /// The invoking user.
    pub user: UserId,
    /// When the command was invoked.
    pub started_at: DateTime<Utc>,
}

impl Invocation {
    /// Starts a new invocation record.
    pub fn new(command: impl Into<String>, kind: CommandKind, user: UserId) -> Self {
        Self {
            id: Uuid::new_v4(),
            command: command.into(),
            kind,
            user,
            started_at: Utc::now(),
        }
    }
}

/// Something that happened while running a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEvent {
    /// The command was matched and is about to run its checks.
    Invoked(Invocation),
    /// A check failed. `reason` is the message shown to the user, if any.
    FailedChecks {
        /// The invocation.
        invocation: Invocation,
        /// Message relayed to the user.
        reason: Option<String>,
    },
    /// Arguments couldn't be parsed.
    FailedParsing {
        /// The invocation.
        invocation: Invocation,
        /// Message relayed to the user.
        reason: String,
    },
    /// The action returned an error.
    FailedWithError {
        /// The invocation.
        invocation: Invocation,
        /// The error, as displayed.
        error: String,
    },
    /// The action finished.
    Succeeded(Invocation),
}

impl CommandEvent {
    /// The invocation this event belongs to.
    pub const fn invocation(&self) -> &Invocation {
        match self {
            Self::Invoked(invocation)
            | Self::Succeeded(invocation)
            | Self::FailedChecks { invocation, .. }
            | Self::FailedParsing { invocation, .. }
            | Self::FailedWithError { invocation, .. } => invocation,
        }
    }
}

/// Fan-out of [`CommandEvent`]s to any number of subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CommandEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(EVENT_BUFFER)
    }
}

impl EventBus {
    /// A bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event. Having no subscribers is fine.
    pub fn publish(&self, event: CommandEvent) {
        if self.sender.send(event).is_err() {
            trace!("No command event subscribers");
        }
    }

    /// Receives every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<CommandEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = EventBus::default();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        let invocation = Invocation::new("ping", CommandKind::Chat, UserId::new(1));
        bus.publish(CommandEvent::Invoked(invocation.clone()));

        assert_eq!(first.recv().await.unwrap(), CommandEvent::Invoked(invocation.clone()));
        assert_eq!(second.recv().await.unwrap().invocation(), &invocation);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new(0);
        bus.publish(CommandEvent::Succeeded(Invocation::new("ping", CommandKind::Slash, UserId::new(1))));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
