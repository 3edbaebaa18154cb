//! Routing button presses to whatever is listening for them.
//!
//! A listener registers a key and builds its custom ids with
//! [`component_id`]. The bot forwards every component interaction to the
//! [`ComponentRouter`], which hands the press to the listener owning the key
//! and answers Discord with the listener's [`PressReply`].

use dashmap::DashMap;
use serenity::all::UserId;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

const PRESS_BUFFER: usize = 16;

/// Builds the custom id of a component owned by `key`.
pub fn component_id(key: &str, action: &str) -> String {
    format!("{key}:{action}")
}

/// A button press delivered to a listener.
#[derive(Debug)]
pub struct ButtonPress {
    /// The part of the custom id after the listener's key.
    pub action: String,
    /// Who pressed the button.
    pub user: UserId,
    reply: oneshot::Sender<PressReply>,
}

impl ButtonPress {
    /// A press and the receiver its reply goes to.
    pub fn new(action: impl Into<String>, user: UserId) -> (Self, oneshot::Receiver<PressReply>) {
        let (reply, receiver) = oneshot::channel();

        (
            Self {
                action: action.into(),
                user,
                reply,
            },
            receiver,
        )
    }

    /// Tells the router how to answer the interaction.
    pub fn reply(self, reply: PressReply) {
        if self.reply.send(reply).is_err() {
            trace!("Nobody waited for the press reply");
        }
    }
}

/// How the router answers a press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PressReply {
    /// Acknowledge silently. The listener edits the message itself.
    Acknowledge,
    /// Tell the presser, privately, why nothing happened.
    Deny(String),
}

/// Hands component interactions to registered listeners.
#[derive(Debug, Default)]
pub struct ComponentRouter {
    listeners: DashMap<String, mpsc::Sender<ButtonPress>>,
}

impl ComponentRouter {
    /// An empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts listening for components owned by `key`.
    pub fn register(&self, key: impl Into<String>) -> mpsc::Receiver<ButtonPress> {
        let key = key.into();
        let (sender, receiver) = mpsc::channel(PRESS_BUFFER);

        trace!(key, "Registering component listener");
        self.listeners.insert(key, sender);

        receiver
    }

    /// Stops listening for components owned by `key`.
    pub fn unregister(&self, key: &str) {
        if self.listeners.remove(key).is_some() {
            trace!(key, "Removed component listener");
        }
    }

    /// Whether a listener owns `key`.
    pub fn is_registered(&self, key: &str) -> bool {
        self.listeners.contains_key(key)
    }

    /// Number of live listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Routes a press on the component `custom_id`.
    ///
    /// Returns `None` when no live listener owns the id, in which case the
    /// interaction isn't ours to answer.
    pub async fn route(&self, custom_id: &str, user: UserId) -> Option<PressReply> {
        let (key, action) = custom_id.split_once(':')?;

        // The guard can't be held across an await
        let sender = self.listeners.get(key).map(|entry| entry.value().clone())?;
        let (press, reply) = ButtonPress::new(action, user);

        if sender.send(press).await.is_err() {
            debug!(key, "Component listener went away");
            self.unregister(key);
            return None;
        }

        Some(reply.await.unwrap_or(PressReply::Acknowledge))
    }
}
