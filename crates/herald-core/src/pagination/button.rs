//! The button paginator: sends the pages and reacts to presses until it
//! finishes or times out.

use super::{ButtonAction, InteractionCheck, Pages, PaginatorOptions, PaginatorState};
use crate::components::{ButtonPress, ComponentRouter, PressReply};
use crate::i18n::Localizer;
use crate::respond::Responder;
use futures::future::BoxFuture;
use herald_common::Result;
use serenity::all::MessageId;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, trace};
use uuid::Uuid;

/// Runs when a paginator ends.
pub type PaginatorCallback = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// How a paginator ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ending {
    Finished,
    TimedOut,
}

/// A paginator answering button presses.
///
/// [`ButtonPaginator::send`] posts the first page and returns right away;
/// the paginator keeps listening in a background task.
pub struct ButtonPaginator {
    state: PaginatorState,
    key: String,
    localizer: Localizer,
    responder: Arc<dyn Responder>,
    router: Arc<ComponentRouter>,
    on_timeout: Vec<PaginatorCallback>,
    on_destroy: Vec<PaginatorCallback>,
}

impl ButtonPaginator {
    /// A paginator over `pages`. Fails when there are no pages or the chunk
    /// size is out of range.
    pub fn new(
        pages: Pages,
        options: &PaginatorOptions,
        localizer: Localizer,
        responder: Arc<dyn Responder>,
        router: Arc<ComponentRouter>,
    ) -> Result<Self> {
        Ok(Self {
            state: PaginatorState::new(pages, options)?,
            key: Uuid::new_v4().simple().to_string(),
            localizer,
            responder,
            router,
            on_timeout: Vec::new(),
            on_destroy: Vec::new(),
        })
    }

    /// Current state.
    pub const fn state(&self) -> &PaginatorState {
        &self.state
    }

    /// Key owning this paginator's component ids.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Runs `callback` if the paginator times out.
    #[must_use]
    pub fn on_timeout<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'static, ()> + Send + 'static,
    {
        self.on_timeout.push(Box::new(callback));
        self
    }

    /// Runs `callback` when the paginator ends, however it ends.
    #[must_use]
    pub fn on_destroy<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'static, ()> + Send + 'static,
    {
        self.on_destroy.push(Box::new(callback));
        self
    }

    /// Sends the first page and starts listening for presses.
    ///
    /// The returned task ends when the paginator does.
    pub async fn send(self) -> Result<JoinHandle<()>> {
        let presses = self.router.register(self.key.clone());

        let sent = self
            .responder
            .send_embed(
                self.state.embed(&self.localizer),
                self.state.components(&self.key, &self.localizer),
            )
            .await;

        let message = match sent {
            Ok(message) => message,
            Err(e) => {
                self.router.unregister(&self.key);
                return Err(e);
            }
        };

        debug!(key = self.key, %message, "Paginator sent");
        Ok(tokio::spawn(self.listen(message, presses)))
    }

    async fn listen(mut self, message: MessageId, mut presses: mpsc::Receiver<ButtonPress>) {
        let ending = loop {
            let press = match timeout(self.state.timeout(), presses.recv()).await {
                Ok(Some(press)) => press,
                Ok(None) => break Ending::Finished,
                Err(_) => break Ending::TimedOut,
            };

            if let Some(ending) = self.handle(message, press).await {
                break ending;
            }
        };

        self.finish(message, ending).await;
    }

    /// Handles one press. Returns how the paginator ended, if it did.
    async fn handle(&mut self, message: MessageId, press: ButtonPress) -> Option<Ending> {
        match self.state.check_interaction(press.user) {
            InteractionCheck::Allowed => {}
            InteractionCheck::Inactive => {
                press.reply(PressReply::Acknowledge);
                return None;
            }
            InteractionCheck::NotOwner => {
                trace!(key = self.key, user = %press.user, "Press from someone other than the owner");
                press.reply(PressReply::Deny(self.localizer.translate("paginator-error-not-owner")));
                return None;
            }
        }

        let Ok(action) = press.action.parse::<ButtonAction>() else {
            debug!(key = self.key, action = press.action, "Unknown paginator action");
            press.reply(PressReply::Acknowledge);
            return None;
        };

        press.reply(PressReply::Acknowledge);

        if action == ButtonAction::Finish {
            return Some(Ending::Finished);
        }

        if self.state.apply(action) {
            let edited = self
                .responder
                .edit_embed(
                    message,
                    self.state.embed(&self.localizer),
                    self.state.components(&self.key, &self.localizer),
                )
                .await;

            if let Err(e) = edited {
                error!(key = self.key, error = %e, "Failed to update paginator");
            }
        }

        None
    }

    async fn finish(mut self, message: MessageId, ending: Ending) {
        self.state.deactivate();
        self.router.unregister(&self.key);

        debug!(key = self.key, ?ending, "Paginator ended");

        let result = if self.state.keep_embed() {
            self.responder
                .edit_embed(message, self.state.embed(&self.localizer), Vec::new())
                .await
        } else {
            self.responder.delete(message).await
        };

        if let Err(e) = result {
            error!(key = self.key, error = %e, "Failed to clean up paginator message");
        }

        if ending == Ending::TimedOut {
            for callback in self.on_timeout.drain(..) {
                callback().await;
            }
        }

        for callback in self.on_destroy.drain(..) {
            callback().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::component_id;
    use crate::pagination::Page;
    use crate::respond::MockResponder;
    use crate::test_support::localizer;
    use futures::FutureExt;
    use serenity::all::UserId;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn three_pages() -> Pages {
        (1..=3).map(|n| Page::new(format!("page {n}"))).collect()
    }

    fn options(owner: Option<UserId>, timeout: Duration, keep_embed: bool) -> PaginatorOptions {
        PaginatorOptions {
            chunk_size: 1,
            owner,
            timeout,
            keep_embed,
        }
    }

    #[tokio::test]
    async fn test_presses_update_and_finish() {
        let mut responder = MockResponder::new();
        responder
            .expect_send_embed()
            .times(1)
            .returning(|_, components| {
                assert_eq!(components.len(), 2);
                Ok(MessageId::new(10))
            });
        // One edit for the page change, one to strip the buttons at the end
        responder
            .expect_edit_embed()
            .times(2)
            .returning(|message, _, _| {
                assert_eq!(message, MessageId::new(10));
                Ok(())
            });
        responder.expect_delete().never();

        let router = Arc::new(ComponentRouter::new());
        let owner = UserId::new(1);
        let paginator = ButtonPaginator::new(
            three_pages(),
            &options(Some(owner), Duration::from_secs(60), true),
            localizer(),
            Arc::new(responder),
            Arc::clone(&router),
        )
        .unwrap();

        let key = paginator.key().to_string();
        let task = paginator.send().await.unwrap();

        let reply = router.route(&component_id(&key, "next"), owner).await;
        assert_eq!(reply, Some(PressReply::Acknowledge));

        let reply = router.route(&component_id(&key, "next"), UserId::new(2)).await;
        assert_eq!(
            reply,
            Some(PressReply::Deny(
                "Only the user who ran this command can use these buttons.".to_string()
            ))
        );

        let reply = router.route(&component_id(&key, "finish"), owner).await;
        assert_eq!(reply, Some(PressReply::Acknowledge));

        task.await.unwrap();
        assert!(!router.is_registered(&key));
    }

    #[tokio::test]
    async fn test_timeout_deletes_and_runs_callbacks() {
        let mut responder = MockResponder::new();
        responder.expect_send_embed().returning(|_, _| Ok(MessageId::new(10)));
        responder.expect_delete().times(1).returning(|_| Ok(()));

        let calls = Arc::new(AtomicUsize::new(0));
        let on_timeout = Arc::clone(&calls);
        let on_destroy = Arc::clone(&calls);

        let router = Arc::new(ComponentRouter::new());
        let paginator = ButtonPaginator::new(
            three_pages(),
            &options(None, Duration::from_millis(20), false),
            localizer(),
            Arc::new(responder),
            Arc::clone(&router),
        )
        .unwrap()
        .on_timeout(move || {
            async move {
                on_timeout.fetch_add(1, Ordering::SeqCst);
            }
            .boxed()
        })
        .on_destroy(move || {
            async move {
                on_destroy.fetch_add(10, Ordering::SeqCst);
            }
            .boxed()
        });

        paginator.send().await.unwrap().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 11);
        assert!(router.is_empty());
    }

    #[tokio::test]
    async fn test_failed_send_unregisters() {
        let mut responder = MockResponder::new();
        responder
            .expect_send_embed()
            .returning(|_, _| Err(herald_common::FrameworkError::discord("no access")));

        let router = Arc::new(ComponentRouter::new());
        let paginator = ButtonPaginator::new(
            three_pages(),
            &PaginatorOptions::default(),
            localizer(),
            Arc::new(responder),
            Arc::clone(&router),
        )
        .unwrap();

        assert!(paginator.send().await.is_err());
        assert!(router.is_empty());
    }
}
