//! Logs every command event, and deleted messages.

use async_trait::async_trait;
use herald_core::{BoxError, CommandEvent, EventListener, Extension, ExtensionBuilder};
use serenity::model::event::MessageDeleteEvent;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Writes command events to the log from a background task, which stops
/// when the extension is unloaded.
#[derive(Debug, Default)]
pub struct EventLogExtension {
    task: Option<JoinHandle<()>>,
}

impl EventLogExtension {
    /// Not listening until set up.
    pub const fn new() -> Self {
        Self { task: None }
    }

    /// Whether the logging task is running.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

fn log_event(event: &CommandEvent) {
    let invocation = event.invocation();
    let command = invocation.command.as_str();
    let user = invocation.user.get();

    match event {
        CommandEvent::Invoked(_) => debug!(command, user, kind = %invocation.kind, "Command invoked"),
        CommandEvent::Succeeded(_) => {
            let elapsed = chrono::Utc::now() - invocation.started_at;
            info!(command, user, elapsed_ms = elapsed.num_milliseconds(), "Command succeeded");
        }
        CommandEvent::FailedChecks { reason, .. } => {
            info!(command, user, reason = reason.as_deref().unwrap_or("<silent>"), "Command checks failed");
        }
        CommandEvent::FailedParsing { reason, .. } => info!(command, user, reason, "Command arguments rejected"),
        CommandEvent::FailedWithError { error, .. } => warn!(command, user, error, "Command failed"),
    }
}

#[async_trait]
impl Extension for EventLogExtension {
    fn name(&self) -> &str {
        "event-log"
    }

    async fn setup(&mut self, builder: &mut ExtensionBuilder) -> Result<(), BoxError> {
        let mut events = builder.subscribe();

        builder.event_listener(EventListener::<MessageDeleteEvent>::new().action(|ctx| async move {
            let event = ctx.event();
            debug!(message = %event.message_id, channel = %event.channel_id, "Message deleted");
            Ok(())
        }));

        self.task = Some(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => log_event(&event),
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event log fell behind"),
                    Err(RecvError::Closed) => break,
                }
            }
        }));

        Ok(())
    }

    async fn unload(&mut self) -> Result<(), BoxError> {
        if let Some(task) = self.task.take() {
            task.abort();

            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "Event log task failed");
                }
            }
        }

        Ok(())
    }
}
