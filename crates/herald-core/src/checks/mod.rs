//! Checks gate command execution.
//!
//! A check inspects the [`EventContext`] of an invocation and marks its
//! [`CheckContext`] as passed or failed. Failing with a message relays that
//! message to the user; failing without one stops the command silently.
//!
//! The library checks are methods on [`CheckContext`], so a command can use
//! them directly:
//!
//! ```ignore
//! command.check(|ctx: &mut CheckContext<'_>| ctx.any_guild());
//! ```

use crate::event::EventContext;
use crate::i18n::Localizer;
use crate::fluent_args;
use async_trait::async_trait;
use herald_common::DiscordRelayedError;
use herald_i18n::FluentArgs;
use std::sync::Arc;
use tracing::{debug, trace};

mod channel;
mod guild;
mod member;
mod misc;
mod nsfw;
mod role;
mod thread;

pub use member::permission_names;

/// Translation key wrapping check failure messages.
pub const DEFAULT_RESPONSE_KEY: &str = "checks-response-template";

/// Status of one check being evaluated.
#[derive(Debug)]
pub struct CheckContext<'a> {
    event: &'a EventContext,
    localizer: &'a Localizer,
    passed: bool,
    message: Option<String>,
    error_response_key: String,
}

impl<'a> CheckContext<'a> {
    /// A passing context for `event`.
    pub fn new(event: &'a EventContext, localizer: &'a Localizer) -> Self {
        Self {
            event,
            localizer,
            passed: true,
            message: None,
            error_response_key: DEFAULT_RESPONSE_KEY.to_string(),
        }
    }

    /// The event being checked.
    pub const fn event(&self) -> &'a EventContext {
        self.event
    }

    /// Translations in the invoking user's locale.
    pub const fn localizer(&self) -> &'a Localizer {
        self.localizer
    }

    /// Whether the check passed so far.
    pub const fn passed(&self) -> bool {
        self.passed
    }

    /// The failure message, untranslated by the response template.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Translation key used to wrap the failure message. It receives the
    /// message as `$message`.
    pub fn error_response_key(&self) -> &str {
        &self.error_response_key
    }

    /// Replaces the key used to wrap the failure message.
    pub fn set_error_response_key(&mut self, key: impl Into<String>) {
        self.error_response_key = key.into();
    }

    /// Marks the check as passed.
    pub fn pass(&mut self) {
        self.passed = true;
    }

    /// Marks the check as failed without telling the user.
    pub fn fail(&mut self) {
        self.passed = false;
    }

    /// Marks the check as failed, relaying `message`.
    pub fn fail_with(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
        self.passed = false;
    }

    /// Marks the check as failed, relaying the translation of `key`.
    pub fn fail_key(&mut self, key: &str) {
        let message = self.localizer.translate(key);
        self.fail_with(message);
    }

    /// Marks the check as failed, relaying the translation of `key` with
    /// placeholders.
    pub fn fail_key_with(&mut self, key: &str, args: &FluentArgs<'_>) {
        let message = self.localizer.translate_with(key, args);
        self.fail_with(message);
    }

    /// Fails when `condition` holds. Returns whether it failed.
    pub fn fail_if(&mut self, condition: bool, message: Option<&str>) -> bool {
        if condition {
            match message {
                Some(message) => self.fail_with(message),
                None => self.fail(),
            }
        }

        condition
    }

    /// Fails unless `condition` holds. Returns whether it failed.
    pub fn fail_if_not(&mut self, condition: bool, message: Option<&str>) -> bool {
        self.fail_if(!condition, message)
    }

    /// Passes when `condition` holds. Returns whether it passed.
    pub fn pass_if(&mut self, condition: bool) -> bool {
        if condition {
            self.pass();
        }

        condition
    }

    /// Passes unless `condition` holds. Returns whether it passed.
    pub fn pass_if_not(&mut self, condition: bool) -> bool {
        self.pass_if(!condition)
    }

    /// Translates `key` in the user's locale.
    pub fn translate(&self, key: &str, args: Option<&FluentArgs<'_>>) -> String {
        match args {
            Some(args) => self.localizer.translate_with(key, args),
            None => self.localizer.translate(key),
        }
    }

    /// The message shown to the user, when the check failed with one.
    pub fn translated_message(&self) -> Option<String> {
        match &self.message {
            Some(message) if !self.passed => Some(
                self.localizer
                    .translate_with(&self.error_response_key, &fluent_args!("message" => message.as_str())),
            ),
            _ => None,
        }
    }

    /// Turns a failure with a message into an error for the user.
    pub fn throw_if_failed_with_message(&self) -> Result<(), DiscordRelayedError> {
        self.translated_message().map_or(Ok(()), |message| Err(DiscordRelayedError::new(message)))
    }

    pub(crate) fn log_passed(&self, check: &str) {
        trace!(check, user = %self.event.author, "Check passed");
    }

    pub(crate) fn log_failed(&self, check: &str, reason: &str) {
        debug!(check, user = %self.event.author, reason, "Check failed");
    }
}

/// A check that may need to wait on something, such as a database.
///
/// Plain closures taking `&mut CheckContext` implement this trait.
#[async_trait]
pub trait Check: Send + Sync {
    /// Evaluates the check.
    async fn check(&self, ctx: &mut CheckContext<'_>);
}

#[async_trait]
impl<F> Check for F
where
    F: Fn(&mut CheckContext<'_>) + Send + Sync,
{
    async fn check(&self, ctx: &mut CheckContext<'_>) {
        self(ctx);
    }
}

/// A shareable check.
pub type CheckFn = Arc<dyn Check>;

/// Result of running a chain of checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Every check passed.
    Passed,
    /// A check failed, with the message to relay, if any.
    Failed(Option<String>),
}

impl CheckOutcome {
    /// Whether every check passed.
    pub const fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Runs `checks` in order, stopping at the first failure.
pub async fn run_checks<'c>(
    checks: impl IntoIterator<Item = &'c CheckFn>,
    event: &EventContext,
    localizer: &Localizer,
) -> CheckOutcome {
    for check in checks {
        let mut ctx = CheckContext::new(event, localizer);
        check.check(&mut ctx).await;

        if !ctx.passed() {
            return CheckOutcome::Failed(ctx.translated_message());
        }
    }

    CheckOutcome::Passed
}

#[cfg(test)]
pub(crate) mod test_events {
    use crate::event::{ChannelKind, EventContext};
    use herald_common::test_utils::discord_fixtures::{TEST_CHANNEL_ID, TEST_GUILD_ID, TEST_USER_ID};
    use serenity::all::{ChannelId, GuildId, UserId};

    pub fn direct_message() -> EventContext {
        EventContext::new(UserId::new(TEST_USER_ID), ChannelId::new(TEST_CHANNEL_ID))
    }

    pub fn guild_message() -> EventContext {
        let mut event = direct_message();
        event.guild = Some(GuildId::new(TEST_GUILD_ID));
        event.channel_kind = ChannelKind::Text;
        event.nsfw = Some(false);
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::localizer;

    struct AlwaysFails;

    #[async_trait]
    impl Check for AlwaysFails {
        async fn check(&self, ctx: &mut CheckContext<'_>) {
            ctx.fail_with("nope");
        }
    }

    #[test]
    fn test_fail_helpers() {
        let event = test_events::direct_message();
        let localizer = localizer();
        let mut ctx = CheckContext::new(&event, &localizer);

        assert!(!ctx.fail_if(false, Some("unused")));
        assert!(ctx.passed());
        assert!(ctx.fail_if_not(false, None));
        assert!(!ctx.passed());
        assert_eq!(ctx.translated_message(), None);
        assert!(ctx.throw_if_failed_with_message().is_ok());

        assert!(ctx.pass_if(true));
        assert!(ctx.passed());
    }

    #[test]
    fn test_failure_message_uses_template() {
        let event = test_events::direct_message();
        let localizer = localizer();
        let mut ctx = CheckContext::new(&event, &localizer);

        ctx.fail_key("checks-any-guild-failed");

        assert_eq!(ctx.message(), Some("Must be in a server"));
        assert_eq!(ctx.translated_message().as_deref(), Some("**Error:** Must be in a server"));
        assert_eq!(
            ctx.throw_if_failed_with_message().unwrap_err().reason,
            "**Error:** Must be in a server"
        );
    }

    #[tokio::test]
    async fn test_chain_stops_at_first_failure() {
        let event = test_events::direct_message();
        let localizer = localizer();

        let checks: Vec<CheckFn> = vec![
            Arc::new(|ctx: &mut CheckContext<'_>| ctx.pass()),
            Arc::new(|ctx: &mut CheckContext<'_>| ctx.fail()),
            Arc::new(AlwaysFails),
        ];

        assert_eq!(run_checks(&checks, &event, &localizer).await, CheckOutcome::Failed(None));

        let checks: Vec<CheckFn> = vec![Arc::new(AlwaysFails)];
        assert_eq!(
            run_checks(&checks, &event, &localizer).await,
            CheckOutcome::Failed(Some("**Error:** nope".to_string()))
        );

        assert!(run_checks(&[], &event, &localizer).await.passed());
    }
}
