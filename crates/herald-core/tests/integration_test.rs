//! Integration tests for herald-core crate.
//!
//! These drive chat commands through a bot built from extensions, the same
//! way the message handler does, with a responder that records replies.

use async_trait::async_trait;
use herald_common::test_utils::discord_fixtures::{BOT_USER_ID, TEST_CHANNEL_ID, TEST_USER_ID};
use herald_common::test_utils::init_test_logging;
use herald_config::Config;
use herald_core::context::CommandCall;
use herald_core::converters::{IntConverter, StringConverter};
use herald_core::{
    Arguments, BoxError, ChatCommand, CheckContext, CommandEvent, CommandOutcome, DiscordRelayedError,
    EventContext, ExtensibleBot, Extension, ExtensionBuilder, ExtensionState, HelpExtension, Responder, Result,
};
use parking_lot::Mutex;
use serenity::all::{ChannelId, CreateActionRow, CreateEmbed, MessageId, UserId};
use std::sync::Arc;

#[derive(Clone, Default)]
struct Recorder {
    replies: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn replies(&self) -> Vec<String> {
        self.replies.lock().clone()
    }
}

#[async_trait]
impl Responder for Recorder {
    async fn respond(&self, content: String) -> Result<()> {
        self.replies.lock().push(content);
        Ok(())
    }

    async fn send_embed(&self, embed: CreateEmbed, _components: Vec<CreateActionRow>) -> Result<MessageId> {
        let json = serde_json::to_value(&embed).unwrap();
        self.replies
            .lock()
            .push(json["description"].as_str().unwrap_or_default().to_string());
        Ok(MessageId::new(1))
    }

    async fn edit_embed(&self, _message: MessageId, _embed: CreateEmbed, _components: Vec<CreateActionRow>) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _message: MessageId) -> Result<()> {
        Ok(())
    }
}

struct Greeter;

#[async_trait]
impl Extension for Greeter {
    fn name(&self) -> &str {
        "greeter"
    }

    async fn setup(&mut self, builder: &mut ExtensionBuilder) -> std::result::Result<(), BoxError> {
        let mut arguments = Arguments::new();
        let name = arguments.single("name", "Who to greet", StringConverter::new());
        let times = arguments.defaulting("times", "How many greetings", IntConverter::new(), 1);

        builder
            .chat_check(|ctx: &mut CheckContext<'_>| ctx.is_not_bot())
            .chat_command(
                ChatCommand::new("greet")
                    .alias("hi")
                    .description("Greets someone")
                    .arguments(arguments)
                    .action(move |ctx| async move {
                        let greeting = format!("Hello, {}!", ctx.arg(name)?);
                        let count = *ctx.arg(times)?;
                        let reply = (0..count).map(|_| greeting.as_str()).collect::<Vec<_>>().join(" ");

                        ctx.respond(reply).await?;
                        Ok(())
                    }),
            )
            .chat_command(
                ChatCommand::new("fail").action(|_| async { Err(DiscordRelayedError::new("Nope").into()) }),
            );

        Ok(())
    }
}

async fn bot() -> ExtensibleBot {
    init_test_logging();

    let mut config = Config::default();
    config.bot.token = "test_token".to_string();

    let bot = ExtensibleBot::from_config(config).unwrap();
    bot.load_extension(Greeter).await.unwrap();
    bot.load_extension(HelpExtension::new()).await.unwrap();
    bot
}

fn user_event() -> EventContext {
    EventContext::new(UserId::new(TEST_USER_ID), ChannelId::new(TEST_CHANNEL_ID))
}

async fn run(bot: &ExtensibleBot, content: &str, event: EventContext) -> Option<(CommandOutcome, Vec<String>)> {
    let framework = bot.framework();
    let (command, parser) = framework
        .chat_commands()
        .find(content, "!", UserId::new(BOT_USER_ID), true)?;

    let recorder = Recorder::default();
    let call = CommandCall::new(
        event,
        framework.localizer(None),
        Arc::new(recorder.clone()),
        Arc::clone(framework),
    );

    let outcome = command.call(call, parser, "!").await;
    Some((outcome, recorder.replies()))
}

#[tokio::test]
async fn test_command_runs_with_arguments() {
    let bot = bot().await;

    let (outcome, replies) = run(&bot, "!greet Ada", user_event()).await.unwrap();
    assert_eq!(outcome, CommandOutcome::Succeeded);
    assert_eq!(replies, vec!["Hello, Ada!".to_string()]);

    let (outcome, replies) = run(&bot, "!HI Ada 2", user_event()).await.unwrap();
    assert_eq!(outcome, CommandOutcome::Succeeded);
    assert_eq!(replies, vec!["Hello, Ada! Hello, Ada!".to_string()]);
}

#[tokio::test]
async fn test_mention_invokes_command() {
    let bot = bot().await;
    let content = format!("<@{BOT_USER_ID}> greet Bo");

    let (outcome, replies) = run(&bot, &content, user_event()).await.unwrap();

    assert_eq!(outcome, CommandOutcome::Succeeded);
    assert_eq!(replies, vec!["Hello, Bo!".to_string()]);
}

#[tokio::test]
async fn test_missing_argument_shows_signature() {
    let bot = bot().await;

    let (outcome, replies) = run(&bot, "!greet", user_event()).await.unwrap();

    assert_eq!(outcome, CommandOutcome::FailedParsing);
    assert_eq!(replies.len(), 1);
    assert!(replies[0].contains("**Signature:** `!greet "));
}

#[tokio::test]
async fn test_relayed_error_reaches_user() {
    let bot = bot().await;

    let (outcome, replies) = run(&bot, "!fail", user_event()).await.unwrap();

    assert_eq!(outcome, CommandOutcome::Errored);
    assert_eq!(replies, vec!["Nope".to_string()]);
}

#[tokio::test]
async fn test_extension_check_applies() {
    let bot = bot().await;
    let mut event = user_event();
    event.author_is_bot = true;

    let (outcome, replies) = run(&bot, "!greet Ada", event).await.unwrap();

    assert_eq!(outcome, CommandOutcome::FailedChecks);
    assert_eq!(replies, vec!["**Error:** Must not be a bot".to_string()]);

    let (outcome, _) = run(&bot, "!help", user_event()).await.unwrap();
    assert_eq!(outcome, CommandOutcome::Succeeded);
}

#[tokio::test]
async fn test_events_follow_invocation() {
    let bot = bot().await;
    let mut events = bot.framework().events().subscribe();

    run(&bot, "!greet Ada", user_event()).await.unwrap();

    match events.try_recv().unwrap() {
        CommandEvent::Invoked(invocation) => {
            assert_eq!(invocation.command, "greet");
            assert_eq!(invocation.user, UserId::new(TEST_USER_ID));
        }
        other => panic!("unexpected event {other:?}"),
    }

    assert!(matches!(events.try_recv().unwrap(), CommandEvent::Succeeded(_)));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_help_describes_extension_commands() {
    let bot = bot().await;

    let (outcome, replies) = run(&bot, "!help greet", user_event()).await.unwrap();

    assert_eq!(outcome, CommandOutcome::Succeeded);
    assert_eq!(replies.len(), 1);
    assert!(replies[0].starts_with("Greets someone"));
    assert!(replies[0].contains("`name`: Who to greet"));
    assert!(replies[0].contains("**Aliases:** `hi`"));
}

#[tokio::test]
async fn test_unloading_removes_commands() {
    let bot = bot().await;
    assert_eq!(bot.extension_state("greeter").await, Some(ExtensionState::Loaded));

    bot.unload_extension("greeter").await.unwrap();
    tokio_test::assert_err!(bot.unload_extension("greeter").await);

    assert!(run(&bot, "!greet Ada", user_event()).await.is_none());
    assert!(run(&bot, "!help", user_event()).await.is_some());

    tokio_test::assert_ok!(bot.load_extension(Greeter).await);
    assert!(run(&bot, "!greet Ada", user_event()).await.is_some());
}

#[test]
fn test_localizer_falls_back_to_default_locale() {
    let mut config = Config::default();
    config.bot.token = "test_token".to_string();
    let bot = ExtensibleBot::from_config(config).unwrap();

    let german = bot.framework().localizer(Some("de"));
    assert_eq!(german.translate("checks-any-guild-failed"), "Muss auf einem Server sein");
    assert_eq!(german.translate("checks-is-bot-failed"), "Must be a bot");

    let unknown = bot.framework().localizer(Some("not a locale"));
    assert_eq!(unknown.translate("checks-any-guild-failed"), "Must be in a server");
}
