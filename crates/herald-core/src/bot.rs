//! The bot runtime: loads extensions and feeds Discord events to the
//! framework.

use crate::extensions::{Extension, LoadedExtension};
use crate::framework::Framework;
use async_trait::async_trait;
use herald_common::{ExtensionState, FrameworkError, Result};
use herald_config::{Config, ConfigCache, I18nConfig};
use herald_i18n::{parse_locale, Translations};
use serenity::all::{Client, Context, EventHandler, GatewayIntents, Interaction, Message, RawEventHandler, Ready};
use serenity::model::event::Event;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Gateway intents the bot connects with. Member events need the
/// privileged `GUILD_MEMBERS` intent, which is left to the bot's owner.
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::DIRECT_MESSAGE_REACTIONS
        | GatewayIntents::GUILD_MESSAGE_TYPING
        | GatewayIntents::DIRECT_MESSAGE_TYPING
}

/// Builtin translations in the configured default locale, plus any found in
/// the configured translations directory.
pub fn load_translations(config: &I18nConfig) -> Result<Translations> {
    let locale = parse_locale(&config.default_locale)?;
    let mut translations = Translations::with_builtin(locale)?;

    if let Some(directory) = &config.translations_directory {
        translations.load_directory(directory)?;
        info!(directory = %directory.display(), "Loaded custom translations");
    }

    Ok(translations)
}

/// A Discord bot made of extensions.
pub struct ExtensibleBot {
    framework: Arc<Framework>,
    extensions: Mutex<Vec<LoadedExtension>>,
}

impl ExtensibleBot {
    /// A bot with no extensions loaded.
    pub fn new(config: Arc<ConfigCache>, translations: Arc<Translations>) -> Self {
        Self {
            framework: Arc::new(Framework::new(config, translations)),
            extensions: Mutex::new(Vec::new()),
        }
    }

    /// Validates `config` and loads the translations it points at.
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let translations = load_translations(&config.i18n)?;

        Ok(Self::new(Arc::new(ConfigCache::new(config)), Arc::new(translations)))
    }

    /// Shared framework state.
    pub const fn framework(&self) -> &Arc<Framework> {
        &self.framework
    }

    /// Sets `extension` up and keeps it loaded.
    ///
    /// Fails when another extension already uses the name, or when setup
    /// fails. A failed extension is not kept.
    pub async fn load_extension(&self, extension: impl Extension + 'static) -> Result<()> {
        let mut extensions = self.extensions.lock().await;
        let name = extension.name().to_string();

        if extensions.iter().any(|loaded| loaded.name() == name) {
            return Err(FrameworkError::invalid_extension(name, "An extension with this name is already loaded"));
        }

        let mut loaded = LoadedExtension::new(Box::new(extension));
        loaded.do_setup(&self.framework).await?;
        extensions.push(loaded);
        drop(extensions);

        self.sync_application_commands().await;
        Ok(())
    }

    /// Unloads the extension called `name` and forgets it.
    ///
    /// Its commands are removed even when its unload hook fails; that
    /// failure is still returned.
    pub async fn unload_extension(&self, name: &str) -> Result<()> {
        let mut extensions = self.extensions.lock().await;

        let index = extensions
            .iter()
            .position(|loaded| loaded.name() == name)
            .ok_or_else(|| FrameworkError::invalid_extension(name, "No extension with this name is loaded"))?;

        let mut loaded = extensions.remove(index);
        drop(extensions);

        let unloaded = loaded.do_unload(&self.framework).await;
        self.sync_application_commands().await;
        unloaded
    }

    /// Unloads and sets up the extension called `name` again.
    ///
    /// When unloading fails the extension stays in the
    /// [`ExtensionState::FailedUnloading`] state and setup is not attempted.
    /// When setup fails the extension is dropped, so it can be loaded again
    /// under the same name.
    pub async fn reload_extension(&self, name: &str) -> Result<()> {
        let mut extensions = self.extensions.lock().await;

        let index = extensions
            .iter()
            .position(|loaded| loaded.name() == name)
            .ok_or_else(|| FrameworkError::invalid_extension(name, "No extension with this name is loaded"))?;

        let unloaded = extensions[index].do_unload(&self.framework).await;
        if unloaded.is_err() {
            drop(extensions);
            self.sync_application_commands().await;
            return unloaded;
        }

        let set_up = extensions[index].do_setup(&self.framework).await;
        if set_up.is_err() {
            extensions.remove(index);
            warn!(extension = name, "Dropped extension after its setup failed during reload");
        }
        drop(extensions);

        self.sync_application_commands().await;
        set_up
    }

    async fn sync_application_commands(&self) {
        match self.framework.sync_application_commands().await {
            Ok(true) => debug!("Synced application commands"),
            Ok(false) => {}
            Err(e) => error!(error = %e, "Failed to sync application commands"),
        }
    }

    /// Where the extension called `name` is in its lifecycle.
    pub async fn extension_state(&self, name: &str) -> Option<ExtensionState> {
        self.extensions
            .lock()
            .await
            .iter()
            .find(|loaded| loaded.name() == name)
            .map(LoadedExtension::state)
    }

    /// Names of the loaded extensions, in load order.
    pub async fn extension_names(&self) -> Vec<String> {
        self.extensions
            .lock()
            .await
            .iter()
            .map(|loaded| loaded.name().to_string())
            .collect()
    }

    /// Connects to Discord and handles events until the connection closes
    /// or the process receives Ctrl+C.
    pub async fn start(&self) -> Result<()> {
        let config = self.framework.config();

        let handler = Handler {
            framework: Arc::clone(&self.framework),
        };
        let raw_handler = RawHandler {
            framework: Arc::clone(&self.framework),
        };

        let mut client = Client::builder(&config.bot.token, intents())
            .event_handler(handler)
            .raw_event_handler(raw_handler)
            .await
            .map_err(|e| FrameworkError::discord_with_source("Failed to build the Discord client", e))?;

        let shard_manager = Arc::clone(&client.shard_manager);

        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl+C");
                return;
            }

            info!("Shutting down");
            shard_manager.shutdown_all().await;
        });

        info!("Connecting to Discord");

        client
            .start()
            .await
            .map_err(|e| FrameworkError::discord_with_source("Discord connection failed", e))
    }
}

impl std::fmt::Debug for ExtensibleBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtensibleBot")
            .field("framework", &self.framework)
            .finish_non_exhaustive()
    }
}

struct Handler {
    framework: Arc<Framework>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, message: Message) {
        self.framework.dispatch_message(&ctx, &message).await;
        self.framework
            .chat_commands()
            .handle_message(&self.framework, &ctx, &message)
            .await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command) => {
                self.framework
                    .application_commands()
                    .handle_command(&self.framework, &ctx, &command)
                    .await;
            }
            Interaction::Component(component) => {
                self.framework
                    .application_commands()
                    .handle_component(&ctx, &component)
                    .await;
            }
            other => debug!(kind = ?other.kind(), "Ignoring interaction"),
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "Connected to Discord");
        self.framework.set_http(Arc::clone(&ctx.http));

        let config = self.framework.config();
        let settings = &config.application_commands;

        if !settings.enabled {
            debug!("Application commands are disabled");
            return;
        }

        if !settings.register {
            warn!("Application command registration is turned off, Discord may show stale commands");
            return;
        }

        if let Err(e) = self.framework.sync_application_commands().await {
            error!(error = %e, "Failed to register application commands");
        }
    }
}

/// Feeds typed event listeners.
struct RawHandler {
    framework: Arc<Framework>,
}

#[async_trait]
impl RawEventHandler for RawHandler {
    async fn raw_event(&self, ctx: Context, event: Event) {
        self.framework.dispatch_gateway(Some(ctx), &event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::ChatCommand;
    use crate::extensions::test_extensions::Sample;
    use crate::extensions::ExtensionBuilder;
    use crate::test_support::framework;
    use herald_common::BoxError;
    use herald_i18n::DEFAULT_LOCALE;

    fn bot() -> ExtensibleBot {
        let framework = framework(Config::default());

        ExtensibleBot {
            framework,
            extensions: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn test_load_and_unload() {
        let bot = bot();
        bot.load_extension(Sample::new("tools")).await.unwrap();

        assert_eq!(bot.extension_state("tools").await, Some(ExtensionState::Loaded));
        assert_eq!(bot.extension_names().await, vec!["tools".to_string()]);
        assert!(bot.framework().chat_commands().get_command("tools-chat").is_some());

        bot.unload_extension("tools").await.unwrap();

        assert_eq!(bot.extension_state("tools").await, None);
        assert!(bot.framework().chat_commands().is_empty());
        assert!(bot.unload_extension("tools").await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_names_rejected() {
        let bot = bot();
        bot.load_extension(Sample::new("tools")).await.unwrap();

        let error = bot.load_extension(Sample::new("tools")).await.unwrap_err();

        assert!(matches!(error, FrameworkError::InvalidExtension { .. }));
        assert_eq!(bot.framework().chat_commands().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_setup_not_kept() {
        let bot = bot();
        let broken = Sample {
            fail_setup: true,
            ..Sample::new("broken")
        };

        assert!(bot.load_extension(broken).await.is_err());
        assert_eq!(bot.extension_state("broken").await, None);
    }

    #[tokio::test]
    async fn test_reload() {
        let bot = bot();
        bot.load_extension(Sample::new("tools")).await.unwrap();

        bot.reload_extension("tools").await.unwrap();

        assert_eq!(bot.extension_state("tools").await, Some(ExtensionState::Loaded));
        assert_eq!(bot.framework().chat_commands().len(), 1);
        assert_eq!(bot.framework().application_commands().len(), 1);
        assert_eq!(bot.framework().message_listener_count(), 1);
    }

    #[tokio::test]
    async fn test_reload_stops_when_unload_fails() {
        let bot = bot();
        let sticky = Sample {
            fail_unload: true,
            ..Sample::new("sticky")
        };

        bot.load_extension(sticky).await.unwrap();

        assert!(bot.reload_extension("sticky").await.is_err());
        assert_eq!(bot.extension_state("sticky").await, Some(ExtensionState::FailedUnloading));
        assert!(bot.framework().chat_commands().is_empty());
    }

    struct Flaky {
        setups: usize,
    }

    #[async_trait]
    impl Extension for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn setup(&mut self, builder: &mut ExtensionBuilder) -> std::result::Result<(), BoxError> {
            self.setups += 1;
            if self.setups > 1 {
                return Err("second setup broke".into());
            }

            builder.chat_command(ChatCommand::new("flaky").action(|_| async { Ok(()) }));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_failed_reload_drops_extension() {
        let bot = bot();
        bot.load_extension(Flaky { setups: 0 }).await.unwrap();

        assert!(bot.reload_extension("flaky").await.is_err());
        assert_eq!(bot.extension_state("flaky").await, None);
        assert!(bot.extension_names().await.is_empty());
        assert!(bot.framework().chat_commands().is_empty());

        bot.load_extension(Flaky { setups: 0 }).await.unwrap();
        assert_eq!(bot.extension_state("flaky").await, Some(ExtensionState::Loaded));
    }

    #[tokio::test]
    async fn test_changes_without_connection_skip_sync() {
        let bot = bot();
        bot.load_extension(Sample::new("tools")).await.unwrap();
        bot.reload_extension("tools").await.unwrap();
        bot.unload_extension("tools").await.unwrap();

        assert!(!bot.framework().is_connected());
    }

    #[test]
    fn test_load_translations() {
        let translations = load_translations(&I18nConfig::default()).unwrap();
        assert_eq!(translations.default_locale(), &*DEFAULT_LOCALE);

        let broken = I18nConfig {
            default_locale: "not a locale!".to_string(),
            ..I18nConfig::default()
        };
        assert!(load_translations(&broken).is_err());
    }

    #[test]
    fn test_from_config_validates() {
        let mut config = Config::default();
        config.bot.token = "token".to_string();
        assert!(ExtensibleBot::from_config(config.clone()).is_ok());

        config.chat_commands.default_prefix = String::new();
        config.chat_commands.invoke_on_mention = false;
        assert!(ExtensibleBot::from_config(config).is_err());
    }

    #[test]
    fn test_intents_include_message_content() {
        assert!(intents().contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(intents().contains(GatewayIntents::GUILD_MESSAGE_REACTIONS));
        assert!(!intents().contains(GatewayIntents::GUILD_MEMBERS));
    }
}
