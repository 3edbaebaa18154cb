//! State shared by the bot, its registries and every command invocation.

use crate::checks::{Check, CheckFn};
use crate::components::ComponentRouter;
use crate::event::PrivilegedUsers;
use crate::events::EventBus;
use crate::i18n::Localizer;
use crate::listeners::{EventListener, GatewayEvent, GatewayHandler};
use crate::registry::{ApplicationCommandRegistry, ChatCommandRegistry};
use futures::future::BoxFuture;
use herald_common::Result;
use herald_config::{Config, ConfigCache};
use herald_i18n::{parse_locale, Translations};
use parking_lot::RwLock;
use serenity::all::{Context, GuildId, Http, Message};
use serenity::model::event::Event;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Picks the prefix for a message. Receives the configured default prefix.
pub type PrefixCallback = Arc<dyn Fn(&Message, &str) -> BoxFuture<'static, String> + Send + Sync>;

/// Sees every message the bot receives, before command handling.
pub type MessageListener = Arc<dyn Fn(Context, Message) -> BoxFuture<'static, ()> + Send + Sync>;

struct Listener<L> {
    extension: Option<String>,
    listener: L,
}

/// Everything commands share: configuration, translations, registries,
/// global checks, listeners and the event bus.
pub struct Framework {
    config: Arc<ConfigCache>,
    translations: Arc<Translations>,
    chat_commands: ChatCommandRegistry,
    application_commands: ApplicationCommandRegistry,
    components: Arc<ComponentRouter>,
    events: EventBus,
    chat_checks: RwLock<Vec<CheckFn>>,
    slash_checks: RwLock<Vec<CheckFn>>,
    message_listeners: RwLock<Vec<Listener<MessageListener>>>,
    gateway_listeners: RwLock<Vec<Listener<GatewayHandler>>>,
    prefix: RwLock<Option<PrefixCallback>>,
    http: RwLock<Option<Arc<Http>>>,
}

impl Framework {
    /// A framework with no commands.
    pub fn new(config: Arc<ConfigCache>, translations: Arc<Translations>) -> Self {
        let components = Arc::new(ComponentRouter::new());

        Self {
            config,
            translations,
            chat_commands: ChatCommandRegistry::new(),
            application_commands: ApplicationCommandRegistry::new(Arc::clone(&components)),
            components,
            events: EventBus::default(),
            chat_checks: RwLock::new(Vec::new()),
            slash_checks: RwLock::new(Vec::new()),
            message_listeners: RwLock::new(Vec::new()),
            gateway_listeners: RwLock::new(Vec::new()),
            prefix: RwLock::new(None),
            http: RwLock::new(None),
        }
    }

    /// The current configuration.
    pub fn config(&self) -> Arc<Config> {
        self.config.get()
    }

    /// The configuration cache, for reloading.
    pub const fn config_cache(&self) -> &Arc<ConfigCache> {
        &self.config
    }

    /// Every loaded translation.
    pub const fn translations(&self) -> &Arc<Translations> {
        &self.translations
    }

    /// Translations bound to `locale`, or to the default locale when it's
    /// missing or unparseable.
    pub fn localizer(&self, locale: Option<&str>) -> Localizer {
        let parsed = locale.and_then(|locale| match parse_locale(locale) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!(locale, error = %e, "Falling back to the default locale");
                None
            }
        });

        match parsed {
            Some(locale) => Localizer::new(Arc::clone(&self.translations), locale),
            None => Localizer::default_for(Arc::clone(&self.translations)),
        }
    }

    /// Bot owners and administrators, as currently configured.
    pub fn privileged(&self) -> Arc<PrivilegedUsers> {
        let config = self.config();
        Arc::new(PrivilegedUsers::from_ids(&config.bot.owners, &config.bot.admins))
    }

    /// Registered chat commands.
    pub const fn chat_commands(&self) -> &ChatCommandRegistry {
        &self.chat_commands
    }

    /// Registered slash commands.
    pub const fn application_commands(&self) -> &ApplicationCommandRegistry {
        &self.application_commands
    }

    /// Component listeners, such as live paginators.
    pub const fn components(&self) -> &Arc<ComponentRouter> {
        &self.components
    }

    /// Command lifecycle events.
    pub const fn events(&self) -> &EventBus {
        &self.events
    }

    /// Adds a check run before every chat command.
    pub fn add_chat_check(&self, check: impl Check + 'static) {
        self.chat_checks.write().push(Arc::new(check));
    }

    /// Adds a check run before every slash command.
    pub fn add_slash_check(&self, check: impl Check + 'static) {
        self.slash_checks.write().push(Arc::new(check));
    }

    pub(crate) fn chat_checks(&self) -> Vec<CheckFn> {
        self.chat_checks.read().clone()
    }

    pub(crate) fn slash_checks(&self) -> Vec<CheckFn> {
        self.slash_checks.read().clone()
    }

    /// Replaces the prefix lookup. Without one, every message uses the
    /// configured default prefix.
    pub fn set_prefix_callback<F>(&self, callback: F)
    where
        F: Fn(&Message, &str) -> BoxFuture<'static, String> + Send + Sync + 'static,
    {
        *self.prefix.write() = Some(Arc::new(callback));
    }

    /// The prefix chat commands need in `message`.
    pub async fn prefix_for(&self, message: &Message) -> String {
        let default = self.config().chat_commands.default_prefix.clone();
        let callback = self.prefix.read().clone();

        match callback {
            Some(callback) => callback(message, &default).await,
            None => default,
        }
    }

    /// Keeps the HTTP client of the current gateway session.
    pub fn set_http(&self, http: Arc<Http>) {
        *self.http.write() = Some(http);
    }

    /// Whether a gateway session has handed over its HTTP client.
    pub fn is_connected(&self) -> bool {
        self.http.read().is_some()
    }

    /// Pushes the current application commands to Discord.
    ///
    /// Returns `Ok(false)` without contacting Discord while disconnected, or
    /// when application commands are disabled or their registration is
    /// turned off.
    pub async fn sync_application_commands(&self) -> Result<bool> {
        let Some(http) = self.http.read().clone() else {
            trace!("Not connected, skipping application command sync");
            return Ok(false);
        };

        let config = self.config();
        let settings = &config.application_commands;

        if !settings.enabled || !settings.register {
            return Ok(false);
        }

        self.application_commands
            .register(&http, &self.localizer(None), settings.default_guild.map(GuildId::new))
            .await?;

        Ok(true)
    }

    /// Adds a listener seeing every message, owned by `extension` if given.
    pub fn add_message_listener(&self, extension: Option<&str>, listener: MessageListener) {
        self.message_listeners.write().push(Listener {
            extension: extension.map(ToString::to_string),
            listener,
        });
    }

    /// Number of message listeners.
    pub fn message_listener_count(&self) -> usize {
        self.message_listeners.read().len()
    }

    /// Hands `message` to every listener, in registration order.
    pub async fn dispatch_message(&self, ctx: &Context, message: &Message) {
        let listeners: Vec<MessageListener> = self
            .message_listeners
            .read()
            .iter()
            .map(|entry| Arc::clone(&entry.listener))
            .collect();

        trace!(count = listeners.len(), message = %message.id, "Dispatching message to listeners");

        for listener in listeners {
            listener(ctx.clone(), message.clone()).await;
        }
    }

    /// Adds a typed gateway event listener, owned by `extension` if given.
    pub fn add_event_listener<E: GatewayEvent>(&self, extension: Option<&str>, listener: EventListener<E>) -> Result<()> {
        let handler = listener.into_handler()?;
        self.add_gateway_handler(extension, handler);

        debug!(event = E::NAME, extension, "Registered event listener");
        Ok(())
    }

    pub(crate) fn add_gateway_handler(&self, extension: Option<&str>, handler: GatewayHandler) {
        self.gateway_listeners.write().push(Listener {
            extension: extension.map(ToString::to_string),
            listener: handler,
        });
    }

    /// Number of typed gateway event listeners.
    pub fn gateway_listener_count(&self) -> usize {
        self.gateway_listeners.read().len()
    }

    /// Hands a gateway event to every typed listener that wants it, in
    /// registration order.
    pub async fn dispatch_gateway(self: &Arc<Self>, ctx: Option<Context>, event: &Event) {
        let handlers: Vec<GatewayHandler> = self
            .gateway_listeners
            .read()
            .iter()
            .map(|entry| Arc::clone(&entry.listener))
            .collect();

        let pending: Vec<_> = handlers
            .iter()
            .filter_map(|handler| handler(self, ctx.clone(), event))
            .collect();

        if pending.is_empty() {
            return;
        }

        trace!(count = pending.len(), "Dispatching gateway event to listeners");

        for work in pending {
            work.await;
        }
    }

    /// Drops every command and listener `extension` registered.
    pub fn remove_extension(&self, extension: &str) {
        let chat = self.chat_commands.remove_extension(extension);
        let application = self.application_commands.remove_extension(extension);
        let listeners = remove_owned(&self.message_listeners, extension);
        let event_listeners = remove_owned(&self.gateway_listeners, extension);

        debug!(extension, chat, application, listeners, event_listeners, "Removed extension contributions");
    }
}

fn remove_owned<L>(listeners: &RwLock<Vec<Listener<L>>>, extension: &str) -> usize {
    let mut listeners = listeners.write();
    let before = listeners.len();
    listeners.retain(|entry| entry.extension.as_deref() != Some(extension));
    before - listeners.len()
}

impl fmt::Debug for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Framework")
            .field("chat_commands", &self.chat_commands.len())
            .field("application_commands", &self.application_commands.len())
            .field("components", &self.components.len())
            .field("message_listeners", &self.message_listener_count())
            .field("gateway_listeners", &self.gateway_listener_count())
            .finish_non_exhaustive()
    }
}
