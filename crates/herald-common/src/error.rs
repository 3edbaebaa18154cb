//! Error types shared across the framework.

use thiserror::Error;

/// Boxed error type used for command actions and other user-supplied code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for framework operations.
pub type Result<T> = std::result::Result<T, FrameworkError>;

/// An error whose message is meant to be shown to the Discord user as-is.
///
/// Converters, checks and command actions return this when something went
/// wrong in a way the invoking user should be told about.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct DiscordRelayedError {
    /// Message to relay.
    pub reason: String,
}

impl DiscordRelayedError {
    /// Create a relayed error with the given user-facing reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Raised when a command's arguments could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct ArgumentParsingError {
    /// Translated, user-facing reason.
    pub reason: String,
    /// Name of the argument that failed, if a single one is to blame.
    pub argument: Option<String>,
}

impl ArgumentParsingError {
    /// Create a parsing error not tied to any single argument.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            argument: None,
        }
    }

    /// Create a parsing error blaming the named argument.
    pub fn for_argument(reason: impl Into<String>, argument: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            argument: Some(argument.into()),
        }
    }
}

/// Main error type for framework operations.
#[derive(Error, Debug)]
pub enum FrameworkError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem.
        message: String,
        /// Underlying cause.
        #[source]
        source: Option<BoxError>,
    },

    /// A command definition is invalid
    #[error("Invalid command {name}: {reason}")]
    InvalidCommand {
        /// Command name, or `<unnamed>` when none was set.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A command could not be registered
    #[error("Failed to register command {name}: {reason}")]
    CommandRegistration {
        /// Command name.
        name: String,
        /// Why registration failed.
        reason: String,
    },

    /// An extension is invalid or could not be loaded
    #[error("Invalid extension {name}: {reason}")]
    InvalidExtension {
        /// Extension name.
        name: String,
        /// What went wrong.
        reason: String,
    },

    /// An argument definition is invalid
    #[error("Invalid argument {name}: {reason}")]
    InvalidArgument {
        /// Argument name.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Error meant for the invoking Discord user
    #[error(transparent)]
    Relayed(#[from] DiscordRelayedError),

    /// Argument parsing failed
    #[error(transparent)]
    ArgumentParsing(#[from] ArgumentParsingError),

    /// Discord API related errors
    #[error("Discord API error: {message}")]
    Discord {
        /// Description of the failed operation.
        message: String,
        /// Underlying client error.
        #[source]
        source: Option<BoxError>,
    },

    /// Internationalization errors
    #[error("Localization error: {message}")]
    Localization {
        /// Description of the problem.
        message: String,
        /// Locale involved, if any.
        locale: Option<String>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl FrameworkError {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new Discord API error
    pub fn discord(msg: impl Into<String>) -> Self {
        Self::Discord {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new Discord API error with source
    pub fn discord_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Discord {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid command error
    pub fn invalid_command(name: Option<&str>, reason: impl Into<String>) -> Self {
        Self::InvalidCommand {
            name: name.unwrap_or("<unnamed>").to_string(),
            reason: reason.into(),
        }
    }

    /// Create a command registration error
    pub fn registration(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CommandRegistration {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid extension error
    pub fn invalid_extension(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidExtension {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a new localization error
    pub fn localization(msg: impl Into<String>, locale: Option<&str>) -> Self {
        Self::Localization {
            message: msg.into(),
            locale: locale.map(ToString::to_string),
        }
    }

    /// Create an error that is relayed to the Discord user
    pub fn relayed(reason: impl Into<String>) -> Self {
        Self::Relayed(DiscordRelayedError::new(reason))
    }

    /// The user-facing message, if this error is meant to reach the user.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Relayed(e) => Some(&e.reason),
            Self::ArgumentParsing(e) => Some(&e.reason),
            _ => None,
        }
    }
}
