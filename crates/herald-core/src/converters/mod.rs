//! Typed argument converters.
//!
//! A converter turns raw user input into a value. Single converters take one
//! token (or one slash option value); coalescing converters look at several
//! tokens and report how many they used.
//!
//! Converters are synchronous and pure. They never talk to Discord, so a
//! [`UserConverter`] yields a [`UserId`](serenity::all::UserId) and leaves
//! fetching the user to the command body.

use crate::i18n::Localizer;
use serenity::all::{CommandDataOptionValue, CommandOptionType, CreateCommandOption};
use std::fmt;
use thiserror::Error;

mod boolean;
mod choice;
mod color;
mod duration;
mod mention;
mod number;
mod string;
mod text;
mod timestamp;

pub use boolean::BooleanConverter;
pub use choice::ChoiceConverter;
pub use color::ColorConverter;
pub use duration::{parse_duration, DurationCoalescingConverter, DurationConverter, DurationError};
pub use mention::{ChannelConverter, RoleConverter, SnowflakeConverter, UserConverter};
pub use number::{DecimalConverter, IntConverter};
pub use string::{StringCoalescingConverter, StringConverter};
pub use text::{EmailConverter, RegexConverter, UrlConverter};
pub use timestamp::{DiscordTimestamp, TimestampConverter};

/// Why a converter rejected its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConverterError {
    /// A translated message meant for the user.
    #[error("{0}")]
    Relayed(String),

    /// Anything else. Only surfaced when the argument had to be filled.
    #[error("{0}")]
    Internal(String),
}

impl ConverterError {
    /// Whether this error carries a message for the user.
    pub const fn is_relayed(&self) -> bool {
        matches!(self, Self::Relayed(_))
    }

    /// The error message.
    pub fn message(&self) -> &str {
        match self {
            Self::Relayed(message) | Self::Internal(message) => message,
        }
    }
}

/// Result of a single conversion: `Ok(None)` means the input wasn't for us.
pub type ConverterResult<T> = Result<Option<T>, ConverterError>;

/// A slash command option value, detached from the interaction it came in.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// Text.
    String(String),
    /// Whole number.
    Integer(i64),
    /// Decimal number.
    Number(f64),
    /// True or false.
    Boolean(bool),
    /// A user id.
    User(u64),
    /// A role id.
    Role(u64),
    /// A channel id.
    Channel(u64),
    /// A user or role id.
    Mentionable(u64),
    /// An attachment id.
    Attachment(u64),
}

impl OptionValue {
    /// Converts a leaf option value. Subcommands and autocomplete values
    /// have no counterpart.
    pub fn from_serenity(value: &CommandDataOptionValue) -> Option<Self> {
        let converted = match value {
            CommandDataOptionValue::String(s) => Self::String(s.trim().to_string()),
            CommandDataOptionValue::Integer(i) => Self::Integer(*i),
            CommandDataOptionValue::Number(n) => Self::Number(*n),
            CommandDataOptionValue::Boolean(b) => Self::Boolean(*b),
            CommandDataOptionValue::User(id) => Self::User(id.get()),
            CommandDataOptionValue::Role(id) => Self::Role(id.get()),
            CommandDataOptionValue::Channel(id) => Self::Channel(id.get()),
            CommandDataOptionValue::Mentionable(id) => Self::Mentionable(id.get()),
            CommandDataOptionValue::Attachment(id) => Self::Attachment(id.get()),
            _ => return None,
        };

        Some(converted)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::User(id) | Self::Role(id) | Self::Channel(id) | Self::Mentionable(id) | Self::Attachment(id) => {
                write!(f, "{id}")
            }
        }
    }
}

/// Converts one token into a value.
pub trait SingleConverter: Send + Sync + 'static {
    /// The converted value.
    type Output: Clone + Send + Sync + fmt::Debug + 'static;

    /// Translation key naming the accepted type in signatures.
    fn signature_type(&self) -> &'static str;

    /// Translation key naming the accepted type in "invalid value" errors.
    fn error_type(&self) -> &'static str {
        self.signature_type()
    }

    /// Whether signatures show the type after the argument name.
    fn show_type_in_signature(&self) -> bool {
        true
    }

    /// Converts a chat token.
    fn parse(&self, input: &str, ctx: &Localizer) -> ConverterResult<Self::Output>;

    /// Converts a slash option value. Defaults to parsing its text form.
    fn parse_option(&self, value: &OptionValue, ctx: &Localizer) -> ConverterResult<Self::Output> {
        self.parse(&value.to_string(), ctx)
    }

    /// The Discord option type used for slash commands.
    fn option_type(&self) -> CommandOptionType {
        CommandOptionType::String
    }

    /// Adds limits or choices to the slash option definition.
    fn customise_option(&self, option: CreateCommandOption) -> CreateCommandOption {
        option
    }
}

/// Converts a run of tokens into one value.
pub trait CoalescingConverter: Send + Sync + 'static {
    /// The converted value.
    type Output: Clone + Send + Sync + fmt::Debug + 'static;

    /// Translation key naming the accepted type in signatures.
    fn signature_type(&self) -> &'static str;

    /// Translation key naming the accepted type in "invalid value" errors.
    fn error_type(&self) -> &'static str {
        self.signature_type()
    }

    /// Whether signatures show the type after the argument name.
    fn show_type_in_signature(&self) -> bool {
        true
    }

    /// Whether a positional token may be offered to [`parse`](Self::parse).
    /// Token collection stops at the first token this rejects.
    fn accepts_token(&self, _token: &str, _ctx: &Localizer) -> bool {
        true
    }

    /// Converts a prefix of `tokens`, returning how many tokens were used.
    fn parse(&self, tokens: &[String], ctx: &Localizer) -> ConverterResult<(usize, Self::Output)>;

    /// Converts a slash option value by splitting it on whitespace.
    fn parse_option(&self, value: &OptionValue, ctx: &Localizer) -> ConverterResult<Self::Output> {
        let tokens: Vec<String> = value.to_string().split_whitespace().map(ToString::to_string).collect();
        Ok(self.parse(&tokens, ctx)?.map(|(_, output)| output))
    }

    /// The Discord option type used for slash commands.
    fn option_type(&self) -> CommandOptionType {
        CommandOptionType::String
    }

    /// Adds limits or choices to the slash option definition.
    fn customise_option(&self, option: CreateCommandOption) -> CreateCommandOption {
        option
    }
}

pub(crate) fn relayed_with(ctx: &Localizer, key: &str, args: &herald_i18n::FluentArgs<'_>) -> ConverterError {
    ConverterError::Relayed(ctx.translate_with(key, args))
}
