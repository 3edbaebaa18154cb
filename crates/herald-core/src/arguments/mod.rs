//! Argument declarations.
//!
//! An [`Arguments`] set is an ordered list of named arguments. Declaring an
//! argument hands back a typed [`Arg`] handle, which the command body uses
//! to read the parsed value from [`ParsedArguments`]:
//!
//! ```
//! use herald_core::arguments::Arguments;
//! use herald_core::converters::{IntConverter, StringCoalescingConverter};
//!
//! let mut args = Arguments::new();
//! let times = args.defaulting("times", "How often to repeat", IntConverter::new().min(1), 1);
//! let text = args.coalescing("text", "What to say", StringCoalescingConverter::new());
//!
//! assert_eq!(args.len(), 2);
//! # let _ = (times, text);
//! ```

use crate::converters::{CoalescingConverter, SingleConverter};
use crate::i18n::Localizer;
use herald_common::{DiscordRelayedError, FrameworkError, Result};
use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

mod erased;
mod parsed;

pub use erased::ArgValue;
pub(crate) use erased::ErasedConverter;
pub use parsed::ParsedArguments;

static NEXT_SET_ID: AtomicU64 = AtomicU64::new(1);

/// How an argument consumes input and what it yields when nothing matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    /// Exactly one token, required.
    Single,
    /// One token, yields `None` when missing.
    Optional {
        /// Whether conversion errors are shown to the user.
        output_error: bool,
    },
    /// One token, yields a default when missing.
    Defaulting {
        /// Whether conversion errors are shown to the user.
        output_error: bool,
    },
    /// As many tokens as convert, yields a list.
    List {
        /// Whether at least one value is required.
        required: bool,
    },
    /// Several tokens combined into one value, required.
    Coalescing,
    /// Several tokens combined into one value, yields `None` when missing.
    OptionalCoalescing {
        /// Whether conversion errors are shown to the user.
        output_error: bool,
    },
    /// Several tokens combined into one value, yields a default when missing.
    DefaultingCoalescing {
        /// Whether conversion errors are shown to the user.
        output_error: bool,
    },
}

impl ArgumentKind {
    /// Whether the command can't run without this argument.
    pub const fn required(self) -> bool {
        match self {
            Self::Single | Self::Coalescing => true,
            Self::List { required } => required,
            _ => false,
        }
    }

    /// Whether conversion errors are shown even though the argument is optional.
    pub const fn output_error(self) -> bool {
        match self {
            Self::Optional { output_error }
            | Self::Defaulting { output_error }
            | Self::OptionalCoalescing { output_error }
            | Self::DefaultingCoalescing { output_error } => output_error,
            _ => false,
        }
    }

    /// Whether the argument takes exactly one token.
    pub const fn is_single_input(self) -> bool {
        matches!(self, Self::Single | Self::Optional { .. } | Self::Defaulting { .. })
    }

    /// Whether the argument yields a list.
    pub const fn is_list(self) -> bool {
        matches!(self, Self::List { .. })
    }

    /// Whether the argument falls back to a default value.
    pub const fn is_defaulting(self) -> bool {
        matches!(self, Self::Defaulting { .. } | Self::DefaultingCoalescing { .. })
    }

    const fn with_output_error(self, output_error: bool) -> Self {
        match self {
            Self::Optional { .. } => Self::Optional { output_error },
            Self::Defaulting { .. } => Self::Defaulting { output_error },
            Self::OptionalCoalescing { .. } => Self::OptionalCoalescing { output_error },
            Self::DefaultingCoalescing { .. } => Self::DefaultingCoalescing { output_error },
            other => other,
        }
    }
}

type Validator = Box<dyn Fn(&(dyn Any + Send + Sync), &Localizer) -> std::result::Result<(), DiscordRelayedError> + Send + Sync>;
type Finisher = Box<dyn Fn(Option<ArgValue>) -> Option<ArgValue> + Send + Sync>;

/// A declared argument.
pub struct Argument {
    name: String,
    description: String,
    kind: ArgumentKind,
    converter: Box<dyn ErasedConverter>,
    validator: Option<Validator>,
    finish: Finisher,
    default_display: Option<String>,
}

impl Argument {
    /// The argument's name, used for keyword arguments and slash options.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The argument's description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// How the argument consumes input.
    pub const fn kind(&self) -> ArgumentKind {
        self.kind
    }

    /// Whether the command can't run without this argument.
    pub const fn required(&self) -> bool {
        self.kind.required()
    }

    /// Translation key of the accepted type.
    pub fn signature_type(&self) -> &'static str {
        self.converter.signature_type()
    }

    /// Translation key of the type named in "invalid value" errors.
    pub fn error_type(&self) -> &'static str {
        self.converter.error_type()
    }

    /// Whether signatures show the accepted type.
    pub fn show_type_in_signature(&self) -> bool {
        self.converter.show_type_in_signature()
    }

    /// The default value as shown in signatures, for defaulting arguments.
    pub fn default_display(&self) -> Option<&str> {
        self.default_display.as_deref()
    }

    pub(crate) fn converter(&self) -> &dyn ErasedConverter {
        self.converter.as_ref()
    }

    pub(crate) fn validate_value(
        &self,
        value: &ArgValue,
        ctx: &Localizer,
    ) -> std::result::Result<(), DiscordRelayedError> {
        match &self.validator {
            Some(validator) => validator(&**value, ctx),
            None => Ok(()),
        }
    }

    pub(crate) fn finish(&self, value: Option<ArgValue>) -> Option<ArgValue> {
        (self.finish)(value)
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("signature_type", &self.signature_type())
            .finish_non_exhaustive()
    }
}

/// A typed handle to a declared argument.
///
/// `T` is the type read back from [`ParsedArguments::get`]: the converter's
/// output, wrapped in `Option` or `Vec` for optional and list arguments.
pub struct Arg<T> {
    set: u64,
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Arg<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Arg<T> {}

impl<T> fmt::Debug for Arg<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arg").field("set", &self.set).field("index", &self.index).finish()
    }
}

/// An argument being declared, before it is added to an [`Arguments`] set.
///
/// `T` is the type stored for the command; `V` is the converter's output,
/// which validators receive.
pub struct ArgumentSpec<T, V> {
    argument: Argument,
    _marker: PhantomData<fn() -> (T, V)>,
}

fn typed_validator<V: 'static>(
    list: bool,
    check: impl Fn(&V, &Localizer) -> std::result::Result<(), DiscordRelayedError> + Send + Sync + 'static,
) -> Validator {
    if list {
        Box::new(move |value, ctx| match value.downcast_ref::<Vec<V>>() {
            Some(values) => values.iter().try_for_each(|value| check(value, ctx)),
            None => Ok(()),
        })
    } else {
        Box::new(move |value, ctx| match value.downcast_ref::<V>() {
            Some(value) => check(value, ctx),
            None => Ok(()),
        })
    }
}

impl<T, V: Send + Sync + 'static> ArgumentSpec<T, V> {
    fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        kind: ArgumentKind,
        converter: Box<dyn ErasedConverter>,
        finish: Finisher,
        default_display: Option<String>,
    ) -> Self {
        Self {
            argument: Argument {
                name: name.into(),
                description: description.into(),
                kind,
                converter,
                validator: None,
                finish,
                default_display,
            },
            _marker: PhantomData,
        }
    }

    /// Shows conversion errors to the user even though the argument is
    /// optional. Has no effect on required and list arguments.
    #[must_use]
    pub fn output_error(mut self, output_error: bool) -> Self {
        self.argument.kind = self.argument.kind.with_output_error(output_error);
        self
    }

    /// Runs `check` on every successfully converted value. An error is
    /// relayed to the user and stops the command.
    #[must_use]
    pub fn validate(
        mut self,
        check: impl Fn(&V, &Localizer) -> std::result::Result<(), DiscordRelayedError> + Send + Sync + 'static,
    ) -> Self {
        self.argument.validator = Some(typed_validator(self.argument.kind.is_list(), check));
        self
    }

    /// The argument as declared so far.
    pub const fn argument(&self) -> &Argument {
        &self.argument
    }
}

fn identity() -> Finisher {
    Box::new(|value| value)
}

fn wrap_option<V: Send + Sync + 'static>() -> Finisher {
    Box::new(|value: Option<ArgValue>| {
        let value: Option<V> = value.and_then(|value| value.downcast::<V>().ok()).map(|value| *value);
        Some(Box::new(value) as ArgValue)
    })
}

fn or_default<V: Clone + Send + Sync + 'static>(default: V) -> Finisher {
    Box::new(move |value| Some(value.unwrap_or_else(|| Box::new(default.clone()))))
}

impl<V: Clone + Send + Sync + 'static> ArgumentSpec<V, V> {
    /// A required single-token argument.
    pub fn single<C: SingleConverter<Output = V>>(
        name: impl Into<String>,
        description: impl Into<String>,
        converter: C,
    ) -> Self {
        Self::new(
            name,
            description,
            ArgumentKind::Single,
            Box::new(erased::Single(converter)),
            identity(),
            None,
        )
    }

    /// A single-token argument that falls back to `default`.
    pub fn defaulting<C: SingleConverter<Output = V>>(
        name: impl Into<String>,
        description: impl Into<String>,
        converter: C,
        default: V,
    ) -> Self
    where
        V: fmt::Display,
    {
        let shown = default.to_string();

        Self::new(
            name,
            description,
            ArgumentKind::Defaulting { output_error: false },
            Box::new(erased::Single(converter)),
            or_default(default),
            Some(shown),
        )
    }

    /// A required argument built from several tokens.
    pub fn coalescing<C: CoalescingConverter<Output = V>>(
        name: impl Into<String>,
        description: impl Into<String>,
        converter: C,
    ) -> Self {
        Self::new(
            name,
            description,
            ArgumentKind::Coalescing,
            Box::new(erased::Coalescing(converter)),
            identity(),
            None,
        )
    }

    /// An argument built from several tokens that falls back to `default`.
    pub fn defaulting_coalescing<C: CoalescingConverter<Output = V>>(
        name: impl Into<String>,
        description: impl Into<String>,
        converter: C,
        default: V,
    ) -> Self
    where
        V: fmt::Display,
    {
        let shown = default.to_string();

        Self::new(
            name,
            description,
            ArgumentKind::DefaultingCoalescing { output_error: false },
            Box::new(erased::Coalescing(converter)),
            or_default(default),
            Some(shown),
        )
    }
}

impl<V: Clone + Send + Sync + 'static> ArgumentSpec<Option<V>, V> {
    /// A single-token argument that may be left out.
    pub fn optional<C: SingleConverter<Output = V>>(
        name: impl Into<String>,
        description: impl Into<String>,
        converter: C,
    ) -> Self {
        Self::new(
            name,
            description,
            ArgumentKind::Optional { output_error: false },
            Box::new(erased::Single(converter)),
            wrap_option::<V>(),
            None,
        )
    }

    /// An argument built from several tokens that may be left out.
    pub fn optional_coalescing<C: CoalescingConverter<Output = V>>(
        name: impl Into<String>,
        description: impl Into<String>,
        converter: C,
    ) -> Self {
        Self::new(
            name,
            description,
            ArgumentKind::OptionalCoalescing { output_error: false },
            Box::new(erased::Coalescing(converter)),
            wrap_option::<V>(),
            None,
        )
    }
}

impl<V: Clone + Send + Sync + 'static> ArgumentSpec<Vec<V>, V> {
    /// Takes tokens for as long as they convert.
    pub fn list<C: SingleConverter<Output = V>>(
        name: impl Into<String>,
        description: impl Into<String>,
        converter: C,
        required: bool,
    ) -> Self {
        Self::new(
            name,
            description,
            ArgumentKind::List { required },
            Box::new(erased::Single(converter)),
            or_default(Vec::<V>::new()),
            None,
        )
    }
}

/// An ordered set of argument declarations.
pub struct Arguments {
    id: u64,
    arguments: Vec<Argument>,
}

impl Default for Arguments {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.arguments).finish()
    }
}

impl Arguments {
    /// An empty set.
    pub fn new() -> Self {
        Self {
            id: NEXT_SET_ID.fetch_add(1, Ordering::Relaxed),
            arguments: Vec::new(),
        }
    }

    pub(crate) const fn id(&self) -> u64 {
        self.id
    }

    /// Adds a declared argument, returning its handle.
    pub fn add<T: 'static, V>(&mut self, spec: ArgumentSpec<T, V>) -> Arg<T> {
        let index = self.arguments.len();
        self.arguments.push(spec.argument);

        Arg {
            set: self.id,
            index,
            _marker: PhantomData,
        }
    }

    /// Declares a required single-token argument.
    pub fn single<C: SingleConverter>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        converter: C,
    ) -> Arg<C::Output> {
        self.add(ArgumentSpec::single(name, description, converter))
    }

    /// Declares a single-token argument that may be left out.
    pub fn optional<C: SingleConverter>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        converter: C,
    ) -> Arg<Option<C::Output>> {
        self.add(ArgumentSpec::optional(name, description, converter))
    }

    /// Declares a single-token argument with a default.
    pub fn defaulting<C>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        converter: C,
        default: C::Output,
    ) -> Arg<C::Output>
    where
        C: SingleConverter,
        C::Output: fmt::Display,
    {
        self.add(ArgumentSpec::defaulting(name, description, converter, default))
    }

    /// Declares a list argument.
    pub fn list<C: SingleConverter>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        converter: C,
        required: bool,
    ) -> Arg<Vec<C::Output>> {
        self.add(ArgumentSpec::list(name, description, converter, required))
    }

    /// Declares a required argument built from several tokens.
    pub fn coalescing<C: CoalescingConverter>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        converter: C,
    ) -> Arg<C::Output> {
        self.add(ArgumentSpec::coalescing(name, description, converter))
    }

    /// Declares an argument built from several tokens that may be left out.
    pub fn optional_coalescing<C: CoalescingConverter>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        converter: C,
    ) -> Arg<Option<C::Output>> {
        self.add(ArgumentSpec::optional_coalescing(name, description, converter))
    }

    /// Declares an argument built from several tokens with a default.
    pub fn defaulting_coalescing<C>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        converter: C,
        default: C::Output,
    ) -> Arg<C::Output>
    where
        C: CoalescingConverter,
        C::Output: fmt::Display,
    {
        self.add(ArgumentSpec::defaulting_coalescing(name, description, converter, default))
    }

    /// The declared arguments, in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Argument> {
        self.arguments.iter()
    }

    /// Number of declared arguments.
    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    /// Whether no arguments are declared.
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// Checks that argument names are non-empty and unique, ignoring case.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();

        for argument in &self.arguments {
            if argument.name.trim().is_empty() {
                return Err(FrameworkError::invalid_argument("<unnamed>", "Argument names must not be empty"));
            }

            if !seen.insert(argument.name.to_lowercase()) {
                return Err(FrameworkError::invalid_argument(
                    &argument.name,
                    "An argument with this name is already declared",
                ));
            }
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a Arguments {
    type Item = &'a Argument;
    type IntoIter = std::slice::Iter<'a, Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
