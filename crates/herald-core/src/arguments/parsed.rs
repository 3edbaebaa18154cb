//! Parsed argument values.

use super::{Arg, ArgValue, Arguments};
use herald_common::{FrameworkError, Result};
use std::fmt;

/// The values parsed for one invocation, read back through [`Arg`] handles.
pub struct ParsedArguments {
    set: u64,
    names: Vec<String>,
    values: Vec<Option<ArgValue>>,
}

impl ParsedArguments {
    /// Values for a command without arguments.
    pub fn empty() -> Self {
        Self {
            set: 0,
            names: Vec::new(),
            values: Vec::new(),
        }
    }

    pub(crate) fn new(arguments: &Arguments, values: Vec<Option<ArgValue>>) -> Self {
        Self {
            set: arguments.id(),
            names: arguments.iter().map(|argument| argument.name().to_string()).collect(),
            values,
        }
    }

    /// Reads the value behind `arg`.
    ///
    /// Fails when `arg` belongs to another [`Arguments`] set or was not
    /// filled. Optional, defaulting and list arguments are always filled.
    pub fn get<T: 'static>(&self, arg: Arg<T>) -> Result<&T> {
        if arg.set != self.set {
            return Err(FrameworkError::invalid_argument(
                format!("#{}", arg.index),
                "The handle belongs to a different set of arguments",
            ));
        }

        let name = self.names.get(arg.index).map_or("<unknown>", String::as_str);

        self.values
            .get(arg.index)
            .and_then(Option::as_ref)
            .ok_or_else(|| FrameworkError::invalid_argument(name, "No value was parsed for this argument"))?
            .downcast_ref::<T>()
            .ok_or_else(|| FrameworkError::invalid_argument(name, "The handle's type doesn't match the value"))
    }

    /// Whether `arg` holds a value.
    pub fn is_filled<T: 'static>(&self, arg: Arg<T>) -> bool {
        self.get(arg).is_ok()
    }

    /// Number of declared arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no arguments were declared.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for ParsedArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filled: Vec<(&str, bool)> = self
            .names
            .iter()
            .zip(&self.values)
            .map(|(name, value)| (name.as_str(), value.is_some()))
            .collect();

        f.debug_struct("ParsedArguments").field("filled", &filled).finish()
    }
}
