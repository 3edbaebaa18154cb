//! Token types produced by the parser.

use std::fmt;

/// A named argument, given either as `--name data` or `name=data`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedArgumentToken {
    /// Argument name, as typed.
    pub name: String,
    /// Argument value with surrounding quotes removed.
    pub data: String,
}

impl NamedArgumentToken {
    /// Create a named token.
    pub fn new(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// A positional argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionalArgumentToken {
    /// Token value with surrounding quotes removed.
    pub data: String,
}

impl PositionalArgumentToken {
    /// Create a positional token.
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }
}

impl fmt::Display for PositionalArgumentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.data)
    }
}
