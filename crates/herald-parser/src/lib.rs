//! # Herald Parser
//!
//! Tokenizer for chat command input.
//!
//! The parser understands:
//!
//! * keyword arguments at any position (`key=value`)
//! * flag arguments at any position (`--key value`)
//! * quoted arguments containing spaces (`"value value"`), with `\"` escapes
//! * plain arguments without spaces (`value`)
//!
//! Call [`StringParser::parse_named`] first to pull the named arguments out,
//! then [`StringParser::parse_next`] as many times as required.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cursor;
pub mod string_parser;
pub mod tokens;

pub use cursor::Cursor;
pub use string_parser::StringParser;
pub use tokens::{NamedArgumentToken, PositionalArgumentToken};
