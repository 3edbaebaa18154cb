//! # Herald Config
//!
//! Type-safe configuration management with hot-reloading for Herald bots.
//!
//! This crate provides configuration loading from TOML, YAML or JSON files,
//! environment overrides, validation, and a lock-free cache that a file
//! watcher can refresh while the bot is running.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cache;
pub mod defaults;
pub mod loader;
pub mod schema;
pub mod validator;
pub mod watcher;

pub use cache::*;
pub use loader::*;
pub use schema::*;
pub use validator::*;
pub use watcher::*;
