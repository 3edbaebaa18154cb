//! # Herald I18n
//!
//! Internationalization support using the Fluent localization system.
//!
//! The framework's own strings are embedded at compile time and validated by
//! the build script. Bots can layer their own resources on top, either from
//! strings or from a directory of `<locale>/*.ftl` files.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod loader;
pub mod locale;
pub mod translations;

pub use fluent_bundle::{FluentArgs, FluentValue};
pub use loader::*;
pub use locale::*;
pub use translations::*;
pub use unic_langid::LanguageIdentifier;
