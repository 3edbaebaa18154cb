//! # Herald Common
//!
//! Shared error types, value types, utilities and logging setup for the
//! Herald framework.
//!
//! Every other crate in the workspace builds on the types defined here, so
//! this crate stays free of any Discord client dependency.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod logging;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use error::*;
pub use logging::*;
pub use types::*;
pub use utils::*;
