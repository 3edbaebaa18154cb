//! Where registered commands live and how events find them.

mod application;
mod chat;

pub use application::ApplicationCommandRegistry;
pub use chat::ChatCommandRegistry;
