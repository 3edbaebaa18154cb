//! Extensions this bot ships with.

mod about;
mod echo;
mod event_log;
mod ping;

pub use about::{about_pages, format_uptime, AboutExtension};
pub use echo::EchoExtension;
pub use event_log::EventLogExtension;
pub use ping::PingExtension;
