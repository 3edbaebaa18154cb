//! Paginated embeds driven by buttons.
//!
//! Pages are grouped under names. The paginator shows one group at a time
//! and lets its user flip through pages and switch groups with buttons.

use herald_common::{FrameworkError, Result};
use herald_config::defaults::DEFAULT_PAGINATOR_TIMEOUT_SECONDS;
use herald_config::PaginationConfig;
use serenity::all::UserId;
use std::time::Duration;
use tracing::trace;

mod button;
mod page;
mod state;

pub use button::{ButtonPaginator, PaginatorCallback};
pub use page::{Page, PageField};
pub use state::{ButtonAction, InteractionCheck, PaginatorButton, PaginatorState};

/// Jumps to the first page.
pub const FIRST_PAGE_EMOJI: &str = "⏮️";
/// Goes back one page.
pub const BACK_EMOJI: &str = "⬅️";
/// Goes forward one page.
pub const NEXT_EMOJI: &str = "➡️";
/// Jumps to the last page.
pub const LAST_PAGE_EMOJI: &str = "⏭️";
/// Ends the paginator and deletes its message.
pub const DELETE_EMOJI: &str = "🗑️";
/// Ends the paginator and keeps its message.
pub const FINISH_EMOJI: &str = "☑️";
/// Moves to the next group.
pub const SWITCH_EMOJI: &str = "🔄";
/// Toggles between exactly two groups.
pub const EXPAND_EMOJI: &str = "ℹ️";

/// Name of the group pages go to by default.
pub const DEFAULT_GROUP: &str = "";

/// Most pages shown in one message.
pub const MAX_CHUNK_SIZE: usize = 9;

/// Pages in named groups, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pages {
    default_group: String,
    groups: Vec<(String, Vec<Page>)>,
}

impl Default for Pages {
    fn default() -> Self {
        Self::new()
    }
}

impl Pages {
    /// No pages, with [`DEFAULT_GROUP`] as the default group.
    pub fn new() -> Self {
        Self::with_default_group(DEFAULT_GROUP)
    }

    /// No pages, with `group` as the default group.
    pub fn with_default_group(group: impl Into<String>) -> Self {
        let group = group.into();

        Self {
            groups: vec![(group.clone(), Vec::new())],
            default_group: group,
        }
    }

    /// Adds a page to the default group.
    pub fn add(&mut self, page: Page) {
        let group = self.default_group.clone();
        self.add_to(&group, page);
    }

    /// Adds a page to `group`, creating the group if needed.
    pub fn add_to(&mut self, group: &str, page: Page) {
        match self.groups.iter_mut().find(|(name, _)| name == group) {
            Some((_, pages)) => pages.push(page),
            None => self.groups.push((group.to_string(), vec![page])),
        }
    }

    /// The default group's name.
    pub fn default_group(&self) -> &str {
        &self.default_group
    }

    /// Names of the groups holding at least one page.
    pub fn groups(&self) -> Vec<&str> {
        self.groups
            .iter()
            .filter(|(_, pages)| !pages.is_empty())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Pages of `group`.
    pub fn group(&self, group: &str) -> &[Page] {
        self.groups
            .iter()
            .find(|(name, _)| name == group)
            .map_or(&[], |(_, pages)| pages.as_slice())
    }

    /// Number of pages across every group.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, pages)| pages.len()).sum()
    }

    /// Whether every group is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Page> for Pages {
    fn from_iter<I: IntoIterator<Item = Page>>(iter: I) -> Self {
        let mut pages = Self::new();

        for page in iter {
            pages.add(page);
        }

        pages
    }
}

/// How a paginator behaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatorOptions {
    /// Pages shown at once, from 1 to [`MAX_CHUNK_SIZE`].
    pub chunk_size: usize,
    /// The only user allowed to press the buttons, if any.
    pub owner: Option<UserId>,
    /// Inactivity before the paginator stops.
    pub timeout: Duration,
    /// Whether the message stays, without buttons, once the paginator ends.
    pub keep_embed: bool,
}

impl Default for PaginatorOptions {
    fn default() -> Self {
        Self {
            chunk_size: 1,
            owner: None,
            timeout: Duration::from_secs(DEFAULT_PAGINATOR_TIMEOUT_SECONDS),
            keep_embed: true,
        }
    }
}

impl PaginatorOptions {
    /// Options taking their timeout and message handling from the
    /// configuration.
    pub fn from_config(config: &PaginationConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_seconds),
            keep_embed: config.keep_embed,
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self, pages: &Pages) -> Result<()> {
        if pages.is_empty() {
            return Err(FrameworkError::invalid_argument(
                "pages",
                "Attempted to send a paginator with no pages in it",
            ));
        }

        if !(1..=MAX_CHUNK_SIZE).contains(&self.chunk_size) {
            return Err(FrameworkError::invalid_argument(
                "chunk_size",
                format!("Paginators show between 1 and {MAX_CHUNK_SIZE} pages at once"),
            ));
        }

        trace!(pages = pages.len(), chunk_size = self.chunk_size, "Paginator options are valid");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_keep_insertion_order() {
        let mut pages = Pages::new();
        pages.add_to("b", Page::new("1"));
        pages.add(Page::new("2"));
        pages.add_to("a", Page::new("3"));
        pages.add_to("b", Page::new("4"));

        assert_eq!(pages.groups(), vec!["", "b", "a"]);
        assert_eq!(pages.group("b").len(), 2);
        assert!(pages.group("missing").is_empty());
        assert_eq!(pages.len(), 4);
    }

    #[test]
    fn test_empty_groups_are_hidden() {
        let mut pages = Pages::new();
        pages.add_to("only", Page::new("1"));

        assert_eq!(pages.groups(), vec!["only"]);
    }

    #[test]
    fn test_options_validation() {
        let options = PaginatorOptions::default();
        assert!(options.validate(&Pages::new()).is_err());

        let pages: Pages = std::iter::once(Page::new("1")).collect();
        assert!(options.validate(&pages).is_ok());

        let chunked = PaginatorOptions {
            chunk_size: 10,
            ..PaginatorOptions::default()
        };
        assert!(chunked.validate(&pages).is_err());
    }
}
