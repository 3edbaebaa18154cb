//! Paginator state, kept apart from Discord so it can be tested directly.

use super::{
    Page, Pages, PaginatorOptions, BACK_EMOJI, DELETE_EMOJI, EXPAND_EMOJI, FINISH_EMOJI, FIRST_PAGE_EMOJI,
    LAST_PAGE_EMOJI, NEXT_EMOJI, SWITCH_EMOJI,
};
use crate::components::component_id;
use crate::fluent_args;
use crate::i18n::Localizer;
use herald_common::Result;
use serenity::all::{ButtonStyle, CreateActionRow, CreateButton, CreateEmbed, ReactionType, UserId};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// What a paginator button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    /// Go to the first page.
    First,
    /// Go back one chunk.
    Back,
    /// Go forward one chunk.
    Next,
    /// Go to the last chunk.
    Last,
    /// End the paginator.
    Finish,
    /// Go to the next group.
    Switch,
    /// Go to the group at this index.
    Group(usize),
}

impl fmt::Display for ButtonAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::Back => f.write_str("back"),
            Self::Next => f.write_str("next"),
            Self::Last => f.write_str("last"),
            Self::Finish => f.write_str("finish"),
            Self::Switch => f.write_str("switch"),
            Self::Group(index) => write!(f, "group-{index}"),
        }
    }
}

impl FromStr for ButtonAction {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "first" => Ok(Self::First),
            "back" => Ok(Self::Back),
            "next" => Ok(Self::Next),
            "last" => Ok(Self::Last),
            "finish" => Ok(Self::Finish),
            "switch" => Ok(Self::Switch),
            other => other
                .strip_prefix("group-")
                .and_then(|index| index.parse().ok())
                .map(Self::Group)
                .ok_or(()),
        }
    }
}

/// A button as the paginator wants it drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginatorButton {
    /// What pressing it does.
    pub action: ButtonAction,
    /// Emoji shown on the button.
    pub emoji: Option<&'static str>,
    /// Text shown on the button.
    pub label: Option<String>,
    /// Button color.
    pub style: ButtonStyle,
    /// Whether it can be pressed.
    pub disabled: bool,
}

impl PaginatorButton {
    const fn new(action: ButtonAction, emoji: &'static str, style: ButtonStyle) -> Self {
        Self {
            action,
            emoji: Some(emoji),
            label: None,
            style,
            disabled: false,
        }
    }

    fn build(&self, key: &str) -> CreateButton {
        let mut button = CreateButton::new(component_id(key, &self.action.to_string()))
            .style(self.style)
            .disabled(self.disabled);

        if let Some(emoji) = self.emoji {
            button = button.emoji(ReactionType::Unicode(emoji.to_string()));
        }

        if let Some(label) = &self.label {
            button = button.label(label);
        }

        button
    }
}

/// Outcome of the default check run on every button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionCheck {
    /// The press may be handled.
    Allowed,
    /// The paginator already ended.
    Inactive,
    /// Someone other than the owner pressed a button.
    NotOwner,
}

/// Which pages a paginator shows and how its buttons look.
#[derive(Debug, Clone)]
pub struct PaginatorState {
    pages: Pages,
    groups: Vec<String>,
    current_group: String,
    current_page: usize,
    chunk_size: usize,
    owner: Option<UserId>,
    timeout: Duration,
    keep_embed: bool,
    active: bool,
}

impl PaginatorState {
    /// State showing the first page of the default group, or of the first
    /// group with pages when the default group is empty.
    pub fn new(pages: Pages, options: &PaginatorOptions) -> Result<Self> {
        options.validate(&pages)?;

        let groups: Vec<String> = pages.groups().into_iter().map(ToString::to_string).collect();
        let current_group = if groups.iter().any(|group| group == pages.default_group()) {
            pages.default_group().to_string()
        } else {
            groups.first().cloned().unwrap_or_default()
        };

        Ok(Self {
            pages,
            groups,
            current_group,
            current_page: 0,
            chunk_size: options.chunk_size,
            owner: options.owner,
            timeout: options.timeout,
            keep_embed: options.keep_embed,
            active: true,
        })
    }

    /// Index of the first page shown.
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    /// Name of the group shown.
    pub fn current_group(&self) -> &str {
        &self.current_group
    }

    /// Names of the groups with pages.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Pages shown at once.
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The only user allowed to press the buttons, if any.
    pub const fn owner(&self) -> Option<UserId> {
        self.owner
    }

    /// Inactivity before the paginator stops.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether the message stays once the paginator ends.
    pub const fn keep_embed(&self) -> bool {
        self.keep_embed
    }

    /// Whether the paginator still reacts to buttons.
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Stops reacting to buttons.
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    /// Number of pages in the current group.
    pub fn group_size(&self) -> usize {
        self.pages.group(&self.current_group).len()
    }

    /// The pages shown right now.
    pub fn current_pages(&self) -> &[Page] {
        let pages = self.pages.group(&self.current_group);
        let end = (self.current_page + self.chunk_size).min(pages.len());

        pages.get(self.current_page..end).unwrap_or_default()
    }

    /// Moves to `page`. Returns whether anything changed; the current page
    /// and pages out of range are ignored.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page == self.current_page {
            debug!(page, "Already on this page");
            return false;
        }

        if page >= self.group_size() {
            debug!(page, size = self.group_size(), "Page is out of range");
            return false;
        }

        self.current_page = page;
        true
    }

    /// Moves forward one chunk.
    pub fn next_page(&mut self) -> bool {
        if self.current_page + 1 < self.group_size() {
            self.go_to_page(self.current_page + self.chunk_size)
        } else {
            false
        }
    }

    /// Moves back one chunk.
    pub fn previous_page(&mut self) -> bool {
        self.current_page
            .checked_sub(self.chunk_size)
            .is_some_and(|page| self.go_to_page(page))
    }

    /// Moves to the last chunk.
    pub fn last_page(&mut self) -> bool {
        let chunks = self.group_size().div_ceil(self.chunk_size);
        let page = (chunks * self.chunk_size).saturating_sub(self.chunk_size);

        self.go_to_page(page)
    }

    /// Shows `group`, keeping the page number where the group is long
    /// enough.
    pub fn switch_group(&mut self, group: &str) -> bool {
        if group == self.current_group || !self.groups.iter().any(|name| name == group) {
            return false;
        }

        let size = self.pages.group(group).len();

        self.current_page = self.current_page.min(size.saturating_sub(1));
        self.current_group = group.to_string();
        true
    }

    /// Shows the next group, wrapping around to the first.
    pub fn next_group(&mut self) -> bool {
        let index = self
            .groups
            .iter()
            .position(|group| *group == self.current_group)
            .map_or(0, |index| index + 1);

        let next = self.groups.get(index).or_else(|| self.groups.first()).cloned();
        next.is_some_and(|group| self.switch_group(&group))
    }

    /// Applies a button press. Returns whether the shown pages changed.
    pub fn apply(&mut self, action: ButtonAction) -> bool {
        match action {
            ButtonAction::First => self.go_to_page(0),
            ButtonAction::Back => self.previous_page(),
            ButtonAction::Next => self.next_page(),
            ButtonAction::Last => self.last_page(),
            ButtonAction::Switch => self.next_group(),
            ButtonAction::Group(index) => match self.groups.get(index).cloned() {
                Some(group) => self.switch_group(&group),
                None => false,
            },
            ButtonAction::Finish => {
                self.deactivate();
                true
            }
        }
    }

    /// The check every press goes through: the paginator must be active and
    /// the presser must be the owner, when there is one.
    pub fn check_interaction(&self, user: UserId) -> InteractionCheck {
        if !self.active {
            InteractionCheck::Inactive
        } else if self.owner.is_some_and(|owner| owner != user) {
            InteractionCheck::NotOwner
        } else {
            InteractionCheck::Allowed
        }
    }

    /// The paginator's footer text, before the page's own footer.
    pub fn footer(&self, localizer: &Localizer) -> Option<String> {
        let size = self.group_size();
        let mut parts = Vec::new();

        if size > 1 {
            let page = self.current_page + 1;

            parts.push(if self.chunk_size > 1 {
                let end = (self.current_page + self.chunk_size).min(size);
                localizer.translate_with(
                    "paginator-footer-pages",
                    &fluent_args!("start" => page, "end" => end, "total" => size),
                )
            } else {
                localizer.translate_with("paginator-footer-page", &fluent_args!("page" => page, "total" => size))
            });
        }

        let groups = self.groups.len();
        let blank = self.current_group.trim().is_empty();

        if !blank || groups > 2 {
            let index = self
                .groups
                .iter()
                .position(|group| *group == self.current_group)
                .unwrap_or_default()
                + 1;

            parts.push(if blank {
                localizer.translate_with("paginator-footer-group", &fluent_args!("index" => index, "total" => groups))
            } else {
                format!("{} ({index}/{groups})", localizer.translate_text(&self.current_group))
            });
        }

        (!parts.is_empty()).then(|| parts.join(" • "))
    }

    /// The embed for the current pages.
    pub fn embed(&self, localizer: &Localizer) -> CreateEmbed {
        Page::render_chunk(self.current_pages(), self.footer(localizer).as_deref())
    }

    fn can_use_group_buttons(&self) -> bool {
        (3..=5).contains(&self.groups.len()) && !self.groups.iter().any(String::is_empty)
    }

    /// The button rows to show, top to bottom.
    pub fn buttons(&self, localizer: &Localizer) -> Vec<Vec<PaginatorButton>> {
        let any_multi_page = self
            .groups
            .iter()
            .any(|group| self.pages.group(group).len() > 1);

        let mut rows = Vec::new();

        if any_multi_page {
            let at_start = self.current_page == 0;
            let at_end = self.current_page + self.chunk_size > self.group_size().saturating_sub(1);

            rows.push(vec![
                PaginatorButton {
                    disabled: at_start,
                    ..PaginatorButton::new(ButtonAction::First, FIRST_PAGE_EMOJI, ButtonStyle::Secondary)
                },
                PaginatorButton {
                    disabled: at_start,
                    ..PaginatorButton::new(ButtonAction::Back, BACK_EMOJI, ButtonStyle::Secondary)
                },
                PaginatorButton {
                    disabled: at_end,
                    ..PaginatorButton::new(ButtonAction::Next, NEXT_EMOJI, ButtonStyle::Secondary)
                },
                PaginatorButton {
                    disabled: at_end,
                    ..PaginatorButton::new(ButtonAction::Last, LAST_PAGE_EMOJI, ButtonStyle::Secondary)
                },
            ]);
        }

        if self.groups.len() > 1 && self.can_use_group_buttons() {
            rows.push(
                self.groups
                    .iter()
                    .enumerate()
                    .map(|(index, group)| PaginatorButton {
                        action: ButtonAction::Group(index),
                        emoji: None,
                        label: Some(group.clone()),
                        style: ButtonStyle::Secondary,
                        disabled: *group == self.current_group,
                    })
                    .collect(),
            );
        }

        let mut last = Vec::new();

        if any_multi_page || !self.keep_embed {
            last.push(if self.keep_embed {
                PaginatorButton {
                    label: Some(localizer.translate("paginator-button-done")),
                    ..PaginatorButton::new(ButtonAction::Finish, FINISH_EMOJI, ButtonStyle::Primary)
                }
            } else {
                PaginatorButton {
                    label: Some(localizer.translate("paginator-button-delete")),
                    ..PaginatorButton::new(ButtonAction::Finish, DELETE_EMOJI, ButtonStyle::Danger)
                }
            });
        }

        if self.groups.len() > 1 && !self.can_use_group_buttons() {
            let (emoji, key) = if self.groups.len() == 2 {
                let key = if self.current_group == self.pages.default_group() {
                    "paginator-button-more"
                } else {
                    "paginator-button-less"
                };

                (EXPAND_EMOJI, key)
            } else {
                (SWITCH_EMOJI, "paginator-button-group-switch")
            };

            last.push(PaginatorButton {
                label: Some(localizer.translate(key)),
                ..PaginatorButton::new(ButtonAction::Switch, emoji, ButtonStyle::Secondary)
            });
        }

        if !last.is_empty() {
            rows.push(last);
        }

        rows
    }

    /// The button rows as Discord components, with custom ids owned by
    /// `key`.
    pub fn components(&self, key: &str, localizer: &Localizer) -> Vec<CreateActionRow> {
        self.buttons(localizer)
            .iter()
            .map(|row| CreateActionRow::Buttons(row.iter().map(|button| button.build(key)).collect()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::localizer;

    fn pages(groups: &[(&str, usize)]) -> Pages {
        let mut pages = Pages::new();

        for (group, count) in groups {
            for index in 0..*count {
                pages.add_to(group, Page::new(format!("{group} {index}")));
            }
        }

        pages
    }

    fn state(groups: &[(&str, usize)], chunk_size: usize) -> PaginatorState {
        let options = PaginatorOptions {
            chunk_size,
            ..PaginatorOptions::default()
        };

        PaginatorState::new(pages(groups), &options).unwrap()
    }

    fn actions(rows: &[Vec<PaginatorButton>]) -> Vec<Vec<(ButtonAction, bool)>> {
        rows.iter()
            .map(|row| row.iter().map(|button| (button.action, button.disabled)).collect())
            .collect()
    }

    #[test]
    fn test_button_action_ids() {
        for action in [ButtonAction::First, ButtonAction::Finish, ButtonAction::Group(3)] {
            assert_eq!(action.to_string().parse::<ButtonAction>(), Ok(action));
        }

        assert!("group-x".parse::<ButtonAction>().is_err());
    }

    #[test]
    fn test_empty_pages_are_rejected() {
        assert!(PaginatorState::new(Pages::new(), &PaginatorOptions::default()).is_err());
    }

    #[test]
    fn test_go_to_page_ignores_current_and_out_of_range() {
        let mut state = state(&[("", 3)], 1);

        assert!(!state.go_to_page(0));
        assert!(!state.go_to_page(3));
        assert!(state.go_to_page(2));
        assert_eq!(state.current_page(), 2);
    }

    #[test]
    fn test_chunked_navigation() {
        let mut state = state(&[("", 5)], 2);

        assert!(state.next_page());
        assert_eq!(state.current_page(), 2);
        assert!(state.last_page());
        assert_eq!(state.current_page(), 4);
        assert!(!state.next_page());
        assert!(state.previous_page());
        assert_eq!(state.current_page(), 2);
        assert!(state.previous_page());
        assert!(!state.previous_page());
        assert_eq!(state.current_pages().len(), 2);
    }

    #[test]
    fn test_switch_group_clamps_page() {
        let mut state = state(&[("", 4), ("extra", 2)], 1);

        state.go_to_page(3);
        assert!(state.switch_group("extra"));
        assert_eq!(state.current_page(), 1);
        assert!(!state.switch_group("extra"));
        assert!(!state.switch_group("missing"));
    }

    #[test]
    fn test_next_group_wraps_around() {
        let mut state = state(&[("a", 1), ("b", 1), ("c", 1)], 1);

        assert_eq!(state.current_group(), "a");
        state.next_group();
        state.next_group();
        assert_eq!(state.current_group(), "c");
        state.next_group();
        assert_eq!(state.current_group(), "a");
    }

    #[test]
    fn test_single_page_has_no_buttons() {
        let localizer = localizer();
        assert!(state(&[("", 1)], 1).buttons(&localizer).is_empty());

        let options = PaginatorOptions {
            keep_embed: false,
            ..PaginatorOptions::default()
        };
        let deleting = PaginatorState::new(pages(&[("", 1)]), &options).unwrap();
        let rows = deleting.buttons(&localizer);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0].emoji, Some(DELETE_EMOJI));
        assert_eq!(rows[0][0].label.as_deref(), Some("Delete"));
    }

    #[test]
    fn test_navigation_buttons_disable_at_edges() {
        let localizer = localizer();
        let mut state = state(&[("", 3)], 1);

        assert_eq!(
            actions(&state.buttons(&localizer)),
            vec![
                vec![
                    (ButtonAction::First, true),
                    (ButtonAction::Back, true),
                    (ButtonAction::Next, false),
                    (ButtonAction::Last, false),
                ],
                vec![(ButtonAction::Finish, false)],
            ]
        );

        state.last_page();
        let rows = state.buttons(&localizer);
        assert!(!rows[0][0].disabled);
        assert!(rows[0][2].disabled);
        assert!(rows[0][3].disabled);
    }

    #[test]
    fn test_group_buttons_for_three_to_five_groups() {
        let localizer = localizer();
        let state = state(&[("a", 1), ("b", 1), ("c", 1)], 1);
        let rows = state.buttons(&localizer);

        assert_eq!(
            actions(&rows),
            vec![vec![
                (ButtonAction::Group(0), true),
                (ButtonAction::Group(1), false),
                (ButtonAction::Group(2), false),
            ]]
        );
        assert_eq!(rows[0][1].label.as_deref(), Some("b"));
    }

    #[test]
    fn test_switch_button_for_two_groups() {
        let localizer = localizer();
        let mut state = state(&[("", 2), ("details", 1)], 1);

        let rows = state.buttons(&localizer);
        let switch = rows.last().and_then(|row| row.last()).unwrap();
        assert_eq!(switch.action, ButtonAction::Switch);
        assert_eq!(switch.emoji, Some(EXPAND_EMOJI));
        assert_eq!(switch.label.as_deref(), Some("More"));

        state.next_group();
        let rows = state.buttons(&localizer);
        assert_eq!(rows.last().and_then(|row| row.last()).unwrap().label.as_deref(), Some("Less"));
    }

    #[test]
    fn test_footer() {
        let localizer = localizer();

        assert_eq!(state(&[("", 1)], 1).footer(&localizer), None);
        assert_eq!(state(&[("", 3)], 1).footer(&localizer).as_deref(), Some("Page 1/3"));
        assert_eq!(state(&[("", 5)], 2).footer(&localizer).as_deref(), Some("Pages 1-2/5"));

        let mut named = state(&[("a", 1), ("b", 1)], 1);
        named.next_group();
        assert_eq!(named.footer(&localizer).as_deref(), Some("b (2/2)"));
        assert_eq!(state(&[("only", 1)], 1).footer(&localizer).as_deref(), Some("only (1/1)"));
    }

    #[test]
    fn test_footer_for_blank_group() {
        let localizer = localizer();

        assert_eq!(
            state(&[("", 2), ("extra", 1)], 1).footer(&localizer).as_deref(),
            Some("Page 1/2")
        );
        assert_eq!(
            state(&[("", 2), ("b", 1), ("c", 1)], 1).footer(&localizer).as_deref(),
            Some("Page 1/2 • Group 1/3")
        );
    }

    #[test]
    fn test_interaction_check() {
        let options = PaginatorOptions {
            owner: Some(UserId::new(1)),
            ..PaginatorOptions::default()
        };
        let mut state = PaginatorState::new(pages(&[("", 2)]), &options).unwrap();

        assert_eq!(state.check_interaction(UserId::new(1)), InteractionCheck::Allowed);
        assert_eq!(state.check_interaction(UserId::new(2)), InteractionCheck::NotOwner);

        state.apply(ButtonAction::Finish);
        assert_eq!(state.check_interaction(UserId::new(1)), InteractionCheck::Inactive);
    }
}
