//! Role checks.
//!
//! Top role checks compare positions in the guild's role list. A member
//! without roles has no top role: checks asking for a higher or equal top
//! role fail, checks asking for a lower or different one pass.

use super::CheckContext;
use crate::fluent_args;
use serenity::all::RoleId;
use std::cmp::Ordering;

fn role_mention(id: RoleId) -> String {
    format!("<@&{id}>")
}

#[derive(Clone, Copy)]
enum TopRole {
    Equal,
    NotEqual,
    Higher,
    Lower,
    HigherOrEqual,
    LowerOrEqual,
}

impl TopRole {
    const fn name(self) -> &'static str {
        match self {
            Self::Equal => "top_role_equal",
            Self::NotEqual => "top_role_not_equal",
            Self::Higher => "top_role_higher",
            Self::Lower => "top_role_lower",
            Self::HigherOrEqual => "top_role_higher_or_equal",
            Self::LowerOrEqual => "top_role_lower_or_equal",
        }
    }

    const fn key(self) -> &'static str {
        match self {
            Self::Equal => "checks-top-role-equal-failed",
            Self::NotEqual => "checks-top-role-not-equal-failed",
            Self::Higher => "checks-top-role-higher-failed",
            Self::Lower => "checks-top-role-lower-failed",
            Self::HigherOrEqual => "checks-top-role-higher-or-equal-failed",
            Self::LowerOrEqual => "checks-top-role-lower-or-equal-failed",
        }
    }

    /// Outcome for a member without any role.
    const fn passes_without_role(self) -> bool {
        matches!(self, Self::NotEqual | Self::Lower | Self::LowerOrEqual)
    }

    fn passes(self, top: RoleId, top_position: u16, role: RoleId, position: u16) -> bool {
        let ordering = top_position.cmp(&position);

        match self {
            Self::Equal => top == role,
            Self::NotEqual => top != role,
            Self::Higher => ordering == Ordering::Greater,
            Self::Lower => ordering == Ordering::Less,
            Self::HigherOrEqual => ordering != Ordering::Less,
            Self::LowerOrEqual => ordering != Ordering::Greater,
        }
    }
}

impl CheckContext<'_> {
    /// Passes when the member has the role `id`.
    pub fn has_role(&mut self, id: RoleId) {
        if !self.passed() {
            return;
        }

        if self.event().guild.is_none() {
            self.log_failed("has_role", "Event did not happen within a guild");
            self.fail();
        } else if self.event().member_roles.contains(&id) {
            self.log_passed("has_role");
            self.pass();
        } else {
            self.log_failed("has_role", "Member doesn't have the role");
            self.fail_key_with("checks-has-role-failed", &fluent_args!("role" => role_mention(id)));
        }
    }

    /// Passes when the member doesn't have the role `id`.
    pub fn not_has_role(&mut self, id: RoleId) {
        if !self.passed() {
            return;
        }

        if self.event().member_roles.contains(&id) {
            self.log_failed("not_has_role", "Member has the role");
            self.fail_key_with("checks-not-has-role-failed", &fluent_args!("role" => role_mention(id)));
        } else {
            self.log_passed("not_has_role");
            self.pass();
        }
    }

    /// Passes when the member's top role is `id`.
    pub fn top_role_equal(&mut self, id: RoleId) {
        self.compare_top_role(TopRole::Equal, id);
    }

    /// Passes when the member's top role isn't `id`.
    pub fn top_role_not_equal(&mut self, id: RoleId) {
        self.compare_top_role(TopRole::NotEqual, id);
    }

    /// Passes when the member's top role is above `id`.
    pub fn top_role_higher(&mut self, id: RoleId) {
        self.compare_top_role(TopRole::Higher, id);
    }

    /// Passes when the member's top role is below `id`.
    pub fn top_role_lower(&mut self, id: RoleId) {
        self.compare_top_role(TopRole::Lower, id);
    }

    /// Passes when the member's top role is `id` or above it.
    pub fn top_role_higher_or_equal(&mut self, id: RoleId) {
        self.compare_top_role(TopRole::HigherOrEqual, id);
    }

    /// Passes when the member's top role is `id` or below it.
    pub fn top_role_lower_or_equal(&mut self, id: RoleId) {
        self.compare_top_role(TopRole::LowerOrEqual, id);
    }

    fn compare_top_role(&mut self, comparison: TopRole, id: RoleId) {
        if !self.passed() {
            return;
        }

        let check = comparison.name();
        let event = self.event();

        if event.guild.is_none() {
            self.log_failed(check, "Event did not happen within a guild");

            if comparison.passes_without_role() {
                self.pass();
            } else {
                self.fail();
            }

            return;
        }

        let Some(position) = event.role_positions.get(&id).copied() else {
            self.log_failed(check, "Role position is unknown");
            self.fail();
            return;
        };

        let passed = match event.top_role().zip(event.top_role_position()) {
            Some((top, top_position)) => comparison.passes(top, top_position, id, position),
            None => comparison.passes_without_role(),
        };

        if passed {
            self.log_passed(check);
            self.pass();
        } else {
            self.log_failed(check, "Top role is not positioned as required");
            self.fail_key_with(comparison.key(), &fluent_args!("role" => role_mention(id)));
        }
    }
}
