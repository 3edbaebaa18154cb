//! Guild checks.

use super::CheckContext;
use crate::fluent_args;
use serenity::all::GuildId;

impl CheckContext<'_> {
    /// Passes for events inside any guild.
    pub fn any_guild(&mut self) {
        if !self.passed() {
            return;
        }

        if self.event().guild.is_some() {
            self.log_passed("any_guild");
            self.pass();
        } else {
            self.log_failed("any_guild", "Event did not happen within a guild");
            self.fail_key("checks-any-guild-failed");
        }
    }

    /// Passes for events outside of guilds.
    pub fn no_guild(&mut self) {
        if !self.passed() {
            return;
        }

        if self.event().guild.is_none() {
            self.log_passed("no_guild");
            self.pass();
        } else {
            self.log_failed("no_guild", "Event happened within a guild");
            self.fail_key("checks-no-guild-failed");
        }
    }

    /// Passes for events inside the guild `id`.
    pub fn in_guild(&mut self, id: GuildId) {
        if !self.passed() {
            return;
        }

        match self.event().guild {
            None => {
                self.log_failed("in_guild", "Event did not happen within a guild");
                self.fail();
            }
            Some(guild) if guild == id => {
                self.log_passed("in_guild");
                self.pass();
            }
            Some(_) => {
                self.log_failed("in_guild", "Event happened in another guild");
                self.fail_key_with("checks-in-guild-failed", &fluent_args!("guild" => id.to_string()));
            }
        }
    }

    /// Passes for events anywhere but the guild `id`.
    pub fn not_in_guild(&mut self, id: GuildId) {
        if !self.passed() {
            return;
        }

        if self.event().guild == Some(id) {
            self.log_failed("not_in_guild", "Event happened in the given guild");
            self.fail_key_with("checks-not-in-guild-failed", &fluent_args!("guild" => id.to_string()));
        } else {
            self.log_passed("not_in_guild");
            self.pass();
        }
    }
}
