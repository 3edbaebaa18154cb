//! Checks on who the invoking user is.

use super::CheckContext;

impl CheckContext<'_> {
    /// Passes when a bot triggered the event.
    pub fn is_bot(&mut self) {
        let condition = self.event().author_is_bot;
        self.require("is_bot", condition, "checks-is-bot-failed");
    }

    /// Passes when a human triggered the event.
    pub fn is_not_bot(&mut self) {
        let condition = !self.event().author_is_bot;
        self.require("is_not_bot", condition, "checks-is-not-bot-failed");
    }

    /// Passes for the bot's owners.
    pub fn is_bot_owner(&mut self) {
        let condition = self.event().is_bot_owner();
        self.require("is_bot_owner", condition, "checks-is-bot-owner-failed");
    }

    /// Passes for anyone but the bot's owners.
    pub fn is_not_bot_owner(&mut self) {
        let condition = !self.event().is_bot_owner();
        self.require("is_not_bot_owner", condition, "checks-is-not-bot-owner-failed");
    }

    /// Passes for the bot's administrators, owners included.
    pub fn is_bot_admin(&mut self) {
        let condition = self.event().is_bot_admin();
        self.require("is_bot_admin", condition, "checks-is-bot-admin-failed");
    }

    /// Passes for anyone but the bot's administrators.
    pub fn is_not_bot_admin(&mut self) {
        let condition = !self.event().is_bot_admin();
        self.require("is_not_bot_admin", condition, "checks-is-not-bot-admin-failed");
    }

    fn require(&mut self, check: &str, condition: bool, key: &str) {
        if !self.passed() {
            return;
        }

        if condition {
            self.log_passed(check);
            self.pass();
        } else {
            self.log_failed(check, "Condition not met");
            self.fail_key(key);
        }
    }
}
