//! Age-restriction checks.

use super::CheckContext;

impl CheckContext<'_> {
    /// Passes in channels marked NSFW. Fails silently when that is unknown.
    pub fn channel_is_nsfw(&mut self) {
        if !self.passed() {
            return;
        }

        match self.event().nsfw {
            Some(true) => {
                self.log_passed("channel_is_nsfw");
                self.pass();
            }
            Some(false) => {
                self.log_failed("channel_is_nsfw", "Channel is not NSFW");
                self.fail_key("checks-channel-is-nsfw-failed");
            }
            None => {
                self.log_failed("channel_is_nsfw", "Channel NSFW flag is unknown");
                self.fail();
            }
        }
    }

    /// Passes in channels not marked NSFW.
    pub fn channel_is_not_nsfw(&mut self) {
        if !self.passed() {
            return;
        }

        if self.event().nsfw == Some(true) {
            self.log_failed("channel_is_not_nsfw", "Channel is NSFW");
            self.fail_key("checks-channel-is-not-nsfw-failed");
        } else {
            self.log_passed("channel_is_not_nsfw");
            self.pass();
        }
    }
}
