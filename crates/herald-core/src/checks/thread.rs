//! Thread checks.

use super::CheckContext;
use crate::event::ChannelKind;

impl CheckContext<'_> {
    /// Passes for events inside a thread.
    pub fn is_in_thread(&mut self) {
        if !self.passed() {
            return;
        }

        if self.event().channel_kind == ChannelKind::Thread {
            self.log_passed("is_in_thread");
            self.pass();
        } else {
            self.log_failed("is_in_thread", "Channel is not a thread");
            self.fail_key("checks-in-thread-failed");
        }
    }

    /// Passes for events outside of threads.
    pub fn is_not_in_thread(&mut self) {
        if !self.passed() {
            return;
        }

        if self.event().channel_kind == ChannelKind::Thread {
            self.log_failed("is_not_in_thread", "Channel is a thread");
            self.fail_key("checks-not-in-thread-failed");
        } else {
            self.log_passed("is_not_in_thread");
            self.pass();
        }
    }
}
