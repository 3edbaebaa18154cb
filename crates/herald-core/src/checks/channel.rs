//! Channel and category checks.

use super::CheckContext;
use crate::event::ChannelKind;
use crate::fluent_args;
use serenity::all::ChannelId;
use std::cmp::Ordering;

fn channel_mention(id: ChannelId) -> String {
    format!("<#{id}>")
}

impl CheckContext<'_> {
    /// Passes for events in the channel `id`.
    pub fn in_channel(&mut self, id: ChannelId) {
        if !self.passed() {
            return;
        }

        if self.event().channel == id {
            self.log_passed("in_channel");
            self.pass();
        } else {
            self.log_failed("in_channel", "Event happened in another channel");
            self.fail_key_with("checks-in-channel-failed", &fluent_args!("channel" => channel_mention(id)));
        }
    }

    /// Passes for events anywhere but the channel `id`.
    pub fn not_in_channel(&mut self, id: ChannelId) {
        if !self.passed() {
            return;
        }

        if self.event().channel == id {
            self.log_failed("not_in_channel", "Event happened in the given channel");
            self.fail_key_with("checks-not-in-channel-failed", &fluent_args!("channel" => channel_mention(id)));
        } else {
            self.log_passed("not_in_channel");
            self.pass();
        }
    }

    /// Passes for events in a channel inside the category `id`.
    pub fn in_category(&mut self, id: ChannelId) {
        if !self.passed() {
            return;
        }

        if self.event().guild.is_none() {
            self.log_failed("in_category", "Event did not happen within a guild");
            self.fail();
        } else if self.event().category == Some(id) {
            self.log_passed("in_category");
            self.pass();
        } else {
            self.log_failed("in_category", "Channel is not in the given category");
            self.fail_key_with("checks-in-category-failed", &fluent_args!("category" => channel_mention(id)));
        }
    }

    /// Passes for events in channels outside the category `id`.
    pub fn not_in_category(&mut self, id: ChannelId) {
        if !self.passed() {
            return;
        }

        if self.event().category == Some(id) {
            self.log_failed("not_in_category", "Channel is in the given category");
            self.fail_key_with(
                "checks-not-in-category-failed",
                &fluent_args!("category" => channel_mention(id)),
            );
        } else {
            self.log_passed("not_in_category");
            self.pass();
        }
    }

    /// Passes when the event's channel has a higher position than `id`.
    pub fn channel_higher(&mut self, id: ChannelId) {
        self.compare_channel("channel_higher", id, Ordering::Greater, "checks-channel-higher-failed");
    }

    /// Passes when the event's channel has a lower position than `id`.
    pub fn channel_lower(&mut self, id: ChannelId) {
        self.compare_channel("channel_lower", id, Ordering::Less, "checks-channel-lower-failed");
    }

    fn compare_channel(&mut self, check: &str, id: ChannelId, wanted: Ordering, key: &str) {
        if !self.passed() {
            return;
        }

        let event = self.event();

        let positions = match event.channel_kind {
            ChannelKind::Text => event.channel_position.zip(event.channel_positions.get(&id).copied()),
            ChannelKind::Thread | ChannelKind::Direct => None,
        };

        let Some((own, other)) = positions else {
            self.log_failed(check, "Channel positions are unknown");
            self.fail();
            return;
        };

        if own.cmp(&other) == wanted {
            self.log_passed(check);
            self.pass();
        } else {
            self.log_failed(check, "Channel is not positioned as required");
            self.fail_key_with(key, &fluent_args!("channel" => channel_mention(id)));
        }
    }
}
