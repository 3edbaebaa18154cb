//! Cooldowns and rate limits for commands.

use crate::event::EventContext;
use dashmap::DashMap;
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultKeyedRateLimiter, Quota};
use herald_common::DatePeriod;
use serenity::all::UserId;
use std::fmt;
use std::num::NonZeroU32;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Who a cooldown applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CooldownScope {
    /// Each user separately.
    User,
    /// Each channel separately.
    Channel,
    /// Each guild separately. Direct messages count as their own guild.
    Guild,
    /// Everyone at once.
    Global,
}

impl CooldownScope {
    fn key(self, event: &EventContext) -> u64 {
        match self {
            Self::User => event.author.get(),
            Self::Channel => event.channel.get(),
            Self::Guild => event.guild.map_or(0, |guild| guild.get()),
            Self::Global => 0,
        }
    }
}

/// Why an invocation was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitHit {
    /// A cooldown is running for this long.
    Cooldown(Duration),
    /// The user ran out of uses for this long.
    RateLimited(Duration),
}

impl LimitHit {
    /// Time until the command can be used again.
    pub const fn remaining(self) -> Duration {
        match self {
            Self::Cooldown(remaining) | Self::RateLimited(remaining) => remaining,
        }
    }

    /// Translation key explaining the refusal. It takes `$remaining`.
    pub const fn translation_key(self) -> &'static str {
        match self {
            Self::Cooldown(_) => "commands-error-cooldown",
            Self::RateLimited(_) => "commands-error-rate-limited",
        }
    }

    /// The remaining time, rounded up to whole seconds, as `1m 5s`.
    pub fn remaining_display(self) -> String {
        let remaining = self.remaining();
        let seconds = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);

        DatePeriod::from_std(Duration::from_secs(seconds)).to_string()
    }
}

/// Usage limits of one command, along with their bookkeeping.
///
/// Cooldowns start when an invocation succeeds, in [`UsageLimits::apply`].
/// The rate limiter counts every invocation that gets past the checks.
#[derive(Default)]
pub struct UsageLimits {
    cooldowns: Vec<(CooldownScope, Duration)>,
    started: DashMap<(CooldownScope, u64), Instant>,
    limiter: Option<DefaultKeyedRateLimiter<UserId>>,
}

impl UsageLimits {
    /// No limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cooldown of `duration` per `scope`. A zero duration is
    /// ignored.
    #[must_use]
    pub fn cooldown(mut self, scope: CooldownScope, duration: Duration) -> Self {
        if !duration.is_zero() {
            self.cooldowns.retain(|(existing, _)| *existing != scope);
            self.cooldowns.push((scope, duration));
        }

        self
    }

    /// Allows each user `uses` invocations per `window`, refilling
    /// gradually.
    #[must_use]
    pub fn rate_limit(mut self, uses: NonZeroU32, window: Duration) -> Self {
        let quota = Quota::with_period(window / uses.get()).map(|quota| quota.allow_burst(uses));

        self.limiter = quota.map(DefaultKeyedRateLimiter::keyed);
        self
    }

    /// Whether any limit is configured.
    pub fn is_empty(&self) -> bool {
        self.cooldowns.is_empty() && self.limiter.is_none()
    }

    /// Checks whether the invocation in `event` may run.
    ///
    /// Returns the longest running cooldown, then the rate limit. Expired
    /// cooldowns are dropped on the way.
    pub fn check(&self, event: &EventContext) -> Option<LimitHit> {
        let now = Instant::now();

        let cooldown = self
            .cooldowns
            .iter()
            .filter_map(|(scope, duration)| {
                let key = (*scope, scope.key(event));
                let remaining = self
                    .started
                    .get(&key)
                    .and_then(|started| duration.checked_sub(now.duration_since(*started)))
                    .filter(|remaining| !remaining.is_zero());

                if remaining.is_none() && self.started.remove(&key).is_some() {
                    trace!(?scope, "Cooldown expired");
                }

                remaining
            })
            .max();

        if let Some(remaining) = cooldown {
            debug!(user = %event.author, ?remaining, "Command on cooldown");
            return Some(LimitHit::Cooldown(remaining));
        }

        let limiter = self.limiter.as_ref()?;

        match limiter.check_key(&event.author) {
            Ok(()) => None,
            Err(not_until) => {
                let remaining = not_until.wait_time_from(DefaultClock::default().now());
                debug!(user = %event.author, ?remaining, "Command rate limited");
                Some(LimitHit::RateLimited(remaining))
            }
        }
    }

    /// Starts every cooldown for the invocation in `event`.
    pub fn apply(&self, event: &EventContext) {
        let now = Instant::now();

        for (scope, _) in &self.cooldowns {
            self.started.insert((*scope, scope.key(event)), now);
        }
    }

    /// Clears every running cooldown.
    pub fn reset(&self) {
        self.started.clear();
    }

    /// Drops expired cooldowns and idle rate limiter entries.
    pub fn purge(&self) {
        let now = Instant::now();
        let durations = &self.cooldowns;

        self.started.retain(|(scope, _), started| {
            durations
                .iter()
                .find(|(existing, _)| existing == scope)
                .is_some_and(|(_, duration)| now.duration_since(*started) < *duration)
        });

        if let Some(limiter) = &self.limiter {
            limiter.retain_recent();
        }
    }
}

impl fmt::Debug for UsageLimits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsageLimits")
            .field("cooldowns", &self.cooldowns)
            .field("active", &self.started.len())
            .field("rate_limited", &self.limiter.is_some())
            .finish()
    }
}
