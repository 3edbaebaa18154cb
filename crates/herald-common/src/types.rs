//! Common type definitions shared by the framework crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;
const DAYS_PER_MONTH: i64 = 30;
const DAYS_PER_YEAR: i64 = 365;

/// Lifecycle state of an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionState {
    /// Not loaded, the initial and final state.
    #[default]
    Unloaded,
    /// Setup is running.
    Loading,
    /// Setup finished and commands are registered.
    Loaded,
    /// Setup returned an error.
    FailedLoading,
    /// Unload is running.
    Unloading,
    /// Unload returned an error.
    FailedUnloading,
}

impl ExtensionState {
    /// Whether the extension currently contributes commands.
    pub const fn is_loaded(self) -> bool {
        matches!(self, Self::Loaded)
    }
}

impl fmt::Display for ExtensionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unloaded => "unloaded",
            Self::Loading => "loading",
            Self::Loaded => "loaded",
            Self::FailedLoading => "failed loading",
            Self::Unloading => "unloading",
            Self::FailedUnloading => "failed unloading",
        };

        f.write_str(name)
    }
}

/// Which command surface an invocation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// A prefixed (or mention-invoked) message command.
    Chat,
    /// An application (slash) command interaction.
    Slash,
    /// A context menu command on a message.
    Message,
    /// A context menu command on a user.
    User,
}

impl CommandKind {
    /// Whether the command is invoked from a context menu.
    pub const fn is_context_menu(self) -> bool {
        matches!(self, Self::Message | Self::User)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chat => f.write_str("chat"),
            Self::Slash => f.write_str("slash"),
            Self::Message => f.write_str("message"),
            Self::User => f.write_str("user"),
        }
    }
}

/// A calendar-style period of time.
///
/// Months and years are kept separate from days, since their length depends
/// on where in the calendar the period is applied. Conversions to a fixed
/// [`Duration`] use 30-day months and 365-day years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DatePeriod {
    /// Whole years.
    pub years: i64,
    /// Whole months.
    pub months: i64,
    /// Whole days, weeks included.
    pub days: i64,
    /// Whole hours.
    pub hours: i64,
    /// Whole minutes.
    pub minutes: i64,
    /// Whole seconds.
    pub seconds: i64,
}

impl DatePeriod {
    /// Build a period from a fixed duration, splitting it into days, hours,
    /// minutes and seconds.
    pub fn from_std(duration: Duration) -> Self {
        let total = i64::try_from(duration.as_secs()).unwrap_or(i64::MAX);

        Self {
            days: total / SECONDS_PER_DAY,
            hours: (total % SECONDS_PER_DAY) / SECONDS_PER_HOUR,
            minutes: (total % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE,
            seconds: total % SECONDS_PER_MINUTE,
            ..Self::default()
        }
    }

    /// Total length in seconds, approximating months and years.
    pub const fn approximate_seconds(&self) -> i64 {
        let days = self.days + self.months * DAYS_PER_MONTH + self.years * DAYS_PER_YEAR;

        days * SECONDS_PER_DAY
            + self.hours * SECONDS_PER_HOUR
            + self.minutes * SECONDS_PER_MINUTE
            + self.seconds
    }

    /// Convert to a fixed duration, or `None` if the period is negative.
    pub fn to_std(&self) -> Option<Duration> {
        u64::try_from(self.approximate_seconds())
            .ok()
            .map(Duration::from_secs)
    }

    /// Whether every component is zero.
    pub const fn is_zero(&self) -> bool {
        self.years == 0
            && self.months == 0
            && self.days == 0
            && self.hours == 0
            && self.minutes == 0
            && self.seconds == 0
    }

    /// Whether the period points forwards in time.
    pub const fn is_positive(&self) -> bool {
        self.approximate_seconds() > 0
    }
}

impl std::ops::Add for DatePeriod {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            years: self.years + rhs.years,
            months: self.months + rhs.months,
            days: self.days + rhs.days,
            hours: self.hours + rhs.hours,
            minutes: self.minutes + rhs.minutes,
            seconds: self.seconds + rhs.seconds,
        }
    }
}

impl fmt::Display for DatePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0s");
        }

        let parts = [
            (self.years, "y"),
            (self.months, "mo"),
            (self.days, "d"),
            (self.hours, "h"),
            (self.minutes, "m"),
            (self.seconds, "s"),
        ];

        let rendered: Vec<String> = parts
            .iter()
            .filter(|(value, _)| *value != 0)
            .map(|(value, unit)| format!("{value}{unit}"))
            .collect();

        f.write_str(&rendered.join(" "))
    }
}
