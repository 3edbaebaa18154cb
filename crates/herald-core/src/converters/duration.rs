//! Duration parsing and converters.
//!
//! Durations are written as number and unit pairs, such as `1h30m`,
//! `2 days 4 hours` or `1w, 3d`. Units are English; weeks are folded into
//! days. A Discord timestamp (`<t:...>`) is accepted too and converted to
//! the period between now and that instant.

use super::{relayed_with, CoalescingConverter, ConverterError, ConverterResult, OptionValue, SingleConverter};
use super::timestamp::DiscordTimestamp;
use crate::fluent_args;
use crate::i18n::Localizer;
use chrono::Utc;
use herald_common::DatePeriod;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const DAYS_PER_WEEK: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

const UNITS: &[(&str, Unit)] = &[
    ("s", Unit::Seconds),
    ("sec", Unit::Seconds),
    ("secs", Unit::Seconds),
    ("second", Unit::Seconds),
    ("seconds", Unit::Seconds),
    ("m", Unit::Minutes),
    ("min", Unit::Minutes),
    ("mins", Unit::Minutes),
    ("minute", Unit::Minutes),
    ("minutes", Unit::Minutes),
    ("h", Unit::Hours),
    ("hr", Unit::Hours),
    ("hrs", Unit::Hours),
    ("hour", Unit::Hours),
    ("hours", Unit::Hours),
    ("d", Unit::Days),
    ("day", Unit::Days),
    ("days", Unit::Days),
    ("w", Unit::Weeks),
    ("week", Unit::Weeks),
    ("weeks", Unit::Weeks),
    ("mo", Unit::Months),
    ("month", Unit::Months),
    ("months", Unit::Months),
    ("y", Unit::Years),
    ("yr", Unit::Years),
    ("yrs", Unit::Years),
    ("year", Unit::Years),
    ("years", Unit::Years),
];

/// Why a duration string couldn't be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    /// Numbers and units don't pair up.
    #[error("every part of a duration needs a number and a unit")]
    BadUnitPairs,

    /// A unit isn't known.
    #[error("unknown duration unit `{0}`")]
    InvalidUnit(String),
}

impl DurationError {
    fn relay(&self, ctx: &Localizer) -> ConverterError {
        match self {
            Self::BadUnitPairs => ConverterError::Relayed(ctx.translate("converters-duration-error-bad-unit-pairs")),
            Self::InvalidUnit(unit) => relayed_with(
                ctx,
                "converters-duration-error-invalid-unit",
                &fluent_args!("unit" => unit.as_str()),
            ),
        }
    }
}

const fn is_value_char(c: char) -> bool {
    c.is_ascii_digit() || c == '-'
}

fn is_duration_char(c: char) -> bool {
    is_value_char(c) || matches!(c, ',' | '+') || UNITS.iter().any(|(name, _)| name.contains(c.to_ascii_lowercase()))
}

/// Parses a duration such as `1h30m` or `2 days, 4 hours`.
///
/// Spaces, commas and plus signs are ignored. An empty string is a zero
/// period.
pub fn parse_duration(input: &str) -> Result<DatePeriod, DurationError> {
    let buffer: Vec<char> = input.chars().filter(|c| !matches!(c, ',' | '+' | ' ')).collect();
    let mut values = Vec::new();
    let mut units = Vec::new();
    let mut index = 0;

    while index < buffer.len() {
        let value_run = is_value_char(buffer[index]);
        let start = index;

        while index < buffer.len() && is_value_char(buffer[index]) == value_run {
            index += 1;
        }

        let run: String = buffer[start..index].iter().collect();

        if value_run {
            values.push(run);
        } else {
            units.push(run);
        }
    }

    if values.len() != units.len() {
        return Err(DurationError::BadUnitPairs);
    }

    let mut period = DatePeriod::default();

    for (value, unit_name) in values.iter().zip(&units) {
        let unit = UNITS
            .iter()
            .find(|(name, _)| *name == unit_name.to_lowercase())
            .map(|(_, unit)| *unit)
            .ok_or_else(|| DurationError::InvalidUnit(unit_name.clone()))?;

        let value: i64 = value.parse().map_err(|_| DurationError::BadUnitPairs)?;

        let field = match unit {
            Unit::Seconds => &mut period.seconds,
            Unit::Minutes => &mut period.minutes,
            Unit::Hours => &mut period.hours,
            Unit::Days => &mut period.days,
            Unit::Weeks => {
                period.days = period
                    .days
                    .checked_add(value.checked_mul(DAYS_PER_WEEK).ok_or(DurationError::BadUnitPairs)?)
                    .ok_or(DurationError::BadUnitPairs)?;
                continue;
            }
            Unit::Months => &mut period.months,
            Unit::Years => &mut period.years,
        };

        *field = field.checked_add(value).ok_or(DurationError::BadUnitPairs)?;
    }

    Ok(period)
}

fn period_until(timestamp: &DiscordTimestamp) -> DatePeriod {
    let seconds = (timestamp.time - Utc::now()).num_seconds();

    u64::try_from(seconds).map_or(
        DatePeriod {
            seconds,
            ..DatePeriod::default()
        },
        |positive| DatePeriod::from_std(Duration::from_secs(positive)),
    )
}

fn check_positive(period: DatePeriod, positive_only: bool, ctx: &Localizer) -> Result<DatePeriod, ConverterError> {
    if positive_only && !period.is_positive() {
        Err(ConverterError::Relayed(ctx.translate("converters-duration-error-positive-only")))
    } else {
        Ok(period)
    }
}

fn parse_strict(input: &str, positive_only: bool, ctx: &Localizer) -> ConverterResult<DatePeriod> {
    let period = match DiscordTimestamp::parse(input) {
        Some(timestamp) => period_until(&timestamp),
        None => parse_duration(input).map_err(|e| e.relay(ctx))?,
    };

    check_positive(period, positive_only, ctx).map(Some)
}

/// Converts a single token such as `1h30m`.
#[derive(Debug, Clone, Copy)]
pub struct DurationConverter {
    positive_only: bool,
}

impl Default for DurationConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl DurationConverter {
    /// A converter that only accepts positive durations.
    pub const fn new() -> Self {
        Self { positive_only: true }
    }

    /// Whether zero and negative durations are rejected.
    #[must_use]
    pub const fn positive_only(mut self, positive_only: bool) -> Self {
        self.positive_only = positive_only;
        self
    }
}

impl SingleConverter for DurationConverter {
    type Output = DatePeriod;

    fn signature_type(&self) -> &'static str {
        "converters-duration-signature-type"
    }

    fn parse(&self, input: &str, ctx: &Localizer) -> ConverterResult<DatePeriod> {
        if input.is_empty() {
            return Err(relayed_with(ctx, "converters-duration-error-invalid", &fluent_args!("value" => input)));
        }

        parse_strict(input, self.positive_only, ctx)
    }
}

/// Converts a duration spread over several tokens, such as
/// `1 hour and 30 minutes`.
///
/// Tokens are taken for as long as they extend a valid duration. Words from
/// the `utils-durations-ignored-words` translation are skipped.
#[derive(Debug, Clone, Copy)]
pub struct DurationCoalescingConverter {
    positive_only: bool,
    should_throw: bool,
}

impl Default for DurationCoalescingConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl DurationCoalescingConverter {
    /// A lenient converter that only accepts positive durations.
    pub const fn new() -> Self {
        Self {
            positive_only: true,
            should_throw: false,
        }
    }

    /// Whether zero and negative durations are rejected.
    #[must_use]
    pub const fn positive_only(mut self, positive_only: bool) -> Self {
        self.positive_only = positive_only;
        self
    }

    /// Whether a token that breaks the duration is reported instead of
    /// ending the argument quietly.
    #[must_use]
    pub const fn should_throw(mut self, should_throw: bool) -> Self {
        self.should_throw = should_throw;
        self
    }

    fn ignored_words(ctx: &Localizer) -> Vec<String> {
        ctx.translate("utils-durations-ignored-words")
            .split(',')
            .map(|word| word.trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect()
    }
}

impl CoalescingConverter for DurationCoalescingConverter {
    type Output = DatePeriod;

    fn signature_type(&self) -> &'static str {
        "converters-duration-signature-type"
    }

    fn accepts_token(&self, token: &str, ctx: &Localizer) -> bool {
        DiscordTimestamp::parse(token).is_some()
            || token.chars().all(is_duration_char)
            || Self::ignored_words(ctx).contains(&token.to_lowercase())
    }

    fn parse(&self, tokens: &[String], ctx: &Localizer) -> ConverterResult<(usize, DatePeriod)> {
        if let Some(timestamp) = tokens.first().and_then(|token| DiscordTimestamp::parse(token)) {
            let period = check_positive(period_until(&timestamp), self.positive_only, ctx)?;
            return Ok(Some((1, period)));
        }

        let ignored = Self::ignored_words(ctx);
        let mut parts: Vec<String> = Vec::new();
        let mut consumed = 0;
        let mut index = 0;
        let mut failure = None;

        while index < tokens.len() {
            let token = &tokens[index];

            if ignored.contains(&token.to_lowercase()) {
                index += 1;
                continue;
            }

            let so_far = parts.concat();

            let alone = parse_duration(token).and_then(|_| parse_duration(&format!("{so_far}{token}")));

            let error = match alone {
                Ok(_) => {
                    parts.push(token.clone());
                    index += 1;
                    consumed = index;
                    continue;
                }
                Err(e) => e,
            };

            // `5 minutes` arrives as two tokens
            let Some(next) = tokens.get(index + 1) else {
                failure = Some(error);
                break;
            };

            let combined = format!("{token}{next}");

            match parse_duration(&combined).and_then(|_| parse_duration(&format!("{so_far}{combined}"))) {
                Ok(_) => {
                    parts.push(combined);
                    index += 2;
                    consumed = index;
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if let Some(error) = failure {
            debug!(%error, "Duration ended at an invalid token");

            if self.should_throw {
                return Err(error.relay(ctx));
            }
        }

        if parts.is_empty() {
            return Ok(None);
        }

        let period = parse_duration(&parts.concat()).map_err(|e| e.relay(ctx))?;
        let period = check_positive(period, self.positive_only, ctx)?;

        Ok(Some((consumed, period)))
    }

    fn parse_option(&self, value: &OptionValue, ctx: &Localizer) -> ConverterResult<DatePeriod> {
        let ignored = Self::ignored_words(ctx);
        let input: Vec<String> = value
            .to_string()
            .split_whitespace()
            .filter(|word| !ignored.contains(&word.to_lowercase()))
            .map(ToString::to_string)
            .collect();

        parse_strict(&input.concat(), self.positive_only, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::localizer;

    fn tokens(input: &str) -> Vec<String> {
        input.split_whitespace().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_duration_forms() {
        let period = parse_duration("1h30m").unwrap();
        assert_eq!((period.hours, period.minutes), (1, 30));

        let period = parse_duration("2 weeks, 1 day").unwrap();
        assert_eq!(period.days, 15);

        let period = parse_duration("1y2mo").unwrap();
        assert_eq!(period.to_string(), "1y 2mo");

        assert_eq!(parse_duration("").unwrap(), DatePeriod::default());
    }

    #[test]
    fn test_parse_duration_errors() {
        assert_eq!(parse_duration("5"), Err(DurationError::BadUnitPairs));
        assert_eq!(parse_duration("5 parsecs"), Err(DurationError::InvalidUnit("parsecs".to_string())));
        assert_eq!(parse_duration("99999999999999999999s"), Err(DurationError::BadUnitPairs));
    }

    #[test]
    fn test_single_converter() {
        let ctx = localizer();

        assert_eq!(DurationConverter::new().parse("10m", &ctx).unwrap().unwrap().minutes, 10);
        assert_eq!(
            DurationConverter::new().parse("-10m", &ctx).unwrap_err().message(),
            "Please specify a positive duration"
        );
        assert!(DurationConverter::new().positive_only(false).parse("-10m", &ctx).is_ok());
        assert_eq!(
            DurationConverter::new().parse("10q", &ctx).unwrap_err().message(),
            "Invalid duration unit specified: q"
        );
    }

    #[test]
    fn test_coalescing_stops_at_first_non_duration() {
        let ctx = localizer();
        let converter = DurationCoalescingConverter::new();

        let (consumed, period) = converter
            .parse(&tokens("1 hour and 30 minutes remind me"), &ctx)
            .unwrap()
            .unwrap();

        assert_eq!(consumed, 5);
        assert_eq!((period.hours, period.minutes), (1, 30));
    }

    #[test]
    fn test_coalescing_nothing_parsed() {
        let ctx = localizer();

        assert_eq!(DurationCoalescingConverter::new().parse(&tokens("hello"), &ctx).unwrap(), None);
        assert!(DurationCoalescingConverter::new()
            .should_throw(true)
            .parse(&tokens("5 parsecs"), &ctx)
            .is_err());
    }

    #[test]
    fn test_coalescing_token_filter() {
        let ctx = localizer();
        let converter = DurationCoalescingConverter::new();

        assert!(converter.accepts_token("30m", &ctx));
        assert!(converter.accepts_token("and", &ctx));
        assert!(!converter.accepts_token("remind!", &ctx));
    }

    #[test]
    fn test_coalescing_option() {
        let ctx = localizer();
        let period = DurationCoalescingConverter::new()
            .parse_option(&OptionValue::String("1 day and 2 hours".to_string()), &ctx)
            .unwrap()
            .unwrap();

        assert_eq!((period.days, period.hours), (1, 2));
    }
}
