//! Discord timestamp converter.

use super::{relayed_with, ConverterResult, SingleConverter};
use crate::fluent_args;
use crate::i18n::Localizer;
use chrono::{DateTime, Utc};
use std::fmt;

/// Formats Discord accepts after the timestamp, as in `<t:1700000000:R>`.
const STYLES: &[char] = &['t', 'T', 'd', 'D', 'f', 'F', 'R'];

/// A parsed `<t:seconds[:style]>` timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscordTimestamp {
    /// The instant the timestamp points at.
    pub time: DateTime<Utc>,
    /// The display style letter, if one was given.
    pub style: Option<char>,
}

impl DiscordTimestamp {
    /// Parses `<t:seconds>` or `<t:seconds:style>`.
    pub fn parse(input: &str) -> Option<Self> {
        let inner = input.strip_prefix("<t:")?.strip_suffix('>')?;
        let (seconds, style) = match inner.split_once(':') {
            Some((seconds, style)) => {
                let mut chars = style.chars();
                let style = chars.next().filter(|c| STYLES.contains(c))?;

                if chars.next().is_some() {
                    return None;
                }

                (seconds, Some(style))
            }
            None => (inner, None),
        };

        let time = DateTime::from_timestamp(seconds.parse().ok()?, 0)?;
        Some(Self { time, style })
    }
}

impl fmt::Display for DiscordTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.style {
            Some(style) => write!(f, "<t:{}:{style}>", self.time.timestamp()),
            None => write!(f, "<t:{}>", self.time.timestamp()),
        }
    }
}

/// Accepts Discord's `<t:...>` timestamp markup.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampConverter;

impl SingleConverter for TimestampConverter {
    type Output = DiscordTimestamp;

    fn signature_type(&self) -> &'static str {
        "converters-timestamp-signature-type"
    }

    fn parse(&self, input: &str, ctx: &Localizer) -> ConverterResult<DiscordTimestamp> {
        DiscordTimestamp::parse(input)
            .map(Some)
            .ok_or_else(|| relayed_with(ctx, "converters-timestamp-error-invalid", &fluent_args!("value" => input)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::localizer;

    #[test]
    fn test_parse_timestamps() {
        let plain = DiscordTimestamp::parse("<t:1700000000>").unwrap();
        assert_eq!(plain.time.timestamp(), 1_700_000_000);
        assert_eq!(plain.style, None);

        let styled = DiscordTimestamp::parse("<t:1700000000:R>").unwrap();
        assert_eq!(styled.style, Some('R'));
        assert_eq!(styled.to_string(), "<t:1700000000:R>");
    }

    #[test]
    fn test_reject_bad_timestamps() {
        let ctx = localizer();

        for input in ["1700000000", "<t:abc>", "<t:1700000000:X>", "<t:1700000000:RR>"] {
            assert!(TimestampConverter.parse(input, &ctx).is_err(), "{input}");
        }
    }
}
