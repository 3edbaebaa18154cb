//! Plain text converters.

use super::{relayed_with, CoalescingConverter, ConverterResult, SingleConverter};
use crate::fluent_args;
use crate::i18n::Localizer;
use serenity::all::CreateCommandOption;

/// Accepts any token, optionally bounded by length in characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringConverter {
    min_length: Option<usize>,
    max_length: Option<usize>,
}

impl StringConverter {
    /// A converter accepting any text.
    pub const fn new() -> Self {
        Self {
            min_length: None,
            max_length: None,
        }
    }

    /// Rejects values shorter than `min` characters.
    #[must_use]
    pub const fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Rejects values longer than `max` characters.
    #[must_use]
    pub const fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    fn check_length(&self, value: &str, ctx: &Localizer) -> ConverterResult<()> {
        let length = value.chars().count();

        if let Some(min) = self.min_length.filter(|min| length < *min) {
            return Err(relayed_with(ctx, "converters-string-error-too-short", &fluent_args!("min" => min)));
        }

        if let Some(max) = self.max_length.filter(|max| length > *max) {
            return Err(relayed_with(ctx, "converters-string-error-too-long", &fluent_args!("max" => max)));
        }

        Ok(Some(()))
    }
}

fn clamp_u16(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

impl SingleConverter for StringConverter {
    type Output = String;

    fn signature_type(&self) -> &'static str {
        "converters-string-signature-type"
    }

    fn show_type_in_signature(&self) -> bool {
        false
    }

    fn parse(&self, input: &str, ctx: &Localizer) -> ConverterResult<String> {
        self.check_length(input, ctx)?;
        Ok(Some(input.to_string()))
    }

    fn customise_option(&self, mut option: CreateCommandOption) -> CreateCommandOption {
        if let Some(min) = self.min_length {
            option = option.min_length(clamp_u16(min));
        }

        if let Some(max) = self.max_length {
            option = option.max_length(clamp_u16(max));
        }

        option
    }
}

/// Joins every remaining token with single spaces.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCoalescingConverter {
    inner: StringConverter,
}

impl StringCoalescingConverter {
    /// A converter taking the rest of the input.
    pub const fn new() -> Self {
        Self {
            inner: StringConverter::new(),
        }
    }

    /// Rejects joined values shorter than `min` characters.
    #[must_use]
    pub const fn min_length(mut self, min: usize) -> Self {
        self.inner = self.inner.min_length(min);
        self
    }

    /// Rejects joined values longer than `max` characters.
    #[must_use]
    pub const fn max_length(mut self, max: usize) -> Self {
        self.inner = self.inner.max_length(max);
        self
    }
}

impl CoalescingConverter for StringCoalescingConverter {
    type Output = String;

    fn signature_type(&self) -> &'static str {
        "converters-string-signature-type"
    }

    fn show_type_in_signature(&self) -> bool {
        false
    }

    fn parse(&self, tokens: &[String], ctx: &Localizer) -> ConverterResult<(usize, String)> {
        if tokens.is_empty() {
            return Ok(None);
        }

        let joined = tokens.join(" ");
        self.inner.check_length(&joined, ctx)?;

        Ok(Some((tokens.len(), joined)))
    }

    fn parse_option(&self, value: &super::OptionValue, ctx: &Localizer) -> ConverterResult<String> {
        self.inner.parse(&value.to_string(), ctx)
    }

    fn customise_option(&self, option: CreateCommandOption) -> CreateCommandOption {
        self.inner.customise_option(option)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converters::ConverterError;
    use crate::test_support::localizer;

    #[test]
    fn test_length_limits() {
        let ctx = localizer();
        let converter = StringConverter::new().min_length(2).max_length(4);

        assert_eq!(converter.parse("abc", &ctx).unwrap(), Some("abc".to_string()));
        assert_eq!(
            converter.parse("a", &ctx),
            Err(ConverterError::Relayed("Value must be at least 2 characters long".to_string()))
        );
        assert!(converter.parse("abcde", &ctx).is_err());
        // Characters, not bytes
        assert!(converter.parse("äöü", &ctx).unwrap().is_some());
    }

    #[test]
    fn test_coalescing_joins_all() {
        let ctx = localizer();
        let tokens = vec!["hello".to_string(), "there".to_string(), "world".to_string()];

        assert_eq!(
            StringCoalescingConverter::new().parse(&tokens, &ctx).unwrap(),
            Some((3, "hello there world".to_string()))
        );
        assert_eq!(StringCoalescingConverter::new().parse(&[], &ctx).unwrap(), None);
    }
}
