//! Numeric converters.

use super::{relayed_with, ConverterResult, OptionValue, SingleConverter};
use crate::fluent_args;
use crate::i18n::Localizer;
use serenity::all::{CommandOptionType, CreateCommandOption};

/// Converts whole numbers, in any radix from 2 to 36.
#[derive(Debug, Clone, Copy)]
pub struct IntConverter {
    radix: u32,
    min: Option<i64>,
    max: Option<i64>,
}

impl Default for IntConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl IntConverter {
    /// A base-10 converter without limits.
    pub const fn new() -> Self {
        Self {
            radix: 10,
            min: None,
            max: None,
        }
    }

    /// Parses numbers in `radix`. Values outside 2..=36 fall back to 10.
    #[must_use]
    pub const fn radix(mut self, radix: u32) -> Self {
        self.radix = if matches!(radix, 2..=36) { radix } else { 10 };
        self
    }

    /// Smallest accepted value.
    #[must_use]
    pub const fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Largest accepted value.
    #[must_use]
    pub const fn max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    fn check_bounds(&self, value: i64, ctx: &Localizer) -> ConverterResult<i64> {
        if let Some(min) = self.min.filter(|min| value < *min) {
            return Err(relayed_with(ctx, "converters-number-error-too-small", &fluent_args!("min" => min)));
        }

        if let Some(max) = self.max.filter(|max| value > *max) {
            return Err(relayed_with(ctx, "converters-number-error-too-large", &fluent_args!("max" => max)));
        }

        Ok(Some(value))
    }
}

impl SingleConverter for IntConverter {
    type Output = i64;

    fn signature_type(&self) -> &'static str {
        "converters-number-signature-type"
    }

    fn parse(&self, input: &str, ctx: &Localizer) -> ConverterResult<i64> {
        let value = i64::from_str_radix(input, self.radix).map_err(|_| {
            if self.radix == 10 {
                relayed_with(ctx, "converters-number-error-invalid", &fluent_args!("value" => input))
            } else {
                relayed_with(
                    ctx,
                    "converters-number-error-invalid-radix",
                    &fluent_args!("value" => input, "radix" => self.radix),
                )
            }
        })?;

        self.check_bounds(value, ctx)
    }

    fn parse_option(&self, value: &OptionValue, ctx: &Localizer) -> ConverterResult<i64> {
        match value {
            OptionValue::Integer(i) => self.check_bounds(*i, ctx),
            other => self.parse(&other.to_string(), ctx),
        }
    }

    fn option_type(&self) -> CommandOptionType {
        // Discord only sends base-10 integers
        if self.radix == 10 {
            CommandOptionType::Integer
        } else {
            CommandOptionType::String
        }
    }

    fn customise_option(&self, mut option: CreateCommandOption) -> CreateCommandOption {
        if self.radix != 10 {
            return option;
        }

        // Negative limits are still enforced when parsing
        if let Some(min) = self.min.and_then(|min| u64::try_from(min).ok()) {
            option = option.min_int_value(min);
        }

        if let Some(max) = self.max.and_then(|max| u64::try_from(max).ok()) {
            option = option.max_int_value(max);
        }

        option
    }
}

/// Converts decimal numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalConverter {
    min: Option<f64>,
    max: Option<f64>,
}

impl DecimalConverter {
    /// A converter without limits.
    pub const fn new() -> Self {
        Self { min: None, max: None }
    }

    /// Smallest accepted value.
    #[must_use]
    pub const fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Largest accepted value.
    #[must_use]
    pub const fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    fn check_bounds(&self, value: f64, ctx: &Localizer) -> ConverterResult<f64> {
        if let Some(min) = self.min.filter(|min| value < *min) {
            return Err(relayed_with(ctx, "converters-number-error-too-small", &fluent_args!("min" => min)));
        }

        if let Some(max) = self.max.filter(|max| value > *max) {
            return Err(relayed_with(ctx, "converters-number-error-too-large", &fluent_args!("max" => max)));
        }

        Ok(Some(value))
    }
}

impl SingleConverter for DecimalConverter {
    type Output = f64;

    fn signature_type(&self) -> &'static str {
        "converters-decimal-signature-type"
    }

    fn parse(&self, input: &str, ctx: &Localizer) -> ConverterResult<f64> {
        let value: f64 = input
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite())
            .ok_or_else(|| relayed_with(ctx, "converters-decimal-error-invalid", &fluent_args!("value" => input)))?;

        self.check_bounds(value, ctx)
    }

    fn parse_option(&self, value: &OptionValue, ctx: &Localizer) -> ConverterResult<f64> {
        match value {
            OptionValue::Number(n) => self.check_bounds(*n, ctx),
            #[allow(clippy::cast_precision_loss)]
            OptionValue::Integer(i) => self.check_bounds(*i as f64, ctx),
            other => self.parse(&other.to_string(), ctx),
        }
    }

    fn option_type(&self) -> CommandOptionType {
        CommandOptionType::Number
    }

    fn customise_option(&self, mut option: CreateCommandOption) -> CreateCommandOption {
        if let Some(min) = self.min {
            option = option.min_number_value(min);
        }

        if let Some(max) = self.max {
            option = option.max_number_value(max);
        }

        option
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::localizer;
    use proptest::prelude::*;

    #[test]
    fn test_int_parsing() {
        let ctx = localizer();
        let converter = IntConverter::new();

        assert_eq!(converter.parse("42", &ctx).unwrap(), Some(42));
        assert_eq!(converter.parse("-7", &ctx).unwrap(), Some(-7));
        assert_eq!(
            converter.parse("abc", &ctx).unwrap_err().message(),
            "Value `abc` is not a valid number"
        );
    }

    #[test]
    fn test_int_radix_and_bounds() {
        let ctx = localizer();

        assert_eq!(IntConverter::new().radix(16).parse("ff", &ctx).unwrap(), Some(255));
        assert_eq!(
            IntConverter::new().radix(2).parse("12", &ctx).unwrap_err().message(),
            "Value `12` is not a valid base-2 number"
        );

        let bounded = IntConverter::new().min(1).max(10);
        assert_eq!(bounded.parse("0", &ctx).unwrap_err().message(), "Value must be at least 1");
        assert_eq!(bounded.parse("11", &ctx).unwrap_err().message(), "Value must be at most 10");
        assert_eq!(bounded.parse_option(&OptionValue::Integer(5), &ctx).unwrap(), Some(5));
    }

    #[test]
    fn test_decimal_parsing() {
        let ctx = localizer();
        let converter = DecimalConverter::new().max(1.0);

        assert_eq!(converter.parse("0.5", &ctx).unwrap(), Some(0.5));
        assert!(converter.parse("1.5", &ctx).is_err());
        assert!(converter.parse("NaN", &ctx).is_err());
        assert!(converter.parse("seven", &ctx).is_err());
    }

    proptest! {
        #[test]
        fn test_property_int_roundtrip(value in any::<i64>()) {
            let ctx = localizer();
            prop_assert_eq!(IntConverter::new().parse(&value.to_string(), &ctx).unwrap(), Some(value));
        }
    }
}
