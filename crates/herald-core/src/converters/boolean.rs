//! Yes/no converter.

use super::{relayed_with, ConverterResult, OptionValue, SingleConverter};
use crate::fluent_args;
use crate::i18n::Localizer;
use serenity::all::CommandOptionType;

/// Converts yes/no style answers.
///
/// The accepted words come from the `converters-boolean-true-values` and
/// `converters-boolean-false-values` translations of the user's locale, plus
/// those of the bot's default locale.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanConverter;

fn word_list(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split(',').map(|word| word.trim().to_lowercase()).filter(|word| !word.is_empty())
}

fn matches(ctx: &Localizer, key: &str, input: &str) -> bool {
    word_list(&ctx.translate(key)).any(|word| word == input)
        || word_list(&ctx.translate_default(key)).any(|word| word == input)
}

impl SingleConverter for BooleanConverter {
    type Output = bool;

    fn signature_type(&self) -> &'static str {
        "converters-boolean-signature-type"
    }

    fn parse(&self, input: &str, ctx: &Localizer) -> ConverterResult<bool> {
        let input = input.trim().to_lowercase();

        if matches(ctx, "converters-boolean-true-values", &input) {
            Ok(Some(true))
        } else if matches(ctx, "converters-boolean-false-values", &input) {
            Ok(Some(false))
        } else {
            Err(relayed_with(ctx, "converters-boolean-error-invalid", &fluent_args!("value" => input)))
        }
    }

    fn parse_option(&self, value: &OptionValue, ctx: &Localizer) -> ConverterResult<bool> {
        match value {
            OptionValue::Boolean(b) => Ok(Some(*b)),
            other => self.parse(&other.to_string(), ctx),
        }
    }

    fn option_type(&self) -> CommandOptionType {
        CommandOptionType::Boolean
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::localizer;
    use herald_i18n::parse_locale;

    #[test]
    fn test_english_words() {
        let ctx = localizer();

        for word in ["true", "Yes", "on", "1"] {
            assert_eq!(BooleanConverter.parse(word, &ctx).unwrap(), Some(true), "{word}");
        }

        for word in ["false", "NO", "off", "0"] {
            assert_eq!(BooleanConverter.parse(word, &ctx).unwrap(), Some(false), "{word}");
        }

        assert_eq!(
            BooleanConverter.parse("maybe", &ctx).unwrap_err().message(),
            "Value `maybe` is not yes or no"
        );
    }

    #[test]
    fn test_localized_words() {
        let ctx = localizer().with_locale(parse_locale("de").unwrap());

        assert_eq!(BooleanConverter.parse("ja", &ctx).unwrap(), Some(true));
        assert_eq!(BooleanConverter.parse("aus", &ctx).unwrap(), Some(false));
        // Default locale words keep working
        assert_eq!(BooleanConverter.parse("yes", &ctx).unwrap(), Some(true));
    }
}
