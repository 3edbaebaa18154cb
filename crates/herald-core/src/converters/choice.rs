//! Fixed-choice converter.

use super::{relayed_with, ConverterResult, SingleConverter};
use crate::fluent_args;
use crate::i18n::Localizer;
use serenity::all::CreateCommandOption;
use std::fmt;

/// Discord's limit on choices per option.
const MAX_SLASH_CHOICES: usize = 25;

/// Accepts one of a fixed set of names, case-insensitively, and maps it to
/// a value. The names become slash command choices.
#[derive(Clone)]
pub struct ChoiceConverter<T> {
    choices: Vec<(String, T)>,
}

impl<T> ChoiceConverter<T> {
    /// Builds a converter from `(name, value)` pairs.
    pub fn new<N: Into<String>>(choices: impl IntoIterator<Item = (N, T)>) -> Self {
        Self {
            choices: choices.into_iter().map(|(name, value)| (name.into(), value)).collect(),
        }
    }

    /// The accepted names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.choices.iter().map(|(name, _)| name.as_str())
    }
}

impl<T: fmt::Debug> fmt::Debug for ChoiceConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChoiceConverter").field("choices", &self.choices).finish()
    }
}

impl<T> SingleConverter for ChoiceConverter<T>
where
    T: Clone + Send + Sync + fmt::Debug + 'static,
{
    type Output = T;

    fn signature_type(&self) -> &'static str {
        "converters-choice-signature-type"
    }

    fn parse(&self, input: &str, ctx: &Localizer) -> ConverterResult<T> {
        let input = input.to_lowercase();
        let found = self.choices.iter().find(|(name, _)| name.to_lowercase() == input);

        match found {
            Some((_, value)) => Ok(Some(value.clone())),
            None => {
                let names = self.names().collect::<Vec<_>>().join(", ");
                Err(relayed_with(ctx, "converters-choice-error-invalid", &fluent_args!("choices" => names)))
            }
        }
    }

    fn customise_option(&self, option: CreateCommandOption) -> CreateCommandOption {
        self.names()
            .take(MAX_SLASH_CHOICES)
            .fold(option, |option, name| option.add_string_choice(name, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::localizer;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Animal {
        Cat,
        Dog,
    }

    #[test]
    fn test_case_insensitive_choice() {
        let ctx = localizer();
        let converter = ChoiceConverter::new([("cat", Animal::Cat), ("dog", Animal::Dog)]);

        assert_eq!(converter.parse("CAT", &ctx).unwrap(), Some(Animal::Cat));
        assert_eq!(converter.parse("dog", &ctx).unwrap(), Some(Animal::Dog));
        assert_eq!(
            converter.parse("bird", &ctx).unwrap_err().message(),
            "Value must be one of: cat, dog"
        );
    }
}
