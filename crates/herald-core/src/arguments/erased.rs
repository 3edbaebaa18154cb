//! Type-erased converters, so arguments of different types share one list.

use crate::converters::{CoalescingConverter, ConverterError, OptionValue, SingleConverter};
use crate::i18n::Localizer;
use serenity::all::{CommandOptionType, CreateCommandOption};
use std::any::Any;

/// A converted value of any argument type.
pub type ArgValue = Box<dyn Any + Send + Sync>;

pub(crate) type ErasedResult<T> = Result<Option<T>, ConverterError>;

pub(crate) trait ErasedConverter: Send + Sync {
    fn signature_type(&self) -> &'static str;
    fn error_type(&self) -> &'static str;
    fn show_type_in_signature(&self) -> bool;
    fn option_type(&self) -> CommandOptionType;
    fn customise_option(&self, option: CreateCommandOption) -> CreateCommandOption;
    fn accepts_token(&self, token: &str, ctx: &Localizer) -> bool;
    fn parse_one(&self, input: &str, ctx: &Localizer) -> ErasedResult<ArgValue>;
    fn parse_many(&self, tokens: &[String], ctx: &Localizer) -> ErasedResult<(usize, ArgValue)>;
    fn parse_option(&self, value: &OptionValue, ctx: &Localizer) -> ErasedResult<ArgValue>;
    fn collect_list(&self, values: Vec<ArgValue>) -> ArgValue;
}

fn boxed<T: Send + Sync + 'static>(value: T) -> ArgValue {
    Box::new(value)
}

fn downcast_all<T: 'static>(values: Vec<ArgValue>) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| value.downcast::<T>().ok())
        .map(|value| *value)
        .collect()
}

pub(crate) struct Single<C>(pub C);

impl<C: SingleConverter> ErasedConverter for Single<C> {
    fn signature_type(&self) -> &'static str {
        self.0.signature_type()
    }

    fn error_type(&self) -> &'static str {
        self.0.error_type()
    }

    fn show_type_in_signature(&self) -> bool {
        self.0.show_type_in_signature()
    }

    fn option_type(&self) -> CommandOptionType {
        self.0.option_type()
    }

    fn customise_option(&self, option: CreateCommandOption) -> CreateCommandOption {
        self.0.customise_option(option)
    }

    fn accepts_token(&self, _token: &str, _ctx: &Localizer) -> bool {
        true
    }

    fn parse_one(&self, input: &str, ctx: &Localizer) -> ErasedResult<ArgValue> {
        Ok(self.0.parse(input, ctx)?.map(boxed))
    }

    fn parse_many(&self, tokens: &[String], ctx: &Localizer) -> ErasedResult<(usize, ArgValue)> {
        match tokens.first() {
            Some(token) => Ok(self.parse_one(token, ctx)?.map(|value| (1, value))),
            None => Ok(None),
        }
    }

    fn parse_option(&self, value: &OptionValue, ctx: &Localizer) -> ErasedResult<ArgValue> {
        Ok(self.0.parse_option(value, ctx)?.map(boxed))
    }

    fn collect_list(&self, values: Vec<ArgValue>) -> ArgValue {
        boxed(downcast_all::<C::Output>(values))
    }
}

pub(crate) struct Coalescing<C>(pub C);

impl<C: CoalescingConverter> ErasedConverter for Coalescing<C> {
    fn signature_type(&self) -> &'static str {
        self.0.signature_type()
    }

    fn error_type(&self) -> &'static str {
        self.0.error_type()
    }

    fn show_type_in_signature(&self) -> bool {
        self.0.show_type_in_signature()
    }

    fn option_type(&self) -> CommandOptionType {
        self.0.option_type()
    }

    fn customise_option(&self, option: CreateCommandOption) -> CreateCommandOption {
        self.0.customise_option(option)
    }

    fn accepts_token(&self, token: &str, ctx: &Localizer) -> bool {
        self.0.accepts_token(token, ctx)
    }

    fn parse_one(&self, input: &str, ctx: &Localizer) -> ErasedResult<ArgValue> {
        let tokens = [input.to_string()];
        Ok(self.0.parse(&tokens, ctx)?.map(|(_, value)| boxed(value)))
    }

    fn parse_many(&self, tokens: &[String], ctx: &Localizer) -> ErasedResult<(usize, ArgValue)> {
        Ok(self.0.parse(tokens, ctx)?.map(|(count, value)| (count, boxed(value))))
    }

    fn parse_option(&self, value: &OptionValue, ctx: &Localizer) -> ErasedResult<ArgValue> {
        Ok(self.0.parse_option(value, ctx)?.map(boxed))
    }

    fn collect_list(&self, values: Vec<ArgValue>) -> ArgValue {
        boxed(downcast_all::<C::Output>(values))
    }
}
