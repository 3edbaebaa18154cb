//! Turning user input into [`ParsedArguments`](crate::arguments::ParsedArguments).

use crate::arguments::Argument;
use crate::converters::ConverterError;
use crate::fluent_args;
use crate::i18n::Localizer;
use herald_common::{ArgumentParsingError, FrameworkError};
use tracing::warn;

mod chat;
mod signature;
mod slash;

pub use chat::ChatCommandParser;
pub use signature::signature;
pub use slash::{collect_options, selected_subcommand, SlashCommandParser};

pub(crate) fn invalid_value(argument: &Argument, ctx: &Localizer) -> FrameworkError {
    let kind = ctx.translate(argument.error_type());
    let reason = ctx.translate_with(
        "argument-parser-error-invalid-value",
        &fluent_args!("name" => argument.name(), "type" => kind),
    );

    ArgumentParsingError::for_argument(reason, argument.name()).into()
}

/// Surfaces a converter error that the relay rules decided to show.
pub(crate) fn converter_failure(argument: &Argument, error: ConverterError, wrap: bool, ctx: &Localizer) -> FrameworkError {
    match error {
        ConverterError::Relayed(message) => {
            let reason = if wrap {
                ctx.translate_with(
                    "argument-parser-error-errored-argument",
                    &fluent_args!("name" => argument.name(), "reason" => message),
                )
            } else {
                message
            };

            ArgumentParsingError::for_argument(reason, argument.name()).into()
        }

        ConverterError::Internal(message) => {
            warn!(argument = argument.name(), error = %message, "Converter failed");
            FrameworkError::invalid_argument(argument.name(), message)
        }
    }
}
