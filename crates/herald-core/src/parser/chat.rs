//! Argument parsing for prefixed message commands.

use super::{converter_failure, invalid_value};
use crate::arguments::{ArgValue, Argument, ArgumentKind, Arguments, ParsedArguments};
use crate::converters::ConverterError;
use crate::fluent_args;
use crate::i18n::Localizer;
use herald_common::{ArgumentParsingError, FrameworkError, Result};
use herald_parser::StringParser;
use std::collections::HashMap;
use tracing::{debug, trace};

type Outcome<T> = std::result::Result<Option<T>, ConverterError>;

/// Parses chat command input into arguments.
///
/// Arguments are filled in declaration order. When keyword arguments are
/// allowed, `--name value` and `name=value` tokens are pulled out first and
/// take priority over positional input for the argument they name.
pub struct ChatCommandParser;

impl ChatCommandParser {
    /// Parses the rest of `parser` into `arguments`.
    pub fn parse(
        arguments: &Arguments,
        parser: &mut StringParser,
        keyword_arguments: bool,
        ctx: &Localizer,
    ) -> Result<ParsedArguments> {
        arguments.validate()?;

        let keywords = if keyword_arguments {
            collect_keywords(parser)
        } else {
            trace!("Skipping keyword arguments, the command disallows them");
            HashMap::new()
        };

        let mut values = Vec::with_capacity(arguments.len());
        let mut filled = Vec::with_capacity(arguments.len());

        for argument in arguments {
            let kwargs = keywords.get(&argument.name().to_lowercase()).map(Vec::as_slice);

            trace!(argument = argument.name(), keyword_values = ?kwargs, "Parsing argument");

            if !parser.has_next() && kwargs.is_none() {
                values.push(None);
                filled.push(false);
                continue;
            }

            let value = parse_argument(argument, parser, kwargs, ctx)?;

            filled.push(value.is_some());
            values.push(value);
        }

        check_required(arguments, &filled, ctx)?;

        let values = arguments
            .iter()
            .zip(values)
            .map(|(argument, value)| argument.finish(value))
            .collect();

        Ok(ParsedArguments::new(arguments, values))
    }
}

fn collect_keywords(parser: &mut StringParser) -> HashMap<String, Vec<String>> {
    let mut keywords: HashMap<String, Vec<String>> = HashMap::new();

    for token in parser.parse_named() {
        keywords.entry(token.name.to_lowercase()).or_default().push(token.data);
    }

    trace!(count = keywords.len(), "Parsed keyword arguments");
    keywords
}

/// Whether a converter error is shown to the user, or the argument quietly
/// left unfilled.
const fn should_relay(kind: ArgumentKind, has_kwargs: bool, error: &ConverterError) -> bool {
    let relayed = error.is_relayed();

    match kind {
        ArgumentKind::Single | ArgumentKind::Coalescing => true,
        ArgumentKind::Defaulting { output_error } => relayed && (output_error || has_kwargs),
        ArgumentKind::Optional { output_error } | ArgumentKind::DefaultingCoalescing { output_error } => {
            if relayed {
                output_error || has_kwargs
            } else {
                has_kwargs
            }
        }
        ArgumentKind::List { required } => required,
        ArgumentKind::OptionalCoalescing { output_error } => output_error || has_kwargs,
    }
}

fn settle<T>(argument: &Argument, has_kwargs: bool, outcome: Outcome<T>, ctx: &Localizer) -> Result<Option<T>> {
    match outcome {
        Ok(value) => Ok(value),
        Err(error) if should_relay(argument.kind(), has_kwargs, &error) => {
            Err(converter_failure(argument, error, true, ctx))
        }
        Err(error) => {
            debug!(argument = argument.name(), error = %error, "Ignoring converter error");
            Ok(None)
        }
    }
}

fn parse_argument(
    argument: &Argument,
    parser: &mut StringParser,
    kwargs: Option<&[String]>,
    ctx: &Localizer,
) -> Result<Option<ArgValue>> {
    let has_kwargs = kwargs.is_some();

    if argument.kind().is_single_input() {
        let outcome = match kwargs {
            Some([value]) => argument.converter().parse_one(value, ctx),
            Some(values) => {
                let reason = ctx.translate_with(
                    "argument-parser-error-requires-one-value",
                    &fluent_args!("name" => argument.name(), "count" => values.len()),
                );

                return Err(ArgumentParsingError::for_argument(reason, argument.name()).into());
            }
            None => parse_positional(argument, parser, ctx),
        };

        let value = settle(argument, has_kwargs, outcome, ctx)?;
        check_single(argument, has_kwargs, value, ctx)
    } else {
        let outcome = match kwargs {
            Some(values) => parse_keyword_values(argument, values, ctx),
            None if argument.kind().is_list() => parse_list(argument, parser, ctx),
            None => parse_coalescing(argument, parser, ctx),
        };

        let value = settle(argument, has_kwargs, outcome, ctx)?;
        check_counted(argument, kwargs, value, ctx)
    }
}

/// Single-token arguments. A required argument always uses up its token,
/// an optional one only when the token converted.
fn parse_positional(argument: &Argument, parser: &mut StringParser, ctx: &Localizer) -> Outcome<ArgValue> {
    let Some(token) = parser.peek_next() else {
        return Ok(None);
    };

    let outcome = argument.converter().parse_one(&token.data, ctx);

    if argument.required() || matches!(outcome, Ok(Some(_))) {
        parser.parse_next();
    }

    outcome
}

/// Takes tokens for as long as they convert. An error on the first token is
/// reported, later ones end the list.
fn parse_list(argument: &Argument, parser: &mut StringParser, ctx: &Localizer) -> Outcome<(usize, ArgValue)> {
    let mut values = Vec::new();

    while let Some(token) = parser.peek_next() {
        match argument.converter().parse_one(&token.data, ctx) {
            Ok(Some(value)) => {
                parser.parse_next();
                values.push(value);
            }
            Ok(None) => break,
            Err(error) if values.is_empty() => return Err(error),
            Err(_) => break,
        }
    }

    if values.is_empty() {
        return Ok(None);
    }

    let count = values.len();
    Ok(Some((count, argument.converter().collect_list(values))))
}

fn parse_coalescing(argument: &Argument, parser: &mut StringParser, ctx: &Localizer) -> Outcome<(usize, ArgValue)> {
    let start = parser.cursor().position();
    let mut tokens = Vec::new();

    while let Some(token) = parser.parse_next() {
        if !argument.converter().accepts_token(&token.data, ctx) {
            break;
        }

        tokens.push(token.data);
    }

    parser.cursor_mut().reset_to(start);

    let outcome = argument.converter().parse_many(&tokens, ctx);

    if let Ok(Some((count, _))) = &outcome {
        for _ in 0..*count {
            parser.parse_next();
        }
    }

    outcome
}

fn parse_keyword_values(argument: &Argument, values: &[String], ctx: &Localizer) -> Outcome<(usize, ArgValue)> {
    if !argument.kind().is_list() {
        return argument.converter().parse_many(values, ctx);
    }

    let mut parsed = Vec::new();
    let mut first_error = None;

    for value in values {
        match argument.converter().parse_one(value, ctx) {
            Ok(Some(value)) => parsed.push(value),
            Ok(None) => {}
            Err(error) => {
                first_error.get_or_insert(error);
            }
        }
    }

    match first_error {
        Some(error) if parsed.is_empty() => Err(error),
        _ if parsed.is_empty() => Ok(None),
        _ => {
            let count = parsed.len();
            Ok(Some((count, argument.converter().collect_list(parsed))))
        }
    }
}

fn validate(argument: &Argument, value: &ArgValue, ctx: &Localizer) -> Result<()> {
    argument.validate_value(value, ctx).map_err(FrameworkError::Relayed)
}

fn check_single(
    argument: &Argument,
    has_kwargs: bool,
    value: Option<ArgValue>,
    ctx: &Localizer,
) -> Result<Option<ArgValue>> {
    match value {
        Some(value) => {
            trace!(argument = argument.name(), "Argument filled");
            validate(argument, &value, ctx)?;
            Ok(Some(value))
        }
        None if argument.required() || has_kwargs => Err(invalid_value(argument, ctx)),
        None => Ok(None),
    }
}

fn check_counted(
    argument: &Argument,
    kwargs: Option<&[String]>,
    value: Option<(usize, ArgValue)>,
    ctx: &Localizer,
) -> Result<Option<ArgValue>> {
    let count = value.as_ref().map_or(0, |(count, _)| *count);

    if (argument.required() || kwargs.is_some()) && count < 1 {
        return Err(invalid_value(argument, ctx));
    }

    if let Some(total) = kwargs.map(<[String]>::len).filter(|total| count < *total) {
        let reason = ctx.translate_with(
            "argument-parser-error-not-all-valid",
            &fluent_args!(
                "name" => argument.name(),
                "type" => ctx.translate(argument.error_type()),
                "valid" => count,
                "total" => total,
            ),
        );

        return Err(ArgumentParsingError::for_argument(reason, argument.name()).into());
    }

    match value {
        Some((_, value)) => {
            trace!(argument = argument.name(), count, "Argument filled");
            validate(argument, &value, ctx)?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

fn check_required(arguments: &Arguments, filled: &[bool], ctx: &Localizer) -> Result<()> {
    let required: Vec<(&str, bool)> = arguments
        .iter()
        .zip(filled)
        .filter(|(argument, _)| argument.required())
        .map(|(argument, filled)| (argument.name(), *filled))
        .collect();

    let total = required.len();
    let filled: Vec<&str> = required.iter().filter(|(_, filled)| *filled).map(|(name, _)| *name).collect();

    trace!(filled = filled.len(), total, "Checked required arguments");

    if filled.len() == total {
        return Ok(());
    }

    let reason = if filled.is_empty() {
        let names: Vec<&str> = required.iter().map(|(name, _)| *name).collect();

        ctx.translate_with(
            "argument-parser-error-no-filled-arguments",
            &fluent_args!("count" => total, "arguments" => names.join(", ")),
        )
    } else {
        ctx.translate_with(
            "argument-parser-error-some-filled-arguments",
            &fluent_args!("total" => total, "filled" => filled.len(), "arguments" => filled.join(", ")),
        )
    };

    Err(ArgumentParsingError::new(reason).into())
}
