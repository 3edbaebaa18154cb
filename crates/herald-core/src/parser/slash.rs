//! Argument parsing for slash commands.
//!
//! Discord already splits slash command input into named, typed options, so
//! there is no tokenizing here. Each argument looks up the option with its
//! name and hands the value to its converter. List arguments have no slash
//! representation and are rejected.

use super::{converter_failure, invalid_value};
use crate::arguments::{Argument, Arguments, ParsedArguments};
use crate::converters::{ConverterError, OptionValue};
use crate::i18n::Localizer;
use herald_common::{truncate_string, ArgumentParsingError, FrameworkError, Result};
use serenity::all::{CommandDataOption, CommandDataOptionValue, CreateCommandOption};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Longest option description Discord accepts.
const MAX_DESCRIPTION_LENGTH: usize = 100;

/// Parses slash command options into arguments.
pub struct SlashCommandParser;

impl SlashCommandParser {
    /// Fills `arguments` from the options of an interaction.
    pub fn parse(
        arguments: &Arguments,
        options: &HashMap<String, OptionValue>,
        ctx: &Localizer,
    ) -> Result<ParsedArguments> {
        arguments.validate()?;

        let mut values = Vec::with_capacity(arguments.len());

        for argument in arguments {
            reject_list(argument)?;

            let value = options.get(&argument.name().to_lowercase());
            trace!(argument = argument.name(), ?value, "Parsing option");

            let outcome = value.map_or(Ok(None), |value| argument.converter().parse_option(value, ctx));

            let parsed = match outcome {
                Ok(parsed) => parsed,
                Err(error) if relays(argument, &error) => return Err(converter_failure(argument, error, false, ctx)),
                Err(error) => {
                    debug!(argument = argument.name(), %error, "Ignoring converter error");
                    None
                }
            };

            match parsed {
                Some(value) => {
                    trace!(argument = argument.name(), "Argument filled");

                    argument
                        .validate_value(&value, ctx)
                        .map_err(|error| validation_failure(argument, error.reason))?;

                    values.push(argument.finish(Some(value)));
                }
                None if argument.required() => return Err(invalid_value(argument, ctx)),
                None => values.push(argument.finish(None)),
            }
        }

        Ok(ParsedArguments::new(arguments, values))
    }

    /// Builds the Discord option definitions for `arguments`.
    ///
    /// Required options are listed first, as Discord demands.
    pub fn options(arguments: &Arguments) -> Result<Vec<CreateCommandOption>> {
        arguments.validate()?;

        let mut ordered: Vec<&Argument> = arguments.iter().collect();
        ordered.sort_by_key(|argument| !argument.required());

        ordered
            .into_iter()
            .map(|argument| {
                reject_list(argument)?;

                let description = if argument.description().is_empty() {
                    argument.name()
                } else {
                    argument.description()
                };

                let option = CreateCommandOption::new(
                    argument.converter().option_type(),
                    argument.name().to_lowercase(),
                    truncate_string(description, MAX_DESCRIPTION_LENGTH),
                )
                .required(argument.required());

                Ok(argument.converter().customise_option(option))
            })
            .collect()
    }
}

/// Flattens interaction options into a name to value map, descending into
/// the selected subcommand or subcommand group.
pub fn collect_options(options: &[CommandDataOption]) -> HashMap<String, OptionValue> {
    let mut collected = HashMap::new();

    for option in options {
        match &option.value {
            CommandDataOptionValue::SubCommand(nested) | CommandDataOptionValue::SubCommandGroup(nested) => {
                collected.extend(collect_options(nested));
            }
            value => {
                if let Some(value) = OptionValue::from_serenity(value) {
                    collected.insert(option.name.to_lowercase(), value);
                }
            }
        }
    }

    collected
}

/// The subcommand chosen in an interaction, if any.
pub fn selected_subcommand(options: &[CommandDataOption]) -> Option<&str> {
    options.iter().find_map(|option| match &option.value {
        CommandDataOptionValue::SubCommand(_) => Some(option.name.as_str()),
        CommandDataOptionValue::SubCommandGroup(nested) => selected_subcommand(nested),
        _ => None,
    })
}

fn reject_list(argument: &Argument) -> Result<()> {
    if argument.kind().is_list() {
        Err(FrameworkError::invalid_argument(
            argument.name(),
            "List arguments can't be used in slash commands",
        ))
    } else {
        Ok(())
    }
}

const fn relays(argument: &Argument, error: &ConverterError) -> bool {
    argument.required() || (error.is_relayed() && argument.kind().output_error())
}

fn validation_failure(argument: &Argument, reason: String) -> FrameworkError {
    if argument.required() {
        ArgumentParsingError::for_argument(reason, argument.name()).into()
    } else {
        FrameworkError::relayed(reason)
    }
}
