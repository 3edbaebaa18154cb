//! The built-in `help` command.

use super::{Extension, ExtensionBuilder};
use crate::arguments::{Arg, Arguments};
use crate::commands::{ChatCommand, CommandBase, CommandResult, SlashCommand};
use crate::context::CommandContext;
use crate::converters::StringCoalescingConverter;
use crate::fluent_args;
use crate::i18n::Localizer;
use crate::pagination::{Page, Pages};
use async_trait::async_trait;
use herald_common::{split_first_word, BoxError, CommandKind};
use tracing::debug;

/// Commands listed per page unless configured otherwise.
pub const DEFAULT_COMMANDS_PER_PAGE: usize = 5;

const SLASH_PREFIX: &str = "/";

/// Adds `help` as a chat command (alias `h`) and as a slash command.
///
/// Without arguments it pages through every command the user may run here.
/// Given a command name it shows that command in detail.
#[derive(Debug, Clone)]
pub struct HelpExtension {
    commands_per_page: usize,
}

impl HelpExtension {
    /// Help with the default page size.
    pub const fn new() -> Self {
        Self {
            commands_per_page: DEFAULT_COMMANDS_PER_PAGE,
        }
    }

    /// Lists `count` commands per page. Zero is treated as one.
    #[must_use]
    pub const fn commands_per_page(mut self, count: usize) -> Self {
        self.commands_per_page = if count == 0 { 1 } else { count };
        self
    }
}

impl Default for HelpExtension {
    fn default() -> Self {
        Self::new()
    }
}

fn help_arguments() -> (Arguments, Arg<Option<String>>) {
    let mut arguments = Arguments::new();
    let command = arguments.optional_coalescing(
        "command",
        "extensions-help-argument-command-description",
        StringCoalescingConverter::new(),
    );

    (arguments, command)
}

#[async_trait]
impl Extension for HelpExtension {
    fn name(&self) -> &str {
        "help"
    }

    async fn setup(&mut self, builder: &mut ExtensionBuilder) -> Result<(), BoxError> {
        let per_page = self.commands_per_page;

        let (arguments, command) = help_arguments();
        builder.chat_command(
            ChatCommand::new("help")
                .alias("h")
                .description("extensions-help-command-description")
                .arguments(arguments)
                .action(move |ctx| run(ctx, command, per_page)),
        );

        let (arguments, command) = help_arguments();
        builder.slash_command(
            SlashCommand::new("help")
                .description("extensions-help-command-description")
                .ephemeral(true)
                .arguments(arguments)
                .action(move |ctx| run(ctx, command, per_page)),
        );

        Ok(())
    }
}

async fn run(ctx: CommandContext, command: Arg<Option<String>>, per_page: usize) -> CommandResult {
    let prefix = ctx.prefix().unwrap_or(SLASH_PREFIX).to_string();

    let pages = match ctx.arg(command)? {
        Some(name) => {
            let Some(entry) = find_entry(&ctx, name).await else {
                ctx.respond(ctx.translate("extensions-help-error-missing-command")).await?;
                return Ok(());
            };

            Pages::from_iter([details_page(&entry, &prefix, ctx.localizer())])
        }
        None => {
            let entries = visible_entries(&ctx).await;
            debug!(count = entries.len(), "Listing commands");

            if entries.is_empty() {
                ctx.respond(ctx.translate("extensions-help-paginator-no-commands")).await?;
                return Ok(());
            }

            list_pages(&entries, per_page, &prefix, ctx.localizer())
        }
    };

    ctx.paginator(pages)?.send().await?;
    Ok(())
}

/// What help shows about one command.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HelpEntry {
    name: String,
    description: String,
    signature: String,
    aliases: Vec<String>,
    arguments: Vec<(String, String)>,
    subcommands: Vec<HelpEntry>,
}

impl HelpEntry {
    fn from_base(base: &CommandBase, name: String, localizer: &Localizer) -> Self {
        Self {
            name,
            description: base.description_in(localizer),
            signature: base.signature(localizer),
            aliases: Vec::new(),
            arguments: base
                .arguments()
                .iter()
                .map(|argument| (argument.name().to_string(), localizer.translate_text(argument.description())))
                .collect(),
            subcommands: Vec::new(),
        }
    }

    fn chat(command: &ChatCommand, localizer: &Localizer) -> Self {
        let subcommands = command
            .subcommands()
            .iter()
            .filter(|subcommand| subcommand.is_enabled() && !subcommand.is_hidden())
            .map(|subcommand| Self::chat_subcommand(command, subcommand, localizer))
            .collect();

        Self {
            aliases: command.aliases().to_vec(),
            subcommands,
            ..Self::from_base(command.base(), command.name().to_string(), localizer)
        }
    }

    fn chat_subcommand(parent: &ChatCommand, subcommand: &ChatCommand, localizer: &Localizer) -> Self {
        Self {
            aliases: subcommand.aliases().to_vec(),
            ..Self::from_base(
                subcommand.base(),
                format!("{} {}", parent.name(), subcommand.name()),
                localizer,
            )
        }
    }

    fn slash(command: &SlashCommand, localizer: &Localizer) -> Self {
        Self {
            subcommands: command
                .subcommands()
                .iter()
                .map(|subcommand| Self::slash_subcommand(command, subcommand, localizer))
                .collect(),
            ..Self::from_base(command.base(), command.name().to_string(), localizer)
        }
    }

    fn slash_subcommand(parent: &SlashCommand, subcommand: &SlashCommand, localizer: &Localizer) -> Self {
        Self::from_base(
            subcommand.base(),
            format!("{} {}", parent.name(), subcommand.name()),
            localizer,
        )
    }

    fn usage(&self, prefix: &str) -> String {
        if self.signature.is_empty() {
            format!("{prefix}{}", self.name)
        } else {
            format!("{prefix}{} {}", self.name, self.signature)
        }
    }

    fn description_or_default(&self, localizer: &Localizer) -> String {
        if self.description.trim().is_empty() {
            localizer.translate("extensions-help-paginator-no-description")
        } else {
            self.description.clone()
        }
    }

    fn summary(&self, prefix: &str, localizer: &Localizer) -> String {
        format!("**`{}`**\n{}", self.usage(prefix), self.description_or_default(localizer))
    }
}

/// Top-level commands of the invoked kind that the user may run here.
async fn visible_entries(ctx: &CommandContext) -> Vec<HelpEntry> {
    let framework = ctx.framework();
    let localizer = ctx.localizer();
    let mut entries = Vec::new();

    match ctx.kind() {
        CommandKind::Chat => {
            for command in framework.chat_commands().commands() {
                if !command.is_enabled() || command.is_hidden() {
                    continue;
                }

                if command
                    .base()
                    .checks_pass(framework, CommandKind::Chat, &[], ctx.event(), localizer)
                    .await
                {
                    entries.push(HelpEntry::chat(&command, localizer));
                }
            }
        }
        CommandKind::Slash => {
            for command in framework.application_commands().commands() {
                if command
                    .base()
                    .checks_pass(framework, CommandKind::Slash, &[], ctx.event(), localizer)
                    .await
                {
                    entries.push(HelpEntry::slash(&command, localizer));
                }
            }
        }
        CommandKind::Message | CommandKind::User => {}
    }

    entries
}

/// The command `query` names, as long as the user could list it.
async fn find_entry(ctx: &CommandContext, query: &str) -> Option<HelpEntry> {
    let framework = ctx.framework();
    let localizer = ctx.localizer();
    let (name, rest) = split_first_word(query.trim());
    let subcommand = split_first_word(rest).0;

    match ctx.kind() {
        CommandKind::Chat => {
            let command = framework.chat_commands().get_command(name)?;

            if !command.is_enabled() || command.is_hidden() {
                return None;
            }

            if !command
                .base()
                .checks_pass(framework, CommandKind::Chat, &[], ctx.event(), localizer)
                .await
            {
                return None;
            }

            if subcommand.is_empty() {
                return Some(HelpEntry::chat(&command, localizer));
            }

            let child = command.get_subcommand(subcommand)?;

            if !child.is_enabled() || child.is_hidden() {
                return None;
            }

            child
                .base()
                .checks_pass(framework, CommandKind::Chat, command.base().checks(), ctx.event(), localizer)
                .await
                .then(|| HelpEntry::chat_subcommand(&command, child, localizer))
        }
        CommandKind::Slash => {
            let command = framework.application_commands().get_command(&name.to_lowercase())?;

            if !command
                .base()
                .checks_pass(framework, CommandKind::Slash, &[], ctx.event(), localizer)
                .await
            {
                return None;
            }

            if subcommand.is_empty() {
                return Some(HelpEntry::slash(&command, localizer));
            }

            let child = command.get_subcommand(&subcommand.to_lowercase())?;

            child
                .base()
                .checks_pass(framework, CommandKind::Slash, command.base().checks(), ctx.event(), localizer)
                .await
                .then(|| HelpEntry::slash_subcommand(&command, child, localizer))
        }
        CommandKind::Message | CommandKind::User => None,
    }
}

fn list_pages(entries: &[HelpEntry], per_page: usize, prefix: &str, localizer: &Localizer) -> Pages {
    let title = localizer.translate("extensions-help-paginator-title-commands");
    let usage = localizer.translate_with(
        "extensions-help-paginator-usage",
        &fluent_args!("prefix" => prefix.to_string()),
    );

    entries
        .chunks(per_page.max(1))
        .map(|chunk| {
            let body = chunk
                .iter()
                .map(|entry| entry.summary(prefix, localizer))
                .collect::<Vec<_>>()
                .join("\n\n");

            Page::new(body).title(title.clone()).footer(usage.clone())
        })
        .collect()
}

fn details_page(entry: &HelpEntry, prefix: &str, localizer: &Localizer) -> Page {
    let mut sections = vec![entry.description_or_default(localizer)];

    if !entry.aliases.is_empty() {
        let aliases = entry
            .aliases
            .iter()
            .map(|alias| format!("`{alias}`"))
            .collect::<Vec<_>>()
            .join(", ");

        sections.push(localizer.translate_with(
            "extensions-help-paginator-aliases",
            &fluent_args!("aliases" => aliases),
        ));
    }

    sections.push(localizer.translate_with(
        "commands-signature",
        &fluent_args!("signature" => entry.usage(prefix)),
    ));

    if !entry.arguments.is_empty() {
        let mut arguments = vec![localizer.translate("extensions-help-paginator-arguments")];

        arguments.extend(entry.arguments.iter().map(|(name, description)| {
            if description.trim().is_empty() {
                format!("`{name}`: {}", localizer.translate("extensions-help-paginator-no-description"))
            } else {
                format!("`{name}`: {description}")
            }
        }));

        sections.push(arguments.join("\n"));
    }

    if !entry.subcommands.is_empty() {
        sections.extend(entry.subcommands.iter().map(|subcommand| subcommand.summary(prefix, localizer)));
    }

    Page::new(sections.join("\n\n")).title(localizer.translate_with(
        "extensions-help-paginator-title-command",
        &fluent_args!("name" => entry.name.clone()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::test_events::direct_message;
    use crate::checks::CheckContext;
    use crate::commands::test_calls::call;
    use crate::commands::CommandOutcome;
    use crate::converters::IntConverter;
    use crate::extensions::LoadedExtension;
    use crate::framework::Framework;
    use crate::respond::MockResponder;
    use crate::test_support::{framework, localizer};
    use herald_config::Config;
    use herald_parser::StringParser;
    use serenity::all::{CreateActionRow, CreateEmbed, MessageId};
    use std::sync::Arc;

    fn entry(name: &str, description: &str) -> HelpEntry {
        HelpEntry {
            name: name.to_string(),
            description: description.to_string(),
            signature: String::new(),
            aliases: Vec::new(),
            arguments: Vec::new(),
            subcommands: Vec::new(),
        }
    }

    async fn framework_with_help() -> Arc<Framework> {
        let framework = framework(Config::default());

        LoadedExtension::new(Box::new(HelpExtension::new()))
            .do_setup(&framework)
            .await
            .unwrap();

        let mut arguments = Arguments::new();
        arguments.single("times", "How often to ping", IntConverter::new());

        let chat = framework.chat_commands();
        chat.add(
            ChatCommand::new("ping")
                .alias("p")
                .description("Checks the bot is alive")
                .arguments(arguments)
                .action(|_| async { Ok(()) }),
        )
        .unwrap();
        chat.add(ChatCommand::new("secret").hidden(true).action(|_| async { Ok(()) }))
            .unwrap();
        chat.add(
            ChatCommand::new("shutdown")
                .check(|ctx: &mut CheckContext<'_>| ctx.is_bot_owner())
                .action(|_| async { Ok(()) }),
        )
        .unwrap();

        framework
    }

    fn embed_description(embed: &CreateEmbed) -> String {
        serde_json::to_value(embed).unwrap()["description"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn test_list_pages_chunk_commands() {
        let entries: Vec<_> = (1..=7).map(|i| entry(&format!("cmd{i}"), "")).collect();
        let pages = list_pages(&entries, 3, "!", &localizer());

        assert_eq!(pages.len(), 3);

        let first = &pages.group(pages.default_group())[0];
        assert_eq!(first.title.as_deref(), Some("Commands"));
        assert_eq!(
            first.footer.as_deref(),
            Some("Use `!help <command>` for more information on a command.")
        );
        assert!(first.description.starts_with("**`!cmd1`**\nNo description provided."));
    }

    #[test]
    fn test_details_page() {
        let mut ping = entry("ping", "Checks the bot is alive");
        ping.signature = "<times: number>".to_string();
        ping.aliases = vec!["p".to_string()];
        ping.arguments = vec![("times".to_string(), "How often to ping".to_string())];

        let page = details_page(&ping, "!", &localizer());

        assert_eq!(page.title.as_deref(), Some("Command: ping"));
        assert_eq!(
            page.description,
            "Checks the bot is alive\n\n\
             **Aliases:** `p`\n\n\
             **Signature:** `!ping <times: number>`\n\n\
             **Arguments:**\n`times`: How often to ping"
        );
    }

    #[tokio::test]
    async fn test_listing_hides_unavailable_commands() {
        let framework = framework_with_help().await;
        let help = framework.chat_commands().get_command("h").unwrap();

        let mut responder = MockResponder::new();
        responder
            .expect_send_embed()
            .withf(|embed: &CreateEmbed, _: &Vec<CreateActionRow>| {
                let description = embed_description(embed);
                description.contains("`!ping <times: number>`")
                    && description.contains("`!help [command]`")
                    && !description.contains("secret")
                    && !description.contains("shutdown")
            })
            .times(1)
            .returning(|_, _| Ok(MessageId::new(1)));

        let outcome = help
            .call(call(direct_message(), responder, &framework), StringParser::new(""), "!")
            .await;

        assert_eq!(outcome, CommandOutcome::Succeeded);
    }

    #[tokio::test]
    async fn test_details_for_one_command() {
        let framework = framework_with_help().await;
        let help = framework.chat_commands().get_command("help").unwrap();

        let mut responder = MockResponder::new();
        responder
            .expect_send_embed()
            .withf(|embed: &CreateEmbed, _: &Vec<CreateActionRow>| {
                embed_description(embed).contains("`times`: How often to ping")
            })
            .times(1)
            .returning(|_, _| Ok(MessageId::new(1)));

        let outcome = help
            .call(call(direct_message(), responder, &framework), StringParser::new("PING"), "!")
            .await;

        assert_eq!(outcome, CommandOutcome::Succeeded);
    }

    #[tokio::test]
    async fn test_unknown_or_forbidden_command() {
        let framework = framework_with_help().await;
        let help = framework.chat_commands().get_command("help").unwrap();

        for query in ["nothing", "secret", "shutdown"] {
            let mut responder = MockResponder::new();
            responder
                .expect_respond()
                .withf(|message: &String| message == "Unable to find that command.")
                .times(1)
                .returning(|_| Ok(()));

            let outcome = help
                .call(call(direct_message(), responder, &framework), StringParser::new(query), "!")
                .await;

            assert_eq!(outcome, CommandOutcome::Succeeded);
        }
    }
}
