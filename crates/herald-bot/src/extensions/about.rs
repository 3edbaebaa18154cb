//! `about`: a paginated overview of the running bot.

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use herald_core::{BoxError, ChatCommand, Extension, ExtensionBuilder, Framework, Page, Pages, SlashCommand};

const OVERVIEW_GROUP: &str = "Overview";
const USAGE_GROUP: &str = "Usage";

/// Shows uptime, configuration and command counts in a paginator with two
/// groups of pages.
#[derive(Debug, Clone, Copy)]
pub struct AboutExtension {
    started: DateTime<Utc>,
}

impl AboutExtension {
    /// Counts uptime from now.
    pub fn new() -> Self {
        Self::started_at(Utc::now())
    }

    /// Counts uptime from `started`.
    pub const fn started_at(started: DateTime<Utc>) -> Self {
        Self { started }
    }
}

impl Default for AboutExtension {
    fn default() -> Self {
        Self::new()
    }
}

/// Formats a duration as `1d 2h 3m 4s`, leaving out leading zero units.
pub fn format_uptime(uptime: TimeDelta) -> String {
    let total = uptime.num_seconds().max(0);
    let units = [
        (total / 86_400, "d"),
        (total / 3_600 % 24, "h"),
        (total / 60 % 60, "m"),
        (total % 60, "s"),
    ];

    let parts: Vec<String> = units
        .iter()
        .skip_while(|(value, unit)| *value == 0 && *unit != "s")
        .map(|(value, unit)| format!("{value}{unit}"))
        .collect();

    parts.join(" ")
}

/// The pages `about` shows.
pub fn about_pages(framework: &Framework, started: DateTime<Utc>, now: DateTime<Utc>) -> Pages {
    let config = framework.config();
    let prefix = &config.chat_commands.default_prefix;

    let mut pages = Pages::with_default_group(OVERVIEW_GROUP);

    pages.add(
        Page::new("A Discord bot assembled from Herald extensions.")
            .title("About")
            .field("Uptime", format_uptime(now - started), true)
            .field("Default locale", config.i18n.default_locale.clone(), true),
    );

    pages.add(
        Page::new("Commands currently registered.")
            .title("Commands")
            .field("Chat", framework.chat_commands().len().to_string(), true)
            .field("Application", framework.application_commands().len().to_string(), true),
    );

    let mention = if config.chat_commands.invoke_on_mention {
        " or by mentioning the bot"
    } else {
        ""
    };

    pages.add_to(
        USAGE_GROUP,
        Page::new(format!("Chat commands start with `{prefix}`{mention}.")).title("Chat commands"),
    );

    pages.add_to(
        USAGE_GROUP,
        Page::new("Type `/` in the message box to browse the slash commands.").title("Slash commands"),
    );

    pages
}

#[async_trait]
impl Extension for AboutExtension {
    fn name(&self) -> &str {
        "about"
    }

    async fn setup(&mut self, builder: &mut ExtensionBuilder) -> Result<(), BoxError> {
        let started = self.started;

        builder
            .chat_command(
                ChatCommand::new("about")
                    .description("Shows information about the bot")
                    .action(move |ctx| async move {
                        let pages = about_pages(ctx.framework(), started, Utc::now());
                        ctx.paginator(pages)?.send().await?;
                        Ok(())
                    }),
            )
            .slash_command(
                SlashCommand::new("about")
                    .description("Shows information about the bot")
                    .action(move |ctx| async move {
                        let pages = about_pages(ctx.framework(), started, Utc::now());
                        ctx.paginator(pages)?.send().await?;
                        Ok(())
                    }),
            );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(TimeDelta::zero()), "0s");
        assert_eq!(format_uptime(TimeDelta::seconds(59)), "59s");
        assert_eq!(format_uptime(TimeDelta::seconds(3_601)), "1h 0m 1s");
        assert_eq!(format_uptime(TimeDelta::seconds(90_061)), "1d 1h 1m 1s");
        assert_eq!(format_uptime(TimeDelta::seconds(-5)), "0s");
    }
}
