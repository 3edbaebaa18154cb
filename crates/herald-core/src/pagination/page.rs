//! A single page of a paginator.

use herald_common::truncate_string;
use serenity::all::{Colour, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter};

/// Most fields Discord shows in one embed.
const MAX_FIELDS: usize = 25;

/// Longest embed description Discord accepts.
const MAX_DESCRIPTION_LENGTH: usize = 4096;

/// A field on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageField {
    /// Field title.
    pub name: String,
    /// Field body.
    pub value: String,
    /// Whether the field may share a line with its neighbours.
    pub inline: bool,
}

/// Content of one paginator page, rendered as an embed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// Embed title.
    pub title: Option<String>,
    /// Embed body.
    pub description: String,
    /// Author line.
    pub author: Option<String>,
    /// Link on the title.
    pub url: Option<String>,
    /// Sidebar color.
    pub color: Option<Colour>,
    /// Footer text, shown after the paginator's own footer.
    pub footer: Option<String>,
    /// Image URL.
    pub image: Option<String>,
    /// Thumbnail URL.
    pub thumbnail: Option<String>,
    /// Fields, in order.
    pub fields: Vec<PageField>,
}

impl Page {
    /// A page with the given body.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the author line.
    #[must_use]
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Sets the title link.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the sidebar color.
    #[must_use]
    pub fn color(mut self, color: impl Into<Colour>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Sets the page's own footer text.
    #[must_use]
    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Sets the image.
    #[must_use]
    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image = Some(url.into());
        self
    }

    /// Sets the thumbnail.
    #[must_use]
    pub fn thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(PageField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    /// The footer shown under this page: the paginator's text followed by
    /// the page's own, separated by ` • `.
    pub fn footer_text(&self, paginator_text: Option<&str>) -> Option<String> {
        let parts: Vec<&str> = paginator_text
            .into_iter()
            .chain(self.footer.as_deref())
            .filter(|part| !part.is_empty())
            .collect();

        (!parts.is_empty()).then(|| parts.join(" • "))
    }

    /// Renders the page with `footer` as the paginator's footer text.
    pub fn render(&self, footer: Option<&str>) -> CreateEmbed {
        Self::render_chunk(std::slice::from_ref(self), footer)
    }

    /// Renders several pages as one embed.
    ///
    /// Presentation comes from the first page. Every page's title and body
    /// are stacked in the description, and fields are concatenated.
    pub(crate) fn render_chunk(pages: &[Self], footer: Option<&str>) -> CreateEmbed {
        let Some(first) = pages.first() else {
            return CreateEmbed::new();
        };

        let mut embed = CreateEmbed::new();

        let description = if pages.len() == 1 {
            if let Some(title) = &first.title {
                embed = embed.title(title);
            }

            first.description.clone()
        } else {
            pages
                .iter()
                .map(|page| match &page.title {
                    Some(title) => format!("**{title}**\n{}", page.description),
                    None => page.description.clone(),
                })
                .collect::<Vec<_>>()
                .join("\n\n")
        };

        if !description.is_empty() {
            embed = embed.description(truncate_string(&description, MAX_DESCRIPTION_LENGTH));
        }

        if let Some(author) = &first.author {
            embed = embed.author(CreateEmbedAuthor::new(author));
        }

        if let Some(url) = &first.url {
            embed = embed.url(url);
        }

        if let Some(color) = first.color {
            embed = embed.colour(color);
        }

        if let Some(image) = &first.image {
            embed = embed.image(image);
        }

        if let Some(thumbnail) = &first.thumbnail {
            embed = embed.thumbnail(thumbnail);
        }

        let fields = pages
            .iter()
            .flat_map(|page| &page.fields)
            .take(MAX_FIELDS)
            .map(|field| (field.name.clone(), field.value.clone(), field.inline));

        embed = embed.fields(fields);

        let own_footer = pages.iter().rev().find_map(|page| page.footer.as_deref());
        let footer_page = Self {
            footer: own_footer.map(ToString::to_string),
            ..Self::default()
        };

        match footer_page.footer_text(footer) {
            Some(text) => embed.footer(CreateEmbedFooter::new(text)),
            None => embed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn json(embed: &CreateEmbed) -> Value {
        serde_json::to_value(embed).unwrap()
    }

    #[test]
    fn test_footer_text() {
        let page = Page::new("body");
        assert_eq!(page.footer_text(None), None);
        assert_eq!(page.footer_text(Some("Page 1/2")).as_deref(), Some("Page 1/2"));

        let page = page.footer("extra");
        assert_eq!(page.footer_text(Some("Page 1/2")).as_deref(), Some("Page 1/2 • extra"));
        assert_eq!(page.footer_text(None).as_deref(), Some("extra"));
    }

    #[test]
    fn test_render_single_page() {
        let page = Page::new("body").title("Title").color(Colour::new(0x58_65_F2)).field("a", "b", true);
        let embed = json(&page.render(Some("Page 1/3")));

        assert_eq!(embed["title"], "Title");
        assert_eq!(embed["description"], "body");
        assert_eq!(embed["color"], 0x58_65_F2);
        assert_eq!(embed["fields"][0]["name"], "a");
        assert_eq!(embed["footer"]["text"], "Page 1/3");
    }

    #[test]
    fn test_render_chunk_stacks_pages() {
        let pages = [Page::new("one").title("First"), Page::new("two")];
        let embed = json(&Page::render_chunk(&pages, Some("Pages 1-2/2")));

        assert_eq!(embed["description"], "**First**\none\n\ntwo");
        assert!(embed.get("title").is_none());
        assert_eq!(embed["footer"]["text"], "Pages 1-2/2");
    }
}
