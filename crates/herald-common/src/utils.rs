//! Shared string helpers.

/// Truncates a string to a maximum number of characters, ending with an
/// ellipsis when anything was cut off.
pub fn truncate_string(input: &str, max_length: usize) -> String {
    if input.chars().count() <= max_length {
        input.to_string()
    } else {
        let kept: String = input.chars().take(max_length.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Escapes Discord markdown control characters so the text renders literally.
pub fn escape_markdown(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());

    for c in input.chars() {
        if matches!(c, '*' | '_' | '~' | '`' | '|' | '>' | '\\') {
            escaped.push('\\');
        }

        escaped.push(c);
    }

    escaped
}

/// Splits off the first whitespace-delimited word, returning it and the
/// trimmed remainder.
pub fn split_first_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();

    input.find(char::is_whitespace).map_or((input, ""), |index| {
        let (word, rest) = input.split_at(index);
        (word, rest.trim_start())
    })
}

/// Parses a raw Discord snowflake.
pub fn parse_snowflake(input: &str) -> Option<u64> {
    if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    input.parse().ok().filter(|id| *id != 0)
}

fn strip_mention<'a>(input: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    let inner = input.strip_prefix('<')?.strip_suffix('>')?;

    prefixes
        .iter()
        .find_map(|prefix| inner.strip_prefix(prefix))
}

/// Parses a user mention (`<@id>` or `<@!id>`) or a raw id.
pub fn parse_user_mention(input: &str) -> Option<u64> {
    strip_mention(input, &["@!", "@"])
        .map_or_else(|| parse_snowflake(input), parse_snowflake)
}

/// Parses a role mention (`<@&id>`) or a raw id.
pub fn parse_role_mention(input: &str) -> Option<u64> {
    strip_mention(input, &["@&"]).map_or_else(|| parse_snowflake(input), parse_snowflake)
}

/// Parses a channel mention (`<#id>`) or a raw id.
pub fn parse_channel_mention(input: &str) -> Option<u64> {
    strip_mention(input, &["#"]).map_or_else(|| parse_snowflake(input), parse_snowflake)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        let input = "This is a very long string that should be truncated";
        assert_eq!(truncate_string(input, 20), "This is a very lo...");
        assert_eq!(truncate_string("Short", 20), "Short");
        assert_eq!(truncate_string("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("**bold** _it_"), "\\*\\*bold\\*\\* \\_it\\_");
        assert_eq!(escape_markdown("plain"), "plain");
    }

    #[test]
    fn test_split_first_word() {
        assert_eq!(split_first_word("ping"), ("ping", ""));
        assert_eq!(split_first_word("  echo hello   world"), ("echo", "hello   world"));
        assert_eq!(split_first_word(""), ("", ""));
    }

    #[test]
    fn test_mentions() {
        assert_eq!(parse_user_mention("<@1234>"), Some(1234));
        assert_eq!(parse_user_mention("<@!1234>"), Some(1234));
        assert_eq!(parse_user_mention("1234"), Some(1234));
        assert_eq!(parse_user_mention("<@&1234>"), None);
        assert_eq!(parse_role_mention("<@&42>"), Some(42));
        assert_eq!(parse_channel_mention("<#42>"), Some(42));
        assert_eq!(parse_channel_mention("#42"), None);
        assert_eq!(parse_snowflake("0"), None);
        assert_eq!(parse_snowflake("12a"), None);
    }
}
