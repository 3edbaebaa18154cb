//! The string tokenizer used for chat command arguments.

use crate::{Cursor, NamedArgumentToken, PositionalArgumentToken};
use tracing::trace;

/// Tokenizes input on demand.
///
/// [`parse_named`](Self::parse_named) replaces the internal cursor with one
/// that only covers the positional part of the input, so it should be called
/// before any positional parsing.
#[derive(Debug, Clone)]
pub struct StringParser {
    input: String,
    cursor: Cursor,
}

/// Working state for [`StringParser::parse_named`].
#[derive(Default)]
struct NamedState {
    buffer: String,
    output: String,
    tokens: Vec<NamedArgumentToken>,

    quoted: bool,

    flag: bool,
    flag_value: bool,
    flag_name: String,

    keyword: bool,
    keyword_name: String,
}

impl NamedState {
    fn emit_flag(&mut self) {
        let name = std::mem::take(&mut self.flag_name);
        let data = std::mem::take(&mut self.buffer);

        trace!(name = %name, data = %data, "Flag value detected");
        self.tokens.push(NamedArgumentToken::new(name, data));

        self.flag = false;
        self.flag_value = false;
    }

    fn emit_keyword(&mut self) {
        let name = std::mem::take(&mut self.keyword_name);
        let data = std::mem::take(&mut self.buffer);

        trace!(name = %name, data = %data, "Keyword value detected");
        self.tokens.push(NamedArgumentToken::new(name, data));

        self.keyword = false;
    }
}

impl StringParser {
    /// Create a parser over `input`.
    pub fn new(input: impl Into<String>) -> Self {
        let input = input.into();
        let cursor = Cursor::new(input.clone());

        Self { input, cursor }
    }

    /// The original input, including any named arguments.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The cursor currently being parsed.
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Mutable access to the current cursor.
    pub fn cursor_mut(&mut self) -> &mut Cursor {
        &mut self.cursor
    }

    /// Whether any non-space input remains.
    pub fn has_next(&self) -> bool {
        let mut lookahead = self.cursor.clone();
        lookahead.skip_whitespace();
        lookahead.has_next()
    }

    /// Parse every flag and keyword argument out of the input.
    ///
    /// The cursor is replaced with one over the remaining positional text,
    /// trimmed. Positional quoted tokens keep their quotes so they can be
    /// parsed again by [`parse_next`](Self::parse_next).
    pub fn parse_named(&mut self) -> Vec<NamedArgumentToken> {
        let mut state = NamedState::default();

        while let Some(c) = self.cursor.next() {
            trace!(character = %c, "parse_named");

            let can_be_quoted = !state.quoted && (!(state.flag && !state.flag_value) || state.keyword);

            if c == '"' && state.buffer.is_empty() && can_be_quoted {
                state.quoted = true;
                continue;
            }

            if c == '-'
                && self.cursor.peek_next() == Some('-')
                && state.buffer.is_empty()
                && !state.flag
                && !state.keyword
            {
                self.cursor.next();
                state.flag = true;
                continue;
            }

            if c == '=' && !state.buffer.is_empty() && !state.keyword && !state.flag {
                state.keyword_name = std::mem::take(&mut state.buffer);
                state.keyword = true;
                continue;
            }

            if c == '\\' && self.cursor.peek_next() == Some('"') && state.quoted {
                state.buffer.push('"');
                self.cursor.next();
                continue;
            }

            if c == '"' && state.quoted {
                if state.flag_value {
                    state.emit_flag();
                } else if state.keyword {
                    state.emit_keyword();
                } else {
                    let token = std::mem::take(&mut state.buffer);
                    state.output.push('"');
                    state.output.push_str(&token.replace('"', "\\\""));
                    state.output.push('"');
                    self.cursor.skip_whitespace();
                    state.output.push(' ');
                }

                state.quoted = false;
                continue;
            }

            if c == ' ' && !state.quoted {
                if state.flag {
                    if state.flag_value {
                        state.emit_flag();
                        self.cursor.skip_whitespace();
                    } else {
                        state.flag_name = std::mem::take(&mut state.buffer);
                        state.flag_value = true;
                    }
                } else if state.keyword {
                    state.emit_keyword();
                    self.cursor.skip_whitespace();
                } else {
                    let token = std::mem::take(&mut state.buffer);
                    state.output.push_str(&token);
                    state.output.push(' ');
                }

                continue;
            }

            state.buffer.push(c);
        }

        if state.flag && !state.flag_value && !state.buffer.is_empty() {
            // A trailing `--flag` with nothing after it
            state.flag_name = std::mem::take(&mut state.buffer);
            state.emit_flag();
        } else if state.flag && state.flag_value {
            state.emit_flag();
        } else if state.keyword {
            state.emit_keyword();
        } else if state.quoted {
            state.output.push('"');
            state.output.push_str(&state.buffer.replace('"', "\\\""));
        } else {
            state.output.push_str(&state.buffer);
        }

        trace!(remaining = %state.output.trim(), count = state.tokens.len(), "Named arguments parsed");

        self.cursor = Cursor::new(state.output.trim());

        state.tokens
    }

    /// Parse the next positional token, or `None` if nothing is left.
    pub fn parse_next(&mut self) -> Option<PositionalArgumentToken> {
        let mut buffer = String::new();
        let mut quoted = false;

        while let Some(c) = self.cursor.next() {
            if c == '"' && buffer.is_empty() && !quoted {
                quoted = true;
                continue;
            }

            if c == '\\' && self.cursor.peek_next() == Some('"') && quoted {
                buffer.push('"');
                self.cursor.next();
                continue;
            }

            if (c == '"' && quoted) || (c == ' ' && !quoted) {
                self.cursor.skip_whitespace();

                trace!(token = %buffer, "Positional token parsed");
                return Some(PositionalArgumentToken::new(buffer));
            }

            buffer.push(c);
        }

        if buffer.is_empty() && !quoted {
            None
        } else {
            Some(PositionalArgumentToken::new(buffer))
        }
    }

    /// Parse the next positional token without moving the cursor.
    pub fn peek_next(&mut self) -> Option<PositionalArgumentToken> {
        let position = self.cursor.position();
        let token = self.parse_next();

        self.cursor.reset_to(position);

        token
    }

    /// Consume whatever is left.
    pub fn consume_remaining(&mut self) -> String {
        self.cursor.consume_remaining()
    }

    /// Return whatever is left without consuming it.
    pub fn peek_remaining(&mut self) -> String {
        let position = self.cursor.position();
        let remaining = self.cursor.consume_remaining();

        self.cursor.reset_to(position);

        remaining
    }

    /// Consume characters while `predicate` holds, then skip any spaces.
    ///
    /// Returns `None` if the predicate fails on the first character.
    pub fn consume_while(&mut self, predicate: impl FnMut(char) -> bool) -> Option<String> {
        let result = self.cursor.consume_while(predicate);

        if result.is_some() {
            self.cursor.skip_whitespace();
        }

        result
    }

    /// Collect characters while `predicate` holds, without consuming them.
    pub fn peek_while(&mut self, predicate: impl FnMut(char) -> bool) -> Option<String> {
        let position = self.cursor.position();
        let result = self.cursor.consume_while(predicate);

        self.cursor.reset_to(position);

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escaped_quotes() {
        let mut parser = StringParser::new(r#""say \"hi\"" next"#);

        assert_eq!(parser.parse_next().unwrap().data, r#"say "hi""#);
        assert_eq!(parser.parse_next().unwrap().data, "next");
        assert!(parser.parse_next().is_none());
    }

    #[test]
    fn test_escaped_quotes_survive_parse_named() {
        let mut parser = StringParser::new(r#""say \"hi\"" --flag x"#);

        let named = parser.parse_named();
        assert_eq!(named, vec![NamedArgumentToken::new("flag", "x")]);
        assert_eq!(parser.parse_next().unwrap().data, r#"say "hi""#);
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        let mut parser = StringParser::new(r#""never closed"#);
        assert_eq!(parser.parse_next().unwrap().data, "never closed");
        assert!(!parser.has_next());
    }

    #[test]
    fn test_trailing_flag_without_value() {
        let mut parser = StringParser::new("word --verbose");

        let named = parser.parse_named();
        assert_eq!(named, vec![NamedArgumentToken::new("verbose", "")]);
        assert_eq!(parser.parse_next().unwrap().data, "word");
    }

    #[test]
    fn test_empty_quoted_token() {
        let mut parser = StringParser::new(r#""" after"#);
        assert_eq!(parser.parse_next().unwrap().data, "");
        assert_eq!(parser.parse_next().unwrap().data, "after");
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut parser = StringParser::new("one two");

        assert_eq!(parser.peek_next().unwrap().data, "one");
        assert_eq!(parser.peek_remaining(), "one two");
        assert_eq!(parser.peek_while(|c| c != ' ').as_deref(), Some("one"));
        assert_eq!(parser.parse_next().unwrap().data, "one");
        assert_eq!(parser.consume_remaining(), "two");
    }

    #[test]
    fn test_has_next_ignores_trailing_spaces() {
        let mut parser = StringParser::new("one   ");
        parser.parse_next();
        assert!(!parser.has_next());
    }
}
