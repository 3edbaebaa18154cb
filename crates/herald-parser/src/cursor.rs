//! Character cursor over an input string.

/// An iteration position over a string, starting before the first character.
///
/// The input is never modified; only the position moves. The position is the
/// index of the next character to be returned, so a fresh cursor sits at `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    input: String,
    chars: Vec<char>,
    position: usize,
}

impl Cursor {
    /// Create a cursor over `input`.
    pub fn new(input: impl Into<String>) -> Self {
        let input = input.into();
        let chars = input.chars().collect();

        Self {
            input,
            chars,
            position: 0,
        }
    }

    /// The full input this cursor iterates over.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Number of characters consumed so far.
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Move the cursor back (or forwards) to a previously saved position.
    pub fn reset_to(&mut self, position: usize) {
        self.position = position.min(self.chars.len());
    }

    /// Whether there are more characters left to iterate over.
    pub fn has_next(&self) -> bool {
        self.position < self.chars.len()
    }

    /// Whether there are characters to iterate backwards to.
    pub const fn has_previous(&self) -> bool {
        self.position > 1
    }

    /// The character that was returned last, if any.
    pub fn peek(&self) -> Option<char> {
        self.position
            .checked_sub(1)
            .and_then(|index| self.chars.get(index).copied())
    }

    /// The character the next call to [`Iterator::next`] will return.
    pub fn peek_next(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    /// The character before the one returned last.
    pub fn peek_previous(&self) -> Option<char> {
        self.position
            .checked_sub(2)
            .and_then(|index| self.chars.get(index).copied())
    }

    /// Step backwards, returning the character now under the cursor.
    pub fn previous(&mut self) -> Option<char> {
        if self.has_previous() {
            self.position -= 1;
            self.peek()
        } else {
            None
        }
    }

    /// Consume up to `amount` characters.
    pub fn consume_number(&mut self, amount: usize) -> String {
        self.by_ref().take(amount).collect()
    }

    /// Consume the rest of the input.
    pub fn consume_remaining(&mut self) -> String {
        self.by_ref().collect()
    }

    /// Consume characters while `predicate` holds.
    ///
    /// Returns `None` when the very first character fails the predicate, or
    /// when nothing is left.
    pub fn consume_while(&mut self, mut predicate: impl FnMut(char) -> bool) -> Option<String> {
        let mut result: Option<String> = None;

        while let Some(c) = self.peek_next() {
            if !predicate(c) {
                break;
            }

            self.position += 1;
            result.get_or_insert_with(String::new).push(c);
        }

        result
    }

    /// Skip any immediate spaces, returning whether anything was skipped.
    pub fn skip_whitespace(&mut self) -> bool {
        if self.peek_next() != Some(' ') {
            return false;
        }

        while self.peek_next() == Some(' ') {
            self.position += 1;
        }

        true
    }
}

impl Iterator for Cursor {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        let c = self.chars.get(self.position).copied()?;
        self.position += 1;

        Some(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_cursor() {
        let cursor = Cursor::new("abc");
        assert!(cursor.has_next());
        assert!(!cursor.has_previous());
        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.peek_next(), Some('a'));
    }

    #[test]
    fn test_forwards_and_backwards() {
        let mut cursor = Cursor::new("abc");

        assert_eq!(cursor.next(), Some('a'));
        assert_eq!(cursor.next(), Some('b'));
        assert_eq!(cursor.peek(), Some('b'));
        assert_eq!(cursor.peek_previous(), Some('a'));
        assert_eq!(cursor.previous(), Some('a'));
        assert_eq!(cursor.previous(), None);
        assert_eq!(cursor.consume_remaining(), "bc");
        assert!(!cursor.has_next());
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn test_consume_number_stops_at_end() {
        let mut cursor = Cursor::new("abc");
        assert_eq!(cursor.consume_number(2), "ab");
        assert_eq!(cursor.consume_number(5), "c");
        assert_eq!(cursor.consume_number(1), "");
    }

    #[test]
    fn test_consume_while() {
        let mut cursor = Cursor::new("aab");
        assert_eq!(cursor.consume_while(|c| c == 'a').as_deref(), Some("aa"));
        assert_eq!(cursor.consume_while(|c| c == 'a'), None);
        assert_eq!(cursor.next(), Some('b'));
        assert_eq!(cursor.consume_while(|_| true), None);
    }

    #[test]
    fn test_skip_whitespace() {
        let mut cursor = Cursor::new("   x");
        assert!(cursor.skip_whitespace());
        assert!(!cursor.skip_whitespace());
        assert_eq!(cursor.next(), Some('x'));
    }

    #[test]
    fn test_multibyte_input() {
        let mut cursor = Cursor::new("héllo");
        assert_eq!(cursor.consume_number(2), "hé");
        assert_eq!(cursor.position(), 2);
        cursor.reset_to(0);
        assert_eq!(cursor.consume_remaining(), "héllo");
    }
}
