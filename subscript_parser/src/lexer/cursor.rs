//! Character cursor over source text.

use std::str::Chars;

/// Sentinel returned when peeking past the end of input.
pub const EOF_CHAR: char = '\0';

/// A forward-only cursor tracking a byte position.
#[derive(Debug, Clone)]
pub struct Cursor<'src> {
    source: &'src str,
    chars: Chars<'src>,
    pos: usize,
}

impl<'src> Cursor<'src> {
    /// Create a cursor at the start of `source`.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.chars(),
            pos: 0,
        }
    }

    /// Peek at the next character without consuming it.
    #[inline]
    #[must_use]
    pub fn first(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    /// Peek two characters ahead.
    #[inline]
    #[must_use]
    pub fn second(&self) -> char {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().unwrap_or(EOF_CHAR)
    }

    /// Peek three characters ahead.
    #[inline]
    #[must_use]
    pub fn third(&self) -> char {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next();
        iter.next().unwrap_or(EOF_CHAR)
    }

    /// Consume and return the next character.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Consume the next character if it equals `expected`.
    pub fn eat(&mut self, expected: char) -> bool {
        if !self.is_eof() && self.first() == expected {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Consume characters while `predicate` holds.
    pub fn eat_while(&mut self, mut predicate: impl FnMut(char) -> bool) {
        while !self.is_eof() && predicate(self.first()) {
            self.bump();
        }
    }

    /// Current byte offset.
    #[inline]
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Whether all input has been consumed.
    #[inline]
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    /// The full source text.
    #[inline]
    #[must_use]
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Source text from `start` to the current position.
    #[must_use]
    pub fn slice_from(&self, start: usize) -> &'src str {
        self.source.get(start..self.pos).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_and_bump() {
        let mut cursor = Cursor::new("ab");
        assert_eq!(cursor.first(), 'a');
        assert_eq!(cursor.second(), 'b');
        assert_eq!(cursor.third(), EOF_CHAR);
        assert_eq!(cursor.bump(), Some('a'));
        assert_eq!(cursor.pos(), 1);
    }

    #[test]
    fn test_multibyte_positions() {
        let mut cursor = Cursor::new("ひx");
        cursor.bump();
        assert_eq!(cursor.pos(), 3);
        assert!(cursor.eat('x'));
        assert!(cursor.is_eof());
    }

    #[test]
    fn test_eat_while_and_slice() {
        let mut cursor = Cursor::new("abc123");
        cursor.eat_while(|c| c.is_ascii_alphabetic());
        assert_eq!(cursor.slice_from(0), "abc");
    }
}
