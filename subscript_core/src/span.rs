//! Byte ranges into the script text.
//!
//! The lexer stamps every token with a [`Span`], statements inherit the span
//! of their first token, and compile errors turn the innermost span back into
//! a line and column.

use std::fmt;

/// Half-open byte range `[start, end)` in the source.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// First byte covered.
    pub start: u32,
    /// One past the last byte covered.
    pub end: u32,
}

impl Span {
    /// Span covering `start..end`.
    #[inline]
    #[must_use]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Placeholder for nodes the parser synthesizes.
    #[inline]
    #[must_use]
    pub const fn dummy() -> Self {
        Self::new(0, 0)
    }

    /// One-based line and zero-based column of `start`, counted in chars.
    ///
    /// Offsets past the end of `source` clamp to its last position.
    #[must_use]
    pub fn line_col(&self, source: &str) -> (u32, u32) {
        let mut offset = (self.start as usize).min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &source[..offset];

        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(newline) => before[newline + 1..].chars().count(),
            None => before.chars().count(),
        };
        (line as u32, column as u32)
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
