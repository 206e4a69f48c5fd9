//! String and bytes literal scanning.
//!
//! Text strings keep their escape sequences verbatim: the game's text
//! encoder resolves `\x` escapes through its own table, so the lexer only
//! needs to find the closing quote. A raw newline inside a triple-quoted
//! string is stored as the two characters `\n`. Bytes literals are decoded
//! to their byte values here.

use super::cursor::Cursor;
use crate::token::TokenKind;

/// String prefix flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringPrefix {
    /// `r` prefix.
    pub raw: bool,
    /// `b` prefix.
    pub bytes: bool,
    invalid: bool,
}

impl StringPrefix {
    /// Build a prefix from its characters.
    #[must_use]
    pub fn from_chars(chars: &str) -> Self {
        let mut prefix = Self::default();
        for c in chars.chars() {
            let slot = match c {
                'r' | 'R' => &mut prefix.raw,
                'b' | 'B' => &mut prefix.bytes,
                _ => {
                    prefix.invalid = true;
                    continue;
                }
            };
            if *slot {
                prefix.invalid = true;
            }
            *slot = true;
        }
        prefix
    }

    /// Whether the prefix combination is accepted.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.invalid
    }
}

/// Whether `c` may start a string prefix.
#[inline]
#[must_use]
pub fn is_string_prefix(c: char) -> bool {
    matches!(c, 'r' | 'R' | 'b' | 'B')
}

/// Scan a string literal. The cursor must sit on the opening quote.
pub fn parse_string(cursor: &mut Cursor<'_>, prefix: StringPrefix) -> TokenKind {
    let quote = match cursor.bump() {
        Some(q @ ('"' | '\'')) => q,
        _ => return TokenKind::Error("expected string quote".to_string()),
    };
    let triple = cursor.first() == quote && cursor.second() == quote;
    if triple {
        cursor.bump();
        cursor.bump();
    }

    let mut body = String::new();
    loop {
        let Some(c) = cursor.bump() else {
            return TokenKind::Error("unterminated string literal".to_string());
        };
        match c {
            _ if c == quote && !triple => break,
            _ if c == quote && cursor.first() == quote && cursor.second() == quote => {
                cursor.bump();
                cursor.bump();
                break;
            }
            '\\' => {
                let Some(next) = cursor.bump() else {
                    return TokenKind::Error("unterminated string literal".to_string());
                };
                if next == '\n' {
                    continue;
                }
                if next == '\r' {
                    cursor.eat('\n');
                    continue;
                }
                body.push('\\');
                body.push(next);
            }
            '\n' | '\r' if !triple => {
                return TokenKind::Error("unterminated string literal".to_string());
            }
            '\r' => {
                cursor.eat('\n');
                body.push_str("\\n");
            }
            '\n' => body.push_str("\\n"),
            _ => body.push(c),
        }
    }

    if prefix.bytes {
        match decode_bytes(&body, prefix.raw) {
            Ok(bytes) => TokenKind::Bytes(bytes),
            Err(message) => TokenKind::Error(message),
        }
    } else {
        TokenKind::String(body)
    }
}

/// Decode the escape sequences of a bytes literal body.
fn decode_bytes(body: &str, raw: bool) -> Result<Vec<u8>, String> {
    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if !c.is_ascii() {
            return Err("bytes can only contain ASCII literal characters".to_string());
        }
        if c != '\\' || raw {
            out.push(c as u8);
            continue;
        }
        let Some(esc) = chars.next() else {
            out.push(b'\\');
            break;
        };
        match esc {
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0C),
            'v' => out.push(0x0B),
            '\\' => out.push(b'\\'),
            '\'' => out.push(b'\''),
            '"' => out.push(b'"'),
            'x' => {
                let hi = chars.next().and_then(|c| c.to_digit(16));
                let lo = chars.next().and_then(|c| c.to_digit(16));
                match (hi, lo) {
                    (Some(hi), Some(lo)) => out.push((hi * 16 + lo) as u8),
                    _ => return Err("truncated \\xXX escape".to_string()),
                }
            }
            '0'..='7' => {
                let mut value = esc.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                if value > 0xFF {
                    return Err("octal escape value out of range".to_string());
                }
                out.push(value as u8);
            }
            other => {
                out.push(b'\\');
                if !other.is_ascii() {
                    return Err("bytes can only contain ASCII literal characters".to_string());
                }
                out.push(other as u8);
            }
        }
    }
    Ok(out)
}
