//! Integer literal scanning.
//!
//! Accepts decimal, `0x`, `0o` and `0b` literals with `_` separators.
//! Floating-point and imaginary literals are recognized only to report them.

use super::cursor::Cursor;
use crate::token::TokenKind;

/// Scan a numeric literal whose first character has been consumed.
pub fn parse_number(cursor: &mut Cursor<'_>, first: char) -> TokenKind {
    if first == '0' {
        let radix = match cursor.first() {
            'x' | 'X' => Some(16),
            'o' | 'O' => Some(8),
            'b' | 'B' => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            cursor.bump();
            return scan_radix(cursor, radix);
        }
    }

    let mut digits = String::new();
    if first != '.' {
        digits.push(first);
    }
    cursor.eat_while(|c| {
        if c.is_ascii_digit() {
            digits.push(c);
            true
        } else {
            c == '_'
        }
    });

    if first == '.' || matches!(cursor.first(), '.' | 'e' | 'E' | 'j' | 'J') {
        cursor.eat_while(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_');
        return TokenKind::Error("floating-point literals are not supported".to_string());
    }

    finish(&digits, 10)
}

fn scan_radix(cursor: &mut Cursor<'_>, radix: u32) -> TokenKind {
    let mut digits = String::new();
    cursor.eat_while(|c| {
        if c.is_ascii_alphanumeric() {
            digits.push(c);
            true
        } else {
            c == '_'
        }
    });
    if digits.is_empty() {
        return TokenKind::Error("missing digits after integer base prefix".to_string());
    }
    finish(&digits, radix)
}

fn finish(digits: &str, radix: u32) -> TokenKind {
    match i64::from_str_radix(digits, radix) {
        Ok(value) => TokenKind::Int(value),
        Err(_) if digits.chars().all(|c| c.is_digit(radix)) => {
            TokenKind::Error(format!("integer literal too large: {digits}"))
        }
        Err(_) => TokenKind::Error(format!("invalid digit in base-{radix} literal: {digits}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> TokenKind {
        let mut cursor = Cursor::new(source);
        let first = cursor.bump().unwrap();
        parse_number(&mut cursor, first)
    }

    #[test]
    fn test_decimal() {
        assert_eq!(scan("1_000"), TokenKind::Int(1000));
    }

    #[test]
    fn test_prefixed() {
        assert_eq!(scan("0x800D"), TokenKind::Int(0x800D));
        assert_eq!(scan("0b1010"), TokenKind::Int(10));
        assert_eq!(scan("0o17"), TokenKind::Int(15));
    }

    #[test]
    fn test_float_rejected() {
        assert!(matches!(scan("3.14"), TokenKind::Error(_)));
        assert!(matches!(scan("1e5"), TokenKind::Error(_)));
    }

    #[test]
    fn test_bad_digit() {
        assert!(matches!(scan("0b102"), TokenKind::Error(_)));
        assert!(matches!(scan("0x"), TokenKind::Error(_)));
    }

    #[test]
    fn test_overflow() {
        assert!(matches!(scan("99999999999999999999"), TokenKind::Error(_)));
    }
}
