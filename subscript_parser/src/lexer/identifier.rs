//! Identifier and keyword scanning.

use super::cursor::Cursor;
use crate::token::{Keyword, TokenKind};

/// Whether `c` can start an identifier.
#[inline]
#[must_use]
pub fn is_id_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

/// Whether `c` can continue an identifier.
#[inline]
#[must_use]
pub fn is_id_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Scan an identifier whose first character has been consumed.
pub fn parse_identifier(cursor: &mut Cursor<'_>, first: char) -> TokenKind {
    let mut name = String::new();
    name.push(first);
    cursor.eat_while(|c| {
        let ok = is_id_continue(c);
        if ok {
            name.push(c);
        }
        ok
    });

    match Keyword::from_ident(&name) {
        Some(kw) => TokenKind::Keyword(kw),
        None => TokenKind::Ident(name),
    }
}
