//! Text and movement encoders.
//!
//! Text syntax:
//!
//! - plain characters map through the `normal` table, or the `japanese`
//!   table for kana (U+3040 to U+30FF)
//! - `\c` maps `c` through the `escape` table
//! - `[name]` maps through the `group` table
//! - `{name}` emits a fixed control sequence
//!
//! Encoded text always ends with [`TEXT_TERMINATOR`].

use crate::tables::{MovementTable, TextTable};
use subscript_core::{SubscriptError, SubscriptResult};

/// Byte ending every encoded string.
pub const TEXT_TERMINATOR: u8 = 0xFF;

/// Byte ending every movement list.
pub const MOVEMENT_TERMINATOR: u8 = 0xFE;

const KANA: std::ops::RangeInclusive<char> = '\u{3040}'..='\u{30FF}';

/// Encode a string through the text table.
pub fn encode_text(table: &TextTable, text: &str) -> SubscriptResult<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len() + 1);
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| SubscriptError::encode("text ends with a lone backslash"))?;
                let code = table.escape(escaped).ok_or_else(|| {
                    SubscriptError::encode(format!("unknown escape sequence \"\\{escaped}\""))
                })?;
                out.extend_from_slice(code);
            }
            '[' => {
                let name = take_until(&mut chars, ']')?;
                let code = table.group(&name).ok_or_else(|| {
                    SubscriptError::encode(format!("unknown text group \"[{name}]\""))
                })?;
                out.extend_from_slice(code);
            }
            '{' => {
                let name = take_until(&mut chars, '}')?;
                out.extend_from_slice(special(&name)?);
            }
            c => {
                let code = if KANA.contains(&c) {
                    table.japanese(c)
                } else {
                    table.normal(c)
                };
                let code = code.ok_or_else(|| {
                    SubscriptError::encode(format!("character {c:?} has no encoding"))
                })?;
                out.extend_from_slice(code);
            }
        }
    }

    out.push(TEXT_TERMINATOR);
    Ok(out)
}

fn take_until(chars: &mut std::str::Chars<'_>, close: char) -> SubscriptResult<String> {
    let mut name = String::new();
    for c in chars.by_ref() {
        if c == close {
            return Ok(name);
        }
        name.push(c);
    }
    Err(SubscriptError::encode(format!(
        "unterminated text control \"{name}\", expected '{close}'"
    )))
}

fn special(name: &str) -> SubscriptResult<&'static [u8]> {
    match name {
        "black" => Ok(&[0xFC, 0x01, 0x01]),
        other => Err(SubscriptError::encode(format!(
            "unknown text special \"{{{other}}}\""
        ))),
    }
}

/// One entry of a movement list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovementStep {
    /// A step named in the movement table.
    Name(String),
    /// A literal movement code.
    Code(i64),
}

/// Encode a movement list, appending the terminator if absent.
pub fn encode_movement(table: &MovementTable, steps: &[MovementStep]) -> SubscriptResult<Vec<u8>> {
    let mut out = Vec::with_capacity(steps.len() + 1);
    for step in steps {
        let code = match step {
            MovementStep::Name(name) => table.get(name).ok_or_else(|| {
                SubscriptError::encode(format!("unknown movement \"{name}\""))
            })?,
            MovementStep::Code(raw) => u8::try_from(*raw).map_err(|_| {
                SubscriptError::range(format!("movement code {raw:#x} does not fit in a byte"))
            })?,
        };
        out.push(code);
    }
    if out.last() != Some(&MOVEMENT_TERMINATOR) {
        out.push(MOVEMENT_TERMINATOR);
    }
    Ok(out)
}
