//! Data tables loaded from JSON.
//!
//! The compiler ships a default copy of every table under `tables/` in this
//! crate, embedded at build time. Each table can also be loaded from a
//! caller-supplied JSON document:
//!
//! | Table                | Shape                                            |
//! |----------------------|--------------------------------------------------|
//! | [`InstructionTable`] | `mnemonic → {code, args: [{type}, ...]}`         |
//! | [`TextTable`]        | `normal`/`japanese`/`group`/`escape` → code(s)   |
//! | [`MovementTable`]    | `name → code`                                    |
//! | [`GameConfig`]       | `game code → {language, inherits?, ...}`         |

mod games;
mod instructions;
mod movement;
mod text;

pub use games::GameConfig;
pub use instructions::{InstructionDef, InstructionTable};
pub use movement::MovementTable;
pub use text::TextTable;

use serde::Deserialize;
use smallvec::{smallvec, SmallVec};
use subscript_core::SubscriptError;

/// A table code: either a single byte or a sequence of bytes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawCode {
    Single(u8),
    Sequence(Vec<u8>),
}

impl RawCode {
    pub(crate) fn into_bytes(self) -> SmallVec<[u8; 2]> {
        match self {
            Self::Single(byte) => smallvec![byte],
            Self::Sequence(bytes) => SmallVec::from_vec(bytes),
        }
    }
}

/// Wrap a serde failure as a table error naming the table.
pub(crate) fn malformed(table: &str, err: &serde_json::Error) -> SubscriptError {
    SubscriptError::table(format!("malformed {table} table: {err}"))
}
