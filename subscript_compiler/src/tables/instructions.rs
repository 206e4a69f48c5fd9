//! Instruction table: mnemonics, opcodes and argument types.

use super::malformed;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use subscript_core::{SubscriptError, SubscriptResult, TypeId};

const DEFAULT_COMMANDS: &str = include_str!("../../tables/commands.json");

/// One instruction table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionDef {
    /// Mnemonic.
    pub name: String,
    /// Opcode byte.
    pub code: u8,
    /// Declared argument types, in order.
    pub args: SmallVec<[TypeId; 4]>,
}

impl InstructionDef {
    /// Number of declared arguments.
    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.args.len()
    }
}

#[derive(Deserialize)]
struct RawEntry {
    code: u8,
    #[serde(default)]
    args: Vec<RawArg>,
}

#[derive(Deserialize)]
struct RawArg {
    #[serde(rename = "type")]
    ty: String,
}

/// Mnemonic and opcode lookup for event-script commands.
#[derive(Debug, Clone, Default)]
pub struct InstructionTable {
    by_name: FxHashMap<String, InstructionDef>,
    by_code: FxHashMap<u8, String>,
}

impl InstructionTable {
    /// The table shipped with the compiler.
    pub fn default_table() -> SubscriptResult<Self> {
        Self::from_json(DEFAULT_COMMANDS)
    }

    /// Load a table from JSON.
    ///
    /// When several mnemonics share an opcode, decoding resolves to the one
    /// that sorts first.
    pub fn from_json(json: &str) -> SubscriptResult<Self> {
        let raw: BTreeMap<String, RawEntry> =
            serde_json::from_str(json).map_err(|e| malformed("instruction", &e))?;

        let mut table = Self::default();
        for (name, entry) in raw {
            let args = entry
                .args
                .iter()
                .map(|arg| arg.ty.parse::<TypeId>())
                .collect::<SubscriptResult<SmallVec<[TypeId; 4]>>>()
                .map_err(|e| SubscriptError::table(format!("command \"{name}\": {e}")))?;

            table.by_code.entry(entry.code).or_insert_with(|| name.clone());
            table.by_name.insert(
                name.clone(),
                InstructionDef {
                    name,
                    code: entry.code,
                    args,
                },
            );
        }
        Ok(table)
    }

    /// Look up a mnemonic.
    pub fn get(&self, name: &str) -> SubscriptResult<&InstructionDef> {
        self.by_name
            .get(name)
            .ok_or_else(|| SubscriptError::unknown_instruction(name))
    }

    /// Look up an opcode.
    pub fn by_code(&self, code: u8) -> SubscriptResult<&InstructionDef> {
        self.by_code
            .get(&code)
            .and_then(|name| self.by_name.get(name))
            .ok_or_else(|| SubscriptError::unknown_instruction(format!("{code:#04x}")))
    }

    /// Check whether a mnemonic exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Check whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Iterate over all entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &InstructionDef> {
        self.by_name.values()
    }
}
