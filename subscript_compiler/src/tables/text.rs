//! Character tables for in-game text.

use super::{malformed, RawCode};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use subscript_core::{SubscriptError, SubscriptResult};

const DEFAULT_TEXT: &str = include_str!("../../tables/text.json");

/// Encoded form of one character, group or escape.
pub type Code = SmallVec<[u8; 2]>;

#[derive(Deserialize)]
struct RawTextTable {
    #[serde(default)]
    normal: BTreeMap<String, RawCode>,
    #[serde(default)]
    japanese: BTreeMap<String, RawCode>,
    #[serde(default)]
    group: BTreeMap<String, RawCode>,
    #[serde(default)]
    escape: BTreeMap<String, RawCode>,
}

/// Character tables used by the text encoder.
#[derive(Debug, Clone, Default)]
pub struct TextTable {
    normal: FxHashMap<char, Code>,
    japanese: FxHashMap<char, Code>,
    group: FxHashMap<String, Code>,
    escape: FxHashMap<char, Code>,
}

impl TextTable {
    /// The table shipped with the compiler.
    pub fn default_table() -> SubscriptResult<Self> {
        Self::from_json(DEFAULT_TEXT)
    }

    /// Load a table from JSON.
    pub fn from_json(json: &str) -> SubscriptResult<Self> {
        let raw: RawTextTable =
            serde_json::from_str(json).map_err(|e| malformed("text", &e))?;

        Ok(Self {
            normal: char_keys("normal", raw.normal)?,
            japanese: char_keys("japanese", raw.japanese)?,
            group: raw
                .group
                .into_iter()
                .map(|(name, code)| (name, code.into_bytes()))
                .collect(),
            escape: char_keys("escape", raw.escape)?,
        })
    }

    /// Code for a plain character.
    #[must_use]
    pub fn normal(&self, c: char) -> Option<&Code> {
        self.normal.get(&c)
    }

    /// Code for a character in the Japanese sub-table.
    #[must_use]
    pub fn japanese(&self, c: char) -> Option<&Code> {
        self.japanese.get(&c)
    }

    /// Code for a bracketed group name.
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Code> {
        self.group.get(name)
    }

    /// Code for a backslash escape.
    #[must_use]
    pub fn escape(&self, c: char) -> Option<&Code> {
        self.escape.get(&c)
    }
}

fn char_keys(
    section: &str,
    entries: BTreeMap<String, RawCode>,
) -> SubscriptResult<FxHashMap<char, Code>> {
    entries
        .into_iter()
        .map(|(key, code)| {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok((c, code.into_bytes())),
                _ => Err(SubscriptError::table(format!(
                    "text table section \"{section}\" key \"{key}\" is not a single character"
                ))),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_letters() {
        let table = TextTable::default_table().unwrap();
        assert_eq!(table.normal('A').unwrap().as_slice(), &[0xBB]);
        assert_eq!(table.normal('z').unwrap().as_slice(), &[0xEE]);
        assert_eq!(table.normal('0').unwrap().as_slice(), &[0xA1]);
        assert_eq!(table.escape('n').unwrap().as_slice(), &[0xFE]);
    }

    #[test]
    fn test_group_sequence() {
        let table = TextTable::default_table().unwrap();
        assert_eq!(table.group("player").unwrap().as_slice(), &[0xFD, 0x01]);
        assert!(table.group("nobody").is_none());
    }

    #[test]
    fn test_japanese_subtable() {
        let table = TextTable::default_table().unwrap();
        assert_eq!(table.japanese('あ').unwrap().as_slice(), &[0x01]);
        assert!(table.normal('あ').is_none());
    }

    #[test]
    fn test_multi_char_key_rejected() {
        let err = TextTable::from_json(r#"{"normal": {"ab": 1}}"#).unwrap_err();
        assert_eq!(err.kind_name(), "TableError");
    }

    #[test]
    fn test_missing_sections_default_empty() {
        let table = TextTable::from_json(r#"{"normal": {"x": [1, 2]}}"#).unwrap();
        assert_eq!(table.normal('x').unwrap().as_slice(), &[1, 2]);
        assert!(table.escape('n').is_none());
    }
}
