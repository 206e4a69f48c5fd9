//! Per-title configuration keyed by 4-character game code.
//!
//! An entry may name a parent through `inherits`. Resolution walks the chain
//! to its root and merges shallowly from the root down, so keys set by a
//! child override its ancestors.

use super::malformed;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::{Map, Value as Json};
use subscript_core::{SubscriptError, SubscriptResult};

const DEFAULT_GAMES: &str = include_str!("../../tables/games.json");

const INHERITS: &str = "inherits";

/// Per-title configuration.
#[derive(Debug, Clone, Default)]
pub struct GameConfig {
    entries: FxHashMap<String, Map<String, Json>>,
}

impl GameConfig {
    /// The configuration shipped with the compiler.
    pub fn default_config() -> SubscriptResult<Self> {
        Self::from_json(DEFAULT_GAMES)
    }

    /// Load a configuration from JSON.
    pub fn from_json(json: &str) -> SubscriptResult<Self> {
        let entries: FxHashMap<String, Map<String, Json>> =
            serde_json::from_str(json).map_err(|e| malformed("game", &e))?;

        for (code, entry) in &entries {
            if code.chars().count() != 4 {
                return Err(SubscriptError::table(format!(
                    "game code \"{code}\" must be 4 characters"
                )));
            }
            if let Some(parent) = entry.get(INHERITS) {
                if !parent.is_string() {
                    return Err(SubscriptError::table(format!(
                        "game \"{code}\": \"{INHERITS}\" must be a game code"
                    )));
                }
            }
        }
        Ok(Self { entries })
    }

    /// Check whether a game code has an entry.
    #[must_use]
    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    /// Resolve the merged configuration for a game code.
    pub fn resolve(&self, code: &str) -> SubscriptResult<Map<String, Json>> {
        let mut chain = Vec::new();
        let mut seen = FxHashSet::default();
        let mut current = code;

        loop {
            if !seen.insert(current) {
                return Err(SubscriptError::table(format!(
                    "inheritance cycle through game \"{current}\""
                )));
            }
            let entry = self.entries.get(current).ok_or_else(|| {
                if current == code {
                    SubscriptError::table(format!("unknown game code \"{code}\""))
                } else {
                    SubscriptError::table(format!(
                        "game \"{code}\" inherits from unknown game \"{current}\""
                    ))
                }
            })?;
            chain.push(entry);

            match entry.get(INHERITS).and_then(Json::as_str) {
                Some(parent) => current = parent,
                None => break,
            }
        }

        let mut merged = Map::new();
        for entry in chain.into_iter().rev() {
            for (key, value) in entry {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged.remove(INHERITS);
        Ok(merged)
    }

    /// The script language a game uses.
    pub fn language(&self, code: &str) -> SubscriptResult<String> {
        let merged = self.resolve(code)?;
        merged
            .get("language")
            .and_then(Json::as_str)
            .map(str::to_owned)
            .ok_or_else(|| {
                SubscriptError::table(format!("game \"{code}\" has no \"language\" setting"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inherited_language() {
        let config = GameConfig::default_config().unwrap();
        assert_eq!(config.language("BPRE").unwrap(), "frlg");
        assert_eq!(config.language("BPGE").unwrap(), "frlg");
    }

    #[test]
    fn test_child_keys_win() {
        let config = GameConfig::default_config().unwrap();
        let emerald = config.resolve("BPEE").unwrap();
        assert_eq!(emerald["language"], "em");
        assert_eq!(emerald["name"], "Pokemon Emerald (U)");
        assert!(!emerald.contains_key("inherits"));
    }

    #[test]
    fn test_cycle_is_an_error() {
        let config = GameConfig::from_json(
            r#"{"AAAA": {"inherits": "BBBB"}, "BBBB": {"inherits": "AAAA"}}"#,
        )
        .unwrap();
        let err = config.resolve("AAAA").unwrap_err();
        assert_eq!(err.kind_name(), "TableError");
        assert!(err.to_string().contains("cycle"));
    }

    #[test]
    fn test_unknown_parent() {
        let config = GameConfig::from_json(r#"{"AAAA": {"inherits": "ZZZZ"}}"#).unwrap();
        let err = config.resolve("AAAA").unwrap_err();
        assert!(err.to_string().contains("ZZZZ"));
    }

    #[test]
    fn test_unknown_code_and_bad_keys() {
        let config = GameConfig::default_config().unwrap();
        assert!(config.resolve("XXXX").is_err());
        assert!(GameConfig::from_json(r#"{"TOOLONG": {}}"#).is_err());
        assert!(GameConfig::from_json(r#"{"AAAA": {"inherits": 4}}"#).is_err());
    }

    #[test]
    fn test_missing_language() {
        let config = GameConfig::from_json(r#"{"AAAA": {"name": "x"}}"#).unwrap();
        assert_eq!(config.language("AAAA").unwrap_err().kind_name(), "TableError");
    }
}
