//! Movement table: step names to movement codes.

use super::malformed;
use rustc_hash::FxHashMap;
use subscript_core::SubscriptResult;

const DEFAULT_MOVEMENT: &str = include_str!("../../tables/movement.json");

/// Movement step lookup.
#[derive(Debug, Clone, Default)]
pub struct MovementTable {
    steps: FxHashMap<String, u8>,
}

impl MovementTable {
    /// The table shipped with the compiler.
    pub fn default_table() -> SubscriptResult<Self> {
        Self::from_json(DEFAULT_MOVEMENT)
    }

    /// Load a table from JSON.
    pub fn from_json(json: &str) -> SubscriptResult<Self> {
        let steps = serde_json::from_str(json).map_err(|e| malformed("movement", &e))?;
        Ok(Self { steps })
    }

    /// Code for a named step.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u8> {
        self.steps.get(name).copied()
    }
}
