//! Compilation environment: tables, import search path and target title.

use crate::tables::{GameConfig, InstructionTable, MovementTable, TextTable};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use subscript_core::SubscriptResult;

/// Everything a compile reads but never mutates.
///
/// Tables are reference counted so one environment can serve many compiles.
#[derive(Debug, Clone)]
pub struct Environment {
    instructions: Rc<InstructionTable>,
    text: Rc<TextTable>,
    movement: Rc<MovementTable>,
    games: Rc<GameConfig>,
    search_path: Vec<PathBuf>,
    game_code: Option<String>,
}

impl Environment {
    /// Build an environment from explicit tables.
    #[must_use]
    pub fn new(
        instructions: InstructionTable,
        text: TextTable,
        movement: MovementTable,
        games: GameConfig,
    ) -> Self {
        Self {
            instructions: Rc::new(instructions),
            text: Rc::new(text),
            movement: Rc::new(movement),
            games: Rc::new(games),
            search_path: Vec::new(),
            game_code: None,
        }
    }

    /// An environment using the tables shipped with the compiler.
    pub fn with_default_tables() -> SubscriptResult<Self> {
        Ok(Self::new(
            InstructionTable::default_table()?,
            TextTable::default_table()?,
            MovementTable::default_table()?,
            GameConfig::default_config()?,
        ))
    }

    /// Replace the instruction table.
    #[must_use]
    pub fn instructions(mut self, table: InstructionTable) -> Self {
        self.instructions = Rc::new(table);
        self
    }

    /// Replace the text table.
    #[must_use]
    pub fn text(mut self, table: TextTable) -> Self {
        self.text = Rc::new(table);
        self
    }

    /// Replace the movement table.
    #[must_use]
    pub fn movement(mut self, table: MovementTable) -> Self {
        self.movement = Rc::new(table);
        self
    }

    /// Replace the per-title configuration.
    #[must_use]
    pub fn games(mut self, config: GameConfig) -> Self {
        self.games = Rc::new(config);
        self
    }

    /// Append a directory to the import search path.
    #[must_use]
    pub fn search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_path.push(dir.into());
        self
    }

    /// Select the target game by its 4-character code.
    #[must_use]
    pub fn game(mut self, code: impl Into<String>) -> Self {
        self.game_code = Some(code.into());
        self
    }

    /// The instruction table.
    #[inline]
    #[must_use]
    pub fn instruction_table(&self) -> &InstructionTable {
        &self.instructions
    }

    /// The text table.
    #[inline]
    #[must_use]
    pub fn text_table(&self) -> &TextTable {
        &self.text
    }

    /// The movement table.
    #[inline]
    #[must_use]
    pub fn movement_table(&self) -> &MovementTable {
        &self.movement
    }

    /// The per-title configuration.
    #[inline]
    #[must_use]
    pub fn game_config(&self) -> &GameConfig {
        &self.games
    }

    /// Import search path, in lookup order.
    #[must_use]
    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// The selected game code.
    #[must_use]
    pub fn game_code(&self) -> Option<&str> {
        self.game_code.as_deref()
    }

    /// The selected game's script language, if a game is selected.
    pub fn language(&self) -> SubscriptResult<Option<String>> {
        self.game_code
            .as_deref()
            .map(|code| self.games.language(code))
            .transpose()
    }

    /// Check whether `dir` is on the search path.
    #[must_use]
    pub fn searches(&self, dir: &Path) -> bool {
        self.search_path.iter().any(|p| p == dir)
    }
}
