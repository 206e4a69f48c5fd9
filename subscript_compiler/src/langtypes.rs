//! Values a script name can be bound to.
//!
//! Typed symbols (`Flag(0x200)`, `Var(0x4000)`, ...) wrap a range-checked
//! [`Value`]. Content symbols (strings, byte strings, movement lists and raw
//! files) are lazy: their bytes become a raw [`Section`](crate::script::Section)
//! the first time something takes their address, and every later use points
//! at that same section.

use crate::command::{Command, CommandArg};
use crate::environment::Environment;
use crate::script::{Script, SectionPointer};
use crate::text::{encode_movement, encode_text, MovementStep};
use std::cell::Cell;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use subscript_core::{SubscriptError, SubscriptResult, Value, ValueKind};
use tracing::debug;

/// Well-known variables bound in every compile.
pub const PREDEFINED: [(&str, u32); 3] = [
    ("PLAYERFACING", 0x800C),
    ("LASTRESULT", 0x800D),
    ("LASTTALKED", 0x800F),
];

/// Explicit type constructors and the kinds they build.
pub const TYPE_CONSTRUCTORS: [(&str, ValueKind); 6] = [
    ("Flag", ValueKind::Flag),
    ("Var", ValueKind::Variable),
    ("Bank", ValueKind::Bank),
    ("Buffer", ValueKind::Buffer),
    ("HiddenVar", ValueKind::HiddenVar),
    ("Pointer", ValueKind::Pointer),
];

/// Look up an explicit type constructor by name.
#[must_use]
pub fn type_constructor(name: &str) -> Option<ValueKind> {
    TYPE_CONSTRUCTORS
        .iter()
        .find(|(ctor, _)| *ctor == name)
        .map(|(_, kind)| *kind)
}

// =============================================================================
// Lazy content
// =============================================================================

/// Bytes that are encoded into their own section on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// In-game text, escapes left for the text encoder.
    Text(String),
    /// A movement list.
    Movement(Vec<MovementStep>),
    /// Literal bytes.
    Raw(Vec<u8>),
    /// Bytes read from a file.
    File(PathBuf),
}

impl Content {
    fn describe(&self) -> &'static str {
        match self {
            Self::Text(_) => "string",
            Self::Movement(_) => "movement",
            Self::Raw(_) => "raw data",
            Self::File(_) => "raw file",
        }
    }

    fn encode(&self, env: &Environment) -> SubscriptResult<Vec<u8>> {
        match self {
            Self::Text(text) => encode_text(env.text_table(), text),
            Self::Movement(steps) => encode_movement(env.movement_table(), steps),
            Self::Raw(bytes) => Ok(bytes.clone()),
            Self::File(path) => std::fs::read(path).map_err(|e| {
                SubscriptError::io(format!("cannot read \"{}\": {e}", path.display()))
            }),
        }
    }
}

/// Content that is placed into the script at most once.
#[derive(Debug)]
pub struct LazySection {
    content: Content,
    placed: Cell<Option<SectionPointer>>,
}

impl LazySection {
    /// Wrap content that has not been placed yet.
    #[must_use]
    pub fn new(content: Content) -> Rc<Self> {
        Rc::new(Self {
            content,
            placed: Cell::new(None),
        })
    }

    /// The wrapped content.
    #[must_use]
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Where the content was placed, if it has been.
    #[must_use]
    pub fn placed(&self) -> Option<SectionPointer> {
        self.placed.get()
    }

    /// Place the content on first use and return its address.
    pub fn value(&self, script: &mut Script, env: &Environment) -> SubscriptResult<SectionPointer> {
        if let Some(pointer) = self.placed.get() {
            return Ok(pointer);
        }
        let bytes = self.content.encode(env)?;
        let pointer = script.add_raw(bytes).start();
        debug!(section = %pointer, kind = self.content.describe(), "content materialized");
        self.placed.set(Some(pointer));
        Ok(pointer)
    }
}

// =============================================================================
// Symbols
// =============================================================================

/// A value bound to a name or passed to a built-in.
#[derive(Debug, Clone)]
pub enum Symbol {
    /// An integer constant.
    Int(i64),
    /// A typed value built by an explicit constructor.
    Typed(Value),
    /// Lazily placed content.
    Content(Rc<LazySection>),
    /// A user function, bound as the command that invokes it.
    Function(Command),
    /// An imported native module.
    Module(String),
}

impl Symbol {
    /// Wrap content in a fresh lazy symbol.
    #[must_use]
    pub fn content(content: Content) -> Self {
        Self::Content(LazySection::new(content))
    }

    /// A typed symbol of `kind`, range-checked.
    pub fn typed(kind: ValueKind, raw: i64) -> SubscriptResult<Self> {
        Ok(Self::Typed(Value::new(kind, raw)?))
    }

    /// The typed value, when the symbol is of `kind`.
    #[must_use]
    pub fn as_kind(&self, kind: ValueKind) -> Option<Value> {
        match self {
            Self::Typed(value) if value.kind() == kind => Some(*value),
            _ => None,
        }
    }

    /// Truth value as a script condition sees it.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Int(n) => *n != 0,
            _ => true,
        }
    }

    /// Short description for error messages.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Int(_) => "int".to_string(),
            Self::Typed(value) => value.kind().to_string(),
            Self::Content(lazy) => lazy.content.describe().to_string(),
            Self::Function(_) => "function".to_string(),
            Self::Module(name) => format!("module '{name}'"),
        }
    }

    /// Convert to a command argument, placing content if needed.
    ///
    /// Typed symbols pass their raw number so the receiving command's
    /// argument type decides the wire kind.
    pub fn to_arg(&self, script: &mut Script, env: &Environment) -> SubscriptResult<CommandArg> {
        match self {
            Self::Int(raw) => Ok(CommandArg::Int(*raw)),
            Self::Typed(value) => Ok(CommandArg::Int(i64::from(value.raw()))),
            Self::Content(lazy) => Ok(lazy.value(script, env)?.into()),
            Self::Function(command) => command.target().map(CommandArg::from).ok_or_else(|| {
                SubscriptError::type_error(format!(
                    "function bound as \"{command}\" has no address"
                ))
            }),
            Self::Module(name) => Err(SubscriptError::type_error(format!(
                "module '{name}' cannot be used as a command argument"
            ))),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Typed(value) => write!(f, "{:?}", value),
            Self::Content(lazy) => match lazy.placed() {
                Some(pointer) => write!(f, "{} {pointer}", lazy.content.describe()),
                None => write!(f, "{} (unplaced)", lazy.content.describe()),
            },
            Self::Function(command) => write!(f, "function ({command})"),
            Self::Module(name) => write!(f, "module {name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Environment {
        Environment::with_default_tables().unwrap()
    }

    #[test]
    fn test_materialization_is_idempotent() {
        let env = env();
        let mut script = Script::new(0);
        script.add();
        let symbol = Symbol::content(Content::Text("Hi".into()));
        let Symbol::Content(lazy) = &symbol else {
            unreachable!()
        };

        assert_eq!(lazy.placed(), None);
        let first = lazy.value(&mut script, &env).unwrap();
        let second = lazy.value(&mut script, &env).unwrap();
        assert_eq!(first, second);
        assert_eq!(script.sections().len(), 2);
        assert_eq!(
            script.section(first.section()).unwrap().data(),
            Some(&[0xC2, 0xDD, 0xFF][..])
        );
    }

    #[test]
    fn test_clones_share_placement() {
        let env = env();
        let mut script = Script::new(0);
        let symbol = Symbol::content(Content::Raw(vec![1, 2]));
        let copy = symbol.clone();

        let a = symbol.to_arg(&mut script, &env).unwrap();
        let b = copy.to_arg(&mut script, &env).unwrap();
        assert_eq!(a, b);
        assert_eq!(script.sections().len(), 1);
    }

    #[test]
    fn test_failed_encoding_places_nothing() {
        let env = env();
        let mut script = Script::new(0);
        let lazy = LazySection::new(Content::Text("[nobody]".into()));
        assert!(lazy.value(&mut script, &env).is_err());
        assert!(script.sections().is_empty());
        assert_eq!(lazy.placed(), None);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let env = env();
        let mut script = Script::new(0);
        let lazy = LazySection::new(Content::File("/nonexistent/dir/blob.bin".into()));
        assert_eq!(lazy.value(&mut script, &env).unwrap_err().kind_name(), "IoError");
    }

    #[test]
    fn test_typed_symbols() {
        let flag = Symbol::typed(ValueKind::Flag, 0x200).unwrap();
        assert!(flag.as_kind(ValueKind::Flag).is_some());
        assert!(flag.as_kind(ValueKind::Variable).is_none());
        assert!(Symbol::typed(ValueKind::Flag, 0x900).is_err());
        assert_eq!(type_constructor("Var"), Some(ValueKind::Variable));
        assert_eq!(type_constructor("Movement"), None);
    }

    #[test]
    fn test_truthiness() {
        assert!(!Symbol::Int(0).is_truthy());
        assert!(Symbol::Int(2).is_truthy());
        assert!(Symbol::typed(ValueKind::Flag, 0).unwrap().is_truthy());
    }

    #[test]
    fn test_module_is_not_an_argument() {
        let env = env();
        let mut script = Script::new(0);
        let err = Symbol::Module("special".into())
            .to_arg(&mut script, &env)
            .unwrap_err();
        assert_eq!(err.kind_name(), "TypeError");
    }
}
