//! Event-script commands.
//!
//! A [`Command`] is one instruction: a mnemonic, its opcode, and one operand
//! per argument declared in the [`InstructionTable`]. Operands are either
//! fixed wire values or [`SectionPointer`]s resolved against the owning
//! [`Script`] when the command is encoded.

use crate::script::{Script, SectionPointer};
use crate::tables::InstructionTable;
use smallvec::SmallVec;
use std::fmt;
use subscript_core::{SubscriptError, SubscriptResult, Value, ValueKind};

// =============================================================================
// Operands
// =============================================================================

/// A built command operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    /// A range-checked value.
    Fixed(Value),
    /// A deferred address.
    Pointer(SectionPointer),
}

impl Operand {
    /// Encoded width in bytes.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        match self {
            Self::Fixed(value) => value.size(),
            Self::Pointer(_) => ValueKind::Pointer.width(),
        }
    }

    /// The concrete value, resolving pointers against `script`.
    pub fn resolve(&self, script: &Script) -> SubscriptResult<Value> {
        match self {
            Self::Fixed(value) => Ok(*value),
            Self::Pointer(pointer) => {
                let address = script.address(*pointer)?;
                Value::new(ValueKind::Pointer, i64::from(address))
            }
        }
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Self::Fixed(value)
    }
}

impl From<SectionPointer> for Operand {
    fn from(pointer: SectionPointer) -> Self {
        Self::Pointer(pointer)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(value) => write_hex(f, value.raw()),
            Self::Pointer(pointer) => write!(f, "{pointer}"),
        }
    }
}

/// Pad to the smallest of 2, 4, 6 or 8 digits that holds the value.
fn write_hex(f: &mut fmt::Formatter<'_>, raw: u32) -> fmt::Result {
    match raw {
        0..=0xFF => write!(f, "0x{raw:02x}"),
        0x100..=0xFFFF => write!(f, "0x{raw:04x}"),
        0x1_0000..=0xFF_FFFF => write!(f, "0x{raw:06x}"),
        _ => write!(f, "0x{raw:08x}"),
    }
}

/// An argument passed to [`Command::create`].
///
/// Integers are constructed through the table's type identifier for their
/// position; operands are taken as they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandArg {
    /// A raw number.
    Int(i64),
    /// An already-built operand.
    Operand(Operand),
}

impl From<i64> for CommandArg {
    fn from(raw: i64) -> Self {
        Self::Int(raw)
    }
}

impl From<i32> for CommandArg {
    fn from(raw: i32) -> Self {
        Self::Int(i64::from(raw))
    }
}

impl From<u32> for CommandArg {
    fn from(raw: u32) -> Self {
        Self::Int(i64::from(raw))
    }
}

impl From<Value> for CommandArg {
    fn from(value: Value) -> Self {
        Self::Operand(Operand::Fixed(value))
    }
}

impl From<SectionPointer> for CommandArg {
    fn from(pointer: SectionPointer) -> Self {
        Self::Operand(Operand::Pointer(pointer))
    }
}

impl From<Operand> for CommandArg {
    fn from(operand: Operand) -> Self {
        Self::Operand(operand)
    }
}

// =============================================================================
// Command
// =============================================================================

/// One event-script instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    code: u8,
    args: SmallVec<[Operand; 4]>,
}

impl Command {
    /// Build a command from the instruction table.
    pub fn create(
        table: &InstructionTable,
        name: &str,
        args: impl IntoIterator<Item = CommandArg>,
    ) -> SubscriptResult<Self> {
        let def = table.get(name)?;
        let args: SmallVec<[CommandArg; 4]> = args.into_iter().collect();
        if args.len() != def.arity() {
            return Err(SubscriptError::arity(name, def.arity(), args.len()));
        }

        let operands = args
            .iter()
            .zip(&def.args)
            .map(|(arg, ty)| match arg {
                CommandArg::Operand(operand) => Ok(*operand),
                CommandArg::Int(raw) => ty.construct(*raw).map(Operand::Fixed),
            })
            .collect::<SubscriptResult<SmallVec<[Operand; 4]>>>()?;

        Ok(Self {
            name: def.name.clone(),
            code: def.code,
            args: operands,
        })
    }

    /// The mnemonic.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The opcode.
    #[inline]
    #[must_use]
    pub const fn code(&self) -> u8 {
        self.code
    }

    /// The operands.
    #[inline]
    #[must_use]
    pub fn args(&self) -> &[Operand] {
        &self.args
    }

    /// Encoded size: opcode plus operands.
    #[must_use]
    pub fn size(&self) -> usize {
        1 + self.args.iter().map(Operand::size).sum::<usize>()
    }

    /// Check whether control never falls through this command.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.name.as_str(), "end" | "return" | "goto")
    }

    /// The first deferred pointer operand, if any.
    #[must_use]
    pub fn target(&self) -> Option<SectionPointer> {
        self.args.iter().find_map(|arg| match arg {
            Operand::Pointer(pointer) => Some(*pointer),
            Operand::Fixed(_) => None,
        })
    }

    /// Append the encoding to `out`, resolving pointers against `script`.
    pub fn encode_into(&self, script: &Script, out: &mut Vec<u8>) -> SubscriptResult<()> {
        out.push(self.code);
        for arg in &self.args {
            arg.resolve(script)?.encode_into(out);
        }
        Ok(())
    }

    /// Encode, resolving pointers against `script`.
    pub fn encode(&self, script: &Script) -> SubscriptResult<Vec<u8>> {
        let mut out = Vec::with_capacity(self.size());
        self.encode_into(script, &mut out)?;
        Ok(out)
    }

    /// Decode one command from the start of `bytes`.
    ///
    /// Returns the command and the number of bytes consumed. Pointer
    /// arguments decode as plain pointer values.
    pub fn decode(table: &InstructionTable, bytes: &[u8]) -> SubscriptResult<(Self, usize)> {
        let code = *bytes
            .first()
            .ok_or_else(|| SubscriptError::range("cannot decode a command from empty input"))?;
        let def = table.by_code(code)?;

        let mut offset = 1;
        let mut args = SmallVec::with_capacity(def.arity());
        for ty in &def.args {
            let value = ty.decode(bytes, offset)?;
            offset += value.size();
            args.push(Operand::Fixed(value));
        }

        Ok((
            Self {
                name: def.name.clone(),
                code,
                args,
            },
            offset,
        ))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
