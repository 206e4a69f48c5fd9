//! Fixed-width wire values.
//!
//! Every argument of an event-script command is one of a small set of
//! integer kinds. Each kind has a byte width and a closed numeric range, and
//! encodes little-endian:
//!
//! | Kind        | Width | Accepted range        |
//! |-------------|-------|-----------------------|
//! | `Byte`      | 1     | `0..=0xFF`            |
//! | `Word`      | 2     | `0..=0xFFFF`          |
//! | `Dword`     | 4     | `0..=0xFFFF_FFFF`     |
//! | `Pointer`   | 4     | `0..=0xFFFF_FFFF`     |
//! | `Variable`  | 2     | `0x3FFF..=0xFFFF`     |
//! | `Flag`      | 2     | `0..0x900`            |
//! | `Bank`      | 1     | `0..4`                |
//! | `Buffer`    | 1     | `0..3`                |
//! | `HiddenVar` | 1     | `0..=0x33`            |
//!
//! Instruction tables refer to kinds through [`TypeId`] strings such as
//! `"byte"` or `"flag-or-variable"`. Compound identifiers list several
//! candidate kinds; [`TypeId::attempts`] yields one tagged [`Attempt`] per
//! candidate and construction stops at the first one that fits.

use crate::error::{SubscriptError, SubscriptResult};
use byteorder::{ByteOrder, LittleEndian};
use std::fmt;
use std::str::FromStr;

/// The concrete wire kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Unsigned 8-bit value.
    Byte,
    /// Unsigned 16-bit value.
    Word,
    /// Unsigned 32-bit value.
    Dword,
    /// Absolute 32-bit address.
    Pointer,
    /// Game RAM variable index.
    Variable,
    /// Event flag index.
    Flag,
    /// Script bank register.
    Bank,
    /// String buffer index.
    Buffer,
    /// Hidden variable index.
    HiddenVar,
}

impl ValueKind {
    /// All concrete kinds, in declaration order.
    pub const ALL: [ValueKind; 9] = [
        ValueKind::Byte,
        ValueKind::Word,
        ValueKind::Dword,
        ValueKind::Pointer,
        ValueKind::Variable,
        ValueKind::Flag,
        ValueKind::Bank,
        ValueKind::Buffer,
        ValueKind::HiddenVar,
    ];

    /// Encoded width in bytes.
    #[inline]
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Byte | Self::Bank | Self::Buffer | Self::HiddenVar => 1,
            Self::Word | Self::Variable | Self::Flag => 2,
            Self::Dword | Self::Pointer => 4,
        }
    }

    /// Inclusive numeric bounds accepted by this kind.
    #[must_use]
    pub const fn bounds(self) -> (i64, i64) {
        match self {
            Self::Byte => (0, 0xFF),
            Self::Word => (0, 0xFFFF),
            Self::Dword | Self::Pointer => (0, 0xFFFF_FFFF),
            Self::Variable => (0x3FFF, 0xFFFF),
            Self::Flag => (0, 0x8FF),
            Self::Bank => (0, 3),
            Self::Buffer => (0, 2),
            Self::HiddenVar => (0, 0x33),
        }
    }

    /// The table identifier naming this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::Word => "word",
            Self::Dword => "dword",
            Self::Pointer => "pointer",
            Self::Variable => "variable",
            Self::Flag => "flag",
            Self::Bank => "bank",
            Self::Buffer => "buffer",
            Self::HiddenVar => "hidden-variable",
        }
    }

    /// Check a raw number against this kind's range.
    pub fn check(self, raw: i64) -> Result<Value, RangeViolation> {
        let (min, max) = self.bounds();
        if raw < min || raw > max {
            return Err(RangeViolation::new(self, raw));
        }
        Ok(Value {
            kind: self,
            raw: raw as u32,
        })
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw number rejected by a kind's range check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeViolation {
    /// The kind that rejected the value.
    pub kind: ValueKind,
    /// The rejected number.
    pub raw: i64,
}

impl RangeViolation {
    /// Create a new range violation.
    #[must_use]
    pub const fn new(kind: ValueKind, raw: i64) -> Self {
        Self { kind, raw }
    }
}

impl fmt::Display for RangeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (min, max) = self.kind.bounds();
        write!(
            f,
            "value {:#x} out of range for {} ({:#x}..={:#x})",
            self.raw, self.kind, min, max
        )
    }
}

/// A range-checked wire value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Value {
    kind: ValueKind,
    raw: u32,
}

impl Value {
    /// Construct a value of the given kind, failing with `RangeError`.
    pub fn new(kind: ValueKind, raw: i64) -> SubscriptResult<Self> {
        Ok(kind.check(raw)?)
    }

    /// The value's kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }

    /// The numeric payload.
    #[inline]
    #[must_use]
    pub const fn raw(&self) -> u32 {
        self.raw
    }

    /// Encoded width in bytes.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> usize {
        self.kind.width()
    }

    /// Append the canonical little-endian encoding to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        let mut buf = [0u8; 4];
        LittleEndian::write_u32(&mut buf, self.raw);
        out.extend_from_slice(&buf[..self.size()]);
    }

    /// The canonical little-endian encoding.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size());
        self.encode_into(&mut out);
        out
    }

    /// Decode a value of `kind` from `bytes` starting at `offset`.
    pub fn decode(kind: ValueKind, bytes: &[u8], offset: usize) -> SubscriptResult<Self> {
        let width = kind.width();
        let slice = offset
            .checked_add(width)
            .and_then(|end| bytes.get(offset..end))
            .ok_or_else(|| {
                SubscriptError::range(format!(
                    "need {} bytes at offset {} to decode {}, have {}",
                    width,
                    offset,
                    kind,
                    bytes.len()
                ))
            })?;

        let raw = match width {
            1 => u32::from(slice[0]),
            2 => u32::from(LittleEndian::read_u16(slice)),
            _ => LittleEndian::read_u32(slice),
        };
        Self::new(kind, i64::from(raw))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:#X})", self.kind, self.raw)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind.width() {
            1 => write!(f, "0x{:02x}", self.raw),
            2 => write!(f, "0x{:04x}", self.raw),
            _ => write!(f, "0x{:08x}", self.raw),
        }
    }
}

// =============================================================================
// Type Identifiers
// =============================================================================

/// An argument type identifier as written in an instruction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeId {
    /// Exactly one kind.
    Concrete(ValueKind),
    /// Bank, falling back to pointer.
    PointerOrBank,
    /// Bank when the value is zero, otherwise pointer.
    PointerOrBankZero,
    /// Variable, falling back to flag.
    FlagOrVariable,
    /// Variable, falling back to word.
    WordOrVariable,
    /// Variable, falling back to byte.
    ByteOrVariable,
}

/// Outcome of trying one candidate kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// The candidate accepted the value.
    Fits(Value),
    /// The candidate's range rejected the value.
    OutOfRange(RangeViolation),
}

const BANK_THEN_POINTER: &[ValueKind] = &[ValueKind::Bank, ValueKind::Pointer];
const VARIABLE_THEN_FLAG: &[ValueKind] = &[ValueKind::Variable, ValueKind::Flag];
const VARIABLE_THEN_WORD: &[ValueKind] = &[ValueKind::Variable, ValueKind::Word];
const VARIABLE_THEN_BYTE: &[ValueKind] = &[ValueKind::Variable, ValueKind::Byte];

impl TypeId {
    /// The identifier string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Concrete(kind) => kind.as_str(),
            Self::PointerOrBank => "pointer-or-bank",
            Self::PointerOrBankZero => "pointer-or-bank-0",
            Self::FlagOrVariable => "flag-or-variable",
            Self::WordOrVariable => "word-or-variable",
            Self::ByteOrVariable => "byte-or-variable",
        }
    }

    /// Candidate kinds for `raw`, in priority order.
    #[must_use]
    pub fn candidates(self, raw: i64) -> &'static [ValueKind] {
        match self {
            Self::Concrete(kind) => concrete_slice(kind),
            Self::PointerOrBank => BANK_THEN_POINTER,
            Self::PointerOrBankZero if raw == 0 => &BANK_THEN_POINTER[..1],
            Self::PointerOrBankZero => &BANK_THEN_POINTER[1..],
            Self::FlagOrVariable => VARIABLE_THEN_FLAG,
            Self::WordOrVariable => VARIABLE_THEN_WORD,
            Self::ByteOrVariable => VARIABLE_THEN_BYTE,
        }
    }

    /// Lazily try each candidate kind against `raw`.
    pub fn attempts(self, raw: i64) -> impl Iterator<Item = Attempt> {
        self.candidates(raw)
            .iter()
            .map(move |kind| match kind.check(raw) {
                Ok(value) => Attempt::Fits(value),
                Err(violation) => Attempt::OutOfRange(violation),
            })
    }

    /// Construct a value from the first candidate that accepts `raw`.
    pub fn construct(self, raw: i64) -> SubscriptResult<Value> {
        let mut last = None;
        for attempt in self.attempts(raw) {
            match attempt {
                Attempt::Fits(value) => return Ok(value),
                Attempt::OutOfRange(violation) => last = Some(violation),
            }
        }
        match last {
            Some(violation) => Err(SubscriptError::range(format!(
                "{} (no candidate of {} accepts it)",
                violation,
                self.as_str()
            ))),
            None => Err(SubscriptError::range(format!(
                "no candidate kinds for {}",
                self.as_str()
            ))),
        }
    }

    /// Decode a value from bytes, trying candidates in priority order.
    ///
    /// Bank-or-pointer identifiers mix a one-byte and a four-byte encoding.
    /// The four-byte reading wins whenever it is a value that construction
    /// would have encoded as a pointer; otherwise the first byte is a bank.
    /// A bank that is followed by more input in the same slice is therefore
    /// only recovered when the next three bytes keep that reading a bank.
    pub fn decode(self, bytes: &[u8], offset: usize) -> SubscriptResult<Value> {
        if matches!(self, Self::PointerOrBank | Self::PointerOrBankZero) {
            if let Ok(wide) = Value::decode(ValueKind::Pointer, bytes, offset) {
                let chosen = self.construct(i64::from(wide.raw())).map(|v| v.kind());
                if matches!(chosen, Ok(ValueKind::Pointer)) {
                    return Ok(wide);
                }
            }
            return Value::decode(ValueKind::Bank, bytes, offset);
        }

        let mut last = None;
        for kind in self.candidates(0) {
            match Value::decode(*kind, bytes, offset) {
                Ok(value) => return Ok(value),
                Err(err) => last = Some(err),
            }
        }
        Err(last.unwrap_or_else(|| SubscriptError::range("nothing to decode")))
    }
}

fn concrete_slice(kind: ValueKind) -> &'static [ValueKind] {
    let index = ValueKind::ALL
        .iter()
        .position(|k| *k == kind)
        .unwrap_or_default();
    &ValueKind::ALL[index..=index]
}

impl FromStr for TypeId {
    type Err = SubscriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = match s {
            "pointer-or-bank" => Self::PointerOrBank,
            "pointer-or-bank-0" => Self::PointerOrBankZero,
            "flag-or-variable" => Self::FlagOrVariable,
            "word-or-variable" => Self::WordOrVariable,
            "byte-or-variable" => Self::ByteOrVariable,
            other => match ValueKind::ALL.iter().find(|k| k.as_str() == other) {
                Some(kind) => Self::Concrete(*kind),
                None => {
                    return Err(SubscriptError::table(format!(
                        "invalid type identifier \"{other}\""
                    )))
                }
            },
        };
        Ok(id)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
