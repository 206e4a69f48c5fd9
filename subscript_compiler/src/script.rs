//! Section arena and address resolution.
//!
//! A [`Script`] owns an ordered list of [`Section`]s laid out back to back
//! from a base address. Sections are never removed or reordered, so a
//! [`SectionId`] stays valid for the lifetime of the script and a
//! [`SectionPointer`] can be resolved at any time by summing the sizes of
//! everything placed before it.
//!
//! Addresses are never cached: appending to an earlier section moves every
//! later one, and resolving on demand keeps every pointer consistent.

use crate::command::Command;
use std::fmt::{self, Write as _};
use subscript_core::{SubscriptError, SubscriptResult};
use tracing::{debug, trace};

// =============================================================================
// Identifiers
// =============================================================================

/// What a section holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    /// Commands.
    Code,
    /// Opaque bytes (text, movement, file contents).
    Raw,
}

/// Stable handle to a section of one script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionId {
    index: u32,
    kind: SectionKind,
    ordinal: u32,
}

impl SectionId {
    /// Position in the script's section list.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// The section's kind.
    #[inline]
    #[must_use]
    pub const fn kind(self) -> SectionKind {
        self.kind
    }

    /// Build a pointer `offset` commands into this section.
    #[inline]
    #[must_use]
    pub const fn at(self, offset: usize) -> SectionPointer {
        SectionPointer {
            section: self,
            offset,
        }
    }

    /// Build a pointer to the start of this section.
    #[inline]
    #[must_use]
    pub const fn start(self) -> SectionPointer {
        self.at(0)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SectionKind::Code => write!(f, "Section{}", self.ordinal),
            SectionKind::Raw => write!(f, "SectionRaw{}", self.ordinal),
        }
    }
}

/// A deferred address: a section plus a command offset into it.
///
/// Offset zero is a plain dynamic pointer; a positive offset is a relative
/// pointer to the command at that position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionPointer {
    section: SectionId,
    offset: usize,
}

impl SectionPointer {
    /// The section pointed into.
    #[inline]
    #[must_use]
    pub const fn section(self) -> SectionId {
        self.section
    }

    /// Command offset into the section.
    #[inline]
    #[must_use]
    pub const fn offset(self) -> usize {
        self.offset
    }

    /// Check whether this pointer is relative to a command.
    #[inline]
    #[must_use]
    pub const fn is_relative(self) -> bool {
        self.offset > 0
    }
}

impl fmt::Display for SectionPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.offset == 0 {
            write!(f, "@{}", self.section)
        } else {
            write!(f, "@{}+{}", self.section, self.offset)
        }
    }
}

// =============================================================================
// Section
// =============================================================================

#[derive(Debug, Clone)]
enum Body {
    Code { commands: Vec<Command>, size: usize },
    Raw(Vec<u8>),
}

/// A contiguous run of commands or raw bytes.
#[derive(Debug, Clone)]
pub struct Section {
    id: SectionId,
    body: Body,
}

impl Section {
    /// The section's handle.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> SectionId {
        self.id
    }

    /// The section's kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> SectionKind {
        self.id.kind
    }

    /// Encoded size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        match &self.body {
            Body::Code { size, .. } => *size,
            Body::Raw(data) => data.len(),
        }
    }

    /// Commands of a code section; empty for raw sections.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        match &self.body {
            Body::Code { commands, .. } => commands,
            Body::Raw(_) => &[],
        }
    }

    /// Bytes of a raw section.
    #[must_use]
    pub fn data(&self) -> Option<&[u8]> {
        match &self.body {
            Body::Raw(data) => Some(data),
            Body::Code { .. } => None,
        }
    }

    /// The last command, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Command> {
        self.commands().last()
    }

    /// Number of commands (zero for raw sections).
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands().len()
    }

    /// Check whether the section holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// A pointer `offset` commands into this section.
    #[must_use]
    pub const fn dynamic(&self, offset: usize) -> SectionPointer {
        self.id.at(offset)
    }

    /// Pointer to the position right after the last command.
    #[must_use]
    pub fn here(&self) -> SectionPointer {
        self.id.at(self.len())
    }

    fn append(&mut self, command: Command) -> SubscriptResult<()> {
        match &mut self.body {
            Body::Code { commands, size } => {
                trace!(section = %self.id, command = %command, "append");
                *size += command.size();
                commands.push(command);
                Ok(())
            }
            Body::Raw(_) => Err(SubscriptError::structural(format!(
                "cannot append command \"{}\" to raw data section {}",
                command.name(),
                self.id
            ))),
        }
    }

    /// Bytes occupied by the first `offset` commands.
    fn prefix_size(&self, offset: usize) -> SubscriptResult<usize> {
        match &self.body {
            _ if offset == 0 => Ok(0),
            Body::Code { commands, .. } if offset <= commands.len() => {
                Ok(commands[..offset].iter().map(Command::size).sum())
            }
            Body::Code { commands, .. } => Err(SubscriptError::structural(format!(
                "offset {} is past the end of {} ({} commands)",
                offset,
                self.id,
                commands.len()
            ))),
            Body::Raw(_) => Err(SubscriptError::structural(format!(
                "relative pointer into raw data section {}",
                self.id
            ))),
        }
    }
}

// =============================================================================
// Script
// =============================================================================

/// The ordered section arena for one compile.
#[derive(Debug, Clone)]
pub struct Script {
    base: u32,
    sections: Vec<Section>,
    code_count: u32,
    raw_count: u32,
}

impl Script {
    /// Create an empty script placed at `base`.
    #[must_use]
    pub fn new(base: u32) -> Self {
        Self {
            base,
            sections: Vec::new(),
            code_count: 0,
            raw_count: 0,
        }
    }

    /// Absolute address of the first output byte.
    #[inline]
    #[must_use]
    pub const fn base(&self) -> u32 {
        self.base
    }

    /// Move the script to a new base address.
    pub fn set_base(&mut self, base: u32) {
        self.base = base;
    }

    /// Append a new empty code section.
    pub fn add(&mut self) -> SectionId {
        let id = self.next_id(SectionKind::Code);
        debug!(section = %id, "code section added");
        self.sections.push(Section {
            id,
            body: Body::Code {
                commands: Vec::new(),
                size: 0,
            },
        });
        id
    }

    /// Append a raw data section.
    pub fn add_raw(&mut self, data: Vec<u8>) -> SectionId {
        let id = self.next_id(SectionKind::Raw);
        debug!(section = %id, bytes = data.len(), "raw section added");
        self.sections.push(Section {
            id,
            body: Body::Raw(data),
        });
        id
    }

    fn next_id(&mut self, kind: SectionKind) -> SectionId {
        let counter = match kind {
            SectionKind::Code => &mut self.code_count,
            SectionKind::Raw => &mut self.raw_count,
        };
        let ordinal = *counter;
        *counter += 1;
        SectionId {
            index: self.sections.len() as u32,
            kind,
            ordinal,
        }
    }

    /// Append a command to a section.
    pub fn append(&mut self, id: SectionId, command: Command) -> SubscriptResult<()> {
        self.section_mut(id)?.append(command)
    }

    /// Append a sequence of commands to a section.
    pub fn extend(
        &mut self,
        id: SectionId,
        commands: impl IntoIterator<Item = Command>,
    ) -> SubscriptResult<()> {
        let section = self.section_mut(id)?;
        for command in commands {
            section.append(command)?;
        }
        Ok(())
    }

    /// Look up a section.
    #[must_use]
    pub fn section(&self, id: SectionId) -> Option<&Section> {
        self.sections.get(id.index()).filter(|s| s.id == id)
    }

    fn section_mut(&mut self, id: SectionId) -> SubscriptResult<&mut Section> {
        self.sections
            .get_mut(id.index())
            .filter(|s| s.id == id)
            .ok_or_else(|| SubscriptError::structural(format!("{id} is not part of this script")))
    }

    /// All sections in layout order.
    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Total encoded size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.sections.iter().map(Section::size).sum()
    }

    /// Resolve a deferred pointer to an absolute address.
    pub fn address(&self, pointer: SectionPointer) -> SubscriptResult<u32> {
        let id = pointer.section();
        let section = self
            .section(id)
            .ok_or_else(|| SubscriptError::structural(format!("{id} is not part of this script")))?;

        let preceding: usize = self.sections[..id.index()].iter().map(Section::size).sum();
        let offset = preceding + section.prefix_size(pointer.offset())?;
        let address = u64::from(self.base) + offset as u64;

        u32::try_from(address).map_err(|_| {
            SubscriptError::range(format!(
                "address of {pointer} ({address:#x}) does not fit in 32 bits"
            ))
        })
    }

    /// Serialize every section in order, resolving all pointers.
    pub fn bytecode(&self) -> SubscriptResult<Vec<u8>> {
        let mut out = Vec::with_capacity(self.size());
        for section in &self.sections {
            match &section.body {
                Body::Code { commands, .. } => {
                    for command in commands {
                        command.encode_into(self, &mut out)?;
                    }
                }
                Body::Raw(data) => out.extend_from_slice(data),
            }
        }
        debug!(bytes = out.len(), base = self.base, "bytecode emitted");
        Ok(out)
    }

    /// Debug listing: each section's label followed by its contents.
    #[must_use]
    pub fn output(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            let _ = writeln!(out, "@{}:", section.id);
            write_body(&mut out, section);
        }
        out
    }

    /// Listing with sizes and absolute addresses.
    pub fn status(&self) -> SubscriptResult<String> {
        let mut out = String::new();
        for section in &self.sections {
            let address = self.address(section.id.start())?;
            let label = match section.kind() {
                SectionKind::Code => "Section",
                SectionKind::Raw => "Raw data",
            };
            let _ = writeln!(
                out,
                "{} ({} bytes) at 0x{:08X} (@{})",
                label,
                section.size(),
                address,
                section.id
            );
            write_body(&mut out, section);
        }
        Ok(out)
    }
}

fn write_body(out: &mut String, section: &Section) {
    match &section.body {
        Body::Code { commands, .. } => {
            for command in commands {
                let _ = writeln!(out, "\t{command}");
            }
        }
        Body::Raw(data) => {
            let hex: Vec<String> = data.iter().map(|b| format!("{b:02x}")).collect();
            let _ = writeln!(out, "\t{}", hex.join(" "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandArg;
    use crate::tables::InstructionTable;

    fn table() -> InstructionTable {
        InstructionTable::default_table().unwrap()
    }

    fn cmd(table: &InstructionTable, name: &str, args: Vec<CommandArg>) -> Command {
        Command::create(table, name, args).unwrap()
    }

    #[test]
    fn test_section_names_count_per_kind() {
        let mut script = Script::new(0);
        let a = script.add();
        let r = script.add_raw(vec![1, 2]);
        let b = script.add();
        assert_eq!(a.to_string(), "Section0");
        assert_eq!(r.to_string(), "SectionRaw0");
        assert_eq!(b.to_string(), "Section1");
        assert_eq!(b.index(), 2);
    }

    #[test]
    fn test_append_accumulates_size() {
        let table = table();
        let mut script = Script::new(0);
        let main = script.add();
        script.append(main, cmd(&table, "lock", vec![])).unwrap();
        script
            .append(main, cmd(&table, "callstd", vec![6.into()]))
            .unwrap();
        let section = script.section(main).unwrap();
        assert_eq!(section.size(), 3);
        assert_eq!(section.len(), 2);
        assert_eq!(section.last().unwrap().name(), "callstd");
    }

    #[test]
    fn test_append_to_raw_is_structural_error() {
        let table = table();
        let mut script = Script::new(0);
        let raw = script.add_raw(vec![0xFF]);
        let err = script.append(raw, cmd(&table, "end", vec![])).unwrap_err();
        assert_eq!(err.kind_name(), "StructuralError");
    }

    #[test]
    fn test_address_tracks_later_growth() {
        let table = table();
        let mut script = Script::new(0x0880_0000);
        let first = script.add();
        let second = script.add();
        let pointer = second.start();

        assert_eq!(script.address(pointer).unwrap(), 0x0880_0000);
        assert_eq!(script.address(pointer).unwrap(), 0x0880_0000);

        script.append(first, cmd(&table, "lock", vec![])).unwrap();
        script.append(first, cmd(&table, "pause", vec![3.into()])).unwrap();
        assert_eq!(script.address(pointer).unwrap(), 0x0880_0004);

        // Appending after the pointed-to section leaves it alone.
        script.append(second, cmd(&table, "end", vec![])).unwrap();
        assert_eq!(script.address(pointer).unwrap(), 0x0880_0004);
    }

    #[test]
    fn test_relative_pointer_skips_exactly_offset_commands() {
        let table = table();
        let mut script = Script::new(0x100);
        let main = script.add();
        script.append(main, cmd(&table, "lock", vec![])).unwrap();
        script
            .append(main, cmd(&table, "setvar", vec![0x4000.into(), 1.into()]))
            .unwrap();
        script.append(main, cmd(&table, "end", vec![])).unwrap();

        assert_eq!(script.address(main.at(1)).unwrap(), 0x101);
        assert_eq!(script.address(main.at(2)).unwrap(), 0x106);
        assert_eq!(script.address(main.at(3)).unwrap(), 0x107);
        assert!(script.address(main.at(4)).is_err());
        assert_eq!(main.at(2).to_string(), "@Section0+2");
    }

    #[test]
    fn test_address_overflow_is_range_error() {
        let mut script = Script::new(0xFFFF_FFFE);
        script.add_raw(vec![0; 4]);
        let tail = script.add();
        let err = script.address(tail.start()).unwrap_err();
        assert_eq!(err.kind_name(), "RangeError");
    }

    #[test]
    fn test_set_base_moves_everything() {
        let mut script = Script::new(0);
        script.add_raw(vec![1, 2, 3]);
        let raw = script.add_raw(vec![4]);
        assert_eq!(script.address(raw.start()).unwrap(), 3);
        script.set_base(0x0800_0000);
        assert_eq!(script.address(raw.start()).unwrap(), 0x0800_0003);
    }

    #[test]
    fn test_foreign_section_rejected() {
        let mut other = Script::new(0);
        other.add();
        let foreign = other.add();
        let script = Script::new(0);
        assert!(script.section(foreign).is_none());
        assert!(script.address(foreign.start()).is_err());
    }

    #[test]
    fn test_output_and_status_listing() {
        let table = table();
        let mut script = Script::new(0x0800_0000);
        let main = script.add();
        let raw = script.add_raw(vec![0xC2, 0xDD, 0xFF]);
        script
            .append(
                main,
                cmd(&table, "loadpointer", vec![0.into(), raw.start().into()]),
            )
            .unwrap();

        assert_eq!(
            script.output(),
            "@Section0:\n\tloadpointer 0x00 @SectionRaw0\n@SectionRaw0:\n\tc2 dd ff\n"
        );

        let status = script.status().unwrap();
        assert!(status.starts_with("Section (6 bytes) at 0x08000000 (@Section0)\n"));
        assert!(status.contains("Raw data (3 bytes) at 0x08000006 (@SectionRaw0)"));
    }
}
