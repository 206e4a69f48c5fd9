//! Instruction table and command codec tests.
//!
//! # Test Categories
//!
//! 1. **Round-trip** - every table entry decodes to what it encoded
//! 2. **Custom tables** - environments built from caller-supplied data

use subscript_compiler::{Command, CommandArg, Environment, InstructionTable, Operand, Script};
use subscript_core::{TypeId, ValueKind};

/// Every kind an identifier can produce, in priority order.
fn kinds(ty: TypeId) -> Vec<ValueKind> {
    let mut kinds = ty.candidates(0).to_vec();
    for kind in ty.candidates(1) {
        if !kinds.contains(kind) {
            kinds.push(*kind);
        }
    }
    kinds
}

/// Lower bound, midpoint and upper bound of each candidate kind. Pointers
/// also get an address whose low byte is zero.
fn samples(ty: TypeId) -> Vec<i64> {
    let mut raws = Vec::new();
    for kind in kinds(ty) {
        let (min, max) = kind.bounds();
        raws.extend([min, min + (max - min) / 2, max]);
        if kind == ValueKind::Pointer {
            raws.push(0x0880_0100);
        }
    }
    raws
}

fn is_mixed_width(ty: TypeId) -> bool {
    let widths: Vec<usize> = kinds(ty).iter().map(|k| k.width()).collect();
    widths.iter().any(|w| *w != widths[0])
}

// =============================================================================
// Round-trip
// =============================================================================

#[test]
fn test_every_command_round_trips() {
    let table = InstructionTable::default_table().unwrap();
    let script = Script::new(0x0800_0000);
    assert!(table.len() > 90);

    for def in table.iter() {
        let columns: Vec<Vec<i64>> = def.args.iter().map(|&ty| samples(ty)).collect();
        let rows = columns.iter().map(Vec::len).max().unwrap_or(1);

        for row in 0..rows {
            let args: Vec<CommandArg> = columns
                .iter()
                .map(|column| column[row % column.len()].into())
                .collect();
            let command = Command::create(&table, &def.name, args)
                .unwrap_or_else(|e| panic!("{} row {row}: {e}", def.name));
            let bytes = command.encode(&script).unwrap();
            assert_eq!(bytes.len(), command.size(), "{}", def.name);

            let (decoded, consumed) = Command::decode(&table, &bytes).unwrap();
            assert_eq!(consumed, bytes.len(), "{} row {row}", def.name);
            assert_eq!(decoded.name(), def.name);
            assert_eq!(decoded.args(), command.args(), "{} row {row}", def.name);
        }
    }
}

/// A mixed-width operand (bank or pointer, byte or variable) is only
/// unambiguous on the wire when nothing follows it inside its command. A
/// bank followed by a command's further operands can read as a pointer, so
/// the shipped table must keep such operands last.
#[test]
fn test_mixed_width_operands_end_their_command() {
    let table = InstructionTable::default_table().unwrap();
    let mut seen = 0;
    for def in table.iter() {
        for (index, ty) in def.args.iter().enumerate() {
            if is_mixed_width(*ty) {
                seen += 1;
                assert_eq!(index + 1, def.args.len(), "{} operand {index}", def.name);
            }
        }
    }
    assert!(seen > 0);
}

#[test]
fn test_preparemsg_aligned_pointer() {
    let table = InstructionTable::default_table().unwrap();
    let script = Script::new(0);
    let command = Command::create(&table, "preparemsg", [0x0880_0100.into()]).unwrap();
    let bytes = command.encode(&script).unwrap();
    assert_eq!(bytes, [0x67, 0x00, 0x01, 0x80, 0x08]);

    let (decoded, consumed) = Command::decode(&table, &bytes).unwrap();
    assert_eq!(consumed, 5);
    assert_eq!(decoded.to_string(), "preparemsg 0x08800100");

    let bank = Command::create(&table, "preparemsg", [0.into()]).unwrap();
    let bytes = bank.encode(&script).unwrap();
    assert_eq!(bytes, [0x67, 0x00]);
    assert_eq!(Command::decode(&table, &bytes).unwrap().0.args(), bank.args());
}

#[test]
fn test_decode_consecutive_commands() {
    let table = InstructionTable::default_table().unwrap();
    let script = Script::new(0);
    let mut bytes = Vec::new();
    for (name, args) in [
        ("lock", vec![]),
        ("setvar", vec![CommandArg::Int(0x4000), CommandArg::Int(7)]),
        ("end", vec![]),
    ] {
        Command::create(&table, name, args)
            .unwrap()
            .encode_into(&script, &mut bytes)
            .unwrap();
    }

    let mut offset = 0;
    let mut names = Vec::new();
    while offset < bytes.len() {
        let (command, used) = Command::decode(&table, &bytes[offset..]).unwrap();
        names.push(command.name().to_string());
        offset += used;
    }
    assert_eq!(names, ["lock", "setvar", "end"]);
}

#[test]
fn test_variable_window_lower_bound() {
    let table = InstructionTable::default_table().unwrap();
    let at_floor = Command::create(&table, "setvar", [0x3FFF.into(), 0.into()]).unwrap();
    assert!(matches!(
        at_floor.args()[0],
        Operand::Fixed(v) if v.kind() == ValueKind::Variable
    ));
    let below = Command::create(&table, "setvar", [0x3FFE.into(), 0.into()]);
    assert_eq!(below.unwrap_err().kind_name(), "RangeError");
}

// =============================================================================
// Custom tables
// =============================================================================

#[test]
fn test_custom_instruction_table() {
    let json = r#"{
        "end": { "code": 2, "args": [] },
        "nop": { "code": 0, "args": [] }
    }"#;
    let table = InstructionTable::from_json(json).unwrap();
    let env = Environment::with_default_tables().unwrap().instructions(table);

    let compiled = subscript_compiler::compile("exit\n", 0, &env).unwrap();
    assert_eq!(compiled.bytecode().unwrap(), [0x02]);

    let err = subscript_compiler::compile("lock()\n", 0, &env).unwrap_err();
    assert_eq!(err.kind_name(), "UnknownInstructionError");
}

#[test]
fn test_malformed_table_is_table_error() {
    let err = InstructionTable::from_json("{ \"end\": 2 }").unwrap_err();
    assert_eq!(err.kind_name(), "TableError");
}
