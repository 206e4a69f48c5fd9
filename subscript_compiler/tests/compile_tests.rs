//! End-to-end compilation tests.
//!
//! # Test Categories
//!
//! 1. **Scripts** - complete sources down to bytecode
//! 2. **Lazy content** - text and movement sections placed on first use
//! 3. **Addresses** - base relocation and pointer determinism
//! 4. **Errors** - kinds and source positions reported to the user

use subscript_compiler::{compile, CompileError, CompiledScript, Environment, SectionKind};

const BASE: u32 = 0x0880_0000;

fn env() -> Environment {
    Environment::with_default_tables().expect("default tables load")
}

fn compile_ok(source: &str) -> CompiledScript {
    compile(source, BASE, &env()).expect("Failed to compile")
}

fn compile_err(source: &str) -> CompileError {
    compile(source, BASE, &env()).expect_err("compile should fail")
}

fn listing(compiled: &CompiledScript) -> Vec<Vec<String>> {
    compiled
        .script()
        .sections()
        .iter()
        .map(|s| s.commands().iter().map(ToString::to_string).collect())
        .collect()
}

// =============================================================================
// Scripts
// =============================================================================

#[test]
fn test_message_end_to_end() {
    let compiled = compile_ok("message(\"Hi\")\n");
    let sections = compiled.script().sections();

    assert_eq!(sections.len(), 2);
    assert_eq!(
        listing(&compiled)[0],
        ["loadpointer 0x00 @SectionRaw0", "callstd 0x06"]
    );
    assert_eq!(sections[1].kind(), SectionKind::Raw);
    assert_eq!(sections[1].data(), Some(&[0xC2, 0xDD, 0xFF][..]));

    let bytes = compiled.bytecode().unwrap();
    assert_eq!(bytes.len(), sections[0].size() + sections[1].size());
    assert_eq!(
        bytes,
        [0x0F, 0x00, 0x08, 0x00, 0x80, 0x08, 0x09, 0x06, 0xC2, 0xDD, 0xFF]
    );
}

#[test]
fn test_variable_increment() {
    let compiled = compile_ok("V = Var(0x4000)\nV += 3\n");
    assert_eq!(listing(&compiled), [vec!["addvar 0x4000 0x03"]]);
    assert_eq!(compiled.bytecode().unwrap(), [0x17, 0x00, 0x40, 0x03, 0x00]);
}

#[test]
fn test_npc_script() {
    let source = r#"
lock()
if LASTRESULT == 1:
    msgbox("Good luck!", keepopen=True)
else:
    givepokemon(25, level=10)
release()
exit
"#;
    let compiled = compile_ok(source);
    let listing = listing(&compiled);

    assert_eq!(
        listing[0],
        [
            "lock",
            "compare 0x800d 0x01",
            "if1 0x01 @Section1",
            "goto @Section2",
            "release",
            "end",
        ]
    );
    assert_eq!(
        listing[1],
        ["loadpointer 0x00 @SectionRaw0", "callstd 0x04", "goto @Section0+4"]
    );
    assert_eq!(
        listing[2],
        ["givepokemon 0x19 0x0a 0x00 0x00 0x00 0x00", "goto @Section0+4"]
    );
}

#[test]
fn test_if_without_trailing_goto() {
    let compiled = compile_ok("x = Var(0x4000)\nif x == 1:\n    exit\n");
    assert_eq!(
        listing(&compiled),
        [
            vec!["compare 0x4000 0x01", "if1 0x01 @Section1"],
            vec!["end"],
        ]
    );
}

#[test]
fn test_swap_retry_compiles_identically() {
    let swapped = compile_ok("V = Var(0x4000)\nif 5 > V:\n    exit\n");
    let direct = compile_ok("V = Var(0x4000)\nif V < 5:\n    exit\n");
    assert_eq!(swapped.output(), direct.output());
    assert_eq!(swapped.bytecode().unwrap(), direct.bytecode().unwrap());
}

#[test]
fn test_function_called_twice_shares_section() {
    let source = r#"
def greet():
    message("Hello")

greet()
greet()
exit
"#;
    let compiled = compile_ok(source);
    let listing = listing(&compiled);

    assert_eq!(listing[0], ["call @Section1", "call @Section1", "end"]);
    assert_eq!(
        listing[1],
        ["loadpointer 0x00 @SectionRaw0", "callstd 0x06", "return"]
    );
}

#[test]
fn test_special_module() {
    let source = r#"
import special
special.heal()
special(0x9F, LASTRESULT)
"#;
    let compiled = compile_ok(source);
    assert_eq!(listing(&compiled)[0], ["special 0x00", "special2 0x800d 0x9f"]);
}

// =============================================================================
// Lazy content
// =============================================================================

#[test]
fn test_string_bound_once_is_placed_once() {
    let source = r#"
text = "Hi"
message(text)
message(text)
"#;
    let compiled = compile_ok(source);
    let sections = compiled.script().sections();

    assert_eq!(sections.len(), 2);
    assert_eq!(
        listing(&compiled)[0],
        [
            "loadpointer 0x00 @SectionRaw0",
            "callstd 0x06",
            "loadpointer 0x00 @SectionRaw0",
            "callstd 0x06",
        ]
    );
}

#[test]
fn test_content_placed_in_first_use_order() {
    let source = r#"
first = "A"
second = "B"
message(second)
message(first)
"#;
    let compiled = compile_ok(source);
    let sections = compiled.script().sections();
    assert_eq!(sections[1].data(), Some(&[0xBC, 0xFF][..]));
    assert_eq!(sections[2].data(), Some(&[0xBB, 0xFF][..]));
}

#[test]
fn test_unused_content_is_never_placed() {
    let compiled = compile_ok("unused = \"never shown\"\nexit\n");
    assert_eq!(compiled.script().sections().len(), 1);
}

#[test]
fn test_movement_list() {
    let compiled = compile_ok("applymovement(LASTTALKED, [\"walk_up\", \"exclaim\"])\n");
    assert_eq!(
        listing(&compiled)[0],
        ["applymovement 0x800f @SectionRaw0"]
    );
    assert_eq!(
        compiled.script().sections()[1].data(),
        Some(&[0x0D, 0x62, 0xFE][..])
    );
}

// =============================================================================
// Addresses
// =============================================================================

#[test]
fn test_rebase_without_recompiling() {
    let mut compiled = compile_ok("message(\"Hi\")\n");
    let before = compiled.bytecode().unwrap();
    assert_eq!(&before[2..6], &0x0880_0008u32.to_le_bytes());

    compiled.set_base(0x0890_0000);
    assert_eq!(compiled.base(), 0x0890_0000);
    let after = compiled.bytecode().unwrap();
    assert_eq!(&after[2..6], &0x0890_0008u32.to_le_bytes());
    assert_eq!(before.len(), after.len());
}

#[test]
fn test_bytecode_is_repeatable() {
    let compiled = compile_ok("V = Var(0x4000)\nwhile V < 3:\n    V += 1\nexit\n");
    assert_eq!(compiled.bytecode().unwrap(), compiled.bytecode().unwrap());
}

#[test]
fn test_status_reports_addresses() {
    let compiled = compile_ok("message(\"Hi\")\n");
    let status = compiled.status().unwrap();
    assert!(status.starts_with("Section (8 bytes) at 0x08800000 (@Section0)\n"));
    assert!(status.contains("Raw data (3 bytes) at 0x08800008 (@SectionRaw0)"));
}

#[test]
fn test_relative_pointer_encodes_inside_section() {
    let compiled = compile_ok("V = Var(0x4000)\nif V == 1:\n    lock()\nexit\n");
    let bytes = compiled.bytecode().unwrap();

    // compare (5) + if1 (6) + end (1), then the body: lock, goto.
    let goto = &bytes[13..18];
    assert_eq!(goto[0], 0x05);
    assert_eq!(&goto[1..], &(BASE + 11).to_le_bytes());
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unknown_call_names_function() {
    let err = compile_err("doesnotexist()\n");
    assert_eq!(err.kind_name(), "NameError");
    assert!(err.to_string().contains("doesnotexist"));
}

#[test]
fn test_error_location_in_nested_block() {
    let source = "lock()\nwhile LASTRESULT == 0:\n    V = Var(0x10)\n";
    let err = compile_err(source);
    assert_eq!(err.kind_name(), "RangeError");
    assert_eq!((err.line, err.column), (3, 4));
}

#[test]
fn test_builtin_argument_errors() {
    assert_eq!(compile_err("message()\n").kind_name(), "TypeError");
    assert_eq!(compile_err("lock(1, 2)\n").kind_name(), "TypeError");
    assert_eq!(compile_err("pauseevent(0x10000)\n").kind_name(), "RangeError");
    assert_eq!(
        compile_err("applymovement(1, [\"moonwalk\"])\n").kind_name(),
        "EncodeError"
    );
}

#[test]
fn test_folding_overflow_is_range_error() {
    let err = compile_err("x = Var((-9223372036854775807 - 1) / -1)\n");
    assert_eq!(err.kind_name(), "RangeError");
    assert_eq!(err.line, 1);

    let err = compile_err("x = Var((-9223372036854775807 - 1) // -1)\n");
    assert_eq!(err.kind_name(), "RangeError");
}

#[test]
fn test_error_source_chain() {
    use std::error::Error;

    let err = compile_err("x = None\n");
    assert_eq!(err.kind_name(), "TypeError");
    assert!(err.source().is_some());
}
