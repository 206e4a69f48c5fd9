//! Import resolution tests.
//!
//! # Test Categories
//!
//! 1. **Raw files** - binary imports placed as data sections
//! 2. **Rejected files** - recognized but unsupported formats
//! 3. **Native modules** - `import` and `from ... import`

use std::fs;
use subscript_compiler::{compile, CompileError, CompiledScript, Environment};
use tempfile::TempDir;

fn env_with(dir: &TempDir) -> Environment {
    Environment::with_default_tables()
        .unwrap()
        .search_dir(dir.path())
}

fn compile_in(dir: &TempDir, source: &str) -> Result<CompiledScript, CompileError> {
    compile(source, 0x0880_0000, &env_with(dir))
}

// =============================================================================
// Raw files
// =============================================================================

#[test]
fn test_raw_import_is_placed_on_use() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("sign.bin"), [0xC2, 0xDD, 0xFF]).unwrap();

    let compiled = compile_in(&dir, "import sign\nmessage(sign)\n").unwrap();
    let sections = compiled.script().sections();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[1].data(), Some(&[0xC2, 0xDD, 0xFF][..]));
}

#[test]
fn test_raw_import_alias_and_subdirectory() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("text")).unwrap();
    fs::write(dir.path().join("text").join("intro.raw"), [0xBB, 0xFF]).unwrap();

    let compiled = compile_in(&dir, "import text.intro as intro\nmessage(intro)\n").unwrap();
    assert_eq!(
        compiled.script().sections()[1].data(),
        Some(&[0xBB, 0xFF][..])
    );
}

#[test]
fn test_unused_raw_import_is_not_read() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("blob.bin"), [1, 2, 3]).unwrap();

    let compiled = compile_in(&dir, "import blob\nexit\n").unwrap();
    assert_eq!(compiled.script().sections().len(), 1);
}

// =============================================================================
// Rejected files
// =============================================================================

#[test]
fn test_unsupported_extensions() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("helpers.py"), "pass\n").unwrap();
    fs::write(dir.path().join("other.sub"), "exit\n").unwrap();
    fs::write(dir.path().join("routine.asm"), "nop\n").unwrap();

    for source in ["import helpers\n", "import other\n", "import routine\n"] {
        let err = compile_in(&dir, source).unwrap_err();
        assert_eq!(err.kind_name(), "ImportError", "{source}");
        assert_eq!(err.line, 1);
    }
}

#[test]
fn test_unresolved_import() {
    let dir = tempfile::tempdir().unwrap();
    let err = compile_in(&dir, "lock()\nimport missing\n").unwrap_err();
    assert_eq!(err.kind_name(), "ImportError");
    assert_eq!(err.line, 2);
    assert!(err.to_string().contains("Import of \"missing\" unresolved."));
}

#[test]
fn test_from_import_of_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("data.bin"), [0]).unwrap();
    let err = compile_in(&dir, "from data import x\n").unwrap_err();
    assert_eq!(err.kind_name(), "ImportError");
}

// =============================================================================
// Native modules
// =============================================================================

#[test]
fn test_native_module_wins_over_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("special.bin"), [0]).unwrap();

    let compiled = compile_in(&dir, "import special\nheal()\n").unwrap();
    assert_eq!(compiled.output(), "@Section0:\n\tspecial 0x00\n");
}

#[test]
fn test_attribute_on_non_module() {
    let dir = tempfile::tempdir().unwrap();
    let err = compile_in(&dir, "x = 1\nx.heal()\n").unwrap_err();
    assert_eq!(err.kind_name(), "TypeError");

    let err = compile_in(&dir, "import special\nspecial.fly()\n").unwrap_err();
    assert_eq!(err.kind_name(), "NameError");
}
