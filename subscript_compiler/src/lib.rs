//! Event-script compiler for Subscript.
//!
//! This crate lowers a parsed Subscript module into the section-based
//! intermediate form and serializes it to event-script bytecode.
//!
//! # Architecture
//!
//! ```text
//! Source → AST → Lowering (symbols, built-ins, conditions) → Script → Bytecode
//! ```
//!
//! # Key Types
//!
//! - [`Compiler`] - Statement lowering and symbol table
//! - [`Script`] - Ordered section arena with deferred pointers
//! - [`Command`] - One table-driven instruction
//! - [`Registry`] - Built-in functions and native modules
//! - [`Environment`] - Data tables and import search path
//!
//! # Example
//!
//! ```
//! use subscript_compiler::{compile, Environment};
//!
//! let env = Environment::with_default_tables().unwrap();
//! let compiled = compile("message(\"Hi\")\n", 0x0880_0000, &env).unwrap();
//!
//! let bytes = compiled.bytecode().unwrap();
//! assert_eq!(bytes.len(), 11);
//! assert_eq!(bytes[0], 0x0F);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod arith;
pub mod command;
pub mod compiler;
mod condition;
pub mod environment;
pub mod functions;
pub mod imports;
pub mod langtypes;
pub mod registry;
pub mod script;
pub mod tables;
pub mod text;

pub use command::{Command, CommandArg, Operand};
pub use compiler::{CompileError, CompileResult, CompiledScript, Compiler};
pub use environment::Environment;
pub use langtypes::{Content, LazySection, Symbol};
pub use registry::{
    Builtin, BuiltinContext, CallArgs, CommandSpec, Expansion, Module, Registry,
};
pub use script::{Script, Section, SectionId, SectionKind, SectionPointer};
pub use tables::{GameConfig, InstructionDef, InstructionTable, MovementTable, TextTable};

/// Compile `source` for a script placed at `base` using the standard built-ins.
pub fn compile(source: &str, base: u32, env: &Environment) -> CompileResult<CompiledScript> {
    Compiler::compile_source(source, base, env)
}
