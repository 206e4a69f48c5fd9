//! # Subscript Parser
//!
//! Lexer, syntax tree and parser for the indentation-based event-script
//! dialect. The grammar is a small subset of a Python-like language:
//! assignments, calls, `if`/`elif`/`else`, `while`, `def`, `return`,
//! `import` and arithmetic or boolean expressions.
//!
//! ```
//! let module = subscript_parser::parse("lock()\nmessage(\"Hi\")\n").unwrap();
//! assert_eq!(module.body.len(), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use parser::{parse, parse_expression};
