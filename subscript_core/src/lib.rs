//! # Subscript Core
//!
//! Core types shared by every stage of the Subscript event-script compiler.
//!
//! - **Error Handling**: the unified [`SubscriptError`] hierarchy and result alias
//! - **Spans**: byte ranges into the source text, with line/column lookup
//! - **Value Types**: fixed-width, range-checked wire values with
//!   little-endian encoding, and the type identifiers used by instruction tables

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod span;
pub mod value;

pub use error::{SubscriptError, SubscriptResult};
pub use span::Span;
pub use value::{Attempt, RangeViolation, TypeId, Value, ValueKind};

/// Subscript version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
