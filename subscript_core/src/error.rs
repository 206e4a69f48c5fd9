//! Error types and result definitions for Subscript.
//!
//! Every phase reports failures through [`SubscriptError`]:
//! - Syntax errors (tokenization, parsing, unsupported statement shapes)
//! - Name, type and range errors raised while lowering statements
//! - Instruction table errors (unknown mnemonic, wrong argument count)
//! - Import, encoding and table-loading errors

use crate::span::Span;
use crate::value::RangeViolation;
use thiserror::Error;

/// The unified result type used throughout Subscript.
pub type SubscriptResult<T> = Result<T, SubscriptError>;

/// Comprehensive error type covering all Subscript error conditions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscriptError {
    /// Unsupported or malformed statement or expression.
    #[error("SyntaxError: {message}")]
    SyntaxError {
        /// Error description.
        message: String,
        /// Source location, when the error was raised by the parser.
        span: Option<Span>,
    },

    /// A value or comparison does not match any accepted type.
    #[error("TypeError: {message}")]
    TypeError {
        /// Error description.
        message: String,
    },

    /// Reference to an unbound symbol or unknown built-in.
    #[error("NameError: name '{name}' is not defined")]
    NameError {
        /// The undefined name.
        name: String,
    },

    /// A value lies outside a value type's closed range.
    #[error("RangeError: {message}")]
    RangeError {
        /// Error description.
        message: String,
    },

    /// Mnemonic missing from the instruction table.
    #[error("UnknownInstructionError: unknown command \"{name}\"")]
    UnknownInstruction {
        /// The unknown mnemonic.
        name: String,
    },

    /// Wrong number of arguments for a command.
    #[error(
        "ArityError: script command \"{name}\" requires exactly {expected} arguments; {found} were provided"
    )]
    ArityError {
        /// Command mnemonic.
        name: String,
        /// Arity declared by the instruction table.
        expected: usize,
        /// Number of arguments supplied.
        found: usize,
    },

    /// Unresolved or unsupported import.
    #[error("ImportError: {message}")]
    ImportError {
        /// Error description.
        message: String,
    },

    /// Illegal operation on the section structure.
    #[error("StructuralError: {message}")]
    StructuralError {
        /// Error description.
        message: String,
    },

    /// Text or movement data that the tables cannot encode.
    #[error("EncodeError: {message}")]
    EncodeError {
        /// Error description.
        message: String,
    },

    /// Malformed data table or configuration.
    #[error("TableError: {message}")]
    TableError {
        /// Error description.
        message: String,
    },

    /// Failure reading an external file.
    #[error("IoError: {message}")]
    IoError {
        /// Error description.
        message: String,
    },
}

impl SubscriptError {
    /// Create a syntax error with a source location.
    #[must_use]
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::SyntaxError {
            message: message.into(),
            span: Some(span),
        }
    }

    /// Create a syntax error whose location is the enclosing statement.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::SyntaxError {
            message: message.into(),
            span: None,
        }
    }

    /// Create a type error.
    #[must_use]
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::TypeError {
            message: message.into(),
        }
    }

    /// Create a name error.
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::NameError { name: name.into() }
    }

    /// Create a range error.
    #[must_use]
    pub fn range(message: impl Into<String>) -> Self {
        Self::RangeError {
            message: message.into(),
        }
    }

    /// Create an unknown instruction error.
    #[must_use]
    pub fn unknown_instruction(name: impl Into<String>) -> Self {
        Self::UnknownInstruction { name: name.into() }
    }

    /// Create an arity error.
    #[must_use]
    pub fn arity(name: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::ArityError {
            name: name.into(),
            expected,
            found,
        }
    }

    /// Create an import error.
    #[must_use]
    pub fn import(message: impl Into<String>) -> Self {
        Self::ImportError {
            message: message.into(),
        }
    }

    /// Create a structural error.
    #[must_use]
    pub fn structural(message: impl Into<String>) -> Self {
        Self::StructuralError {
            message: message.into(),
        }
    }

    /// Create an encoding error.
    #[must_use]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::EncodeError {
            message: message.into(),
        }
    }

    /// Create a table error.
    #[must_use]
    pub fn table(message: impl Into<String>) -> Self {
        Self::TableError {
            message: message.into(),
        }
    }

    /// Create an I/O error.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::IoError {
            message: message.into(),
        }
    }

    /// The user-facing name of this error kind.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::SyntaxError { .. } => "SyntaxError",
            Self::TypeError { .. } => "TypeError",
            Self::NameError { .. } => "NameError",
            Self::RangeError { .. } => "RangeError",
            Self::UnknownInstruction { .. } => "UnknownInstructionError",
            Self::ArityError { .. } => "ArityError",
            Self::ImportError { .. } => "ImportError",
            Self::StructuralError { .. } => "StructuralError",
            Self::EncodeError { .. } => "EncodeError",
            Self::TableError { .. } => "TableError",
            Self::IoError { .. } => "IoError",
        }
    }

    /// The parser-reported location, if any.
    #[must_use]
    pub const fn span(&self) -> Option<Span> {
        match self {
            Self::SyntaxError { span, .. } => *span,
            _ => None,
        }
    }
}

impl From<RangeViolation> for SubscriptError {
    fn from(violation: RangeViolation) -> Self {
        Self::range(violation.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    #[test]
    fn test_syntax_error_creation() {
        let span = Span::new(5, 15);
        let err = SubscriptError::syntax("invalid syntax", span);

        assert_eq!(err.kind_name(), "SyntaxError");
        assert_eq!(err.to_string(), "SyntaxError: invalid syntax");
        assert_eq!(err.span(), Some(span));
    }

    #[test]
    fn test_unsupported_has_no_span() {
        let err = SubscriptError::unsupported("decorators are not supported");
        assert_eq!(err.span(), None);
        assert_eq!(err.kind_name(), "SyntaxError");
    }

    #[test]
    fn test_name_error_creation() {
        let err = SubscriptError::name("doesnotexist");

        match &err {
            SubscriptError::NameError { name } => assert_eq!(name, "doesnotexist"),
            _ => panic!("Expected NameError"),
        }
        assert_eq!(
            err.to_string(),
            "NameError: name 'doesnotexist' is not defined"
        );
    }

    #[test]
    fn test_arity_error_message() {
        let err = SubscriptError::arity("compare", 2, 1);
        assert_eq!(err.kind_name(), "ArityError");
        assert!(err.to_string().contains("requires exactly 2 arguments; 1 were provided"));
    }

    #[test]
    fn test_unknown_instruction_message() {
        let err = SubscriptError::unknown_instruction("frobnicate");
        assert_eq!(
            err.to_string(),
            "UnknownInstructionError: unknown command \"frobnicate\""
        );
    }

    #[test]
    fn test_range_violation_conversion() {
        let violation = RangeViolation::new(ValueKind::Flag, 0x900);
        let err: SubscriptError = violation.into();
        assert_eq!(err.kind_name(), "RangeError");
        assert!(err.to_string().contains("flag"));
    }

    #[test]
    fn test_error_is_clone() {
        let original = SubscriptError::import("Import of \"x\" unresolved.");
        assert_eq!(original.clone(), original);
    }
}
