//! Abstract syntax tree for the event-script dialect.
//!
//! The tree covers the statement and expression shapes the compiler can
//! lower, plus the handful of host-language shapes (decorators, function
//! parameters, attribute access, tuples) that are parsed only so the
//! compiler can reject them with a located error.

use subscript_core::Span;

/// A parsed source file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Module {
    /// Top-level statements.
    pub body: Vec<Stmt>,
}

// =============================================================================
// Statements
// =============================================================================

/// A statement with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stmt {
    /// Statement kind.
    pub kind: StmtKind,
    /// Source span.
    pub span: Span,
}

impl Stmt {
    /// Create a new statement.
    #[must_use]
    pub const fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Statement kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StmtKind {
    /// Expression statement.
    Expr(Box<Expr>),
    /// `a = value` (chained targets are kept so they can be rejected).
    Assign {
        /// Assignment targets, left to right.
        targets: Vec<Expr>,
        /// Assigned value.
        value: Box<Expr>,
    },
    /// `a += value`
    AugAssign {
        /// Target.
        target: Box<Expr>,
        /// Operator.
        op: AugOp,
        /// Operand.
        value: Box<Expr>,
    },
    /// `if test: body else: orelse` (`elif` nests in `orelse`).
    If {
        /// Condition.
        test: Box<Expr>,
        /// Taken branch.
        body: Vec<Stmt>,
        /// Else branch.
        orelse: Vec<Stmt>,
    },
    /// `while test: body else: orelse`
    While {
        /// Condition.
        test: Box<Expr>,
        /// Loop body.
        body: Vec<Stmt>,
        /// Else branch.
        orelse: Vec<Stmt>,
    },
    /// `def name(args): body`
    FunctionDef {
        /// Function name.
        name: String,
        /// Declared parameters.
        args: Vec<Arg>,
        /// Function body.
        body: Vec<Stmt>,
        /// Decorator expressions.
        decorator_list: Vec<Expr>,
    },
    /// `return [value]`
    Return(Option<Box<Expr>>),
    /// `import a [as b], ...`
    Import(Vec<Alias>),
    /// `from module import a [as b], ...`
    ImportFrom {
        /// Source module.
        module: String,
        /// Imported names.
        names: Vec<Alias>,
    },
    /// `pass`
    Pass,
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    /// Parameter name.
    pub name: String,
    /// Source span.
    pub span: Span,
}

/// An import alias (`name as asname`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// Imported name (dotted).
    pub name: String,
    /// Local binding, if renamed.
    pub asname: Option<String>,
    /// Source span.
    pub span: Span,
}

impl Alias {
    /// The name this import binds locally.
    #[must_use]
    pub fn binding(&self) -> &str {
        self.asname.as_deref().unwrap_or(&self.name)
    }
}

/// Augmented assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AugOp {
    /// `+=`
    Add,
    /// `-=`
    Sub,
    /// `*=`
    Mult,
    /// `/=`
    Div,
    /// `//=`
    FloorDiv,
    /// `%=`
    Mod,
    /// `**=`
    Pow,
    /// `<<=`
    LShift,
    /// `>>=`
    RShift,
    /// `&=`
    BitAnd,
    /// `|=`
    BitOr,
    /// `^=`
    BitXor,
}

impl AugOp {
    /// Operator spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+=",
            Self::Sub => "-=",
            Self::Mult => "*=",
            Self::Div => "/=",
            Self::FloorDiv => "//=",
            Self::Mod => "%=",
            Self::Pow => "**=",
            Self::LShift => "<<=",
            Self::RShift => ">>=",
            Self::BitAnd => "&=",
            Self::BitOr => "|=",
            Self::BitXor => "^=",
        }
    }
}

// =============================================================================
// Expressions
// =============================================================================

/// An expression with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    /// Expression kind.
    pub kind: ExprKind,
    /// Source span.
    pub span: Span,
}

impl Expr {
    /// Create a new expression.
    #[must_use]
    pub const fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The identifier, if this is a bare name.
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Name(name) => Some(name),
            _ => None,
        }
    }
}

/// Expression kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprKind {
    /// Integer literal.
    Int(i64),
    /// `True` / `False`
    Bool(bool),
    /// `None`
    None,
    /// Text string (escapes left for the text encoder).
    String(String),
    /// Bytes literal.
    Bytes(Vec<u8>),
    /// Identifier.
    Name(String),
    /// `[a, b, ...]`
    List(Vec<Expr>),
    /// `(a, b, ...)`
    Tuple(Vec<Expr>),
    /// `func(args, key=value)`
    Call {
        /// Callee.
        func: Box<Expr>,
        /// Positional arguments.
        args: Vec<Expr>,
        /// Keyword arguments.
        keywords: Vec<Keyword>,
    },
    /// `left op right`
    BinOp {
        /// Left operand.
        left: Box<Expr>,
        /// Operator.
        op: BinOp,
        /// Right operand.
        right: Box<Expr>,
    },
    /// `op operand`
    UnaryOp {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// `a and b and c` / `a or b or c`, flattened.
    BoolOp {
        /// Operator.
        op: BoolOp,
        /// Operands, at least two.
        values: Vec<Expr>,
    },
    /// `left op1 c1 op2 c2 ...`
    Compare {
        /// First operand.
        left: Box<Expr>,
        /// Operators.
        ops: Vec<CmpOp>,
        /// Remaining operands.
        comparators: Vec<Expr>,
    },
    /// `value.attr`
    Attribute {
        /// Object.
        value: Box<Expr>,
        /// Attribute name.
        attr: String,
    },
}

/// A keyword argument in a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    /// Parameter name.
    pub arg: String,
    /// Argument value.
    pub value: Expr,
    /// Source span.
    pub span: Span,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mult,
    /// `/`
    Div,
    /// `//`
    FloorDiv,
    /// `%`
    Mod,
    /// `**`
    Pow,
    /// `<<`
    LShift,
    /// `>>`
    RShift,
    /// `&`
    BitAnd,
    /// `|`
    BitOr,
    /// `^`
    BitXor,
}

impl From<AugOp> for BinOp {
    fn from(op: AugOp) -> Self {
        match op {
            AugOp::Add => Self::Add,
            AugOp::Sub => Self::Sub,
            AugOp::Mult => Self::Mult,
            AugOp::Div => Self::Div,
            AugOp::FloorDiv => Self::FloorDiv,
            AugOp::Mod => Self::Mod,
            AugOp::Pow => Self::Pow,
            AugOp::LShift => Self::LShift,
            AugOp::RShift => Self::RShift,
            AugOp::BitAnd => Self::BitAnd,
            AugOp::BitOr => Self::BitOr,
            AugOp::BitXor => Self::BitXor,
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `~`
    Invert,
    /// `not`
    Not,
    /// `+`
    UAdd,
    /// `-`
    USub,
}

/// Boolean operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    /// `and`
    And,
    /// `or`
    Or,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtE,
    /// `>`
    Gt,
    /// `>=`
    GtE,
}

impl CmpOp {
    /// The operator that holds exactly when `self` does not.
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::Eq => Self::NotEq,
            Self::NotEq => Self::Eq,
            Self::Lt => Self::GtE,
            Self::GtE => Self::Lt,
            Self::Gt => Self::LtE,
            Self::LtE => Self::Gt,
        }
    }

    /// The operator that holds after exchanging the operands.
    #[must_use]
    pub const fn swap(self) -> Self {
        match self {
            Self::Lt => Self::Gt,
            Self::Gt => Self::Lt,
            Self::LtE => Self::GtE,
            Self::GtE => Self::LtE,
            Self::Eq => Self::Eq,
            Self::NotEq => Self::NotEq,
        }
    }

    /// Whether this is an ordering comparison.
    #[must_use]
    pub const fn is_ordering(self) -> bool {
        matches!(self, Self::Lt | Self::LtE | Self::Gt | Self::GtE)
    }

    /// Operator spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtE => "<=",
            Self::Gt => ">",
            Self::GtE => ">=",
        }
    }
}
