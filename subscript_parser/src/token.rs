//! Token definitions.

use subscript_core::Span;

/// Reserved words of the dialect.
///
/// Only a handful are accepted by the parser; the rest are reserved so that
/// host-language constructs fail with a clear syntax error instead of being
/// read as names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    /// `False`
    False,
    /// `None`
    None,
    /// `True`
    True,
    /// `and`
    And,
    /// `as`
    As,
    /// `def`
    Def,
    /// `elif`
    Elif,
    /// `else`
    Else,
    /// `from`
    From,
    /// `if`
    If,
    /// `import`
    Import,
    /// `not`
    Not,
    /// `or`
    Or,
    /// `pass`
    Pass,
    /// `return`
    Return,
    /// `while`
    While,
    /// Reserved but unsupported (`for`, `class`, `try`, ...).
    Reserved(&'static str),
}

const RESERVED: &[&str] = &[
    "assert", "async", "await", "break", "class", "continue", "del", "except", "finally", "for",
    "global", "in", "is", "lambda", "nonlocal", "raise", "try", "with", "yield",
];

impl Keyword {
    /// Look up a keyword by its spelling.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        let kw = match ident {
            "False" => Self::False,
            "None" => Self::None,
            "True" => Self::True,
            "and" => Self::And,
            "as" => Self::As,
            "def" => Self::Def,
            "elif" => Self::Elif,
            "else" => Self::Else,
            "from" => Self::From,
            "if" => Self::If,
            "import" => Self::Import,
            "not" => Self::Not,
            "or" => Self::Or,
            "pass" => Self::Pass,
            "return" => Self::Return,
            "while" => Self::While,
            other => return RESERVED.iter().copied().find(|r| *r == other).map(Self::Reserved),
        };
        Some(kw)
    }

    /// The keyword's spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::False => "False",
            Self::None => "None",
            Self::True => "True",
            Self::And => "and",
            Self::As => "as",
            Self::Def => "def",
            Self::Elif => "elif",
            Self::Else => "else",
            Self::From => "from",
            Self::If => "if",
            Self::Import => "import",
            Self::Not => "not",
            Self::Or => "or",
            Self::Pass => "pass",
            Self::Return => "return",
            Self::While => "while",
            Self::Reserved(word) => word,
        }
    }
}

/// The kind of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Literals
    /// Integer literal.
    Int(i64),
    /// String literal body, with escape sequences left in place.
    String(String),
    /// Bytes literal, escapes decoded.
    Bytes(Vec<u8>),
    /// Identifier.
    Ident(String),
    /// Keyword.
    Keyword(Keyword),

    // Layout
    /// End of a logical line.
    Newline,
    /// Indentation increase.
    Indent,
    /// Indentation decrease.
    Dedent,
    /// End of input.
    Eof,
    /// Lexical error.
    Error(String),

    // Delimiters
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `;`
    Semicolon,
    /// `.`
    Dot,
    /// `@`
    At,
    /// `->`
    Arrow,
    /// `=`
    Equal,

    // Operators
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `**`
    DoubleStar,
    /// `/`
    Slash,
    /// `//`
    DoubleSlash,
    /// `%`
    Percent,
    /// `~`
    Tilde,
    /// `&`
    Ampersand,
    /// `|`
    Pipe,
    /// `^`
    Caret,
    /// `<<`
    LeftShift,
    /// `>>`
    RightShift,

    // Comparisons
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `==`
    EqualEqual,
    /// `!=`
    NotEqual,

    // Augmented assignment
    /// `+=`
    PlusEqual,
    /// `-=`
    MinusEqual,
    /// `*=`
    StarEqual,
    /// `/=`
    SlashEqual,
    /// `//=`
    DoubleSlashEqual,
    /// `%=`
    PercentEqual,
    /// `**=`
    DoubleStarEqual,
    /// `&=`
    AmpersandEqual,
    /// `|=`
    PipeEqual,
    /// `^=`
    CaretEqual,
    /// `<<=`
    LeftShiftEqual,
    /// `>>=`
    RightShiftEqual,
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token kind.
    pub kind: TokenKind,
    /// Source span.
    pub span: Span,
}

impl Token {
    /// Create a new token.
    #[must_use]
    pub const fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Check for end of input.
    #[must_use]
    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}
