//! Recursive-descent parser with Pratt expression parsing.
//!
//! [`StmtParser`] handles statements and blocks, [`ExprParser`] handles
//! operator precedence. Both drive the shared token buffer in [`Parser`].

mod expr;
mod stmt;

pub use expr::ExprParser;
pub use stmt::StmtParser;

use crate::ast::{Expr, Module};
use crate::lexer::Lexer;
use crate::token::{Keyword, Token, TokenKind};
use subscript_core::{Span, SubscriptError, SubscriptResult};

/// Operator precedence levels, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// Entry level.
    Lowest,
    /// `or`
    Or,
    /// `and`
    And,
    /// `not`
    Not,
    /// Comparisons.
    Comparison,
    /// `|`
    BitwiseOr,
    /// `^`
    BitwiseXor,
    /// `&`
    BitwiseAnd,
    /// `<<` `>>`
    Shift,
    /// `+` `-`
    Additive,
    /// `*` `/` `//` `%`
    Multiplicative,
    /// Unary `-` `+` `~`
    Unary,
    /// `**`
    Power,
    /// Calls and attribute access.
    Primary,
}

impl Precedence {
    /// The next-tighter level (used for left-associative operators).
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Lowest => Self::Or,
            Self::Or => Self::And,
            Self::And => Self::Not,
            Self::Not => Self::Comparison,
            Self::Comparison => Self::BitwiseOr,
            Self::BitwiseOr => Self::BitwiseXor,
            Self::BitwiseXor => Self::BitwiseAnd,
            Self::BitwiseAnd => Self::Shift,
            Self::Shift => Self::Additive,
            Self::Additive => Self::Multiplicative,
            Self::Multiplicative => Self::Unary,
            Self::Unary => Self::Power,
            Self::Power | Self::Primary => Self::Primary,
        }
    }
}

/// Token buffer and cursor shared by the statement and expression parsers.
#[derive(Debug)]
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'src> Parser<'src> {
    /// Tokenize `source`, failing on the first lexical error.
    pub fn new(source: &'src str) -> SubscriptResult<Self> {
        let tokens = Lexer::tokenize(source);
        if let Some(token) = tokens.iter().find(|t| matches!(t.kind, TokenKind::Error(_))) {
            if let TokenKind::Error(message) = &token.kind {
                return Err(SubscriptError::syntax(message.clone(), token.span));
            }
        }
        Ok(Self {
            source,
            tokens,
            pos: 0,
        })
    }

    /// The source text being parsed.
    #[must_use]
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Parse a whole module.
    pub fn parse_module(&mut self) -> SubscriptResult<Module> {
        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            if self.check(TokenKind::Eof) {
                break;
            }
            body.push(StmtParser::parse(self)?);
        }
        Ok(Module { body })
    }

    // =========================================================================
    // Token access
    // =========================================================================

    /// The current token.
    #[must_use]
    pub fn current(&self) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[self.pos.min(last)]
    }

    /// The most recently consumed token.
    #[must_use]
    pub fn previous(&self) -> &Token {
        &self.tokens[self.pos.saturating_sub(1)]
    }

    /// Consume the current token.
    pub fn advance(&mut self) {
        if !self.current().is_eof() {
            self.pos += 1;
        }
    }

    /// Whether the current token has the same kind as `kind`.
    ///
    /// Payload-carrying kinds compare by variant only.
    #[must_use]
    pub fn check(&self, kind: TokenKind) -> bool {
        std::mem::discriminant(&self.current().kind) == std::mem::discriminant(&kind)
    }

    /// Whether the current token is the keyword `kw`.
    #[must_use]
    pub fn check_keyword(&self, kw: Keyword) -> bool {
        self.current().kind == TokenKind::Keyword(kw)
    }

    /// Consume the current token if it matches `kind`.
    pub fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume the current token if it is the keyword `kw`.
    pub fn match_keyword(&mut self, kw: Keyword) -> bool {
        if self.check_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of `kind` or fail with `message`.
    pub fn expect(&mut self, kind: TokenKind, message: &str) -> SubscriptResult<()> {
        if self.match_token(kind) {
            Ok(())
        } else {
            Err(self.error_at_current(message))
        }
    }

    /// Consume the keyword `kw` or fail with `message`.
    pub fn expect_keyword(&mut self, kw: Keyword, message: &str) -> SubscriptResult<()> {
        if self.match_keyword(kw) {
            Ok(())
        } else {
            Err(self.error_at_current(message))
        }
    }

    /// Consume an identifier or fail with `message`.
    pub fn expect_identifier(&mut self, message: &str) -> SubscriptResult<String> {
        if let TokenKind::Ident(name) = &self.current().kind {
            let name = name.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.error_at_current(message))
        }
    }

    /// Skip blank logical lines.
    pub fn skip_newlines(&mut self) {
        while self.match_token(TokenKind::Newline) {}
    }

    // =========================================================================
    // Spans and errors
    // =========================================================================

    /// Start offset of the current token.
    #[must_use]
    pub fn start_span(&self) -> u32 {
        self.current().span.start
    }

    /// Span from `start` to the end of the previous token.
    #[must_use]
    pub fn span_from(&self, start: u32) -> Span {
        let end = self.previous().span.end.max(start);
        Span::new(start, end)
    }

    /// Syntax error located at the current token.
    #[must_use]
    pub fn error_at_current(&self, message: &str) -> SubscriptError {
        let token = self.current();
        let found = describe(&token.kind);
        SubscriptError::syntax(format!("{message}, found {found}"), token.span)
    }

    /// Syntax error located at the previous token.
    #[must_use]
    pub fn error_at_previous(&self, message: &str) -> SubscriptError {
        SubscriptError::syntax(message, self.previous().span)
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Int(n) => format!("integer {n}"),
        TokenKind::String(_) => "string literal".to_string(),
        TokenKind::Bytes(_) => "bytes literal".to_string(),
        TokenKind::Ident(name) => format!("'{name}'"),
        TokenKind::Keyword(kw) => format!("keyword '{}'", kw.as_str()),
        TokenKind::Newline => "end of line".to_string(),
        TokenKind::Indent => "indent".to_string(),
        TokenKind::Dedent => "dedent".to_string(),
        TokenKind::Eof => "end of input".to_string(),
        TokenKind::Error(message) => message.clone(),
        other => format!("{other:?}"),
    }
}

/// Parse a complete source file.
pub fn parse(source: &str) -> SubscriptResult<Module> {
    Parser::new(source)?.parse_module()
}

/// Parse a single expression.
pub fn parse_expression(source: &str) -> SubscriptResult<Expr> {
    let mut parser = Parser::new(source)?;
    let expr = ExprParser::parse(&mut parser, Precedence::Lowest)?;
    parser.skip_newlines();
    if !parser.check(TokenKind::Eof) {
        return Err(parser.error_at_current("unexpected trailing input"));
    }
    Ok(expr)
}
