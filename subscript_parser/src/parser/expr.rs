//! Expression parser using Pratt parsing.
//!
//! Covers literals, names, calls, arithmetic, comparisons and boolean
//! operators. Adjacent string literals concatenate. Subscripts, lambdas,
//! comprehensions and other host-language forms are rejected here.

use crate::ast::{BinOp, BoolOp, CmpOp, Expr, ExprKind, Keyword, UnaryOp};
use crate::parser::{Parser, Precedence};
use crate::token::{Keyword as KW, TokenKind};
use subscript_core::SubscriptResult;

/// Expression parser.
pub struct ExprParser;

impl ExprParser {
    /// Parse an expression with the given minimum precedence.
    pub fn parse(parser: &mut Parser<'_>, min_prec: Precedence) -> SubscriptResult<Expr> {
        let mut left = Self::parse_prefix(parser)?;

        while let Some(prec) = Self::infix_precedence(parser) {
            if prec < min_prec {
                break;
            }
            left = Self::parse_infix(parser, left, prec)?;
        }

        Ok(left)
    }

    /// Parse a prefix expression (literals, unary ops, atoms).
    fn parse_prefix(parser: &mut Parser<'_>) -> SubscriptResult<Expr> {
        let start = parser.start_span();
        let kind = parser.current().kind.clone();
        match kind {
            // === Literals ===
            TokenKind::Int(n) => {
                parser.advance();
                Ok(Expr::new(ExprKind::Int(n), parser.span_from(start)))
            }
            TokenKind::String(s) => {
                parser.advance();
                let mut text = s;
                while let TokenKind::String(next) = &parser.current().kind {
                    text.push_str(next);
                    parser.advance();
                }
                Ok(Expr::new(ExprKind::String(text), parser.span_from(start)))
            }
            TokenKind::Bytes(b) => {
                parser.advance();
                let mut bytes = b;
                while let TokenKind::Bytes(next) = &parser.current().kind {
                    bytes.extend_from_slice(next);
                    parser.advance();
                }
                Ok(Expr::new(ExprKind::Bytes(bytes), parser.span_from(start)))
            }
            TokenKind::Keyword(KW::True) => {
                parser.advance();
                Ok(Expr::new(ExprKind::Bool(true), parser.span_from(start)))
            }
            TokenKind::Keyword(KW::False) => {
                parser.advance();
                Ok(Expr::new(ExprKind::Bool(false), parser.span_from(start)))
            }
            TokenKind::Keyword(KW::None) => {
                parser.advance();
                Ok(Expr::new(ExprKind::None, parser.span_from(start)))
            }

            // === Identifiers ===
            TokenKind::Ident(name) => {
                parser.advance();
                Ok(Expr::new(ExprKind::Name(name), parser.span_from(start)))
            }

            // === Unary Operators ===
            TokenKind::Minus => Self::parse_unary(parser, start, UnaryOp::USub, Precedence::Unary),
            TokenKind::Plus => Self::parse_unary(parser, start, UnaryOp::UAdd, Precedence::Unary),
            TokenKind::Tilde => {
                Self::parse_unary(parser, start, UnaryOp::Invert, Precedence::Unary)
            }
            TokenKind::Keyword(KW::Not) => {
                Self::parse_unary(parser, start, UnaryOp::Not, Precedence::Not)
            }

            // === Grouped/Tuple ===
            TokenKind::LeftParen => Self::parse_paren_expr(parser, start),

            // === List ===
            TokenKind::LeftBracket => Self::parse_list_expr(parser, start),

            TokenKind::LeftBrace => {
                Err(parser.error_at_current("dict and set displays are not supported"))
            }
            TokenKind::Keyword(KW::Reserved(word)) => Err(parser.error_at_current(&format!(
                "'{word}' is not supported in event scripts"
            ))),

            _ => Err(parser.error_at_current("expected expression")),
        }
    }

    fn parse_unary(
        parser: &mut Parser<'_>,
        start: u32,
        op: UnaryOp,
        prec: Precedence,
    ) -> SubscriptResult<Expr> {
        parser.advance();
        let operand = Self::parse(parser, prec)?;
        Ok(Expr::new(
            ExprKind::UnaryOp {
                op,
                operand: Box::new(operand),
            },
            parser.span_from(start),
        ))
    }

    /// Parse an infix expression.
    fn parse_infix(parser: &mut Parser<'_>, left: Expr, prec: Precedence) -> SubscriptResult<Expr> {
        let start = left.span.start;

        if let Some(op) = Self::binary_op(&parser.current().kind) {
            parser.advance();
            // Power is right-associative and binds tighter than a unary
            // operator on its left only.
            let right = if op == BinOp::Pow {
                Self::parse(parser, Precedence::Unary)?
            } else {
                Self::parse(parser, prec.next())?
            };
            return Ok(Expr::new(
                ExprKind::BinOp {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                },
                parser.span_from(start),
            ));
        }

        match &parser.current().kind.clone() {
            // === Boolean Operators ===
            TokenKind::Keyword(KW::And) => Self::parse_bool_op(parser, left, BoolOp::And, start),
            TokenKind::Keyword(KW::Or) => Self::parse_bool_op(parser, left, BoolOp::Or, start),

            // === Comparison Operators ===
            TokenKind::Less
            | TokenKind::Greater
            | TokenKind::LessEqual
            | TokenKind::GreaterEqual
            | TokenKind::EqualEqual
            | TokenKind::NotEqual => Self::parse_comparison(parser, left, start),

            // === Attribute Access ===
            TokenKind::Dot => {
                parser.advance();
                let attr = parser.expect_identifier("expected attribute name")?;
                Ok(Expr::new(
                    ExprKind::Attribute {
                        value: Box::new(left),
                        attr,
                    },
                    parser.span_from(start),
                ))
            }

            // === Call ===
            TokenKind::LeftParen => Self::parse_call(parser, left, start),

            TokenKind::LeftBracket => {
                Err(parser.error_at_current("subscripts are not supported"))
            }

            _ => Err(parser.error_at_current("unexpected token in expression")),
        }
    }

    fn binary_op(kind: &TokenKind) -> Option<BinOp> {
        Some(match kind {
            TokenKind::Plus => BinOp::Add,
            TokenKind::Minus => BinOp::Sub,
            TokenKind::Star => BinOp::Mult,
            TokenKind::Slash => BinOp::Div,
            TokenKind::DoubleSlash => BinOp::FloorDiv,
            TokenKind::Percent => BinOp::Mod,
            TokenKind::DoubleStar => BinOp::Pow,
            TokenKind::LeftShift => BinOp::LShift,
            TokenKind::RightShift => BinOp::RShift,
            TokenKind::Ampersand => BinOp::BitAnd,
            TokenKind::Pipe => BinOp::BitOr,
            TokenKind::Caret => BinOp::BitXor,
            _ => return None,
        })
    }

    /// Get the precedence of the current token as an infix operator.
    fn infix_precedence(parser: &Parser<'_>) -> Option<Precedence> {
        Some(match &parser.current().kind {
            TokenKind::Less
            | TokenKind::Greater
            | TokenKind::LessEqual
            | TokenKind::GreaterEqual
            | TokenKind::EqualEqual
            | TokenKind::NotEqual => Precedence::Comparison,

            TokenKind::Keyword(KW::And) => Precedence::And,
            TokenKind::Keyword(KW::Or) => Precedence::Or,

            TokenKind::Pipe => Precedence::BitwiseOr,
            TokenKind::Caret => Precedence::BitwiseXor,
            TokenKind::Ampersand => Precedence::BitwiseAnd,
            TokenKind::LeftShift | TokenKind::RightShift => Precedence::Shift,
            TokenKind::Plus | TokenKind::Minus => Precedence::Additive,
            TokenKind::Star | TokenKind::Slash | TokenKind::DoubleSlash | TokenKind::Percent => {
                Precedence::Multiplicative
            }
            TokenKind::DoubleStar => Precedence::Power,

            TokenKind::LeftParen | TokenKind::LeftBracket | TokenKind::Dot => Precedence::Primary,

            _ => return None,
        })
    }

    // =========================================================================
    // Complex Expression Parsers
    // =========================================================================

    /// Parse a run of the same boolean operator into one flattened node.
    fn parse_bool_op(
        parser: &mut Parser<'_>,
        left: Expr,
        op: BoolOp,
        start: u32,
    ) -> SubscriptResult<Expr> {
        let (kw, prec) = match op {
            BoolOp::And => (KW::And, Precedence::And),
            BoolOp::Or => (KW::Or, Precedence::Or),
        };
        let mut values = vec![left];
        while parser.match_keyword(kw) {
            values.push(Self::parse(parser, prec.next())?);
        }
        Ok(Expr::new(
            ExprKind::BoolOp { op, values },
            parser.span_from(start),
        ))
    }

    /// Parse a comparison chain.
    fn parse_comparison(parser: &mut Parser<'_>, left: Expr, start: u32) -> SubscriptResult<Expr> {
        let mut ops = Vec::new();
        let mut comparators = Vec::new();

        loop {
            let op = match &parser.current().kind {
                TokenKind::Less => CmpOp::Lt,
                TokenKind::Greater => CmpOp::Gt,
                TokenKind::LessEqual => CmpOp::LtE,
                TokenKind::GreaterEqual => CmpOp::GtE,
                TokenKind::EqualEqual => CmpOp::Eq,
                TokenKind::NotEqual => CmpOp::NotEq,
                _ => break,
            };
            parser.advance();

            ops.push(op);
            comparators.push(Self::parse(parser, Precedence::Comparison.next())?);
        }

        Ok(Expr::new(
            ExprKind::Compare {
                left: Box::new(left),
                ops,
                comparators,
            },
            parser.span_from(start),
        ))
    }

    /// Parse a parenthesized expression or tuple.
    fn parse_paren_expr(parser: &mut Parser<'_>, start: u32) -> SubscriptResult<Expr> {
        parser.advance(); // consume '('

        if parser.match_token(TokenKind::RightParen) {
            return Ok(Expr::new(ExprKind::Tuple(vec![]), parser.span_from(start)));
        }

        let first = Self::parse(parser, Precedence::Lowest)?;
        if parser.match_token(TokenKind::RightParen) {
            return Ok(first);
        }

        let mut elements = vec![first];
        while parser.match_token(TokenKind::Comma) {
            if parser.check(TokenKind::RightParen) {
                break;
            }
            elements.push(Self::parse(parser, Precedence::Lowest)?);
        }
        parser.expect(TokenKind::RightParen, "expected ')'")?;
        Ok(Expr::new(ExprKind::Tuple(elements), parser.span_from(start)))
    }

    /// Parse a list display.
    fn parse_list_expr(parser: &mut Parser<'_>, start: u32) -> SubscriptResult<Expr> {
        parser.advance(); // consume '['

        let mut elements = Vec::new();
        while !parser.check(TokenKind::RightBracket) {
            elements.push(Self::parse(parser, Precedence::Lowest)?);
            if parser.check_keyword(KW::Reserved("for")) {
                return Err(parser.error_at_current("comprehensions are not supported"));
            }
            if !parser.match_token(TokenKind::Comma) {
                break;
            }
        }
        parser.expect(TokenKind::RightBracket, "expected ']'")?;
        Ok(Expr::new(ExprKind::List(elements), parser.span_from(start)))
    }

    /// Parse a function call.
    fn parse_call(parser: &mut Parser<'_>, func: Expr, start: u32) -> SubscriptResult<Expr> {
        parser.advance(); // consume '('

        let mut args = Vec::new();
        let mut keywords: Vec<Keyword> = Vec::new();

        while !parser.check(TokenKind::RightParen) {
            let arg_start = parser.start_span();

            if parser.check(TokenKind::Star) || parser.check(TokenKind::DoubleStar) {
                return Err(parser.error_at_current("argument unpacking is not supported"));
            }

            let expr = Self::parse(parser, Precedence::Lowest)?;
            if parser.match_token(TokenKind::Equal) {
                let ExprKind::Name(name) = expr.kind else {
                    return Err(parser.error_at_previous("keyword argument name must be identifier"));
                };
                if keywords.iter().any(|k| k.arg == name) {
                    return Err(parser.error_at_previous(&format!(
                        "keyword argument repeated: {name}"
                    )));
                }
                let value = Self::parse(parser, Precedence::Lowest)?;
                keywords.push(Keyword {
                    arg: name,
                    value,
                    span: parser.span_from(arg_start),
                });
            } else if !keywords.is_empty() {
                return Err(parser.error_at_previous(
                    "positional argument follows keyword argument",
                ));
            } else {
                args.push(expr);
            }

            if !parser.match_token(TokenKind::Comma) {
                break;
            }
        }

        parser.expect(TokenKind::RightParen, "expected ')'")?;

        Ok(Expr::new(
            ExprKind::Call {
                func: Box::new(func),
                args,
                keywords,
            },
            parser.span_from(start),
        ))
    }
}
