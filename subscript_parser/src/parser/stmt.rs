//! Statement parser.
//!
//! Handles simple statements (expressions, assignments, imports, `return`,
//! `pass`) and the compound statements `if`/`elif`/`else`, `while` and
//! `def`, including decorators so they can be reported by the compiler.

use crate::ast::{Alias, Arg, AugOp, Expr, ExprKind, Stmt, StmtKind};
use crate::parser::{ExprParser, Parser, Precedence};
use crate::token::{Keyword as KW, TokenKind};
use subscript_core::SubscriptResult;

/// Statement parser.
pub struct StmtParser;

impl StmtParser {
    /// Parse a statement.
    pub fn parse(parser: &mut Parser<'_>) -> SubscriptResult<Stmt> {
        let start = parser.start_span();

        if let TokenKind::Keyword(kw) = &parser.current().kind {
            match kw {
                KW::If => return Self::parse_if(parser, start),
                KW::While => return Self::parse_while(parser, start),
                KW::Def => return Self::parse_function_def(parser, start),
                KW::Reserved(word) => {
                    return Err(parser.error_at_current(&format!(
                        "'{word}' statements are not supported in event scripts"
                    )))
                }
                _ => {}
            }
        }

        if parser.check(TokenKind::At) {
            return Self::parse_decorated(parser, start);
        }

        Self::parse_simple_statement(parser, start)
    }

    /// Parse a simple statement and its terminator.
    fn parse_simple_statement(parser: &mut Parser<'_>, start: u32) -> SubscriptResult<Stmt> {
        let stmt = match &parser.current().kind {
            TokenKind::Keyword(KW::Pass) => {
                parser.advance();
                Stmt::new(StmtKind::Pass, parser.span_from(start))
            }
            TokenKind::Keyword(KW::Return) => Self::parse_return(parser, start)?,
            TokenKind::Keyword(KW::Import) => Self::parse_import(parser, start)?,
            TokenKind::Keyword(KW::From) => Self::parse_from_import(parser, start)?,
            _ => Self::parse_expression_statement(parser, start)?,
        };

        // `a(); b()` keeps both statements on one logical line.
        if !parser.match_token(TokenKind::Semicolon)
            && !parser.match_token(TokenKind::Newline)
            && !parser.check(TokenKind::Eof)
            && !parser.check(TokenKind::Dedent)
        {
            return Err(parser.error_at_current("expected end of statement"));
        }
        Ok(stmt)
    }

    // =========================================================================
    // Simple Statements
    // =========================================================================

    /// Parse an expression statement (possibly assignment).
    fn parse_expression_statement(parser: &mut Parser<'_>, start: u32) -> SubscriptResult<Stmt> {
        let first = Self::parse_tuple_expr(parser)?;

        if parser.match_token(TokenKind::Equal) {
            let mut targets = vec![first];
            loop {
                let value = Self::parse_tuple_expr(parser)?;
                if parser.match_token(TokenKind::Equal) {
                    targets.push(value);
                } else {
                    return Ok(Stmt::new(
                        StmtKind::Assign {
                            targets,
                            value: Box::new(value),
                        },
                        parser.span_from(start),
                    ));
                }
            }
        }

        if let Some(op) = Self::match_aug_assign(parser) {
            let value = ExprParser::parse(parser, Precedence::Lowest)?;
            return Ok(Stmt::new(
                StmtKind::AugAssign {
                    target: Box::new(first),
                    op,
                    value: Box::new(value),
                },
                parser.span_from(start),
            ));
        }

        if parser.check(TokenKind::Colon) {
            return Err(parser.error_at_current("annotated assignments are not supported"));
        }

        Ok(Stmt::new(
            StmtKind::Expr(Box::new(first)),
            parser.span_from(start),
        ))
    }

    /// Parse an expression, collecting `a, b` into a tuple.
    fn parse_tuple_expr(parser: &mut Parser<'_>) -> SubscriptResult<Expr> {
        let start = parser.start_span();
        let first = ExprParser::parse(parser, Precedence::Lowest)?;
        if !parser.match_token(TokenKind::Comma) {
            return Ok(first);
        }

        let mut elements = vec![first];
        while !parser.check(TokenKind::Newline)
            && !parser.check(TokenKind::Eof)
            && !parser.check(TokenKind::Equal)
        {
            elements.push(ExprParser::parse(parser, Precedence::Lowest)?);
            if !parser.match_token(TokenKind::Comma) {
                break;
            }
        }
        Ok(Expr::new(ExprKind::Tuple(elements), parser.span_from(start)))
    }

    fn match_aug_assign(parser: &mut Parser<'_>) -> Option<AugOp> {
        let op = match &parser.current().kind {
            TokenKind::PlusEqual => AugOp::Add,
            TokenKind::MinusEqual => AugOp::Sub,
            TokenKind::StarEqual => AugOp::Mult,
            TokenKind::SlashEqual => AugOp::Div,
            TokenKind::DoubleSlashEqual => AugOp::FloorDiv,
            TokenKind::PercentEqual => AugOp::Mod,
            TokenKind::DoubleStarEqual => AugOp::Pow,
            TokenKind::LeftShiftEqual => AugOp::LShift,
            TokenKind::RightShiftEqual => AugOp::RShift,
            TokenKind::AmpersandEqual => AugOp::BitAnd,
            TokenKind::PipeEqual => AugOp::BitOr,
            TokenKind::CaretEqual => AugOp::BitXor,
            _ => return None,
        };
        parser.advance();
        Some(op)
    }

    /// Parse a return statement.
    fn parse_return(parser: &mut Parser<'_>, start: u32) -> SubscriptResult<Stmt> {
        parser.advance(); // consume 'return'

        let value = if parser.check(TokenKind::Newline)
            || parser.check(TokenKind::Semicolon)
            || parser.check(TokenKind::Eof)
        {
            None
        } else {
            Some(Box::new(Self::parse_tuple_expr(parser)?))
        };

        Ok(Stmt::new(StmtKind::Return(value), parser.span_from(start)))
    }

    /// Parse an import statement.
    fn parse_import(parser: &mut Parser<'_>, start: u32) -> SubscriptResult<Stmt> {
        parser.advance(); // consume 'import'

        let mut names = vec![Self::parse_alias(parser)?];
        while parser.match_token(TokenKind::Comma) {
            names.push(Self::parse_alias(parser)?);
        }

        Ok(Stmt::new(StmtKind::Import(names), parser.span_from(start)))
    }

    /// Parse a from-import statement.
    fn parse_from_import(parser: &mut Parser<'_>, start: u32) -> SubscriptResult<Stmt> {
        parser.advance(); // consume 'from'

        if parser.check(TokenKind::Dot) {
            return Err(parser.error_at_current("relative imports are not supported"));
        }
        let module = Self::parse_dotted_name(parser)?;

        parser.expect_keyword(KW::Import, "expected 'import'")?;

        if parser.check(TokenKind::Star) {
            return Err(parser.error_at_current("wildcard imports are not supported"));
        }

        let has_paren = parser.match_token(TokenKind::LeftParen);
        let mut names = vec![Self::parse_alias(parser)?];
        while parser.match_token(TokenKind::Comma) {
            if has_paren && parser.check(TokenKind::RightParen) {
                break;
            }
            names.push(Self::parse_alias(parser)?);
        }
        if has_paren {
            parser.expect(TokenKind::RightParen, "expected ')'")?;
        }

        Ok(Stmt::new(
            StmtKind::ImportFrom { module, names },
            parser.span_from(start),
        ))
    }

    /// Parse a dotted name (module path).
    fn parse_dotted_name(parser: &mut Parser<'_>) -> SubscriptResult<String> {
        let mut name = parser.expect_identifier("expected module name")?;
        while parser.match_token(TokenKind::Dot) {
            name.push('.');
            name.push_str(&parser.expect_identifier("expected identifier")?);
        }
        Ok(name)
    }

    /// Parse an import alias.
    fn parse_alias(parser: &mut Parser<'_>) -> SubscriptResult<Alias> {
        let start = parser.start_span();
        let name = Self::parse_dotted_name(parser)?;

        let asname = if parser.match_keyword(KW::As) {
            Some(parser.expect_identifier("expected identifier")?)
        } else {
            None
        };

        Ok(Alias {
            name,
            asname,
            span: parser.span_from(start),
        })
    }

    // =========================================================================
    // Compound Statements
    // =========================================================================

    /// Parse an if statement; each `elif` becomes a nested `if` in `orelse`.
    fn parse_if(parser: &mut Parser<'_>, start: u32) -> SubscriptResult<Stmt> {
        parser.advance(); // consume 'if' or 'elif'

        let test = ExprParser::parse(parser, Precedence::Lowest)?;
        parser.expect(TokenKind::Colon, "expected ':'")?;
        let body = Self::parse_block(parser)?;

        let orelse = if parser.check_keyword(KW::Elif) {
            let elif_start = parser.start_span();
            vec![Self::parse_if(parser, elif_start)?]
        } else if parser.match_keyword(KW::Else) {
            parser.expect(TokenKind::Colon, "expected ':'")?;
            Self::parse_block(parser)?
        } else {
            Vec::new()
        };

        Ok(Stmt::new(
            StmtKind::If {
                test: Box::new(test),
                body,
                orelse,
            },
            parser.span_from(start),
        ))
    }

    /// Parse a while statement.
    fn parse_while(parser: &mut Parser<'_>, start: u32) -> SubscriptResult<Stmt> {
        parser.advance(); // consume 'while'

        let test = ExprParser::parse(parser, Precedence::Lowest)?;
        parser.expect(TokenKind::Colon, "expected ':'")?;
        let body = Self::parse_block(parser)?;

        let orelse = if parser.match_keyword(KW::Else) {
            parser.expect(TokenKind::Colon, "expected ':'")?;
            Self::parse_block(parser)?
        } else {
            Vec::new()
        };

        Ok(Stmt::new(
            StmtKind::While {
                test: Box::new(test),
                body,
                orelse,
            },
            parser.span_from(start),
        ))
    }

    /// Parse a function definition.
    fn parse_function_def(parser: &mut Parser<'_>, start: u32) -> SubscriptResult<Stmt> {
        parser.advance(); // consume 'def'

        let name = parser.expect_identifier("expected function name")?;

        parser.expect(TokenKind::LeftParen, "expected '('")?;
        let args = Self::parse_function_params(parser)?;
        parser.expect(TokenKind::RightParen, "expected ')'")?;

        if parser.match_token(TokenKind::Arrow) {
            ExprParser::parse(parser, Precedence::Lowest)?;
        }

        parser.expect(TokenKind::Colon, "expected ':'")?;
        let body = Self::parse_block(parser)?;

        Ok(Stmt::new(
            StmtKind::FunctionDef {
                name,
                args,
                body,
                decorator_list: Vec::new(),
            },
            parser.span_from(start),
        ))
    }

    /// Parse function parameters. Annotations and defaults are discarded.
    fn parse_function_params(parser: &mut Parser<'_>) -> SubscriptResult<Vec<Arg>> {
        let mut args = Vec::new();

        while !parser.check(TokenKind::RightParen) {
            let arg_start = parser.start_span();
            if parser.match_token(TokenKind::Star) || parser.match_token(TokenKind::DoubleStar) {
                if parser.check(TokenKind::Comma) || parser.check(TokenKind::RightParen) {
                    parser.match_token(TokenKind::Comma);
                    continue;
                }
            }
            if parser.match_token(TokenKind::Slash) {
                parser.match_token(TokenKind::Comma);
                continue;
            }

            let name = parser.expect_identifier("expected parameter name")?;
            if parser.match_token(TokenKind::Colon) {
                ExprParser::parse(parser, Precedence::Lowest)?;
            }
            if parser.match_token(TokenKind::Equal) {
                ExprParser::parse(parser, Precedence::Lowest)?;
            }
            args.push(Arg {
                name,
                span: parser.span_from(arg_start),
            });

            if !parser.match_token(TokenKind::Comma) {
                break;
            }
        }

        Ok(args)
    }

    /// Parse a decorated function definition.
    fn parse_decorated(parser: &mut Parser<'_>, start: u32) -> SubscriptResult<Stmt> {
        let mut decorators = Vec::new();

        while parser.match_token(TokenKind::At) {
            decorators.push(ExprParser::parse(parser, Precedence::Lowest)?);
            parser.expect(TokenKind::Newline, "expected newline after decorator")?;
        }

        if !parser.check_keyword(KW::Def) {
            return Err(parser.error_at_current("expected 'def' after decorator"));
        }
        let def_start = parser.start_span();
        let mut stmt = Self::parse_function_def(parser, def_start)?;

        if let StmtKind::FunctionDef { decorator_list, .. } = &mut stmt.kind {
            *decorator_list = decorators;
        }

        stmt.span = parser.span_from(start);
        Ok(stmt)
    }

    /// Parse a block of statements: an indented suite or a same-line body.
    fn parse_block(parser: &mut Parser<'_>) -> SubscriptResult<Vec<Stmt>> {
        if !parser.check(TokenKind::Newline) {
            let mut stmts = Vec::new();
            loop {
                let start = parser.start_span();
                stmts.push(Self::parse_simple_statement(parser, start)?);
                if parser.previous().kind != TokenKind::Semicolon
                    || parser.check(TokenKind::Newline)
                {
                    parser.match_token(TokenKind::Newline);
                    return Ok(stmts);
                }
            }
        }

        parser.expect(TokenKind::Newline, "expected newline")?;
        parser.expect(TokenKind::Indent, "expected an indented block")?;

        let mut stmts = Vec::new();
        while !parser.check(TokenKind::Dedent) && !parser.check(TokenKind::Eof) {
            parser.skip_newlines();
            if parser.check(TokenKind::Dedent) || parser.check(TokenKind::Eof) {
                break;
            }
            stmts.push(Self::parse(parser)?);
        }

        parser.match_token(TokenKind::Dedent);
        Ok(stmts)
    }
}
