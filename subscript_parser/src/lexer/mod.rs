//! Lexer for the event-script dialect.
//!
//! Produces the token stream of an indentation-sensitive language:
//! - Operators and delimiters used by expressions, assignments and calls
//! - INDENT/DEDENT tracking, suspended inside brackets
//! - Integer literals in every base (floats are rejected)
//! - Text strings, triple-quoted strings and bytes literals
//! - Comments and backslash line continuations

pub mod cursor;
pub mod identifier;
pub mod indent;
pub mod number;
pub mod string;

use cursor::Cursor;
use identifier::{is_id_start, parse_identifier};
use indent::IndentStack;
use number::parse_number;
use string::{is_string_prefix, parse_string, StringPrefix};
use subscript_core::Span;

use crate::token::{Token, TokenKind};

/// The script lexer.
#[derive(Debug)]
pub struct Lexer<'src> {
    /// Character cursor.
    cursor: Cursor<'src>,
    /// Indentation tracker.
    indent: IndentStack,
    /// Whether we've reached EOF.
    at_eof: bool,
    /// Whether the last emitted token ended a logical line.
    line_closed: bool,
    /// Token start position for the current token.
    token_start: usize,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source code.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            indent: IndentStack::new(),
            at_eof: false,
            line_closed: true,
            token_start: 0,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Token {
        if self.indent.has_pending_dedents() {
            self.indent.consume_dedent();
            return self.make_token(TokenKind::Dedent);
        }

        if self.at_eof {
            return self.make_token(TokenKind::Eof);
        }

        if self.indent.at_line_start() && self.indent.tracking_indent() {
            let token = self.handle_line_start();
            self.indent.consumed_content();
            if let Some(token) = token {
                return token;
            }
        }

        self.skip_whitespace();
        self.token_start = self.cursor.pos();

        if self.cursor.is_eof() {
            return self.finish();
        }

        // Quotes are scanned from the opening delimiter.
        if matches!(self.cursor.first(), '"' | '\'') {
            let kind = parse_string(&mut self.cursor, StringPrefix::default());
            return self.emit(kind);
        }

        let Some(c) = self.cursor.bump() else {
            return self.finish();
        };

        let kind = match c {
            '\n' => return self.handle_newline(),
            '\r' => {
                self.cursor.eat('\n');
                return self.handle_newline();
            }

            '#' => {
                self.skip_comment();
                return self.next_token();
            }

            '(' => {
                self.indent.open_bracket();
                TokenKind::LeftParen
            }
            ')' => {
                self.indent.close_bracket();
                TokenKind::RightParen
            }
            '[' => {
                self.indent.open_bracket();
                TokenKind::LeftBracket
            }
            ']' => {
                self.indent.close_bracket();
                TokenKind::RightBracket
            }
            '{' => {
                self.indent.open_bracket();
                TokenKind::LeftBrace
            }
            '}' => {
                self.indent.close_bracket();
                TokenKind::RightBrace
            }

            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '~' => TokenKind::Tilde,
            '@' => TokenKind::At,
            '.' if self.cursor.first().is_ascii_digit() => parse_number(&mut self.cursor, c),
            '.' => TokenKind::Dot,

            '+' => self.with_equal(TokenKind::Plus, TokenKind::PlusEqual),
            '-' => {
                if self.cursor.eat('>') {
                    TokenKind::Arrow
                } else {
                    self.with_equal(TokenKind::Minus, TokenKind::MinusEqual)
                }
            }
            '*' => {
                if self.cursor.eat('*') {
                    self.with_equal(TokenKind::DoubleStar, TokenKind::DoubleStarEqual)
                } else {
                    self.with_equal(TokenKind::Star, TokenKind::StarEqual)
                }
            }
            '/' => {
                if self.cursor.eat('/') {
                    self.with_equal(TokenKind::DoubleSlash, TokenKind::DoubleSlashEqual)
                } else {
                    self.with_equal(TokenKind::Slash, TokenKind::SlashEqual)
                }
            }
            '%' => self.with_equal(TokenKind::Percent, TokenKind::PercentEqual),
            '<' => {
                if self.cursor.eat('<') {
                    self.with_equal(TokenKind::LeftShift, TokenKind::LeftShiftEqual)
                } else {
                    self.with_equal(TokenKind::Less, TokenKind::LessEqual)
                }
            }
            '>' => {
                if self.cursor.eat('>') {
                    self.with_equal(TokenKind::RightShift, TokenKind::RightShiftEqual)
                } else {
                    self.with_equal(TokenKind::Greater, TokenKind::GreaterEqual)
                }
            }
            '=' => self.with_equal(TokenKind::Equal, TokenKind::EqualEqual),
            '!' => {
                if self.cursor.eat('=') {
                    TokenKind::NotEqual
                } else {
                    TokenKind::Error("unexpected '!'".to_string())
                }
            }
            '&' => self.with_equal(TokenKind::Ampersand, TokenKind::AmpersandEqual),
            '|' => self.with_equal(TokenKind::Pipe, TokenKind::PipeEqual),
            '^' => self.with_equal(TokenKind::Caret, TokenKind::CaretEqual),

            // Line continuation
            '\\' if matches!(self.cursor.first(), '\n' | '\r') => {
                self.cursor.eat('\r');
                self.cursor.eat('\n');
                return self.next_token();
            }

            _ if is_id_start(c) => self.handle_identifier_or_string(c),
            _ if c.is_ascii_digit() => parse_number(&mut self.cursor, c),

            _ => TokenKind::Error(format!("unexpected character: {c:?}")),
        };

        self.emit(kind)
    }

    /// Handle the start of a logical line, skipping blank and comment lines.
    fn handle_line_start(&mut self) -> Option<Token> {
        let mut width = 0;
        while !self.cursor.is_eof() {
            match self.cursor.first() {
                ' ' => {
                    width += 1;
                    self.cursor.bump();
                }
                '\t' => {
                    // Tabs align to 8-column stops
                    width = (width / 8 + 1) * 8;
                    self.cursor.bump();
                }
                '#' => {
                    self.skip_comment();
                }
                '\n' | '\r' => {
                    self.cursor.eat('\r');
                    self.cursor.eat('\n');
                    width = 0;
                }
                _ => break,
            }
        }

        if self.cursor.is_eof() {
            return None;
        }

        self.token_start = self.cursor.pos();
        match self.indent.process_indent(width) {
            Ok(Some(true)) => Some(self.make_token(TokenKind::Indent)),
            Ok(Some(false)) => {
                self.indent.consume_dedent();
                Some(self.make_token(TokenKind::Dedent))
            }
            Ok(None) => None,
            Err(message) => Some(self.make_token(TokenKind::Error(message.to_string()))),
        }
    }

    /// Handle a newline character.
    fn handle_newline(&mut self) -> Token {
        if !self.indent.tracking_indent() {
            // Inside brackets newlines are insignificant
            return self.next_token();
        }
        self.indent.new_line();
        if self.line_closed {
            return self.next_token();
        }
        self.line_closed = true;
        self.make_token(TokenKind::Newline)
    }

    /// Close the final logical line and drain open indentation levels.
    fn finish(&mut self) -> Token {
        self.token_start = self.cursor.pos();
        if !self.line_closed {
            self.line_closed = true;
            return self.make_token(TokenKind::Newline);
        }
        self.at_eof = true;
        self.indent.close_all();
        if self.indent.has_pending_dedents() {
            self.indent.consume_dedent();
            return self.make_token(TokenKind::Dedent);
        }
        self.make_token(TokenKind::Eof)
    }

    fn with_equal(&mut self, plain: TokenKind, with_equal: TokenKind) -> TokenKind {
        if self.cursor.eat('=') {
            with_equal
        } else {
            plain
        }
    }

    /// Skip a comment (everything until end of line).
    fn skip_comment(&mut self) {
        self.cursor.eat_while(|c| c != '\n' && c != '\r');
    }

    /// Skip whitespace (but not newlines).
    fn skip_whitespace(&mut self) {
        self.cursor.eat_while(|c| c == ' ' || c == '\t' || c == '\x0C');
    }

    /// Handle an identifier, keyword, or prefixed string.
    fn handle_identifier_or_string(&mut self, first: char) -> TokenKind {
        if is_string_prefix(first) {
            let next = self.cursor.first();
            if matches!(next, '"' | '\'') {
                return parse_string(&mut self.cursor, StringPrefix::from_chars(&first.to_string()));
            }
            if is_string_prefix(next) && matches!(self.cursor.second(), '"' | '\'') {
                self.cursor.bump();
                let prefix = StringPrefix::from_chars(&format!("{first}{next}"));
                if !prefix.is_valid() {
                    return TokenKind::Error("invalid string prefix".to_string());
                }
                return parse_string(&mut self.cursor, prefix);
            }
        }
        parse_identifier(&mut self.cursor, first)
    }

    fn emit(&mut self, kind: TokenKind) -> Token {
        self.line_closed = false;
        self.make_token(kind)
    }

    /// Create a token with the current span.
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            Span::new(self.token_start as u32, self.cursor.pos() as u32),
        )
    }

    /// Tokenize the entire source into a vector.
    #[must_use]
    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();

        loop {
            let token = lexer.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        tokens
    }
}

/// Convenience function to tokenize source code.
#[must_use]
pub fn tokenize(source: &str) -> Vec<Token> {
    Lexer::tokenize(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Keyword;

    fn lex(s: &str) -> Vec<TokenKind> {
        Lexer::tokenize(s).into_iter().map(|t| t.kind).collect()
    }

    fn lex_no_layout(s: &str) -> Vec<TokenKind> {
        lex(s)
            .into_iter()
            .filter(|k| {
                !matches!(
                    k,
                    TokenKind::Eof | TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent
                )
            })
            .collect()
    }

    #[test]
    fn test_empty() {
        assert_eq!(lex(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_call_statement() {
        assert_eq!(
            lex("message(\"Hi\")"),
            vec![
                TokenKind::Ident("message".to_string()),
                TokenKind::LeftParen,
                TokenKind::String("Hi".to_string()),
                TokenKind::RightParen,
                TokenKind::Newline,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            lex_no_layout("+ - * / // ** % << >> & | ^ ~"),
            vec![
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Slash,
                TokenKind::DoubleSlash,
                TokenKind::DoubleStar,
                TokenKind::Percent,
                TokenKind::LeftShift,
                TokenKind::RightShift,
                TokenKind::Ampersand,
                TokenKind::Pipe,
                TokenKind::Caret,
                TokenKind::Tilde,
            ]
        );
    }

    #[test]
    fn test_comparison() {
        assert_eq!(
            lex_no_layout("< > <= >= == !="),
            vec![
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::EqualEqual,
                TokenKind::NotEqual,
            ]
        );
    }

    #[test]
    fn test_augmented_assign() {
        assert_eq!(
            lex_no_layout("+= -= *= //= <<="),
            vec![
                TokenKind::PlusEqual,
                TokenKind::MinusEqual,
                TokenKind::StarEqual,
                TokenKind::DoubleSlashEqual,
                TokenKind::LeftShiftEqual,
            ]
        );
    }

    #[test]
    fn test_hex_and_bytes() {
        assert_eq!(
            lex_no_layout("Var(0x4000) b'\\x01'"),
            vec![
                TokenKind::Ident("Var".to_string()),
                TokenKind::LeftParen,
                TokenKind::Int(0x4000),
                TokenKind::RightParen,
                TokenKind::Bytes(vec![0x01]),
            ]
        );
    }

    #[test]
    fn test_prefix_letter_alone_is_identifier() {
        assert_eq!(
            lex_no_layout("b = r"),
            vec![
                TokenKind::Ident("b".to_string()),
                TokenKind::Equal,
                TokenKind::Ident("r".to_string()),
            ]
        );
    }

    #[test]
    fn test_comment_and_blank_lines_skipped() {
        let tokens = lex("lock()\n\n# note\n   \nrelease()  # done\n");
        let newlines = tokens
            .iter()
            .filter(|t| matches!(t, TokenKind::Newline))
            .count();
        assert_eq!(newlines, 2);
        assert!(!tokens.iter().any(|t| matches!(t, TokenKind::Indent)));
    }

    #[test]
    fn test_keywords() {
        let tokens = lex_no_layout("if elif else while def return for");
        assert_eq!(tokens[0], TokenKind::Keyword(Keyword::If));
        assert_eq!(tokens[1], TokenKind::Keyword(Keyword::Elif));
        assert_eq!(tokens[6], TokenKind::Keyword(Keyword::Reserved("for")));
    }

    #[test]
    fn test_newline_ignored_in_brackets() {
        let tokens = lex("call(\n  1,\n  2)\n");
        let newlines = tokens
            .iter()
            .filter(|t| matches!(t, TokenKind::Newline))
            .count();
        assert_eq!(newlines, 1);
    }

    #[test]
    fn test_indent_dedent() {
        let tokens = lex("if x:\n    y()\nz()");
        assert_eq!(
            tokens
                .iter()
                .filter(|t| matches!(t, TokenKind::Indent))
                .count(),
            1
        );
        assert_eq!(
            tokens
                .iter()
                .filter(|t| matches!(t, TokenKind::Dedent))
                .count(),
            1
        );
    }

    #[test]
    fn test_dedents_drained_at_eof() {
        let tokens = lex("if x:\n    if y:\n        z()\n");
        let tail: Vec<_> = tokens.iter().rev().take(3).cloned().collect();
        assert_eq!(
            tail,
            vec![TokenKind::Eof, TokenKind::Dedent, TokenKind::Dedent]
        );
    }

    #[test]
    fn test_bad_dedent() {
        let tokens = lex("if x:\n    y()\n  z()\n");
        assert!(tokens.iter().any(|t| matches!(t, TokenKind::Error(_))));
    }

    #[test]
    fn test_line_continuation() {
        let tokens = lex_no_layout("x = 1 + \\\n    2");
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn test_token_spans() {
        let tokens = Lexer::tokenize("lock()");
        assert_eq!(tokens[0].span, Span::new(0, 4));
    }
}
