//! Expression grammar.
//!
//! - `expr.rs`: precedence climbing over binary/logical operators, unary
//! - `postfix.rs`: `.name`, `[expr]`, `(args)` chains
//! - `primary.rs`: literals, identifiers, arrows, arrays, objects, templates

mod expr;
mod postfix;
mod primary;

use stencil_ir::Expr;
use stencil_lexer::TokenKind;

use crate::cursor::Cursor;
use crate::ParseError;

/// Recursive descent expression parser over a slice of page source.
pub struct Parser<'src> {
    cursor: Cursor<'src>,
}

impl<'src> Parser<'src> {
    /// Parser for a standalone expression starting at page offset `base`.
    pub fn new(source: &'src str, base: usize) -> Self {
        Parser {
            cursor: Cursor::new(source, base, false),
        }
    }

    /// Parser for a variable fragment, where a top-level `|` ends the
    /// expression instead of meaning bitwise-or.
    pub fn for_fragment(source: &'src str, base: usize) -> Self {
        Parser {
            cursor: Cursor::new(source, base, true),
        }
    }

    /// Parse one expression and stop at the first token that cannot
    /// continue it.
    pub fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        stencil_stack::ensure_sufficient_stack(|| self.parse_binary(0))
    }

    /// Parse one expression that must span the whole input.
    pub fn parse_complete(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expr()?;
        self.expect_end()?;
        Ok(expr)
    }

    pub fn expect_end(&mut self) -> Result<(), ParseError> {
        let token = self.cursor.peek().clone();
        if token.kind.is_eof() {
            Ok(())
        } else {
            Err(ParseError::unexpected(&token.kind, token.span.start as usize))
        }
    }

    /// Relative offset just past the last consumed token.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn at_end(&mut self) -> bool {
        self.cursor.peek_kind().is_eof()
    }

    pub fn check(&mut self, kind: &TokenKind) -> bool {
        self.cursor.check(kind)
    }

    pub fn check_word(&mut self, word: &str) -> bool {
        self.cursor.check_word(word)
    }

    /// Consume the identifier `word` if it is next.
    pub fn eat_word(&mut self, word: &str) -> bool {
        if self.cursor.check_word(word) {
            self.cursor.advance();
            true
        } else {
            false
        }
    }

    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        self.cursor.eat(kind)
    }

    pub fn expect_ident(&mut self) -> Result<String, ParseError> {
        self.cursor.expect_ident()
    }

    /// Identifier followed by the identifier `word`, as in `item in items`.
    pub fn peek_ident_then_word(&mut self, word: &str) -> Option<String> {
        let mut ahead = self.cursor.clone();
        let TokenKind::Ident(name) = ahead.advance().kind else {
            return None;
        };
        ahead.check_word(word).then_some(name)
    }

    /// The identifier `word` followed by another identifier.
    pub fn peek_ident_then_any(&mut self, word: &str) -> bool {
        let mut ahead = self.cursor.clone();
        if !ahead.check_word(word) {
            return false;
        }
        ahead.advance();
        matches!(ahead.peek_kind(), TokenKind::Ident(_))
    }
}
