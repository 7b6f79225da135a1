//! Member access, indexing and calls.

use stencil_ir::Expr;
use stencil_lexer::TokenKind;

use super::Parser;
use crate::ParseError;

impl Parser<'_> {
    /// Primary expression followed by any number of `.name`, `[expr]` and
    /// `(args)` suffixes, folded left.
    pub(super) fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.cursor.peek_kind() {
                TokenKind::Dot => {
                    self.cursor.advance();
                    let name = self.cursor.expect_ident()?;
                    expr = Expr::member(expr, name);
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    self.cursor.enter_nested();
                    let key = self.parse_expr()?;
                    self.cursor.expect_close(&TokenKind::RBracket)?;
                    self.cursor.exit_nested();
                    expr = Expr::index(expr, key);
                }
                TokenKind::LParen => {
                    self.cursor.advance();
                    let args = self.parse_call_args()?;
                    expr = Expr::call(expr, args);
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Comma-separated arguments after an opening `(`, through the `)`.
    pub(crate) fn parse_call_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.cursor.enter_nested();
        let mut args = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            args.push(self.parse_expr()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect_close(&TokenKind::RParen)?;
        self.cursor.exit_nested();
        Ok(args)
    }

    /// Like [`Self::parse_call_args`], also returning each argument's byte
    /// range relative to the parser's input.
    pub fn parse_call_args_with_source(
        &mut self,
    ) -> Result<Vec<(Expr, std::ops::Range<usize>)>, ParseError> {
        self.cursor.enter_nested();
        let mut args = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            let start = self.cursor.peek_position().saturating_sub(self.cursor.base());
            let arg = self.parse_expr()?;
            args.push((arg, start..self.cursor.position()));
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect_close(&TokenKind::RParen)?;
        self.cursor.exit_nested();
        Ok(args)
    }
}
