//! Binary and unary operators.
//!
//! Precedence climbing: every infix operator has a binding power (see
//! `BinaryOp::precedence`), operators of equal power associate left.
//! Parenthesized sub-expressions restart at zero.

use stencil_ir::{BinaryOp, Expr, Literal, LogicalOp, UnaryOp};
use stencil_lexer::TokenKind;

use super::Parser;
use crate::ParseError;

#[derive(Copy, Clone)]
enum Infix {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

impl Infix {
    fn precedence(self) -> u8 {
        match self {
            Infix::Binary(op) => op.precedence(),
            Infix::Logical(op) => op.precedence(),
        }
    }

    fn build(self, left: Expr, right: Expr) -> Expr {
        match self {
            Infix::Binary(op) => Expr::binary(left, op, right),
            Infix::Logical(op) => Expr::logical(left, op, right),
        }
    }
}

fn infix_for(kind: &TokenKind) -> Option<Infix> {
    let op = match kind {
        TokenKind::AmpAmp => return Some(Infix::Logical(LogicalOp::And)),
        TokenKind::PipePipe => return Some(Infix::Logical(LogicalOp::Or)),
        TokenKind::QuestionQuestion => return Some(Infix::Logical(LogicalOp::Coalesce)),
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::EqEqEq => BinaryOp::StrictEq,
        TokenKind::NotEqEq => BinaryOp::StrictNotEq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::GtEq,
        TokenKind::Shl => BinaryOp::Shl,
        TokenKind::Shr => BinaryOp::Shr,
        TokenKind::UShr => BinaryOp::UnsignedShr,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        _ => return None,
    };
    Some(Infix::Binary(op))
}

impl Parser<'_> {
    pub(super) fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let pipe_ends_expr = self.cursor.pipe_is_separator();
            let kind = self.cursor.peek_kind();
            if pipe_ends_expr && matches!(kind, TokenKind::Pipe) {
                break;
            }
            let Some(op) = infix_for(kind) else {
                break;
            };
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.cursor.advance();
            let right =
                stencil_stack::ensure_sufficient_stack(|| self.parse_binary(prec + 1))?;
            left = op.build(left, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match self.cursor.peek_kind() {
            TokenKind::Minus => UnaryOp::Neg,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitNot,
            _ => return self.parse_postfix(),
        };
        self.cursor.advance();
        let operand = stencil_stack::ensure_sufficient_stack(|| self.parse_unary())?;

        // `-1` is a literal, not a negation node.
        Ok(match (op, operand) {
            (UnaryOp::Neg, Expr::Literal(Literal::Int(n))) => match n.checked_neg() {
                Some(neg) => Expr::int(neg),
                None => Expr::unary(UnaryOp::Neg, Expr::int(n)),
            },
            (UnaryOp::Neg, Expr::Literal(Literal::Double(n))) => Expr::double(-n),
            (op, operand) => Expr::unary(op, operand),
        })
    }
}
