//! Binary, logical and unary operators.
//!
//! Binding powers follow the template language's precedence table; higher
//! numbers bind tighter. Logical operators live in their own enum because
//! they short-circuit and never coerce their result.

use std::fmt;

/// Binary operators (everything that evaluates both operands).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Equality
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,

    // Comparison
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UnsignedShr,
}

impl BinaryOp {
    /// Source-level symbol, used in error messages and `Display`.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::StrictEq => "===",
            Self::StrictNotEq => "!==",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::UnsignedShr => ">>>",
        }
    }

    /// Binding power. Higher binds tighter.
    ///
    /// - 11: `*` `/` `%`
    /// - 9: `+` `-`
    /// - 8: `<<` `>>` `>>>`
    /// - 7: `<` `>` `<=` `>=`
    /// - 6: `==` `!=` `===` `!==`
    /// - 5: `&`
    /// - 4: `^`
    /// - 3: `|`
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Mul | Self::Div | Self::Mod => 11,
            Self::Add | Self::Sub => 9,
            Self::Shl | Self::Shr | Self::UnsignedShr => 8,
            Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => 7,
            Self::Eq | Self::NotEq | Self::StrictEq | Self::StrictNotEq => 6,
            Self::BitAnd => 5,
            Self::BitXor => 4,
            Self::BitOr => 3,
        }
    }

    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::NotEq
                | Self::StrictEq
                | Self::StrictNotEq
                | Self::Lt
                | Self::LtEq
                | Self::Gt
                | Self::GtEq
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Short-circuiting operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LogicalOp {
    And,
    Or,
    /// `??`: right side only when the left is null or undefined.
    Coalesce,
}

impl LogicalOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::And => "&&",
            Self::Or => "||",
            Self::Coalesce => "??",
        }
    }

    /// `||` and `??` share the loosest level; `&&` sits one above.
    pub const fn precedence(self) -> u8 {
        match self {
            Self::And => 2,
            Self::Or | Self::Coalesce => 1,
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Prefix operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Plus => "+",
            Self::Not => "!",
            Self::BitNot => "~",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}
