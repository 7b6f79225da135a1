//! Syntax trees.
//!
//! - [`expr`]: one expression, as parsed from a `{{ }}` span or a filter argument
//! - [`fragment`]: a compiled page, as an ordered list of fragments
//! - [`operators`]: operator enums with their binding powers

mod expr;
mod fragment;
mod operators;

pub use expr::{ArrayElement, Expr, Literal, Property, TemplatePart};
pub use fragment::{BlockFragment, FilterCall, PageFragment, VariableFragment};
pub use operators::{BinaryOp, LogicalOp, UnaryOp};

#[cfg(test)]
mod tests;
