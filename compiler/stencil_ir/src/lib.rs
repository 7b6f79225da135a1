//! Stencil IR - syntax tree types shared by the parser and the evaluator.
//!
//! This crate contains:
//! - [`Span`] for byte-offset source locations
//! - The expression AST ([`Expr`] and its operators)
//! - The page fragment tree ([`PageFragment`]) produced by the page compiler
//!
//! Both trees are closed enums with structural equality, so tests can assert
//! on parsed output directly and the evaluator's dispatch stays exhaustive.

pub mod ast;
mod span;

pub use ast::{
    ArrayElement, BinaryOp, BlockFragment, Expr, FilterCall, Literal, LogicalOp, PageFragment,
    Property, TemplatePart, UnaryOp, VariableFragment,
};
pub use span::{Span, SpanError};
