//! Parser for Stencil templates.
//!
//! Two layers:
//! - the expression parser ([`parse_expression`], [`Parser`]): a JS-like
//!   expression grammar over `stencil_lexer` tokens, producing
//!   [`stencil_ir::Expr`]
//! - the page compiler ([`compile_page`], [`PageCompiler`]): splits page text
//!   into text, variable and block fragments, using the expression parser for
//!   every `{{ }}` span
//!
//! Front matter and the built-in blocks' argument grammars live here too, so
//! every syntax error in a page is a [`ParseError`] from this crate.

pub mod block_args;
mod cursor;
mod error;
mod fragment;
mod front_matter;
mod grammar;

use stencil_ir::{Expr, PageFragment};
use tracing::instrument;

pub use error::{ParseError, ParseErrorKind};
pub use fragment::{CompileOptions, PageCompiler};
pub use front_matter::{parse_front_matter, FrontMatter};
pub use grammar::Parser;

/// Parse a standalone expression. The whole input must be consumed.
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    Parser::new(source, 0).parse_complete()
}

/// Compile page text with the default options (`raw` is verbatim, no
/// newline elision).
pub fn compile_page(text: &str) -> Result<Vec<PageFragment>, ParseError> {
    compile_page_with(text, &CompileOptions::default())
}

#[instrument(level = "debug", skip_all, fields(len = text.len()))]
pub fn compile_page_with(
    text: &str,
    options: &CompileOptions,
) -> Result<Vec<PageFragment>, ParseError> {
    PageCompiler::new(options).compile(text, 0)
}

#[cfg(test)]
mod tests;
