//! Argument grammars of the built-in blocks.
//!
//! Block tags keep their argument as raw text; handlers parse it with these
//! helpers. Positions in the returned errors are relative to the argument.

use stencil_ir::Expr;

use crate::{ParseError, ParseErrorKind, Parser};

/// `each [x in] source [where e] [orderBy e [descending]] [skip n] [take n]`
#[derive(Clone, Debug, PartialEq)]
pub struct EachArgs {
    pub binding: Option<String>,
    pub source: Expr,
    pub filter: Option<Expr>,
    pub order_by: Option<Expr>,
    pub descending: bool,
    pub skip: Option<Expr>,
    pub take: Option<Expr>,
}

pub fn parse_each_args(argument: &str) -> Result<EachArgs, ParseError> {
    let mut parser = Parser::new(argument, 0);

    let binding = parser.peek_ident_then_word("in");
    if binding.is_some() {
        parser.expect_ident()?;
        parser.expect_ident()?;
    }
    let source = parser.parse_expr()?;

    let filter = clause(&mut parser, "where")?;
    let order_by = clause(&mut parser, "orderBy")?;
    let descending = order_by.is_some() && parser.eat_word("descending");
    let skip = clause(&mut parser, "skip")?;
    let take = clause(&mut parser, "take")?;
    parser.expect_end()?;

    Ok(EachArgs {
        binding,
        source,
        filter,
        order_by,
        descending,
        skip,
        take,
    })
}

fn clause(parser: &mut Parser<'_>, keyword: &str) -> Result<Option<Expr>, ParseError> {
    if parser.eat_word(keyword) {
        parser.parse_expr().map(Some)
    } else {
        Ok(None)
    }
}

/// `capture [appendTo] name [args]`
#[derive(Clone, Debug, PartialEq)]
pub struct CaptureArgs {
    pub name: String,
    pub append: bool,
    pub args: Option<Expr>,
}

pub fn parse_capture_args(argument: &str) -> Result<CaptureArgs, ParseError> {
    let mut parser = Parser::new(argument, 0);
    let append = parser.peek_ident_then_any("appendTo");
    if append {
        parser.expect_ident()?;
    }
    let name = parser.expect_ident()?;
    let args = optional_rest(&mut parser)?;
    Ok(CaptureArgs { name, append, args })
}

/// `partial name [args]`
#[derive(Clone, Debug, PartialEq)]
pub struct PartialArgs {
    pub name: String,
    pub args: Option<Expr>,
}

pub fn parse_partial_args(argument: &str) -> Result<PartialArgs, ParseError> {
    let mut parser = Parser::new(argument, 0);
    let name = parser.expect_ident()?;
    let args = optional_rest(&mut parser)?;
    Ok(PartialArgs { name, args })
}

/// An optional single expression (`eval`, `evalSafe`).
pub fn parse_optional_expr(argument: &str) -> Result<Option<Expr>, ParseError> {
    let mut parser = Parser::new(argument, 0);
    optional_rest(&mut parser)
}

/// A required single expression (`if`, `with`).
pub fn parse_required_expr(block: &str, argument: &str) -> Result<Expr, ParseError> {
    if argument.trim().is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::ExpectedExpression,
            format!("'{block}' block requires an expression"),
            0,
        ));
    }
    Parser::new(argument, 0).parse_complete()
}

/// Argument of an `{{else …}}` branch: empty, or `if <expr>`.
pub fn parse_else_condition(argument: &str) -> Result<Option<Expr>, ParseError> {
    let trimmed = argument.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let rest = trimmed
        .strip_prefix("if")
        .filter(|rest| rest.is_empty() || rest.starts_with(|c: char| c.is_whitespace() || c == '('));
    let Some(rest) = rest else {
        return Err(ParseError::new(
            ParseErrorKind::UnexpectedToken,
            format!("Expected 'else' or 'else if' but found 'else {trimmed}'"),
            0,
        ));
    };
    parse_required_expr("else if", rest).map(Some)
}

fn optional_rest(parser: &mut Parser<'_>) -> Result<Option<Expr>, ParseError> {
    if parser.at_end() {
        return Ok(None);
    }
    let expr = parser.parse_expr()?;
    parser.expect_end()?;
    Ok(Some(expr))
}
