//! Primary expressions.

use stencil_ir::{ArrayElement, Expr, Property, TemplatePart};
use stencil_lexer::{split_template, unescape, QuoteStyle, TemplateSegment, TokenKind};

use super::Parser;
use crate::error::{ParseError, ParseErrorKind};

impl Parser<'_> {
    pub(super) fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.cursor.advance();
        let position = token.span.start as usize;

        match token.kind {
            TokenKind::Int(n) => Ok(Expr::int(n)),
            TokenKind::Double(n) => Ok(Expr::double(n)),
            TokenKind::Str(s) => Ok(Expr::string(s)),
            TokenKind::True => Ok(Expr::bool(true)),
            TokenKind::False => Ok(Expr::bool(false)),
            TokenKind::Null => Ok(Expr::null()),
            TokenKind::Template(raw) => parse_template(&raw, position + 1),
            TokenKind::Ident(name) => {
                if self.cursor.eat(&TokenKind::Arrow) {
                    let body = self.parse_expr()?;
                    return Ok(Expr::arrow(vec![name], body));
                }
                Ok(Expr::Identifier(name))
            }
            TokenKind::LParen => {
                if let Some(params) = self.try_arrow_params() {
                    let body = self.parse_expr()?;
                    return Ok(Expr::arrow(params, body));
                }
                self.cursor.enter_nested();
                let inner = self.parse_expr()?;
                self.cursor.expect_close(&TokenKind::RParen)?;
                self.cursor.exit_nested();
                Ok(inner)
            }
            TokenKind::LBracket => self.parse_array(),
            TokenKind::LBrace => self.parse_object(),
            other => Err(ParseError::unexpected(&other, position)),
        }
    }

    /// After a consumed `(`: `a, b) =>` commits and returns the parameter
    /// names; anything else rewinds and returns `None`.
    fn try_arrow_params(&mut self) -> Option<Vec<String>> {
        let mut ahead = self.cursor.clone();
        let mut params = Vec::new();
        if !ahead.eat(&TokenKind::RParen) {
            loop {
                let TokenKind::Ident(name) = ahead.advance().kind else {
                    return None;
                };
                params.push(name);
                if ahead.eat(&TokenKind::Comma) {
                    continue;
                }
                if ahead.eat(&TokenKind::RParen) {
                    break;
                }
                return None;
            }
        }
        if !ahead.eat(&TokenKind::Arrow) {
            return None;
        }
        self.cursor = ahead;
        Some(params)
    }

    fn parse_array(&mut self) -> Result<Expr, ParseError> {
        self.cursor.enter_nested();
        let mut elements = Vec::new();
        while !self.cursor.check(&TokenKind::RBracket) {
            if self.cursor.eat(&TokenKind::Ellipsis) {
                elements.push(ArrayElement::Spread(self.parse_expr()?));
            } else {
                elements.push(ArrayElement::Item(self.parse_expr()?));
            }
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect_close(&TokenKind::RBracket)?;
        self.cursor.exit_nested();
        Ok(Expr::Array(elements))
    }

    fn parse_object(&mut self) -> Result<Expr, ParseError> {
        self.cursor.enter_nested();
        let mut props = Vec::new();
        while !self.cursor.check(&TokenKind::RBrace) {
            props.push(self.parse_property()?);
            if !self.cursor.eat(&TokenKind::Comma) {
                break;
            }
        }
        self.cursor.expect_close(&TokenKind::RBrace)?;
        self.cursor.exit_nested();
        Ok(Expr::Object(props))
    }

    fn parse_property(&mut self) -> Result<Property, ParseError> {
        if self.cursor.eat(&TokenKind::Ellipsis) {
            return Ok(Property {
                key: None,
                value: self.parse_expr()?,
                shorthand: false,
            });
        }

        let token = self.cursor.advance();
        let position = token.span.start as usize;
        let key = match token.kind {
            TokenKind::Ident(name) => {
                if matches!(
                    self.cursor.peek_kind(),
                    TokenKind::Comma | TokenKind::RBrace
                ) {
                    return Ok(Property {
                        key: Some(Expr::string(name.clone())),
                        value: Expr::Identifier(name),
                        shorthand: true,
                    });
                }
                Expr::string(name)
            }
            TokenKind::Str(s) => Expr::string(s),
            TokenKind::Int(n) => Expr::int(n),
            TokenKind::Double(n) => Expr::double(n),
            TokenKind::LBracket => {
                let key = self.parse_expr()?;
                self.cursor.expect_close(&TokenKind::RBracket)?;
                key
            }
            other => return Err(ParseError::unexpected(&other, position)),
        };

        if !self.cursor.eat(&TokenKind::Colon) {
            let token = self.cursor.peek().clone();
            return Err(ParseError::unexpected(&token.kind, token.span.start as usize));
        }
        Ok(Property {
            key: Some(key),
            value: self.parse_expr()?,
            shorthand: false,
        })
    }
}

/// Build a template literal from its raw body, which starts at page offset
/// `base`.
fn parse_template(raw: &str, base: usize) -> Result<Expr, ParseError> {
    let segments = split_template(raw).map_err(|hole| {
        ParseError::new(
            ParseErrorKind::UnclosedDelimiter,
            "Expected end of template literal expression '}'",
            base + hole.offset,
        )
    })?;

    let mut quasis = Vec::new();
    let mut exprs = Vec::new();
    for segment in segments {
        match segment {
            TemplateSegment::Text(text) => quasis.push(TemplatePart {
                text: unescape(text, QuoteStyle::Backtick),
                tail: false,
            }),
            TemplateSegment::Expr { offset, text } => {
                exprs.push(Parser::new(text, base + offset).parse_complete()?);
            }
        }
    }
    if let Some(last) = quasis.last_mut() {
        last.tail = true;
    }
    Ok(Expr::Template { quasis, exprs })
}
