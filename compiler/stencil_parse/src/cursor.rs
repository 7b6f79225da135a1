//! Token cursor over a lazily lexed stream.

use stencil_lexer::{Token, TokenKind, TokenStream};

use crate::ParseError;

/// Navigation over a [`TokenStream`], plus the bracket nesting the grammar
/// needs to tell a filter separator from bitwise-or.
#[derive(Clone)]
pub(crate) struct Cursor<'src> {
    stream: TokenStream<'src>,
    nesting: u32,
    filter_mode: bool,
}

impl<'src> Cursor<'src> {
    pub(crate) fn new(source: &'src str, base: usize, filter_mode: bool) -> Self {
        Cursor {
            stream: TokenStream::new(source, base),
            nesting: 0,
            filter_mode,
        }
    }

    #[inline]
    pub(crate) fn peek(&mut self) -> &Token {
        self.stream.peek()
    }

    #[inline]
    pub(crate) fn peek_kind(&mut self) -> &TokenKind {
        self.stream.peek_kind()
    }

    /// Absolute start of the next token.
    #[inline]
    pub(crate) fn peek_position(&mut self) -> usize {
        self.peek().span.start as usize
    }

    #[inline]
    pub(crate) fn check(&mut self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    /// Next token is the identifier `word`.
    pub(crate) fn check_word(&mut self, word: &str) -> bool {
        matches!(self.peek_kind(), TokenKind::Ident(name) if name == word)
    }

    #[inline]
    pub(crate) fn advance(&mut self) -> Token {
        self.stream.next_token()
    }

    /// Consume the next token if it matches.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a closing delimiter or fail naming it.
    pub(crate) fn expect_close(&mut self, kind: &TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        let token = self.peek().clone();
        Err(ParseError::unclosed(
            kind.symbol().unwrap_or("?"),
            &token.kind,
            token.span.start as usize,
        ))
    }

    /// Consume an identifier and return its name.
    pub(crate) fn expect_ident(&mut self) -> Result<String, ParseError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Ident(name) => Ok(name),
            other => Err(ParseError::unexpected(&other, token.span.start as usize)),
        }
    }

    /// Relative offset just past the last consumed token.
    pub(crate) fn position(&self) -> usize {
        self.stream.position()
    }

    pub(crate) fn base(&self) -> usize {
        self.stream.base()
    }

    pub(crate) fn enter_nested(&mut self) {
        self.nesting += 1;
    }

    pub(crate) fn exit_nested(&mut self) {
        self.nesting = self.nesting.saturating_sub(1);
    }

    /// `|` separates filters here instead of meaning bitwise-or.
    pub(crate) fn pipe_is_separator(&self) -> bool {
        self.filter_mode && self.nesting == 0
    }
}
