//! Expression tokenizer for Stencil templates.
//!
//! Expressions live inside page text (`{{ ... }}`), so the lexer never sees a
//! whole file. [`TokenStream`] lexes lazily from a byte offset into the page
//! and stops wherever the parser stops pulling, which lets the page compiler
//! resume free-text scanning right after the last consumed token.
//!
//! Spans on emitted tokens are absolute page offsets.

mod convert;
mod escape;
mod raw_token;
mod template;
mod token;

use logos::Logos;
use stencil_ir::Span;

pub use escape::unescape;
pub use template::{split_template, TemplateSegment, UnclosedHole};
pub use token::{LexErrorKind, QuoteStyle, Token, TokenKind};

use convert::{convert_error, convert_token};
use raw_token::RawToken;

/// Lazy token stream over a slice of page source.
///
/// Cloning is cheap and gives a checkpoint the parser can rewind to.
#[derive(Clone)]
pub struct TokenStream<'src> {
    lexer: logos::Lexer<'src, RawToken>,
    source: &'src str,
    base: usize,
    peeked: Option<Token>,
}

impl<'src> TokenStream<'src> {
    /// Start lexing `source`, which begins at byte `base` of the page.
    pub fn new(source: &'src str, base: usize) -> Self {
        TokenStream {
            lexer: RawToken::lexer(source),
            source,
            base,
            peeked: None,
        }
    }

    /// The slice being lexed.
    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn base(&self) -> usize {
        self.base
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> &Token {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.lex_one(),
        };
        self.peeked.insert(token)
    }

    pub fn peek_kind(&mut self) -> &TokenKind {
        &self.peek().kind
    }

    pub fn next_token(&mut self) -> Token {
        match self.peeked.take() {
            Some(token) => token,
            None => self.lex_one(),
        }
    }

    /// Relative offset just past the last consumed token.
    ///
    /// A peeked but unconsumed token does not count: after the parser stops
    /// at `|` or `}`, this is where free-text scanning resumes.
    pub fn position(&self) -> usize {
        match &self.peeked {
            Some(token) => self.relative(token.span.start),
            None => self.lexer.span().end,
        }
    }

    /// Unlexed rest of the input after the last consumed token.
    pub fn remainder(&self) -> &'src str {
        &self.source[self.position()..]
    }

    fn relative(&self, absolute: u32) -> usize {
        (absolute as usize).saturating_sub(self.base)
    }

    fn absolute(&self, range: std::ops::Range<usize>) -> Span {
        Span::from_range(range.start + self.base..range.end + self.base)
    }

    fn lex_one(&mut self) -> Token {
        match self.lexer.next() {
            Some(Ok(raw)) => {
                let kind = convert_token(raw, self.lexer.slice());
                Token::new(kind, self.absolute(self.lexer.span()))
            }
            Some(Err(())) => {
                let kind = convert_error(self.lexer.slice());
                // An unterminated string swallows the rest of the input.
                if matches!(kind, TokenKind::Error(LexErrorKind::UnterminatedString(_))) {
                    let rest = self.lexer.remainder().len();
                    self.lexer.bump(rest);
                }
                Token::new(kind, self.absolute(self.lexer.span()))
            }
            None => {
                let end = self.source.len();
                Token::new(TokenKind::Eof, self.absolute(end..end))
            }
        }
    }
}

/// Lex a whole expression source, ending with `Eof`.
pub fn lex_all(source: &str) -> Vec<Token> {
    let mut stream = TokenStream::new(source, 0);
    let mut tokens = Vec::new();
    loop {
        let token = stream.next_token();
        let done = token.kind.is_eof();
        tokens.push(token);
        if done {
            return tokens;
        }
    }
}
