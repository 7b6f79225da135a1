//! Parse errors.
//!
//! Every syntax failure, whether in an expression or in the page structure,
//! surfaces as a [`ParseError`] carrying the absolute byte position of the
//! construct that failed. Errors are raised eagerly while compiling; nothing
//! is deferred to render time.

use stencil_diagnostic::{Diagnostic, ErrorCode};
use stencil_ir::Span;
use stencil_lexer::{LexErrorKind, TokenKind};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    Lex(LexErrorKind),
    UnexpectedToken,
    ExpectedExpression,
    UnclosedDelimiter,
    /// `{{#name}}` without a matching `{{/name}}`.
    UnclosedBlock,
    /// `{{` or `{{#name` without its closing `}}`.
    UnterminatedTag,
    ExpectedFilterSeparator,
    FrontMatter,
}

impl ParseErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            ParseErrorKind::Lex(LexErrorKind::UnterminatedString(_)) => ErrorCode::E0001,
            ParseErrorKind::Lex(LexErrorKind::InvalidCharacter(_)) => ErrorCode::E0002,
            ParseErrorKind::Lex(LexErrorKind::InvalidNumber) => ErrorCode::E0003,
            ParseErrorKind::UnexpectedToken => ErrorCode::E1001,
            ParseErrorKind::ExpectedExpression => ErrorCode::E1002,
            ParseErrorKind::UnclosedDelimiter => ErrorCode::E1003,
            ParseErrorKind::UnclosedBlock => ErrorCode::E1004,
            ParseErrorKind::UnterminatedTag => ErrorCode::E1005,
            ParseErrorKind::ExpectedFilterSeparator => ErrorCode::E1006,
            ParseErrorKind::FrontMatter => ErrorCode::E1007,
        }
    }
}

/// A syntax error in an expression or page.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Absolute byte offset in the page source.
    pub position: usize,
}

impl ParseError {
    #[cold]
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, position: usize) -> Self {
        ParseError {
            kind,
            message: message.into(),
            position,
        }
    }

    #[cold]
    pub fn unexpected(found: &TokenKind, position: usize) -> Self {
        if let TokenKind::Error(lex) = found {
            return ParseError::new(ParseErrorKind::Lex(lex.clone()), lex.to_string(), position);
        }
        if found.is_eof() {
            return ParseError::expected_expression(position);
        }
        ParseError::new(
            ParseErrorKind::UnexpectedToken,
            format!("Unexpected '{found}'"),
            position,
        )
    }

    #[cold]
    pub fn expected_expression(position: usize) -> Self {
        ParseError::new(
            ParseErrorKind::ExpectedExpression,
            "Expected expression but reached the end of input",
            position,
        )
    }

    #[cold]
    pub fn unclosed(delimiter: &str, found: &TokenKind, position: usize) -> Self {
        if let TokenKind::Error(lex) = found {
            return ParseError::new(ParseErrorKind::Lex(lex.clone()), lex.to_string(), position);
        }
        ParseError::new(
            ParseErrorKind::UnclosedDelimiter,
            format!("Expected '{delimiter}' but found '{found}'"),
            position,
        )
    }

    #[cold]
    pub fn unclosed_block(name: &str, position: usize) -> Self {
        ParseError::new(
            ParseErrorKind::UnclosedBlock,
            format!("End block for '{name}' not found."),
            position,
        )
    }

    #[cold]
    pub fn unterminated_block_tag(name: &str, position: usize) -> Self {
        ParseError::new(
            ParseErrorKind::UnterminatedTag,
            format!("Unterminated '{name}' block expression"),
            position,
        )
    }

    #[cold]
    pub fn unterminated_filter(position: usize) -> Self {
        ParseError::new(
            ParseErrorKind::UnterminatedTag,
            "Unterminated filter expression",
            position,
        )
    }

    #[cold]
    pub fn expected_filter_separator(found: char, position: usize) -> Self {
        ParseError::new(
            ParseErrorKind::ExpectedFilterSeparator,
            format!("Expected filter separator '|' but was '{found}'"),
            position,
        )
    }

    /// Move the position by `offset`, for errors from a nested parse.
    #[must_use]
    pub fn shifted(mut self, offset: usize) -> Self {
        self.position += offset;
        self
    }

    /// Convert to a diagnostic pointing at the failing position.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let start = u32::try_from(self.position).unwrap_or(u32::MAX);
        let label = match &self.kind {
            ParseErrorKind::UnclosedBlock => "block opened here",
            ParseErrorKind::Lex(LexErrorKind::UnterminatedString(_)) => "string starts here",
            ParseErrorKind::ExpectedFilterSeparator => "expected `|` here",
            _ => "here",
        };
        let diagnostic = Diagnostic::error(self.kind.code())
            .with_message(self.message.clone())
            .with_label(Span::new(start, start.saturating_add(1)), label);
        match &self.kind {
            ParseErrorKind::UnclosedBlock => {
                diagnostic.with_note("blocks are closed with {{/name}}")
            }
            ParseErrorKind::ExpectedFilterSeparator => {
                diagnostic.with_suggestion("separate filters with `|`, or wrap the expression in parentheses")
            }
            _ => diagnostic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_lexer::QuoteStyle;

    #[test]
    fn block_messages() {
        assert_eq!(
            ParseError::unclosed_block("if", 0).to_string(),
            "End block for 'if' not found."
        );
        assert_eq!(
            ParseError::unterminated_block_tag("each", 3).to_string(),
            "Unterminated 'each' block expression"
        );
    }

    #[test]
    fn lex_errors_keep_their_code() {
        let err = ParseError::unexpected(
            &TokenKind::Error(LexErrorKind::UnterminatedString(QuoteStyle::Single)),
            4,
        );
        assert_eq!(err.kind.code(), ErrorCode::E0001);
        assert!(err.message.starts_with("Unterminated string literal"));
    }

    #[test]
    fn eof_means_missing_expression() {
        let err = ParseError::unexpected(&TokenKind::Eof, 9);
        assert_eq!(err.kind, ParseErrorKind::ExpectedExpression);
    }

    #[test]
    fn diagnostics_carry_position() {
        let diag = ParseError::unclosed_block("each", 12).to_diagnostic();
        assert_eq!(diag.code, ErrorCode::E1004);
        assert_eq!(diag.primary_span(), Some(Span::new(12, 13)));
        assert_eq!(diag.notes.len(), 1);
    }

    #[test]
    fn shifting_moves_position() {
        let err = ParseError::expected_expression(2).shifted(10);
        assert_eq!(err.position, 12);
    }
}
