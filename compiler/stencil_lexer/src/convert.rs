//! Token conversion
//!
//! Turns raw logos tokens into cooked `TokenKind`s: numbers are parsed,
//! quoted literals unescaped, keyword aliases folded onto operators.

use crate::escape::unescape;
use crate::raw_token::RawToken;
use crate::token::{LexErrorKind, QuoteStyle, TokenKind};

/// Strip the delimiters off a quoted slice. Handles multi-byte quotes.
fn quoted_body(slice: &str, style: QuoteStyle) -> &str {
    let q = style.delimiter();
    slice
        .strip_prefix(q)
        .and_then(|rest| rest.strip_suffix(q))
        .unwrap_or(slice)
}

pub(crate) fn convert_token(raw: RawToken, slice: &str) -> TokenKind {
    match raw {
        // Literals
        // Integers too large for i64 degrade to doubles.
        RawToken::Int => match slice.parse::<i64>() {
            Ok(n) => TokenKind::Int(n),
            Err(_) => parse_double(slice),
        },
        RawToken::Double => parse_double(slice),
        RawToken::SingleQuoted => cook(slice, QuoteStyle::Single),
        RawToken::DoubleQuoted => cook(slice, QuoteStyle::Double),
        RawToken::Prime => cook(slice, QuoteStyle::Prime),
        RawToken::Backtick => {
            TokenKind::Template(quoted_body(slice, QuoteStyle::Backtick).to_string())
        }
        RawToken::True => TokenKind::True,
        RawToken::False => TokenKind::False,
        RawToken::Null => TokenKind::Null,
        RawToken::Ident => TokenKind::Ident(slice.to_string()),

        // Word aliases
        RawToken::AndWord => TokenKind::AmpAmp,
        RawToken::OrWord => TokenKind::PipePipe,

        // Delimiters
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Ellipsis => TokenKind::Ellipsis,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Arrow => TokenKind::Arrow,

        // Operators
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::EqEqEq => TokenKind::EqEqEq,
        RawToken::NotEqEq => TokenKind::NotEqEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::Gt => TokenKind::Gt,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Shl => TokenKind::Shl,
        RawToken::Shr => TokenKind::Shr,
        RawToken::UShr => TokenKind::UShr,
        RawToken::Amp => TokenKind::Amp,
        RawToken::AmpAmp => TokenKind::AmpAmp,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::PipePipe => TokenKind::PipePipe,
        RawToken::PipeForward => TokenKind::PipeForward,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Bang => TokenKind::Bang,
        RawToken::QuestionQuestion => TokenKind::QuestionQuestion,
        RawToken::Question => TokenKind::Question,
        RawToken::Eq => TokenKind::Eq,
    }
}

fn parse_double(slice: &str) -> TokenKind {
    slice.parse::<f64>().map_or(
        TokenKind::Error(LexErrorKind::InvalidNumber),
        TokenKind::Double,
    )
}

fn cook(slice: &str, style: QuoteStyle) -> TokenKind {
    TokenKind::Str(unescape(quoted_body(slice, style), style))
}

/// Classify a slice logos could not match.
pub(crate) fn convert_error(slice: &str) -> TokenKind {
    let first = slice.chars().next().unwrap_or(' ');
    let kind = match QuoteStyle::from_delimiter(first) {
        Some(style) => LexErrorKind::UnterminatedString(style),
        None => LexErrorKind::InvalidCharacter(first),
    };
    TokenKind::Error(kind)
}
