//! Cooked tokens handed to the parser.

use std::fmt;

use stencil_ir::Span;

/// Quoting style of a string literal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum QuoteStyle {
    Single,
    Double,
    /// Backtick: a template literal with `${ }` holes.
    Backtick,
    /// `′…′`: only the quote itself may be escaped.
    Prime,
}

impl QuoteStyle {
    pub const fn delimiter(self) -> char {
        match self {
            QuoteStyle::Single => '\'',
            QuoteStyle::Double => '"',
            QuoteStyle::Backtick => '`',
            QuoteStyle::Prime => '′',
        }
    }

    pub fn from_delimiter(c: char) -> Option<Self> {
        match c {
            '\'' => Some(QuoteStyle::Single),
            '"' => Some(QuoteStyle::Double),
            '`' => Some(QuoteStyle::Backtick),
            '′' => Some(QuoteStyle::Prime),
            _ => None,
        }
    }
}

/// Why a stretch of input failed to lex.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LexErrorKind {
    UnterminatedString(QuoteStyle),
    InvalidNumber,
    InvalidCharacter(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexErrorKind::UnterminatedString(style) => {
                write!(f, "Unterminated string literal, expected closing {}", style.delimiter())
            }
            LexErrorKind::InvalidNumber => write!(f, "Invalid number literal"),
            LexErrorKind::InvalidCharacter(c) => write!(f, "Invalid character '{c}'"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Literals
    Int(i64),
    Double(f64),
    /// Cooked string contents.
    Str(String),
    /// Raw body of a backtick literal, escapes and `${ }` holes untouched.
    Template(String),
    True,
    False,
    Null,
    Ident(String),

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Ellipsis,
    Colon,
    Arrow,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    EqEqEq,
    NotEqEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Shl,
    Shr,
    UShr,
    Amp,
    AmpAmp,
    Pipe,
    PipePipe,
    PipeForward,
    Caret,
    Tilde,
    Bang,
    QuestionQuestion,
    Question,
    Eq,

    Error(LexErrorKind),
    Eof,
}

impl TokenKind {
    /// Short human description for "unexpected token" messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Int(n) => n.to_string(),
            TokenKind::Double(n) => n.to_string(),
            TokenKind::Str(s) => format!("'{s}'"),
            TokenKind::Template(s) => format!("`{s}`"),
            TokenKind::True => "true".into(),
            TokenKind::False => "false".into(),
            TokenKind::Null => "null".into(),
            TokenKind::Ident(name) => name.clone(),
            TokenKind::Error(kind) => kind.to_string(),
            TokenKind::Eof => "end of expression".into(),
            other => other.symbol().unwrap_or("?").to_string(),
        }
    }

    /// Fixed spelling of punctuation and operator tokens.
    pub fn symbol(&self) -> Option<&'static str> {
        Some(match self {
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::Ellipsis => "...",
            TokenKind::Colon => ":",
            TokenKind::Arrow => "=>",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::EqEqEq => "===",
            TokenKind::NotEqEq => "!==",
            TokenKind::Lt => "<",
            TokenKind::LtEq => "<=",
            TokenKind::Gt => ">",
            TokenKind::GtEq => ">=",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::UShr => ">>>",
            TokenKind::Amp => "&",
            TokenKind::AmpAmp => "&&",
            TokenKind::Pipe => "|",
            TokenKind::PipePipe => "||",
            TokenKind::PipeForward => "|>",
            TokenKind::Caret => "^",
            TokenKind::Tilde => "~",
            TokenKind::Bang => "!",
            TokenKind::QuestionQuestion => "??",
            TokenKind::Question => "?",
            TokenKind::Eq => "=",
            _ => return None,
        })
    }

    pub fn is_eof(&self) -> bool {
        matches!(self, TokenKind::Eof)
    }

    /// `|` or `|>`: separates filters inside a variable fragment.
    pub fn is_filter_separator(&self) -> bool {
        matches!(self, TokenKind::Pipe | TokenKind::PipeForward)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Absolute byte span in the page source.
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}
