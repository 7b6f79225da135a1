//! Raw tokens recognized by logos, before literal cooking.

use logos::Logos;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub(crate) enum RawToken {
    // === Literals ===
    #[regex(r"[0-9]+")]
    Int,

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+")]
    Double,

    #[regex(r"'([^'\\]|\\.)*'")]
    SingleQuoted,

    #[regex(r#""([^"\\]|\\.)*""#)]
    DoubleQuoted,

    #[regex(r"`([^`\\]|\\.)*`")]
    Backtick,

    #[regex(r"′([^′\\]|\\.)*′")]
    Prime,

    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // `and` / `or` only alias the logical operators when followed by
    // whitespace; `and(x)` and `android` stay identifiers.
    #[regex(r"and[ \t\r\n]")]
    AndWord,
    #[regex(r"or[ \t\r\n]")]
    OrWord,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    // === Delimiters ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("...")]
    Ellipsis,
    #[token(":")]
    Colon,
    #[token("=>")]
    Arrow,

    // === Operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("===")]
    EqEqEq,
    #[token("!==")]
    NotEqEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    LtEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token(">>>")]
    UShr,
    #[token("&")]
    Amp,
    #[token("&&")]
    AmpAmp,
    #[token("|")]
    Pipe,
    #[token("||")]
    PipePipe,
    #[token("|>")]
    PipeForward,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("!")]
    Bang,
    #[token("??")]
    QuestionQuestion,
    #[token("?")]
    Question,
    #[token("=")]
    Eq,
}
