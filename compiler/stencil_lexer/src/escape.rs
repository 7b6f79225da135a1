//! Escape sequence cooking for quoted literals.
//!
//! Single, double and backtick literals recognize `\n`, `\r`, `\t`, `\0`,
//! `\\`, the quote characters, and `\$` inside templates. Unknown escapes
//! are kept literally (`\q` stays `\q`). Prime-quoted literals (`′…′`)
//! only strip the backslash in front of an escaped `′`.

use crate::token::QuoteStyle;

#[inline]
fn resolve_escape(c: char, style: QuoteStyle) -> Option<char> {
    match c {
        'n' => Some('\n'),
        'r' => Some('\r'),
        't' => Some('\t'),
        '0' => Some('\0'),
        '\\' => Some('\\'),
        '"' | '\'' | '`' => Some(c),
        '$' if style == QuoteStyle::Backtick => Some('$'),
        _ => None,
    }
}

/// Cook the body of a quoted literal (delimiters already removed).
pub fn unescape(content: &str, style: QuoteStyle) -> String {
    if !content.contains('\\') {
        return content.to_string();
    }
    if style == QuoteStyle::Prime {
        return unescape_prime(content);
    }

    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some(esc) => match resolve_escape(esc, style) {
                Some(resolved) => result.push(resolved),
                None => {
                    result.push('\\');
                    result.push(esc);
                }
            },
            None => result.push('\\'),
        }
    }
    result
}

fn unescape_prime(content: &str) -> String {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek() == Some(&'′') {
            continue;
        }
        result.push(c);
    }
    result
}
