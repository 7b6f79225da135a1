//! Byte-level scanning helpers for the page compiler.

use super::CompileOptions;

/// End of a name (`[A-Za-z_$][A-Za-z0-9_$]*`) starting at `start`; `start`
/// itself when no name starts there.
pub(super) fn read_name(text: &str, start: usize) -> usize {
    let bytes = &text.as_bytes()[start.min(text.len())..];
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' || *b == b'$' => {}
        _ => return start,
    }
    let len = bytes
        .iter()
        .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_' || **b == b'$')
        .count();
    start + len
}

pub(super) fn skip_whitespace(text: &str, start: usize) -> usize {
    let len = text.as_bytes()[start.min(text.len())..]
        .iter()
        .take_while(|b| b.is_ascii_whitespace())
        .count();
    start + len
}

/// Length of a leading `\n` or `\r\n`, else 0.
pub(super) fn newline_len(text: &str) -> usize {
    if text.starts_with("\r\n") {
        2
    } else if text.starts_with('\n') {
        1
    } else {
        0
    }
}

/// `{{else}}` or `{{else …}}`, given the offset just after `{{`.
fn is_else_tag(text: &str, after_open: usize) -> bool {
    let rest = &text[after_open..];
    rest.starts_with("else")
        && rest
            .as_bytes()
            .get(4)
            .is_some_and(|b| b.is_ascii_whitespace() || *b == b'}')
}

pub(super) enum BodyEnd {
    /// Offset of the `{{else…}}` or `{{/name}}` that ends the body.
    Found(usize),
    Unclosed,
    /// A nested `{{#…` at this offset has no `}}`.
    UnterminatedTag(usize),
}

/// Find where the body of block `name` starting at `start` ends, skipping
/// nested blocks, comments and verbatim bodies.
pub(super) fn find_body_end(
    text: &str,
    start: usize,
    name: &str,
    options: &CompileOptions,
) -> BodyEnd {
    let mut depth = 0usize;
    let mut i = start;

    loop {
        let Some(found) = text[i..].find("{{") else {
            return BodyEnd::Unclosed;
        };
        let pos = i + found;

        match text.as_bytes().get(pos + 2) {
            Some(b'*') => match text[pos + 3..].find("*}}") {
                Some(end) => i = pos + 3 + end + 3,
                None => return BodyEnd::Unclosed,
            },
            Some(b'#') => {
                let name_end = read_name(text, pos + 3);
                let Some(tag_len) = text[name_end..].find("}}") else {
                    return BodyEnd::UnterminatedTag(pos);
                };
                let tag_end = name_end + tag_len + 2;
                let inner = &text[pos + 3..name_end];
                if options.is_verbatim(inner) {
                    let close = format!("{{{{/{inner}}}}}");
                    match text[tag_end..].find(&close) {
                        Some(at) => i = tag_end + at + close.len(),
                        None => return BodyEnd::Unclosed,
                    }
                } else {
                    depth += 1;
                    i = tag_end;
                }
            }
            Some(b'/') => {
                if depth == 0 {
                    let name_end = read_name(text, pos + 3);
                    return if &text[pos + 3..name_end] == name {
                        BodyEnd::Found(pos)
                    } else {
                        BodyEnd::Unclosed
                    };
                }
                depth -= 1;
                i = pos + 2;
            }
            _ if depth == 0 && is_else_tag(text, pos + 2) => return BodyEnd::Found(pos),
            _ => i = pos + 2,
        }
    }
}

/// Free-text filter argument starting at `start`: runs to a top-level `|`,
/// a newline or the closing `}}`. Returns the trimmed text and the offset of
/// the stop character, or `None` if the input ends first.
pub(super) fn split_clean_argument(text: &str, start: usize) -> Option<(&str, usize)> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = start;

    while i < bytes.len() {
        match bytes[i] {
            b'\n' => break,
            b'|' if depth == 0 => break,
            b'{' => depth += 1,
            b'}' if depth == 0 && bytes.get(i + 1) == Some(&b'}') => break,
            b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }

    if i >= bytes.len() {
        return None;
    }
    Some((text[start..i].trim(), i))
}
