//! Splitting backtick literals into text and `${ }` holes.

/// One piece of a template literal body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateSegment<'a> {
    /// Literal text, escapes still raw.
    Text(&'a str),
    /// Source of an embedded expression and its byte offset within the body.
    Expr { offset: usize, text: &'a str },
}

/// Error when a `${` hole never closes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnclosedHole {
    pub offset: usize,
}

/// Split a raw template body into alternating text and expression segments.
///
/// The result always starts and ends with a `Text` segment (possibly empty),
/// so `n` holes produce `2n + 1` segments. `\${` is not a hole. Braces inside
/// nested quotes do not count towards the hole's depth.
pub fn split_template(body: &str) -> Result<Vec<TemplateSegment<'_>>, UnclosedHole> {
    let bytes = body.as_bytes();
    let mut segments = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                segments.push(TemplateSegment::Text(&body[text_start..i]));
                let expr_start = i + 2;
                let close = find_hole_end(bytes, expr_start).ok_or(UnclosedHole { offset: i })?;
                segments.push(TemplateSegment::Expr {
                    offset: expr_start,
                    text: &body[expr_start..close],
                });
                i = close + 1;
                text_start = i;
            }
            _ => i += 1,
        }
    }

    segments.push(TemplateSegment::Text(&body[text_start.min(body.len())..]));
    Ok(segments)
}

fn find_hole_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut i = start;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
        } else {
            match b {
                b'\'' | b'"' | b'`' => quote = Some(b),
                b'{' => depth += 1,
                b'}' if depth == 0 => return Some(i),
                b'}' => depth -= 1,
                _ => {}
            }
        }
        i += 1;
    }
    None
}
