//! Page front matter.
//!
//! A page may open with a metadata block of `key: value` lines, either in an
//! HTML comment or between `---` fences:
//!
//! ```text
//! <!--
//! title: Home
//! layout: alt-layout
//! -->
//! ```

use crate::{ParseError, ParseErrorKind};

/// Parsed front matter plus where the page body starts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrontMatter {
    /// Arguments in declaration order.
    pub args: Vec<(String, String)>,
    /// Byte offset of the body after the block (and one newline).
    pub body_start: usize,
}

impl FrontMatter {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.args
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Split off front matter, if the page has any.
pub fn parse_front_matter(text: &str) -> Result<FrontMatter, ParseError> {
    let (open, close) = if text.starts_with("<!--") {
        ("<!--", "-->")
    } else if text.starts_with("---\n") || text.starts_with("---\r\n") {
        ("---", "\n---")
    } else {
        return Ok(FrontMatter::default());
    };

    let inner_start = open.len();
    let Some(inner_len) = text[inner_start..].find(close) else {
        return Err(ParseError::new(
            ParseErrorKind::FrontMatter,
            format!("Front matter opened with '{open}' is never closed with '{}'", close.trim()),
            0,
        ));
    };
    let inner = &text[inner_start..inner_start + inner_len];
    let mut body_start = inner_start + inner_len + close.len();
    let rest = &text[body_start..];
    if rest.starts_with("\r\n") {
        body_start += 2;
    } else if rest.starts_with('\n') {
        body_start += 1;
    }

    let args = inner
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(':') {
            Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
            None => (line.to_string(), String::new()),
        })
        .collect();

    Ok(FrontMatter { args, body_start })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn html_comment_block() {
        let text = "<!--\ntitle: Home Page\nlayout: alt\n-->\n<h1>{{ title }}</h1>";
        let fm = parse_front_matter(text).unwrap();
        assert_eq!(
            fm.args,
            vec![
                ("title".to_string(), "Home Page".to_string()),
                ("layout".to_string(), "alt".to_string()),
            ]
        );
        assert_eq!(&text[fm.body_start..], "<h1>{{ title }}</h1>");
        assert_eq!(fm.get("layout"), Some("alt"));
    }

    #[test]
    fn dashed_block_and_values_with_colons() {
        let text = "---\nurl: http://example.org\n---\nbody";
        let fm = parse_front_matter(text).unwrap();
        assert_eq!(fm.get("url"), Some("http://example.org"));
        assert_eq!(&text[fm.body_start..], "body");
    }

    #[test]
    fn no_front_matter() {
        let fm = parse_front_matter("<p>hi</p>").unwrap();
        assert!(fm.args.is_empty());
        assert_eq!(fm.body_start, 0);
    }

    #[test]
    fn unclosed_block_is_an_error() {
        let err = parse_front_matter("<!--\ntitle: x\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::FrontMatter);
    }
}
