//! Output formats.

use std::borrow::Cow;

use crate::Value;

/// How variable output is written.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PageFormat {
    /// Strings are HTML-encoded unless raw.
    #[default]
    Html,
    /// Strings are written as is.
    Text,
}

impl PageFormat {
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            "html" | "htm" => PageFormat::Html,
            _ => PageFormat::Text,
        }
    }

    /// Append `value`'s output text.
    pub fn write(self, value: &Value, out: &mut String) {
        match value {
            Value::Undefined | Value::Null => {}
            Value::Raw(text) => out.push_str(text),
            Value::Str(text) => out.push_str(&self.encode(text)),
            other => out.push_str(&self.encode(&other.to_display_string())),
        }
    }

    pub fn encode(self, text: &str) -> Cow<'_, str> {
        match self {
            PageFormat::Html => html_encode(text),
            PageFormat::Text => Cow::Borrowed(text),
        }
    }
}

/// Escape `& < > " '`.
pub fn html_encode(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
