//! Error codes for template diagnostics.

use std::fmt;

/// Error codes.
///
/// Format: E#### where the first digit is the phase:
/// - E0xxx: expression lexing
/// - E1xxx: expression and page syntax
/// - E6xxx: rendering
/// - E9xxx: internal
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Unterminated string or template literal
    E0001,
    /// Invalid character in expression
    E0002,
    /// Invalid number literal
    E0003,

    /// Unexpected token
    E1001,
    /// Expected expression
    E1002,
    /// Unclosed delimiter
    E1003,
    /// Block has no matching close tag
    E1004,
    /// Unterminated `{{ }}` tag or block tag
    E1005,
    /// Missing `|` between filters
    E1006,
    /// Malformed front matter
    E1007,

    /// Member or index access on an incompatible value
    E6001,
    /// Unknown filter
    E6002,
    /// Filter raised an error
    E6003,
    /// Error thrown by template code
    E6004,
    /// Partial, eval or template nesting too deep
    E6005,
    /// Page or partial not found
    E6006,
    /// Render cancelled
    E6007,

    /// Internal error
    E9001,
}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E0003,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E1007,
        ErrorCode::E6001,
        ErrorCode::E6002,
        ErrorCode::E6003,
        ErrorCode::E6004,
        ErrorCode::E6005,
        ErrorCode::E6006,
        ErrorCode::E6007,
        ErrorCode::E9001,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E6001 => "E6001",
            ErrorCode::E6002 => "E6002",
            ErrorCode::E6003 => "E6003",
            ErrorCode::E6004 => "E6004",
            ErrorCode::E6005 => "E6005",
            ErrorCode::E6006 => "E6006",
            ErrorCode::E6007 => "E6007",
            ErrorCode::E9001 => "E9001",
        }
    }

    /// One-line description, shown by `stencil help <code>`.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "unterminated string literal",
            ErrorCode::E0002 => "invalid character in expression",
            ErrorCode::E0003 => "invalid number literal",
            ErrorCode::E1001 => "unexpected token",
            ErrorCode::E1002 => "expected expression",
            ErrorCode::E1003 => "unclosed delimiter",
            ErrorCode::E1004 => "block is never closed",
            ErrorCode::E1005 => "unterminated template tag",
            ErrorCode::E1006 => "expected filter separator",
            ErrorCode::E1007 => "malformed front matter",
            ErrorCode::E6001 => "member access on an incompatible value",
            ErrorCode::E6002 => "unknown filter",
            ErrorCode::E6003 => "filter failed",
            ErrorCode::E6004 => "error thrown by template",
            ErrorCode::E6005 => "nesting limit exceeded",
            ErrorCode::E6006 => "page not found",
            ErrorCode::E6007 => "render cancelled",
            ErrorCode::E9001 => "internal error",
        }
    }

    pub fn is_syntax_error(&self) -> bool {
        matches!(self.as_str().as_bytes().get(1), Some(b'0' | b'1'))
    }

    pub fn is_render_error(&self) -> bool {
        matches!(self.as_str().as_bytes().get(1), Some(b'6'))
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E1004"` (case-insensitive).
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_code_roundtrips_through_from_str() {
        for code in ErrorCode::ALL {
            assert_eq!(code.as_str().parse::<ErrorCode>(), Ok(*code));
        }
        assert_eq!("e6004".parse::<ErrorCode>(), Ok(ErrorCode::E6004));
        assert!("E4242".parse::<ErrorCode>().is_err());
    }

    #[test]
    fn phase_classification() {
        assert!(ErrorCode::E0001.is_syntax_error());
        assert!(ErrorCode::E1004.is_syntax_error());
        assert!(!ErrorCode::E6001.is_syntax_error());
        assert!(ErrorCode::E6003.is_render_error());
        assert!(!ErrorCode::E9001.is_render_error());
    }
}
