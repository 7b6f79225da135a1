//! Render-time errors.
//!
//! `EvalErrorKind` is the structured category; the factory functions below
//! are the public way to build errors and fill in both `kind` and `message`.
//! `frames` is the synthesized template stack (innermost first) captured when
//! the error crosses a fragment boundary.

use std::fmt;

use stencil_diagnostic::{Diagnostic, ErrorCode};
use stencil_parse::ParseError;
use stencil_stack::DepthExceeded;

/// Result of evaluation.
pub type EvalResult<T = crate::Value> = Result<T, EvalError>;

#[derive(Clone, Debug, PartialEq)]
pub enum EvalErrorKind {
    /// Member or index access on a value that does not support it.
    Binding,
    /// A filter name with no definition of a matching arity.
    FilterNotFound { name: String },
    /// A filter body failed.
    FilterInvocation { filter: String },
    /// Raised on purpose by the `throw` family; `type_name` is user-facing.
    Thrown { type_name: String },
    /// Bad argument passed to a filter.
    Argument,
    NotCallable,
    NestingTooDeep { limit: u32 },
    PageNotFound { path: String },
    Cancelled,
    Parse(ParseError),
    Custom,
}

/// An error raised while rendering.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub message: String,
    /// Template stack at the failure, innermost first.
    pub frames: Vec<String>,
}

impl EvalError {
    /// An error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_kind(EvalErrorKind::Custom, message)
    }

    fn from_kind(kind: EvalErrorKind, message: impl Into<String>) -> Self {
        EvalError {
            kind,
            message: message.into(),
            frames: Vec::new(),
        }
    }

    /// Attach the template stack, keeping an already captured one.
    #[must_use]
    pub fn with_frames(mut self, frames: Vec<String>) -> Self {
        if self.frames.is_empty() {
            self.frames = frames;
        }
        self
    }

    /// The error's type as shown to templates (`error.type`).
    pub fn type_name(&self) -> &str {
        match &self.kind {
            EvalErrorKind::Binding => "BindingError",
            EvalErrorKind::FilterNotFound { .. } => "FilterNotFound",
            EvalErrorKind::FilterInvocation { .. } => "FilterInvocationError",
            EvalErrorKind::Thrown { type_name } => type_name,
            EvalErrorKind::Argument => "ArgumentError",
            EvalErrorKind::NotCallable => "NotCallable",
            EvalErrorKind::NestingTooDeep { .. } => "NestingTooDeep",
            EvalErrorKind::PageNotFound { .. } => "PageNotFound",
            EvalErrorKind::Cancelled => "Cancelled",
            EvalErrorKind::Parse(_) => "ParseError",
            EvalErrorKind::Custom => "Error",
        }
    }

    pub fn is_thrown(&self) -> bool {
        matches!(self.kind, EvalErrorKind::Thrown { .. })
    }

    /// Frames rendered as `   at {frame}` lines.
    pub fn stack_trace(&self) -> String {
        format_stack_trace(&self.frames)
    }

    pub fn code(&self) -> ErrorCode {
        match &self.kind {
            EvalErrorKind::Binding | EvalErrorKind::NotCallable => ErrorCode::E6001,
            EvalErrorKind::FilterNotFound { .. } => ErrorCode::E6002,
            EvalErrorKind::FilterInvocation { .. } | EvalErrorKind::Argument => ErrorCode::E6003,
            EvalErrorKind::Thrown { .. } => ErrorCode::E6004,
            EvalErrorKind::NestingTooDeep { .. } => ErrorCode::E6005,
            EvalErrorKind::PageNotFound { .. } => ErrorCode::E6006,
            EvalErrorKind::Cancelled => ErrorCode::E6007,
            EvalErrorKind::Parse(err) => err.kind.code(),
            EvalErrorKind::Custom => ErrorCode::E9001,
        }
    }

    /// Render errors have no source span; the stack goes into notes.
    pub fn to_diagnostic(&self) -> Diagnostic {
        if let EvalErrorKind::Parse(err) = &self.kind {
            return err.to_diagnostic();
        }
        let mut diagnostic = Diagnostic::error(self.code()).with_message(self.message.clone());
        for frame in &self.frames {
            diagnostic = diagnostic.with_note(format!("at {frame}"));
        }
        diagnostic
    }
}

pub(crate) fn format_stack_trace(frames: &[String]) -> String {
    frames
        .iter()
        .map(|frame| format!("   at {frame}"))
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<ParseError> for EvalError {
    fn from(err: ParseError) -> Self {
        parse_error(err)
    }
}

impl From<DepthExceeded> for EvalError {
    fn from(err: DepthExceeded) -> Self {
        nesting_too_deep(err.limit)
    }
}

// Access

#[cold]
pub fn binding_error(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Binding, message)
}

#[cold]
pub fn no_property(type_name: &str, name: &str) -> EvalError {
    binding_error(format!("There is no property '{name}' on '{type_name}'"))
}

#[cold]
pub fn cannot_index(type_name: &str, index: &dyn fmt::Display) -> EvalError {
    binding_error(format!("Cannot index '{type_name}' with '{index}'"))
}

#[cold]
pub fn index_out_of_range(type_name: &str, index: i64, len: usize) -> EvalError {
    binding_error(format!(
        "Index {index} is out of range for '{type_name}' of length {len}"
    ))
}

#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::NotCallable,
        format!("'{type_name}' is not a function"),
    )
}

// Filters

#[cold]
pub fn filter_not_found(name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::FilterNotFound {
            name: name.to_string(),
        },
        format!("Filter named '{name}' was not found."),
    )
}

/// Wrap a filter failure when it escapes the page.
#[cold]
pub fn filter_invocation(filter: &str, cause: &EvalError) -> EvalError {
    EvalError {
        kind: EvalErrorKind::FilterInvocation {
            filter: filter.to_string(),
        },
        message: format!("Failed to invoke filter '{filter}': {}", cause.message),
        frames: cause.frames.clone(),
    }
}

#[cold]
pub fn argument_error(filter: &str, message: impl fmt::Display) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Argument, format!("{filter}: {message}"))
}

/// A user-thrown error; the message is kept exactly as given.
#[cold]
pub fn thrown(type_name: &str, message: impl Into<String>) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::Thrown {
            type_name: type_name.to_string(),
        },
        message,
    )
}

// Pages and limits

#[cold]
pub fn nesting_too_deep(limit: u32) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::NestingTooDeep { limit },
        format!("Exceeded maximum nesting depth of {limit}"),
    )
}

#[cold]
pub fn page_not_found(path: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::PageNotFound {
            path: path.to_string(),
        },
        format!("Page was not found: '{path}'"),
    )
}

#[cold]
pub fn partial_not_found(name: &str) -> EvalError {
    EvalError::from_kind(
        EvalErrorKind::PageNotFound {
            path: name.to_string(),
        },
        format!("Partial was not found: '{name}'"),
    )
}

#[cold]
pub fn block_not_found(name: &str) -> EvalError {
    EvalError::new(format!("Block named '{name}' was not found."))
}

#[cold]
pub fn cancelled() -> EvalError {
    EvalError::from_kind(EvalErrorKind::Cancelled, "Rendering was cancelled")
}

#[cold]
pub fn parse_error(err: ParseError) -> EvalError {
    let message = err.message.clone();
    EvalError::from_kind(EvalErrorKind::Parse(err), message)
}
