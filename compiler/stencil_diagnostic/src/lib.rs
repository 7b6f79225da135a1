//! Diagnostics for template compile and render failures.
//!
//! - [`ErrorCode`] makes every failure searchable (`E0xxx` lexing, `E1xxx`
//!   page and expression syntax, `E6xxx` rendering)
//! - [`Diagnostic`] carries the message, labeled spans and notes
//! - [`emitter::TerminalEmitter`] prints them with a source snippet

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod span_utils;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
