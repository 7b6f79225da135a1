//! Diagnostic emitters.
//!
//! Only a terminal emitter ships; the trait keeps the CLI independent of the
//! output format.

mod terminal;

pub use terminal::{ColorMode, TerminalEmitter};

use crate::Diagnostic;

/// Sink for diagnostics.
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    fn flush(&mut self);

    /// Emit a closing summary line.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);
}
