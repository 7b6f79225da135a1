//! Terminal emitter.
//!
//! Human-readable output with optional ANSI colors. When a source text is
//! attached, each label is shown as `path:line:col` followed by the source
//! line and a caret underline.

use std::io::{self, Write};

use crate::span_utils::LineOffsetTable;
use crate::{Diagnostic, Label, Severity};

use super::DiagnosticEmitter;

mod colors {
    pub const ERROR: &str = "\x1b[1;31m";
    pub const WARNING: &str = "\x1b[1;33m";
    pub const NOTE: &str = "\x1b[1;36m";
    pub const HELP: &str = "\x1b[1;32m";
    pub const BOLD: &str = "\x1b[1m";
    pub const SECONDARY: &str = "\x1b[1;34m";
    pub const RESET: &str = "\x1b[0m";
}

#[inline]
fn plural_s(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Color output mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Colors when the output is a TTY.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Terminal emitter with optional color and source snippets.
pub struct TerminalEmitter<W: Write> {
    writer: W,
    colors: bool,
    source: Option<(String, LineOffsetTable)>,
    file_path: Option<String>,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn with_color_mode(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            source: None,
            file_path: None,
        }
    }

    /// Attach the template text the diagnostics' spans point into.
    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some((source.to_string(), LineOffsetTable::build(source)));
        self
    }

    #[must_use]
    pub fn with_file_path(mut self, path: &str) -> Self {
        self.file_path = Some(path.to_string());
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_colored(&mut self, text: &str, color: &str) {
        if self.colors {
            let _ = write!(self.writer, "{color}{text}{}", colors::RESET);
        } else {
            let _ = write!(self.writer, "{text}");
        }
    }

    fn write_severity(&mut self, severity: Severity) {
        let color = match severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Note => colors::NOTE,
        };
        self.write_colored(&severity.to_string(), color);
    }

    fn write_label(&mut self, label: &Label) {
        let marker = if label.is_primary { "-->" } else { "   " };
        let path = self.file_path.clone().unwrap_or_else(|| "<template>".to_string());

        let located = self.source.as_ref().map(|(source, table)| {
            let (line, col) = table.offset_to_line_col(source, label.span.start);
            let text = table.line_text(source, line).unwrap_or_default().to_string();
            (line, col, text)
        });
        let Some((line, col, line_text)) = located else {
            let _ = write!(self.writer, "  {marker} {path} {:?}: ", label.span);
            self.write_label_message(label);
            let _ = writeln!(self.writer);
            return;
        };

        let gutter = line.to_string();
        let pad = " ".repeat(gutter.len());
        let width = label
            .span
            .to_range()
            .len()
            .clamp(1, line_text.chars().count().saturating_sub(col as usize - 1).max(1));

        let _ = writeln!(self.writer, "  {marker} {path}:{line}:{col}");
        let _ = writeln!(self.writer, " {pad} |");
        let _ = writeln!(self.writer, " {gutter} | {line_text}");
        let _ = write!(
            self.writer,
            " {pad} | {}",
            " ".repeat(col as usize - 1)
        );
        let underline = if label.is_primary { "^" } else { "-" }.repeat(width);
        if label.is_primary {
            self.write_colored(&underline, colors::ERROR);
        } else {
            self.write_colored(&underline, colors::SECONDARY);
        }
        let _ = write!(self.writer, " ");
        self.write_label_message(label);
        let _ = writeln!(self.writer);
    }

    fn write_label_message(&mut self, label: &Label) {
        if label.is_primary {
            self.write_colored(&label.message, colors::ERROR);
        } else {
            self.write_colored(&label.message, colors::SECONDARY);
        }
    }
}

impl TerminalEmitter<io::Stderr> {
    pub fn stderr(mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter::with_color_mode(io::stderr(), mode, is_tty)
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: &Diagnostic) {
        self.write_severity(diagnostic.severity);
        if self.colors {
            let _ = write!(
                self.writer,
                "{}[{}]{}",
                colors::BOLD,
                diagnostic.code,
                colors::RESET
            );
        } else {
            let _ = write!(self.writer, "[{}]", diagnostic.code);
        }
        let _ = writeln!(self.writer, ": {}", diagnostic.message);

        for label in &diagnostic.labels {
            self.write_label(label);
        }

        for note in &diagnostic.notes {
            let _ = write!(self.writer, "  = ");
            self.write_colored("note", colors::BOLD);
            let _ = writeln!(self.writer, ": {note}");
        }

        for suggestion in &diagnostic.suggestions {
            let _ = write!(self.writer, "  = ");
            self.write_colored("help", colors::HELP);
            let _ = writeln!(self.writer, ": {suggestion}");
        }

        let _ = writeln!(self.writer);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }

    fn emit_summary(&mut self, error_count: usize, warning_count: usize) {
        if error_count > 0 {
            self.write_colored("error", colors::ERROR);
            let error_part = if error_count == 1 {
                "previous error".to_string()
            } else {
                format!("{error_count} previous errors")
            };
            if warning_count > 0 {
                let _ = writeln!(
                    self.writer,
                    ": aborting due to {error_part}; {warning_count} warning{} emitted",
                    plural_s(warning_count)
                );
            } else {
                let _ = writeln!(self.writer, ": aborting due to {error_part}");
            }
        } else if warning_count > 0 {
            self.write_colored("warning", colors::WARNING);
            let _ = writeln!(
                self.writer,
                ": {warning_count} warning{} emitted",
                plural_s(warning_count)
            );
        }
    }
}
