//! The `check` command: compile pages without rendering them.
//!
//! Syntax errors fail the check. Filters the default library does not know
//! are reported as warnings, since they render as their own source text.

use std::io::Write;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use stencil_diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use stencil_diagnostic::{Diagnostic, ErrorCode};
use stencil_eval::{Page, TemplateContext};
use stencil_ir::{PageFragment, Span};
use tracing::debug;

use super::read_file;

/// Outcome of checking one file.
#[derive(Debug)]
pub struct FileCheck {
    pub path: PathBuf,
    /// File text, when it could be read.
    pub text: Option<String>,
    pub read_error: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
    /// Fragments in the compiled page.
    pub fragments: usize,
}

impl FileCheck {
    pub fn is_ok(&self) -> bool {
        self.read_error.is_none() && self.diagnostics.iter().all(|d| !d.is_error())
    }
}

/// Results for every checked file, in the order given.
#[derive(Debug)]
pub struct CheckReport {
    pub files: Vec<FileCheck>,
}

impl CheckReport {
    pub fn error_count(&self) -> usize {
        self.files
            .iter()
            .map(|file| {
                usize::from(file.read_error.is_some())
                    + file.diagnostics.iter().filter(|d| d.is_error()).count()
            })
            .sum()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn warning_count(&self) -> usize {
        self.files
            .iter()
            .flat_map(|file| &file.diagnostics)
            .filter(|d| !d.is_error())
            .count()
    }

    /// Write diagnostics with source snippets, then one line per passing
    /// file and a summary.
    pub fn emit<W: Write>(&self, out: &mut W, mode: ColorMode, is_tty: bool) {
        for file in &self.files {
            let path = file.path.display().to_string();
            if let Some(message) = &file.read_error {
                let _ = writeln!(out, "error: {message}");
                continue;
            }
            if !file.diagnostics.is_empty() {
                let mut emitter = TerminalEmitter::with_color_mode(&mut *out, mode, is_tty)
                    .with_file_path(&path);
                if let Some(text) = &file.text {
                    emitter = emitter.with_source(text);
                }
                emitter.emit_all(&file.diagnostics);
                emitter.flush();
            }
            if file.is_ok() {
                let _ = writeln!(out, "OK: {path} ({} fragments)", file.fragments);
            }
        }
        let warnings = self.warning_count();
        if self.has_errors() || warnings > 0 {
            let mut emitter = TerminalEmitter::with_color_mode(&mut *out, mode, is_tty);
            emitter.emit_summary(self.error_count(), warnings);
            emitter.flush();
        }
    }
}

/// Compile every file in parallel.
pub fn check_sources(paths: &[PathBuf]) -> CheckReport {
    let context = TemplateContext::default();
    let files = paths
        .par_iter()
        .map(|path| check_one(&context, path))
        .collect();
    CheckReport { files }
}

fn check_one(context: &TemplateContext, path: &Path) -> FileCheck {
    let mut check = FileCheck {
        path: path.to_path_buf(),
        text: None,
        read_error: None,
        diagnostics: Vec::new(),
        fragments: 0,
    };
    let text = match read_file(path) {
        Ok(text) => text,
        Err(err) => {
            check.read_error = Some(err.to_string());
            return check;
        }
    };
    match Page::compile(context, &path.display().to_string(), &text) {
        Ok(page) => {
            check.fragments = page.fragments.len();
            let mut from = 0;
            unknown_filters(context, &text, &page.fragments, &mut from, &mut check.diagnostics);
        }
        Err(err) => check.diagnostics.push(err.to_diagnostic()),
    }
    debug!(path = %path.display(), ok = check.is_ok(), "checked page");
    check.text = Some(text);
    check
}

/// Warn about piped filters that do not resolve. `from` tracks where the
/// previous fragment was found so repeated tags map to their own positions.
fn unknown_filters(
    context: &TemplateContext,
    text: &str,
    fragments: &[PageFragment],
    from: &mut usize,
    out: &mut Vec<Diagnostic>,
) {
    for fragment in fragments {
        match fragment {
            PageFragment::Text(_) => {}
            PageFragment::Block(block) => {
                unknown_filters(context, text, &block.body, from, out);
                for branch in &block.else_branches {
                    unknown_filters(context, text, &branch.body, from, out);
                }
            }
            PageFragment::Variable(var) => {
                let tag = &var.original_text;
                let at = text
                    .get(*from..)
                    .and_then(|rest| rest.find(tag.as_str()))
                    .map(|i| *from + i);
                if let Some(at) = at {
                    *from = at + tag.len();
                }
                for filter in &var.filters {
                    if context
                        .filters()
                        .resolve_piped(&filter.name, filter.args.len())
                        .is_some()
                    {
                        continue;
                    }
                    let mut diagnostic = Diagnostic::warning(ErrorCode::E6002)
                        .with_message(format!("unknown filter '{}'", filter.name))
                        .with_note("unknown filters are written out as their source text");
                    if let Some(at) = at {
                        let name_at = tag
                            .find('|')
                            .and_then(|bar| tag[bar..].find(filter.name.as_str()).map(|i| bar + i))
                            .map_or(at, |offset| at + offset);
                        diagnostic = diagnostic
                            .with_label(
                                Span::from_range(name_at..name_at + filter.name.len()),
                                "not a registered filter",
                            )
                            .with_secondary_label(
                                Span::from_range(at..at + tag.len()),
                                "this tag renders as written",
                            );
                    }
                    out.push(diagnostic);
                }
            }
        }
    }
}
