//! Shared test utilities for phase tests.

use std::path::Path;

use stencil_diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use stencil_diagnostic::Diagnostic;
use stencil_eval::{MemoryFiles, TemplateContext, Value};

/// Render template text in a default context.
pub fn eval(source: &str) -> String {
    TemplateContext::default()
        .evaluate_template(source, [])
        .unwrap()
}

/// Render template text with arguments.
pub fn eval_with(source: &str, args: &[(&str, Value)]) -> String {
    TemplateContext::default()
        .evaluate_template(
            source,
            args.iter()
                .map(|(name, value)| ((*name).to_string(), value.clone())),
        )
        .unwrap()
}

/// A context over in-memory pages.
pub fn site(files: &[(&str, &str)]) -> TemplateContext {
    let memory = files
        .iter()
        .fold(MemoryFiles::new(), |memory, (path, text)| {
            memory.with_file(path, *text)
        });
    TemplateContext::builder().files(memory).build()
}

/// Compile and render the page at `path`.
pub fn render_page(context: &TemplateContext, path: &str) -> String {
    let page = context.compile_page(path).unwrap();
    context.render(page).result().unwrap()
}

/// Write `files` under `root`, creating directories.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (path, text) in files {
        let full = root.join(path);
        if let Some(dir) = full.parent() {
            std::fs::create_dir_all(dir).unwrap();
        }
        std::fs::write(full, text).unwrap();
    }
}

/// Emit `diagnostic` without colors, as the CLI prints it.
pub fn emit_plain(diagnostic: &Diagnostic, source: &str, path: &str) -> String {
    let mut output = Vec::new();
    {
        let mut emitter = TerminalEmitter::with_color_mode(&mut output, ColorMode::Never, false)
            .with_source(source)
            .with_file_path(path);
        emitter.emit(diagnostic);
        emitter.flush();
    }
    String::from_utf8(output).unwrap()
}
