//! Command handlers for the `stencil` CLI.
//!
//! Each submodule implements one command. The functions here and the
//! `*_page`/`*_source` entry points return their results; only
//! [`report`] and the binary touch stderr or the exit code.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use stencil_diagnostic::emitter::{ColorMode, DiagnosticEmitter, TerminalEmitter};
use stencil_eval::{ContextConfig, EvalError, TemplateContext};
use thiserror::Error;

use crate::options::CliOptions;

mod check;
mod eval;
mod render;

pub use check::{check_sources, CheckReport, FileCheck};
pub use eval::eval_source;
pub use render::render_page;

/// Failure of a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config '{path}': {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Usage(String),
    /// A template failed to compile or render. `text` is what the error's
    /// spans point into.
    #[error("{error}")]
    Template {
        error: EvalError,
        path: String,
        text: Option<String>,
    },
}

/// Read a file, with the error message a user expects.
pub(crate) fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| {
        let shown = path.display();
        let message = match source.kind() {
            std::io::ErrorKind::NotFound => format!("cannot find file '{shown}'"),
            std::io::ErrorKind::PermissionDenied => format!("permission denied reading '{shown}'"),
            std::io::ErrorKind::InvalidData => format!("'{shown}' contains invalid UTF-8 data"),
            _ => format!("error reading '{shown}': {source}"),
        };
        CliError::Io { message, source }
    })
}

/// The context settings from `--config` and `--debug`.
pub(crate) fn load_config(options: &CliOptions) -> Result<ContextConfig, CliError> {
    let mut config = match &options.config {
        Some(path) => ContextConfig::from_json(&read_file(path)?).map_err(|source| {
            CliError::Config {
                path: path.clone(),
                source,
            }
        })?,
        None => ContextConfig::default(),
    };
    if options.debug {
        config.debug_mode = true;
    }
    Ok(config)
}

/// A context from the CLI options; `--arg` values become global arguments
/// after those in the config file.
pub(crate) fn build_context(
    options: &CliOptions,
    configure: impl FnOnce(stencil_eval::ContextBuilder) -> stencil_eval::ContextBuilder,
) -> Result<TemplateContext, CliError> {
    let config = load_config(options)?;
    let mut builder = configure(TemplateContext::builder().config(config));
    for (name, value) in &options.args {
        builder = builder.arg(name.clone(), value.clone());
    }
    Ok(builder.build())
}

/// Print a command failure to stderr.
pub fn report(err: &CliError) {
    match err {
        CliError::Template { error, path, text } => {
            let is_tty = std::io::stderr().is_terminal();
            let mut emitter =
                TerminalEmitter::stderr(ColorMode::Auto, is_tty).with_file_path(path);
            if let Some(text) = text {
                emitter = emitter.with_source(text);
            }
            emitter.emit(&error.to_diagnostic());
            emitter.flush();
        }
        other => eprintln!("error: {other}"),
    }
}
