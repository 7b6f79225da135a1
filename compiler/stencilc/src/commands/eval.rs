//! The `eval` command: render template text given on the command line.

use super::{build_context, CliError};
use crate::options::CliOptions;

/// Render `source` as a one-time page with no layout.
pub fn eval_source(source: &str, options: &CliOptions) -> Result<String, CliError> {
    let context = build_context(options, |builder| builder)?;
    context
        .evaluate_template(source, [])
        .map_err(|error| CliError::Template {
            error,
            path: "<eval>".to_string(),
            text: Some(source.to_string()),
        })
}
