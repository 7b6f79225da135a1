//! The `render` command: render a page from disk with its layouts.

use std::path::Path;

use stencil_eval::{FileSystemFiles, PageFormat};
use tracing::debug;

use super::{build_context, read_file, CliError};
use crate::options::CliOptions;

/// Render the page at `path`. Layouts and partials resolve against the
/// page's directory.
pub fn render_page(path: &Path, options: &CliOptions) -> Result<String, CliError> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| CliError::Usage(format!("'{}' is not a page file", path.display())))?
        .to_string();
    let root = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(PageFormat::Html, PageFormat::from_extension);
    debug!(root = %root.display(), page = %name, ?format, "rendering page");

    let context = build_context(options, |builder| {
        builder.files(FileSystemFiles::new(root))
    })?;
    let template_error = |error| CliError::Template {
        error,
        path: path.display().to_string(),
        text: read_file(path).ok(),
    };
    let page = context.compile_page(&name).map_err(template_error)?;
    context
        .render(page)
        .with_format(format)
        .result()
        .map_err(template_error)
}
