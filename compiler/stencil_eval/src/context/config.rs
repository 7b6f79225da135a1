//! Context settings.
//!
//! Every field has a default, so a JSON config file only needs the keys it
//! changes:
//!
//! ```json
//! { "debug_mode": true, "assign_exceptions_to": "error", "args": { "site": "docs" } }
//! ```

use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;
use stencil_stack::DEFAULT_MAX_NESTING;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContextConfig {
    /// Selects the detailed `htmlError` output and rechecks pages for
    /// changes.
    pub debug_mode: bool,
    /// Recheck cached pages against their modification time.
    pub check_for_modified_pages: bool,
    /// Minimum time between rechecks of one page. `None` rechecks on every
    /// access.
    pub check_for_modified_pages_after_ms: Option<u64>,
    /// Bind errors raised by fragments under this name instead of failing
    /// the render.
    pub assign_exceptions_to: Option<String>,
    /// After an error, skip later fragments except those reporting it.
    pub skip_executing_filters_if_error: bool,
    /// Filters treated as missing.
    pub exclude_filters_named: Vec<String>,
    /// Blocks whose body is kept as text.
    pub verbatim_blocks: Vec<String>,
    /// Page name tried for directory paths.
    pub index_page: String,
    /// Layout looked up from the page's directory outward.
    pub default_layout_page: String,
    pub page_extension: String,
    pub max_nesting_depth: u32,
    /// Fail the render on every error, ignoring capture settings.
    pub rethrow_exceptions: bool,
    /// Global arguments, visible to every render.
    pub args: IndexMap<String, serde_json::Value>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        ContextConfig {
            debug_mode: false,
            check_for_modified_pages: false,
            check_for_modified_pages_after_ms: None,
            assign_exceptions_to: None,
            skip_executing_filters_if_error: false,
            exclude_filters_named: Vec::new(),
            verbatim_blocks: vec!["raw".to_string()],
            index_page: "index".to_string(),
            default_layout_page: "_layout".to_string(),
            page_extension: "html".to_string(),
            max_nesting_depth: DEFAULT_MAX_NESTING,
            rethrow_exceptions: false,
            args: IndexMap::new(),
        }
    }
}

impl ContextConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Whether cached pages are rechecked at all.
    pub fn checks_for_modified_pages(&self) -> bool {
        self.debug_mode || self.check_for_modified_pages
    }

    pub fn recheck_interval(&self) -> Duration {
        Duration::from_millis(self.check_for_modified_pages_after_ms.unwrap_or(0))
    }

    /// `name` with the page extension, unless it already has one.
    pub fn with_extension(&self, name: &str) -> String {
        let suffix = format!(".{}", self.page_extension);
        if name.ends_with(&suffix) {
            name.to_string()
        } else {
            format!("{name}{suffix}")
        }
    }
}
