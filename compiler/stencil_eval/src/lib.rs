//! Stencil Eval - renderer for Stencil templates.
//!
//! A [`TemplateContext`] holds everything shared between renders: global
//! arguments, filters, block handlers, the virtual file system and the
//! compiled-page cache. A [`PageResult`] renders one page against it.
//!
//! # Architecture
//!
//! - `value`: runtime values and conversions
//! - `scope`: the scope frame chain
//! - `capability`: member/index/enumeration dispatch per value kind
//! - `filters`: filter definitions, the registry and the default library
//! - `blocks`: `{{#name}}` block handlers
//! - `interpreter`: the fragment renderer and error capture
//! - `context`, `page`, `render`: contexts, compiled pages and renders
//!
//! Rendering is synchronous; filters may return pending values, which are
//! awaited before the pipeline continues. [`PageResult::render_to_string`]
//! is the async entry point.

pub mod blocks;
mod cancel;
pub mod capability;
pub mod context;
pub mod errors;
pub mod filters;
pub mod interpreter;
mod markdown;
pub mod page;
pub mod pending;
pub mod render;
pub mod scope;
pub mod value;

pub use blocks::BlockHandler;
pub use cancel::CancellationToken;
pub use capability::{Capability, CapabilityTable};
pub use context::{
    ContextBuilder, ContextConfig, FileStamp, FileSystemFiles, MemoryFiles, Services,
    TemplateContext, VirtualFiles,
};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use filters::library::DefaultFilters;
pub use filters::{FilterCx, FilterDef, FilterFlags, FilterProvider, ParamShape};
pub use interpreter::Interpreter;
pub use markdown::{default_markdown, markdown_to_html, MarkdownTransform};
pub use page::{OneTimePage, Page};
pub use pending::{delayed, AsyncValue, ControlSignal, Outcome};
pub use render::{html_encode, PageFormat, PageResult};
pub use scope::ScopeFrame;
pub use value::{HostObject, ObjectMap, Value};
