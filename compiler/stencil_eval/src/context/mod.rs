//! The template context: everything renders share.
//!
//! A [`TemplateContext`] holds the global arguments, the filter registry,
//! block handlers, capability table, page sources and the compile caches.
//! It is cheap to clone, `Send + Sync`, and read-only once built; caches
//! fill on first use with the first writer winning.

mod builder;
mod config;
mod files;
mod services;

use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::{FxHashMap, FxHashSet};
use stencil_ir::{Expr, PageFragment};
use stencil_parse::block_args::parse_else_condition;
use stencil_parse::{parse_expression, CompileOptions, PageCompiler, ParseError};
use tracing::{debug, instrument};

use crate::blocks::BlockHandler;
use crate::capability::CapabilityTable;
use crate::errors::EvalResult;
use crate::filters::FilterRegistry;
use crate::markdown::MarkdownTransform;
use crate::page::{OneTimePage, Page, PageCache};
use crate::render::PageResult;
use crate::scope::ScopeFrame;
use crate::Value;

pub use builder::ContextBuilder;
pub use config::ContextConfig;
pub use files::{cascade, normalize_path, parent_dir, FileStamp, FileSystemFiles, MemoryFiles, VirtualFiles};
pub use services::Services;

pub(crate) struct ContextInner {
    pub(crate) config: ContextConfig,
    pub(crate) globals: ScopeFrame,
    pub(crate) filters: FilterRegistry,
    pub(crate) blocks: FxHashMap<String, Arc<dyn BlockHandler>>,
    pub(crate) capabilities: CapabilityTable,
    pub(crate) files: Arc<dyn VirtualFiles>,
    pub(crate) services: Services,
    pub(crate) markdown: MarkdownTransform,
    pub(crate) compile_options: CompileOptions,
    pub(crate) eval_when_skipping: FxHashSet<String>,
    pub(crate) expressions: DashMap<String, Arc<Expr>>,
    pub(crate) templates: DashMap<String, Arc<Vec<PageFragment>>>,
    pub(crate) conditions: DashMap<String, Option<Arc<Expr>>>,
    pub(crate) pages: PageCache,
}

#[derive(Clone)]
pub struct TemplateContext(pub(crate) Arc<ContextInner>);

impl Default for TemplateContext {
    fn default() -> Self {
        TemplateContext::builder().build()
    }
}

impl TemplateContext {
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    pub fn config(&self) -> &ContextConfig {
        &self.0.config
    }

    /// The root frame holding the global arguments. Renders read it but
    /// never write to it.
    pub fn globals(&self) -> &ScopeFrame {
        &self.0.globals
    }

    pub fn filters(&self) -> &FilterRegistry {
        &self.0.filters
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.0.capabilities
    }

    pub fn files(&self) -> &dyn VirtualFiles {
        self.0.files.as_ref()
    }

    pub fn services(&self) -> &Services {
        &self.0.services
    }

    pub fn markdown(&self) -> &MarkdownTransform {
        &self.0.markdown
    }

    pub fn compile_options(&self) -> &CompileOptions {
        &self.0.compile_options
    }

    #[cfg(test)]
    pub(crate) fn page_cache(&self) -> &PageCache {
        &self.0.pages
    }

    pub fn block(&self, name: &str) -> Option<Arc<dyn BlockHandler>> {
        self.0.blocks.get(name).cloned()
    }

    /// Whether a fragment headed by `name` still runs after an error
    /// switched the page to skipping.
    pub fn evaluates_when_skipping(&self, name: &str) -> bool {
        self.0.eval_when_skipping.contains(name)
    }

    /// Parse an expression, memoized by source text.
    pub fn expression(&self, source: &str) -> EvalResult<Arc<Expr>> {
        if let Some(hit) = self.0.expressions.get(source) {
            return Ok(Arc::clone(hit.value()));
        }
        let expr = Arc::new(parse_expression(source)?);
        Ok(Arc::clone(
            self.0
                .expressions
                .entry(source.to_string())
                .or_insert(expr)
                .value(),
        ))
    }

    /// Condition of an `{{else …}}` branch, memoized by argument text.
    pub fn else_condition(&self, argument: &str) -> EvalResult<Option<Arc<Expr>>> {
        if let Some(hit) = self.0.conditions.get(argument) {
            return Ok(hit.value().clone());
        }
        let condition = parse_else_condition(argument)?.map(Arc::new);
        Ok(self
            .0
            .conditions
            .entry(argument.to_string())
            .or_insert(condition)
            .value()
            .clone())
    }

    /// Compile template text with this context's options, memoized by
    /// source text.
    pub fn template(&self, source: &str) -> EvalResult<Arc<Vec<PageFragment>>> {
        if let Some(hit) = self.0.templates.get(source) {
            return Ok(Arc::clone(hit.value()));
        }
        debug!(len = source.len(), "compiling template");
        let fragments = Arc::new(self.compile(source, 0)?);
        Ok(Arc::clone(
            self.0
                .templates
                .entry(source.to_string())
                .or_insert(fragments)
                .value(),
        ))
    }

    /// Compile page text without caching, validating block arguments.
    pub fn compile(&self, text: &str, base: usize) -> Result<Vec<PageFragment>, ParseError> {
        let fragments = PageCompiler::new(&self.0.compile_options).compile(text, base)?;
        self.validate_blocks(&fragments)?;
        Ok(fragments)
    }

    fn validate_blocks(&self, fragments: &[PageFragment]) -> Result<(), ParseError> {
        for fragment in fragments {
            if let PageFragment::Block(block) = fragment {
                if let Some(handler) = self.0.blocks.get(&block.name) {
                    handler.validate(block)?;
                }
                self.validate_blocks(&block.body)?;
                for branch in &block.else_branches {
                    self.validate_blocks(&branch.body)?;
                }
            }
        }
        Ok(())
    }

    /// Resolve and compile the page at `path`: `path`, then `path` with the
    /// page extension, then its index page.
    #[instrument(level = "debug", skip(self))]
    pub fn compile_page(&self, path: &str) -> EvalResult<Arc<Page>> {
        self.0.pages.get_or_load(self, path)
    }

    /// Render template text with extra arguments.
    #[instrument(level = "debug", skip_all, fields(len = source.len()))]
    pub fn evaluate_template(
        &self,
        source: &str,
        args: impl IntoIterator<Item = (String, Value)>,
    ) -> EvalResult<String> {
        let page = OneTimePage::compile(self, source)?;
        PageResult::new(self, page).with_args(args).result()
    }

    /// Start a render of `page`.
    pub fn render(&self, page: Arc<Page>) -> PageResult {
        PageResult::new(self, page)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::filters::FilterDef;
    use pretty_assertions::assert_eq;

    #[test]
    fn expressions_are_memoized() {
        let context = TemplateContext::default();
        let first = context.expression("1 + 2").unwrap();
        let second = context.expression("1 + 2").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn templates_are_memoized() {
        let context = TemplateContext::default();
        let first = context.template("a {{ b }}").unwrap();
        let second = context.template("a {{ b }}").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn block_arguments_are_checked_when_compiling() {
        let context = TemplateContext::default();
        let err = context.template("{{#if}}x{{/if}}").unwrap_err();
        assert!(err.message.contains("'if' block requires an expression"));
    }

    #[test]
    fn user_filters_shadow_the_library() {
        let context = TemplateContext::builder()
            .filter(FilterDef::any("upper", 1, |_| Ok(Value::from("shadowed"))))
            .build();
        assert_eq!(
            context.evaluate_template("{{ 'a' | upper }}", []).unwrap(),
            "shadowed"
        );
    }

    #[test]
    fn contexts_resolve_filters_independently() {
        let english = TemplateContext::builder()
            .filter(FilterDef::any("greet", 1, |_| Ok(Value::from("hello"))))
            .build();
        let french = TemplateContext::builder()
            .filter(FilterDef::any("greet", 1, |_| Ok(Value::from("bonjour"))))
            .build();
        let plain = TemplateContext::default();

        for _ in 0..2 {
            assert_eq!(english.evaluate_template("{{ 1 | greet }}", []).unwrap(), "hello");
            assert_eq!(french.evaluate_template("{{ 1 | greet }}", []).unwrap(), "bonjour");
            assert_eq!(
                plain.evaluate_template("{{ 1 | greet }}", []).unwrap(),
                "{{ 1 | greet }}"
            );
        }
        assert!(english.filters().resolve_piped("greet", 0).is_some());
        assert!(plain.filters().resolve_piped("greet", 0).is_none());
    }

    #[test]
    fn builder_args_override_config_args() {
        let config = ContextConfig::from_json(r#"{ "args": { "a": 1, "b": 2 } }"#).unwrap();
        let context = TemplateContext::builder().config(config).arg("b", 3).build();
        assert_eq!(context.evaluate_template("{{ a }}{{ b }}", []).unwrap(), "13");
    }

    #[test]
    fn excluded_filters_are_unresolved() {
        let config = ContextConfig {
            exclude_filters_named: vec!["upper".to_string()],
            ..ContextConfig::default()
        };
        let context = TemplateContext::builder().config(config).build();
        assert_eq!(
            context.evaluate_template("{{ 'a' | upper }}", []).unwrap(),
            "{{ 'a' | upper }}"
        );
    }
}
