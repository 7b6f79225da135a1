//! `ContextBuilder` for assembling a [`TemplateContext`].

use std::any::{Any, TypeId};
use std::sync::Arc;

use dashmap::DashMap;
use rustc_hash::{FxHashMap, FxHashSet};
use stencil_parse::CompileOptions;
use tracing::debug;

use super::files::{MemoryFiles, VirtualFiles};
use super::{ContextConfig, ContextInner, Services, TemplateContext};
use crate::blocks::{builtin_blocks, BlockHandler};
use crate::capability::{Capability, CapabilityTable};
use crate::filters::library::DefaultFilters;
use crate::filters::{FilterDef, FilterFlags, FilterProvider, FilterRegistry};
use crate::markdown::{default_markdown, MarkdownTransform};
use crate::page::PageCache;
use crate::scope::ScopeFrame;
use crate::value::{from_json, HostObject};
use crate::Value;

/// Builder for a [`TemplateContext`].
///
/// Registration order matters for filters: single definitions added with
/// [`filter`](Self::filter) come first, then providers in the order given,
/// then the default library. The first definition of a name and arity wins.
/// Blocks are keyed by name and a later registration replaces a built-in.
pub struct ContextBuilder {
    config: ContextConfig,
    filters: Vec<FilterDef>,
    providers: Vec<Arc<dyn FilterProvider>>,
    default_filters: bool,
    blocks: Vec<Arc<dyn BlockHandler>>,
    capabilities: FxHashMap<TypeId, Arc<dyn Capability>>,
    files: Option<Arc<dyn VirtualFiles>>,
    services: Services,
    markdown: Option<MarkdownTransform>,
    args: Vec<(String, Value)>,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        ContextBuilder::new()
    }
}

impl ContextBuilder {
    pub fn new() -> Self {
        ContextBuilder {
            config: ContextConfig::default(),
            filters: Vec::new(),
            providers: Vec::new(),
            default_filters: true,
            blocks: Vec::new(),
            capabilities: FxHashMap::default(),
            files: None,
            services: Services::new(),
            markdown: None,
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn config(mut self, config: ContextConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn debug_mode(mut self, on: bool) -> Self {
        self.config.debug_mode = on;
        self
    }

    /// A single filter definition, taking precedence over every provider.
    #[must_use]
    pub fn filter(mut self, def: FilterDef) -> Self {
        self.filters.push(def);
        self
    }

    #[must_use]
    pub fn provider(mut self, provider: impl FilterProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Leave out the default filter library.
    #[must_use]
    pub fn without_default_filters(mut self) -> Self {
        self.default_filters = false;
        self
    }

    #[must_use]
    pub fn block(mut self, handler: impl BlockHandler + 'static) -> Self {
        self.blocks.push(Arc::new(handler));
        self
    }

    /// Access rules for the host type `T`.
    #[must_use]
    pub fn capability<T: HostObject>(mut self, capability: impl Capability + 'static) -> Self {
        self.capabilities
            .insert(TypeId::of::<T>(), Arc::new(capability));
        self
    }

    #[must_use]
    pub fn files(mut self, files: impl VirtualFiles + 'static) -> Self {
        self.files = Some(Arc::new(files));
        self
    }

    #[must_use]
    pub fn shared_files(mut self, files: Arc<dyn VirtualFiles>) -> Self {
        self.files = Some(files);
        self
    }

    #[must_use]
    pub fn service<T: Any + Send + Sync>(mut self, service: T) -> Self {
        self.services.insert(service);
        self
    }

    #[must_use]
    pub fn markdown(mut self, transform: MarkdownTransform) -> Self {
        self.markdown = Some(transform);
        self
    }

    /// A global argument. Overrides a config argument of the same name.
    #[must_use]
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.push((name.into(), value.into()));
        self
    }

    pub fn build(self) -> TemplateContext {
        let excluded: FxHashSet<String> = self.config.exclude_filters_named.iter().cloned().collect();
        let mut filters = FilterRegistry::new(excluded);
        for def in self.filters {
            filters.register(def);
        }
        for provider in &self.providers {
            filters.register_all(provider.as_ref(), &self.services);
        }
        if self.default_filters {
            filters.register_all(&DefaultFilters, &self.services);
        }

        let mut blocks: FxHashMap<String, Arc<dyn BlockHandler>> = FxHashMap::default();
        for handler in builtin_blocks().into_iter().chain(self.blocks) {
            blocks.insert(handler.name().to_string(), handler);
        }

        let compile_options = CompileOptions {
            verbatim_blocks: self.config.verbatim_blocks.iter().cloned().collect(),
            no_output_filters: filters.names_with(FilterFlags::NO_OUTPUT),
        };
        let eval_when_skipping = filters.names_with(FilterFlags::EVAL_WHEN_SKIPPING);

        let globals = ScopeFrame::global(
            self.config
                .args
                .iter()
                .map(|(name, json)| (name.clone(), from_json(json)))
                .chain(self.args),
        );

        debug!(
            blocks = blocks.len(),
            debug_mode = self.config.debug_mode,
            "built template context"
        );

        TemplateContext(Arc::new(ContextInner {
            globals,
            filters,
            blocks,
            capabilities: CapabilityTable::new(self.capabilities),
            files: self.files.unwrap_or_else(|| Arc::new(MemoryFiles::new())),
            services: self.services,
            markdown: self.markdown.unwrap_or_else(default_markdown),
            compile_options,
            eval_when_skipping,
            expressions: DashMap::new(),
            templates: DashMap::new(),
            conditions: DashMap::new(),
            pages: PageCache::default(),
            config: self.config,
        }))
    }
}
