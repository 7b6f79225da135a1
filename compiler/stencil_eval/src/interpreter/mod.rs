//! Fragment renderer.
//!
//! One [`Interpreter`] drives one render. It owns the state that lives for
//! the render only: the error/skip flags, the template stack used for error
//! traces, partials declared by `{{#partial}}` blocks and the nesting guard.
//! The [`TemplateContext`] it reads from is shared and never written.
//!
//! - `expr`: expression evaluation
//! - `operators`: binary and unary operators
//! - `pipeline`: variable fragments, filter invocation and error capture

mod expr;
mod operators;
mod pipeline;

use std::rc::Rc;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use stencil_ir::{BlockFragment, PageFragment};
use stencil_stack::DepthLimit;
use tracing::trace;

use crate::cancel::CancellationToken;
use crate::context::TemplateContext;
use crate::errors::{block_not_found, cancelled, EvalError, EvalResult};
use crate::pending::{Outcome, Settled, Suspender};
use crate::render::PageFormat;
use crate::scope::ScopeFrame;
use crate::value::ObjectMap;
use crate::Value;

pub(crate) use operators::{binary, unary};
pub(crate) use pipeline::error_object;

/// A partial declared by a `{{#partial}}` block in this render.
#[derive(Clone, Debug)]
pub struct Partial {
    pub fragments: Arc<Vec<PageFragment>>,
    /// Declared arguments, evaluated where the block appeared.
    pub args: ObjectMap,
}

/// Error and skip flags of one render.
#[derive(Debug, Default)]
pub struct RenderState {
    /// Set after a captured error when skipping is configured; later
    /// fragments are skipped unless they only report the error.
    pub skip_filter_execution: bool,
    /// Page-level override of the context's skip setting, set by the
    /// `skipExecutingFiltersOnError` / `continueExecutingFiltersOnError`
    /// directives.
    pub skip_if_error: Option<bool>,
    pub last_error: Option<EvalError>,
    pub rethrow: bool,
    pub assign_exceptions_to: Option<String>,
}

impl RenderState {
    /// Forget the last error and resume execution.
    pub fn reset_error(&mut self) {
        self.skip_filter_execution = false;
        self.last_error = None;
    }
}

pub struct Interpreter {
    context: TemplateContext,
    format: PageFormat,
    state: RenderState,
    depth: Rc<DepthLimit>,
    cancel: CancellationToken,
    partials: FxHashMap<String, Partial>,
    /// Template stack, outermost first.
    stack: Vec<String>,
    /// Directory partial pages are looked up from.
    page_dir: String,
    /// Set when an async caller awaits pending values for this render.
    suspender: Option<Suspender>,
}

impl Interpreter {
    pub fn new(context: TemplateContext) -> Self {
        let config = context.config();
        let state = RenderState {
            rethrow: config.rethrow_exceptions,
            assign_exceptions_to: config.assign_exceptions_to.clone(),
            ..RenderState::default()
        };
        let depth = Rc::new(DepthLimit::new(config.max_nesting_depth));
        Interpreter {
            context,
            format: PageFormat::default(),
            state,
            depth,
            cancel: CancellationToken::new(),
            partials: FxHashMap::default(),
            stack: Vec::new(),
            page_dir: String::new(),
            suspender: None,
        }
    }

    #[must_use]
    pub(crate) fn with_suspender(mut self, suspender: Option<Suspender>) -> Self {
        self.suspender = suspender;
        self
    }

    #[must_use]
    pub fn with_page_dir(mut self, dir: impl Into<String>) -> Self {
        self.page_dir = dir.into();
        self
    }

    pub fn page_dir(&self) -> &str {
        &self.page_dir
    }

    #[must_use]
    pub fn with_format(mut self, format: PageFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn context(&self) -> &TemplateContext {
        &self.context
    }

    pub fn format(&self) -> PageFormat {
        self.format
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    /// Render fragments in order, appending to `out`.
    pub fn render_fragments(
        &mut self,
        fragments: &[PageFragment],
        frame: &ScopeFrame,
        out: &mut String,
    ) -> EvalResult<()> {
        for fragment in fragments {
            if self.cancel.is_cancelled() {
                return Err(cancelled());
            }
            match fragment {
                PageFragment::Text(text) => out.push_str(text),
                PageFragment::Variable(var) => {
                    if self.should_skip(var) {
                        trace!(fragment = %var.original_text, "skipped");
                        continue;
                    }
                    self.render_variable(var, frame, out)?;
                }
                PageFragment::Block(block) => {
                    if self.state.skip_filter_execution {
                        continue;
                    }
                    if let Err(err) = self.render_block(block, frame, out) {
                        let err = err.with_frames(self.stack_frames());
                        self.capture(err, None, frame, out)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Render into a fresh string.
    pub fn render_to_string(
        &mut self,
        fragments: &[PageFragment],
        frame: &ScopeFrame,
    ) -> EvalResult<String> {
        let mut out = String::new();
        self.render_fragments(fragments, frame, &mut out)?;
        Ok(out)
    }

    /// Render with `label` on the template stack (`Page: index.html`).
    pub fn render_labeled(
        &mut self,
        label: String,
        fragments: &[PageFragment],
        frame: &ScopeFrame,
        out: &mut String,
    ) -> EvalResult<()> {
        self.stack.push(label);
        let result = self.render_fragments(fragments, frame, out);
        self.stack.pop();
        result
    }

    fn render_block(
        &mut self,
        block: &BlockFragment,
        frame: &ScopeFrame,
        out: &mut String,
    ) -> EvalResult<()> {
        trace!(block = %block.name, "render block");
        let handler = self
            .context
            .block(&block.name)
            .ok_or_else(|| block_not_found(&block.name))?;
        handler.render(self, block, frame, out)
    }

    /// Run `f` one nesting level deeper, failing past the context's limit.
    pub fn nested<R>(&mut self, f: impl FnOnce(&mut Self) -> EvalResult<R>) -> EvalResult<R> {
        let depth = Rc::clone(&self.depth);
        let _guard = depth.enter()?;
        stencil_stack::ensure_sufficient_stack(|| f(self))
    }

    pub fn register_partial(&mut self, name: impl Into<String>, partial: Partial) {
        self.partials.insert(name.into(), partial);
    }

    pub fn partial(&self, name: &str) -> Option<Partial> {
        self.partials.get(name).cloned()
    }

    /// Template stack, innermost first.
    pub fn stack_frames(&self) -> Vec<String> {
        self.stack.iter().rev().cloned().collect()
    }

    /// Settle a filter outcome. Pending values that are not ready go to the
    /// awaiting task when there is one; otherwise this thread parks.
    pub(crate) fn settle(&self, outcome: Outcome) -> EvalResult<Settled> {
        let Outcome::Pending(mut pending) = outcome else {
            return outcome.settle();
        };
        if let Some(ready) = pending.try_now() {
            return ready.map(Settled::Value);
        }
        match &self.suspender {
            Some(suspender) => suspender.wait(pending),
            None => pending.resolve(),
        }
        .map(Settled::Value)
    }

    /// Write a value in the page's output format.
    pub fn write_value(&self, value: &Value, out: &mut String) {
        self.format.write(value, out);
    }
}
