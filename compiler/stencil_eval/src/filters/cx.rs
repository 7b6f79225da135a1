//! What a filter body sees of the render.

use std::any::Any;
use std::sync::Arc;

use stencil_ir::PageFragment;

use crate::context::TemplateContext;
use crate::errors::{argument_error, EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::scope::ScopeFrame;
use crate::Value;

/// Call context of one filter invocation.
pub struct FilterCx<'i> {
    interp: &'i mut Interpreter,
    frame: &'i ScopeFrame,
    raw_args: &'i [String],
    name: &'i str,
}

impl<'i> FilterCx<'i> {
    pub(crate) fn new(
        interp: &'i mut Interpreter,
        frame: &'i ScopeFrame,
        raw_args: &'i [String],
        name: &'i str,
    ) -> Self {
        FilterCx {
            interp,
            frame,
            raw_args,
            name,
        }
    }

    /// Name the filter was called by.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Scope of the calling fragment.
    pub fn frame(&self) -> &ScopeFrame {
        self.frame
    }

    /// Source text of the written arguments (pipeline calls only).
    pub fn raw_args(&self) -> &[String] {
        self.raw_args
    }

    pub fn context(&self) -> &TemplateContext {
        self.interp.context()
    }

    pub fn interpreter(&mut self) -> &mut Interpreter {
        self.interp
    }

    /// A service registered on the context.
    pub fn service<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.context().services().get::<T>()
    }

    /// An argument error naming this filter.
    #[cold]
    pub fn error(&self, message: impl std::fmt::Display) -> EvalError {
        argument_error(self.name, message)
    }

    /// Items of a collection argument.
    pub fn items(&self, value: &Value) -> EvalResult<Vec<Value>> {
        self.context()
            .capabilities()
            .enumerate(value)
            .ok_or_else(|| self.error(format_args!("'{}' is not enumerable", value.type_name())))
    }

    pub fn property(&self, value: &Value, name: &str) -> EvalResult {
        self.context().capabilities().property(value, name)
    }

    pub fn own_properties(&self, value: &Value) -> Vec<(String, Value)> {
        self.context().capabilities().own_properties(value)
    }

    /// Apply a per-item argument: a function is called with `(item, index)`;
    /// a string is an expression evaluated with `it` and `index` bound.
    pub fn apply(&mut self, func: &Value, item: &Value, index: usize) -> EvalResult {
        match func {
            Value::Function(_) => self
                .interp
                .call_function(func, &[item.clone(), Value::from(index)]),
            Value::Str(source) | Value::Raw(source) => {
                let expr = self.context().expression(source)?;
                let frame = self.frame.child();
                frame.set("it", item.clone());
                frame.set("index", Value::from(index));
                self.interp.eval(&expr, &frame)
            }
            other => Err(self.error(format_args!(
                "expected an expression or function but got '{}'",
                other.type_name()
            ))),
        }
    }

    /// Evaluate an expression given as text in the caller's scope.
    pub fn eval_source(&mut self, source: &str) -> EvalResult {
        let expr = self.context().expression(source)?;
        self.interp.eval(&expr, self.frame)
    }

    /// Render template text against the caller's scope plus `bindings`.
    pub fn render_template(
        &mut self,
        source: &str,
        bindings: impl IntoIterator<Item = (String, Value)>,
    ) -> EvalResult<String> {
        let fragments = self.context().template(source)?;
        let frame = self.frame.child();
        frame.set_all(bindings);
        self.interp.render_to_string(&fragments, &frame)
    }

    /// Render fragments in a child of `frame`, one nesting level deeper.
    pub fn render_nested(
        &mut self,
        label: String,
        fragments: &[PageFragment],
        frame: &ScopeFrame,
    ) -> EvalResult<String> {
        self.interp.nested(|interp| {
            let mut out = String::new();
            interp.render_labeled(label, fragments, frame, &mut out)?;
            Ok(out)
        })
    }
}
