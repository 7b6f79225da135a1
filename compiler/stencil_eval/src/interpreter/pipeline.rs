//! Variable fragments: head expression, filter pipeline and error capture.
//!
//! A filter result can be a value (piped into the next filter), a pending
//! value (resolved before continuing), `Stop` (the fragment writes nothing)
//! or `Ignore` (the previous value keeps flowing; if it is the last result
//! the fragment writes nothing).
//!
//! Errors raised anywhere in a fragment are handled by [`Interpreter::capture`]:
//! depending on the context settings, the page directives and the failing
//! call's `assignError` / `catchError` / `ifErrorReturn` options, the error is
//! bound into scope, swallowed, or rethrown.

use stencil_ir::{Expr, Literal, VariableFragment};
use tracing::{trace, warn};

use super::expr::literal_value;
use super::Interpreter;
use crate::errors::{filter_invocation, EvalError, EvalErrorKind, EvalResult};
use crate::filters::FilterFlags;
use crate::pending::{ControlSignal, Settled};
use crate::scope::ScopeFrame;
use crate::value::ObjectMap;
use crate::Value;

const MAX_FRAME_TEXT: usize = 200;

/// What a variable fragment writes.
enum Emit {
    Value(Value),
    Nothing,
    /// A filter could not be resolved: the tag is written as source text.
    Unresolved,
}

/// The filter call an error came from.
pub(super) struct FailedCall {
    name: String,
    flags: FilterFlags,
    /// Last argument, when it is an options object.
    options: Option<Value>,
}

struct Failure {
    error: EvalError,
    call: Option<FailedCall>,
}

impl From<EvalError> for Failure {
    fn from(error: EvalError) -> Self {
        Failure { error, call: None }
    }
}

/// The error as seen by templates: `{ message, type, stackTrace }`.
pub(crate) fn error_object(err: &EvalError) -> Value {
    let mut map = ObjectMap::with_capacity(3);
    map.insert("message".to_string(), Value::from(err.message.as_str()));
    map.insert("type".to_string(), Value::from(err.type_name()));
    map.insert("stackTrace".to_string(), Value::from(err.stack_trace()));
    Value::object(map)
}

/// Template stack entry for a fragment.
fn describe(var: &VariableFragment) -> String {
    if let Some(binding) = var.binding() {
        return format!("Expression (binding): {binding}");
    }
    if let Expr::Call { callee, .. } = &var.expr {
        if let Some(name) = callee.as_identifier() {
            return format!("Expression (filter): {name}");
        }
    }
    if let Expr::Literal(lit) = &var.expr {
        let value = literal_value(lit);
        let text = match lit {
            Literal::Str(s) => format!("\"{}\"", s.replace('"', "\\\"")),
            _ => value.to_display_string(),
        };
        return format!("Expression ({}): {}", value.type_name(), ellipsis(&text));
    }
    format!("{}: {}", expr_kind(&var.expr), ellipsis(&var.expr.to_string()))
}

fn expr_kind(expr: &Expr) -> &'static str {
    match expr {
        Expr::Literal(_) => "Literal",
        Expr::Identifier(_) => "Identifier",
        Expr::Member { .. } => "Member",
        Expr::Call { .. } => "Call",
        Expr::Binary { .. } => "Binary",
        Expr::Logical { .. } => "Logical",
        Expr::Unary { .. } => "Unary",
        Expr::Array(_) => "Array",
        Expr::Object(_) => "Object",
        Expr::Template { .. } => "Template",
        Expr::Arrow { .. } => "Arrow",
    }
}

fn ellipsis(text: &str) -> String {
    match text.char_indices().nth(MAX_FRAME_TEXT) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Name that decides whether a fragment runs while skipping: the binding,
/// or the name of a head filter call.
fn head_name(var: &VariableFragment) -> Option<&str> {
    match &var.expr {
        Expr::Identifier(name) => Some(name),
        Expr::Call { callee, .. } => callee.as_identifier(),
        _ => None,
    }
}

fn options_of(args: &[Value]) -> Option<Value> {
    match args.last() {
        Some(last @ Value::Object(map)) => {
            let map = map.read();
            ["assignError", "catchError", "ifErrorReturn"]
                .iter()
                .any(|key| map.contains_key(*key))
                .then(|| last.clone())
        }
        _ => None,
    }
}

impl Interpreter {
    pub(super) fn should_skip(&self, var: &VariableFragment) -> bool {
        self.state.skip_filter_execution
            && !head_name(var).is_some_and(|name| self.context.evaluates_when_skipping(name))
    }

    pub(super) fn render_variable(
        &mut self,
        var: &VariableFragment,
        frame: &ScopeFrame,
        out: &mut String,
    ) -> EvalResult<()> {
        trace!(fragment = %var.original_text, "render variable");
        self.stack.push(describe(var));
        let result = self.eval_pipeline(var, frame);
        let handled = match result {
            Ok(Emit::Value(value)) => {
                self.write_value(&value, out);
                Ok(())
            }
            Ok(Emit::Nothing) => Ok(()),
            Ok(Emit::Unresolved) => {
                out.push_str(&var.original_text);
                Ok(())
            }
            Err(failure) => {
                let error = failure.error.with_frames(self.stack_frames());
                self.capture(error, failure.call, frame, out)
            }
        };
        self.stack.pop();
        handled
    }

    fn eval_pipeline(
        &mut self,
        var: &VariableFragment,
        frame: &ScopeFrame,
    ) -> Result<Emit, Failure> {
        let (mut value, mut ignored) = match self.eval_head(&var.expr, frame)? {
            None => return Ok(Emit::Unresolved),
            Some(Settled::Value(value)) => (value, false),
            Some(Settled::Signal(ControlSignal::Stop)) => return Ok(Emit::Nothing),
            Some(Settled::Signal(ControlSignal::Ignore)) => (Value::Undefined, true),
        };

        for filter in &var.filters {
            let args = self.eval_args(&filter.args, frame)?;
            let Some(resolved) = self.context.filters().resolve_piped(&filter.name, args.len())
            else {
                return Ok(Emit::Unresolved);
            };
            let options = options_of(&args);
            let call_args = if resolved.consumes {
                let mut call_args = Vec::with_capacity(args.len() + 1);
                call_args.push(value.clone());
                call_args.extend(args);
                call_args
            } else {
                args
            };
            let settled = self
                .invoke(&resolved.def, frame, &filter.raw_args, call_args)
                .and_then(|outcome| self.settle(outcome))
                .map_err(|error| Failure {
                    error,
                    call: Some(FailedCall {
                        name: filter.name.clone(),
                        flags: resolved.def.flags,
                        options,
                    }),
                })?;
            match settled {
                Settled::Value(next) => {
                    value = next;
                    ignored = false;
                }
                Settled::Signal(ControlSignal::Stop) => return Ok(Emit::Nothing),
                Settled::Signal(ControlSignal::Ignore) => ignored = true,
            }
        }

        Ok(if ignored { Emit::Nothing } else { Emit::Value(value) })
    }

    /// Head expression. Filter calls here may stop the fragment; `None`
    /// means the head is a call to a filter that does not exist.
    fn eval_head(&mut self, expr: &Expr, frame: &ScopeFrame) -> Result<Option<Settled>, Failure> {
        let (name, args) = match expr {
            Expr::Identifier(name) if !frame.contains(name) => (name.as_str(), &[][..]),
            Expr::Call { callee, args } => match callee.as_identifier() {
                Some(name) if !matches!(frame.lookup(name), Some(Value::Function(_))) => {
                    (name, args.as_slice())
                }
                _ => return Ok(Some(Settled::Value(self.eval(expr, frame)?))),
            },
            _ => return Ok(Some(Settled::Value(self.eval(expr, frame)?))),
        };

        let args = self.eval_args(args, frame)?;
        let Some(resolved) = self.context.filters().resolve_call(name, args.len()) else {
            return Ok(match expr {
                Expr::Identifier(_) => Some(Settled::Value(Value::Undefined)),
                _ => None,
            });
        };
        let options = options_of(&args);
        self.invoke(&resolved.def, frame, &[], args)
            .and_then(|outcome| self.settle(outcome))
            .map(Some)
            .map_err(|error| Failure {
                error,
                call: Some(FailedCall {
                    name: name.to_string(),
                    flags: resolved.def.flags,
                    options,
                }),
            })
    }

    /// Handle an error raised by a fragment.
    pub(super) fn capture(
        &mut self,
        error: EvalError,
        call: Option<FailedCall>,
        frame: &ScopeFrame,
        out: &mut String,
    ) -> EvalResult<()> {
        if matches!(error.kind, EvalErrorKind::Cancelled | EvalErrorKind::NestingTooDeep { .. }) {
            return Err(error);
        }
        self.state.last_error = Some(error.clone());

        if self.state.rethrow {
            return Err(error);
        }

        let skip_configured = self.state.skip_if_error.is_some()
            || self.context.config().skip_executing_filters_if_error;
        if self
            .state
            .skip_if_error
            .unwrap_or(self.context.config().skip_executing_filters_if_error)
        {
            self.state.skip_filter_execution = true;
        }

        let mut binding = None;
        if let Some(options) = call.as_ref().and_then(|call| call.options.as_ref()) {
            if let Some(name) = options.get("assignError") {
                binding = Some(name.to_display_string());
            } else if let Some(name) = options.get("catchError") {
                binding = Some(name.to_display_string());
                self.state.reset_error();
            }
            if let Some(value) = options.get("ifErrorReturn") {
                self.state.reset_error();
                self.write_value(&value, out);
                return Ok(());
            }
        }
        let binding = binding
            .or_else(|| self.state.assign_exceptions_to.clone())
            .filter(|name| !name.is_empty());

        if let Some(binding) = binding {
            warn!(error = %error, binding = %binding, "captured render error");
            frame.assign(&format!("{binding}StackTrace"), Value::from(error.stack_trace()));
            frame.assign(&binding, error_object(&error));
            return Ok(());
        }

        if skip_configured {
            warn!(error = %error, "render error, skipping filters");
            return Ok(());
        }

        Err(match call {
            Some(call)
                if !call.flags.contains(FilterFlags::THROWS)
                    && !error.is_thrown()
                    && !matches!(error.kind, EvalErrorKind::FilterInvocation { .. }) =>
            {
                filter_invocation(&call.name, &error)
            }
            _ => error,
        })
    }
}
