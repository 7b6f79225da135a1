//! Expression evaluation.
//!
//! Root identifiers resolve through the scope chain, then as zero-argument
//! filters, and read as `undefined` when neither exists. Member steps go
//! through the capability table, which is strict about missing members on
//! concrete values.
//!
//! Filters called inside an expression cannot control a pipeline, so their
//! signals read as `undefined` here.

use std::sync::Arc;

use stencil_ir::{ArrayElement, Expr, Literal, LogicalOp, Property};

use super::operators::{binary, unary};
use super::Interpreter;
use crate::errors::{filter_not_found, not_callable, EvalResult};
use crate::filters::{FilterCx, FilterDef};
use crate::pending::Outcome;
use crate::scope::ScopeFrame;
use crate::value::{Lambda, ObjectMap};
use crate::Value;

pub(super) fn literal_value(lit: &Literal) -> Value {
    match lit {
        Literal::Int(n) => Value::Int(*n),
        Literal::Double(n) => Value::Double(*n),
        Literal::Str(s) => Value::from(s.as_str()),
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Null => Value::Null,
    }
}

impl Interpreter {
    /// Evaluate an expression to a value.
    pub fn eval(&mut self, expr: &Expr, frame: &ScopeFrame) -> EvalResult {
        stencil_stack::ensure_sufficient_stack(|| self.eval_inner(expr, frame))
    }

    fn eval_inner(&mut self, expr: &Expr, frame: &ScopeFrame) -> EvalResult {
        match expr {
            Expr::Literal(lit) => Ok(literal_value(lit)),
            Expr::Identifier(name) => self.eval_identifier(name, frame),
            Expr::Member {
                object,
                key,
                computed,
            } => {
                let target = self.eval(object, frame)?;
                if *computed {
                    let index = self.eval(key, frame)?;
                    self.context.capabilities().element(&target, &index)
                } else {
                    let name = key.as_identifier().unwrap_or_default();
                    self.context.capabilities().property(&target, name)
                }
            }
            Expr::Call { callee, args } => self.eval_call(callee, args, frame),
            Expr::Binary { left, op, right } => {
                let left = self.eval(left, frame)?;
                let right = self.eval(right, frame)?;
                binary(*op, &left, &right)
            }
            Expr::Logical { left, op, right } => {
                let left = self.eval(left, frame)?;
                let short_circuit = match op {
                    LogicalOp::And => left.is_falsy(),
                    LogicalOp::Or => left.is_truthy(),
                    LogicalOp::Coalesce => !left.is_nullish(),
                };
                if short_circuit {
                    Ok(left)
                } else {
                    self.eval(right, frame)
                }
            }
            Expr::Unary { op, operand } => {
                let operand = self.eval(operand, frame)?;
                Ok(unary(*op, &operand))
            }
            Expr::Array(elements) => self.eval_array(elements, frame),
            Expr::Object(props) => self.eval_object(props, frame),
            Expr::Template { quasis, exprs } => {
                let mut text = String::new();
                for (i, part) in quasis.iter().enumerate() {
                    text.push_str(&part.text);
                    if let Some(expr) = exprs.get(i) {
                        text.push_str(&self.eval(expr, frame)?.to_display_string());
                    }
                }
                Ok(Value::from(text))
            }
            Expr::Arrow { params, body } => Ok(Value::Function(Arc::new(Lambda {
                params: params.clone(),
                body: (**body).clone(),
                frame: frame.clone(),
            }))),
        }
    }

    pub(super) fn eval_identifier(&mut self, name: &str, frame: &ScopeFrame) -> EvalResult {
        if let Some(value) = frame.lookup(name) {
            return Ok(value);
        }
        match self.context.filters().resolve_call(name, 0) {
            Some(resolved) => {
                let outcome = self.invoke(&resolved.def, frame, &[], Vec::new())?;
                Ok(self.settle(outcome)?.into_value())
            }
            None => Ok(Value::Undefined),
        }
    }

    pub(super) fn eval_args(&mut self, args: &[Expr], frame: &ScopeFrame) -> EvalResult<Vec<Value>> {
        args.iter().map(|arg| self.eval(arg, frame)).collect()
    }

    fn eval_call(&mut self, callee: &Expr, args: &[Expr], frame: &ScopeFrame) -> EvalResult {
        match callee {
            Expr::Identifier(name) => {
                let bound = frame.lookup(name);
                if let Some(Value::Function(lambda)) = &bound {
                    let args = self.eval_args(args, frame)?;
                    return self.call_lambda(lambda, &args);
                }
                let args = self.eval_args(args, frame)?;
                match self.context.filters().resolve_call(name, args.len()) {
                    Some(resolved) => {
                        let outcome = self.invoke(&resolved.def, frame, &[], args)?;
                        Ok(self.settle(outcome)?.into_value())
                    }
                    None if bound.is_some() => Err(not_callable(name)),
                    None => Err(filter_not_found(name)),
                }
            }
            // `target.name(args)`: a function stored on the target, else the
            // filter `name(target, args)`.
            Expr::Member {
                object,
                key,
                computed: false,
            } => {
                let name = key.as_identifier().unwrap_or_default();
                let target = self.eval(object, frame)?;
                if let Some(Value::Function(lambda)) = target.get(name) {
                    let args = self.eval_args(args, frame)?;
                    return self.call_lambda(&lambda, &args);
                }
                let mut call_args = Vec::with_capacity(args.len() + 1);
                call_args.push(target);
                call_args.extend(self.eval_args(args, frame)?);
                match self.context.filters().resolve_call(name, call_args.len()) {
                    Some(resolved) => {
                        let outcome = self.invoke(&resolved.def, frame, &[], call_args)?;
                        Ok(self.settle(outcome)?.into_value())
                    }
                    None => Err(filter_not_found(name)),
                }
            }
            other => {
                let function = self.eval(other, frame)?;
                let args = self.eval_args(args, frame)?;
                self.call_function(&function, &args)
            }
        }
    }

    /// Call a function value.
    pub fn call_function(&mut self, function: &Value, args: &[Value]) -> EvalResult {
        match function {
            Value::Function(lambda) => self.call_lambda(lambda, args),
            other => Err(not_callable(&other.type_name())),
        }
    }

    fn call_lambda(&mut self, lambda: &Lambda, args: &[Value]) -> EvalResult {
        let frame = lambda.frame.child();
        for (i, param) in lambda.params.iter().enumerate() {
            frame.set(param.clone(), args.get(i).cloned().unwrap_or_default());
        }
        self.eval(&lambda.body, &frame)
    }

    /// Call a filter definition with evaluated arguments.
    pub(crate) fn invoke(
        &mut self,
        def: &FilterDef,
        frame: &ScopeFrame,
        raw_args: &[String],
        args: Vec<Value>,
    ) -> EvalResult<Outcome> {
        let mut cx = FilterCx::new(self, frame, raw_args, &def.name);
        def.call(&mut cx, args)
    }

    fn eval_array(&mut self, elements: &[ArrayElement], frame: &ScopeFrame) -> EvalResult {
        let mut items = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                ArrayElement::Item(expr) => items.push(self.eval(expr, frame)?),
                ArrayElement::Spread(expr) => {
                    let source = self.eval(expr, frame)?;
                    if let Some(spread) = self.context.capabilities().enumerate(&source) {
                        items.extend(spread);
                    }
                }
            }
        }
        Ok(Value::list(items))
    }

    fn eval_object(&mut self, props: &[Property], frame: &ScopeFrame) -> EvalResult {
        let mut map = ObjectMap::with_capacity(props.len());
        for prop in props {
            match &prop.key {
                None => {
                    let source = self.eval(&prop.value, frame)?;
                    map.extend(self.context.capabilities().own_properties(&source));
                }
                Some(Expr::Literal(lit)) => {
                    let value = self.eval(&prop.value, frame)?;
                    map.insert(literal_value(lit).to_display_string(), value);
                }
                Some(key) => {
                    let key = self.eval(key, frame)?.to_display_string();
                    let value = self.eval(&prop.value, frame)?;
                    map.insert(key, value);
                }
            }
        }
        Ok(Value::object(map))
    }
}
