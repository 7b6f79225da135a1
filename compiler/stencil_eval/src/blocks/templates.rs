//! Blocks that define or render templates: `partial`, `eval`, `evalSafe`
//! and `noop`.

use std::sync::Arc;

use stencil_ir::BlockFragment;
use stencil_parse::block_args::{parse_optional_expr, parse_partial_args};
use stencil_parse::ParseError;

use super::{eval_args, BlockHandler};
use crate::errors::EvalResult;
use crate::interpreter::{Interpreter, Partial};
use crate::scope::ScopeFrame;
use crate::value::ObjectMap;

/// `{{#partial name [args]}} … {{/partial}}` declares a partial for the rest
/// of the render. It writes nothing; the `partial` filter renders it.
pub struct PartialBlock;

impl BlockHandler for PartialBlock {
    fn name(&self) -> &str {
        "partial"
    }

    fn validate(&self, block: &BlockFragment) -> Result<(), ParseError> {
        parse_partial_args(&block.argument).map(|_| ())
    }

    fn render(
        &self,
        interp: &mut Interpreter,
        block: &BlockFragment,
        frame: &ScopeFrame,
        _out: &mut String,
    ) -> EvalResult<()> {
        let args = parse_partial_args(&block.argument)?;
        let declared: ObjectMap = eval_args(interp, args.args.as_ref(), frame)?
            .into_iter()
            .collect();
        interp.register_partial(
            args.name,
            Partial {
                fragments: Arc::new(block.body.clone()),
                args: declared,
            },
        );
        Ok(())
    }
}

/// `{{#eval [args]}} … {{/eval}}` renders its body, then renders the result
/// as a template in the current scope. `evalSafe` renders the result in a
/// fresh scope holding only `args`.
pub struct EvalBlock {
    name: &'static str,
    isolated: bool,
}

impl EvalBlock {
    pub fn eval() -> Self {
        EvalBlock {
            name: "eval",
            isolated: false,
        }
    }

    pub fn eval_safe() -> Self {
        EvalBlock {
            name: "evalSafe",
            isolated: true,
        }
    }
}

impl BlockHandler for EvalBlock {
    fn name(&self) -> &str {
        self.name
    }

    fn validate(&self, block: &BlockFragment) -> Result<(), ParseError> {
        parse_optional_expr(&block.argument).map(|_| ())
    }

    fn render(
        &self,
        interp: &mut Interpreter,
        block: &BlockFragment,
        frame: &ScopeFrame,
        out: &mut String,
    ) -> EvalResult<()> {
        let args_expr = parse_optional_expr(&block.argument)?;
        let args = eval_args(interp, args_expr.as_ref(), frame)?;
        let source = interp.render_to_string(&block.body, frame)?;
        let fragments = interp.context().template(&source)?;

        let scope = if self.isolated {
            ScopeFrame::global(std::iter::empty()).page()
        } else {
            frame.child()
        };
        scope.set_all(args);
        let label = format!("Block: {}", self.name);
        interp.nested(|interp| interp.render_labeled(label, &fragments, &scope, out))
    }
}

/// `{{#noop}} … {{/noop}}` is compiled and never rendered.
pub struct NoopBlock;

impl BlockHandler for NoopBlock {
    fn name(&self) -> &str {
        "noop"
    }

    fn validate(&self, _block: &BlockFragment) -> Result<(), ParseError> {
        Ok(())
    }

    fn render(
        &self,
        _interp: &mut Interpreter,
        _block: &BlockFragment,
        _frame: &ScopeFrame,
        _out: &mut String,
    ) -> EvalResult<()> {
        Ok(())
    }
}
