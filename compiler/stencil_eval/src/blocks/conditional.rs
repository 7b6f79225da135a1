//! `if` and `with`.

use stencil_ir::BlockFragment;
use stencil_parse::block_args::parse_required_expr;
use stencil_parse::ParseError;

use super::{bind_item, render_else, validate_else_branches, BlockHandler};
use crate::errors::EvalResult;
use crate::interpreter::Interpreter;
use crate::scope::ScopeFrame;

/// `{{#if cond}} … {{else if cond}} … {{else}} … {{/if}}`
pub struct IfBlock;

impl BlockHandler for IfBlock {
    fn name(&self) -> &str {
        "if"
    }

    fn validate(&self, block: &BlockFragment) -> Result<(), ParseError> {
        parse_required_expr("if", &block.argument)?;
        validate_else_branches(block)
    }

    fn render(
        &self,
        interp: &mut Interpreter,
        block: &BlockFragment,
        frame: &ScopeFrame,
        out: &mut String,
    ) -> EvalResult<()> {
        let condition = interp.context().expression(&block.argument)?;
        if interp.eval(&condition, frame)?.is_truthy() {
            interp.render_fragments(&block.body, frame, out)
        } else {
            render_else(interp, block, frame, out)
        }
    }
}

/// `{{#with expr}} … {{else}} … {{/with}}`: the body sees `it` and the
/// value's own properties.
pub struct WithBlock;

impl BlockHandler for WithBlock {
    fn name(&self) -> &str {
        "with"
    }

    fn validate(&self, block: &BlockFragment) -> Result<(), ParseError> {
        parse_required_expr("with", &block.argument)?;
        validate_else_branches(block)
    }

    fn render(
        &self,
        interp: &mut Interpreter,
        block: &BlockFragment,
        frame: &ScopeFrame,
        out: &mut String,
    ) -> EvalResult<()> {
        let expr = interp.context().expression(&block.argument)?;
        let value = interp.eval(&expr, frame)?;
        if value.is_falsy() {
            return render_else(interp, block, frame, out);
        }
        let scope = frame.child();
        bind_item(interp, &scope, None, &value);
        interp.render_fragments(&block.body, &scope, out)
    }
}
