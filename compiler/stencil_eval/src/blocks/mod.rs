//! Block statements: `{{#name argument}} body {{else …}} body {{/name}}`.
//!
//! Each block name maps to a [`BlockHandler`]. Handlers check their argument
//! grammar when a page compiles and render against the interpreter at
//! runtime. Built-in handlers:
//!
//! | Block | Handler |
//! |---|---|
//! | `if` | [`IfBlock`] |
//! | `each` | [`EachBlock`] |
//! | `with` | [`WithBlock`] |
//! | `raw` | [`RawBlock`] |
//! | `markdown` | [`MarkdownBlock`] |
//! | `capture` | [`CaptureBlock`] |
//! | `partial` | [`PartialBlock`] |
//! | `eval`, `evalSafe` | [`EvalBlock`] |
//! | `noop` | [`NoopBlock`] |

mod conditional;
mod each;
mod templates;
mod text;

use std::sync::Arc;

use stencil_ir::BlockFragment;
use stencil_parse::block_args::parse_else_condition;
use stencil_parse::ParseError;

use crate::errors::EvalResult;
use crate::interpreter::Interpreter;
use crate::scope::ScopeFrame;
use crate::Value;

pub use conditional::{IfBlock, WithBlock};
pub use each::EachBlock;
pub use templates::{EvalBlock, NoopBlock, PartialBlock};
pub use text::{CaptureBlock, MarkdownBlock, RawBlock};

/// Renders one kind of block.
pub trait BlockHandler: Send + Sync {
    fn name(&self) -> &str;

    /// Check the block's argument when the page compiles. Error positions
    /// are relative to the argument text.
    fn validate(&self, block: &BlockFragment) -> Result<(), ParseError> {
        validate_else_branches(block)
    }

    fn render(
        &self,
        interp: &mut Interpreter,
        block: &BlockFragment,
        frame: &ScopeFrame,
        out: &mut String,
    ) -> EvalResult<()>;
}

pub(crate) fn builtin_blocks() -> Vec<Arc<dyn BlockHandler>> {
    vec![
        Arc::new(IfBlock),
        Arc::new(EachBlock::default()),
        Arc::new(WithBlock),
        Arc::new(RawBlock),
        Arc::new(MarkdownBlock),
        Arc::new(CaptureBlock::default()),
        Arc::new(PartialBlock),
        Arc::new(EvalBlock::eval()),
        Arc::new(EvalBlock::eval_safe()),
        Arc::new(NoopBlock),
    ]
}

/// Check every `{{else …}}` condition of `block`.
pub fn validate_else_branches(block: &BlockFragment) -> Result<(), ParseError> {
    for branch in &block.else_branches {
        parse_else_condition(&branch.argument)?;
    }
    Ok(())
}

/// Render the first `{{else}}` branch whose condition holds, in `frame`.
pub fn render_else(
    interp: &mut Interpreter,
    block: &BlockFragment,
    frame: &ScopeFrame,
    out: &mut String,
) -> EvalResult<()> {
    for branch in &block.else_branches {
        let taken = match interp.context().else_condition(&branch.argument)? {
            None => true,
            Some(condition) => interp.eval(&condition, frame)?.is_truthy(),
        };
        if taken {
            return interp.render_fragments(&branch.body, frame, out);
        }
    }
    Ok(())
}

/// Bind `item` in `frame`: under `alias` when given, else as `it` plus the
/// item's own properties.
pub(crate) fn bind_item(interp: &Interpreter, frame: &ScopeFrame, alias: Option<&str>, item: &Value) {
    match alias {
        Some(alias) => frame.set(alias, item.clone()),
        None => {
            frame.set_all(interp.context().capabilities().own_properties(item));
            frame.set("it", item.clone());
        }
    }
}

/// Evaluate an optional arguments expression to its own properties.
pub(crate) fn eval_args(
    interp: &mut Interpreter,
    args: Option<&stencil_ir::Expr>,
    frame: &ScopeFrame,
) -> EvalResult<Vec<(String, Value)>> {
    match args {
        None => Ok(Vec::new()),
        Some(expr) => {
            let value = interp.eval(expr, frame)?;
            Ok(interp.context().capabilities().own_properties(&value))
        }
    }
}
