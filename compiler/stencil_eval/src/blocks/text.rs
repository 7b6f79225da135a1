//! Blocks that produce text: `raw`, `markdown` and `capture`.

use std::sync::Arc;

use dashmap::DashMap;
use stencil_ir::BlockFragment;
use stencil_parse::block_args::{parse_capture_args, CaptureArgs};
use stencil_parse::{ParseError, ParseErrorKind};

use super::{eval_args, BlockHandler};
use crate::errors::EvalResult;
use crate::interpreter::Interpreter;
use crate::scope::ScopeFrame;
use crate::Value;

/// Optional single identifier argument naming a binding to write to.
fn target_name(block: &BlockFragment) -> Result<Option<&str>, ParseError> {
    let name = block.argument.trim();
    if name.is_empty() {
        return Ok(None);
    }
    let valid = name
        .chars()
        .enumerate()
        .all(|(i, c)| c == '_' || c == '$' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()));
    if valid {
        Ok(Some(name))
    } else {
        Err(ParseError::new(
            ParseErrorKind::UnexpectedToken,
            format!("'{}' block expects a variable name but got '{name}'", block.name),
            0,
        ))
    }
}

/// `{{#raw}} … {{/raw}}` writes its body untouched; `{{#raw name}}` binds it
/// to `name` instead.
pub struct RawBlock;

impl BlockHandler for RawBlock {
    fn name(&self) -> &str {
        "raw"
    }

    fn validate(&self, block: &BlockFragment) -> Result<(), ParseError> {
        target_name(block).map(|_| ())
    }

    fn render(
        &self,
        interp: &mut Interpreter,
        block: &BlockFragment,
        frame: &ScopeFrame,
        out: &mut String,
    ) -> EvalResult<()> {
        match target_name(block)? {
            None => interp.render_fragments(&block.body, frame, out),
            Some(name) => {
                let text = interp.render_to_string(&block.body, frame)?;
                frame.assign(name, Value::from(text));
                Ok(())
            }
        }
    }
}

/// `{{#markdown}} … {{/markdown}}` renders its body, then converts it to
/// HTML; `{{#markdown name}}` binds the HTML to `name`.
pub struct MarkdownBlock;

impl BlockHandler for MarkdownBlock {
    fn name(&self) -> &str {
        "markdown"
    }

    fn validate(&self, block: &BlockFragment) -> Result<(), ParseError> {
        target_name(block).map(|_| ())
    }

    fn render(
        &self,
        interp: &mut Interpreter,
        block: &BlockFragment,
        frame: &ScopeFrame,
        out: &mut String,
    ) -> EvalResult<()> {
        let source = interp.render_to_string(&block.body, frame)?;
        let html = (interp.context().markdown())(&source);
        match target_name(block)? {
            None => out.push_str(&html),
            Some(name) => frame.assign(name, Value::raw(html)),
        }
        Ok(())
    }
}

/// `{{#capture [appendTo] name [args]}} … {{/capture}}` renders its body
/// with `args` in scope and stores the output under `name`.
#[derive(Default)]
pub struct CaptureBlock {
    parsed: DashMap<String, Arc<CaptureArgs>>,
}

impl CaptureBlock {
    fn args(&self, argument: &str) -> EvalResult<Arc<CaptureArgs>> {
        if let Some(hit) = self.parsed.get(argument) {
            return Ok(Arc::clone(hit.value()));
        }
        let args = Arc::new(parse_capture_args(argument)?);
        Ok(Arc::clone(
            self.parsed
                .entry(argument.to_string())
                .or_insert(args)
                .value(),
        ))
    }
}

impl BlockHandler for CaptureBlock {
    fn name(&self) -> &str {
        "capture"
    }

    fn validate(&self, block: &BlockFragment) -> Result<(), ParseError> {
        parse_capture_args(&block.argument).map(|_| ())
    }

    fn render(
        &self,
        interp: &mut Interpreter,
        block: &BlockFragment,
        frame: &ScopeFrame,
        _out: &mut String,
    ) -> EvalResult<()> {
        let args = self.args(&block.argument)?;
        let scope = frame.child();
        scope.set_all(eval_args(interp, args.args.as_ref(), frame)?);
        let mut text = interp.render_to_string(&block.body, &scope)?;
        if args.append {
            if let Some(existing) = frame.lookup(&args.name) {
                text.insert_str(0, &existing.to_display_string());
            }
        }
        frame.assign(&args.name, Value::raw(text));
        Ok(())
    }
}
