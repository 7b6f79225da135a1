//! `each`: iteration with optional `where`, `orderBy`, `skip` and `take`
//! clauses, applied in that order.

use std::cmp::Ordering;
use std::sync::Arc;

use dashmap::DashMap;
use stencil_ir::BlockFragment;
use stencil_parse::block_args::{parse_each_args, EachArgs};
use stencil_parse::ParseError;

use super::{bind_item, render_else, validate_else_branches, BlockHandler};
use crate::errors::{argument_error, EvalResult};
use crate::interpreter::Interpreter;
use crate::scope::ScopeFrame;
use crate::value::compare_values;
use crate::Value;

/// `{{#each [x in] items [where e] [orderBy e [descending]] [skip n] [take n]}}`
///
/// Lists, objects (as `{ key, value }` entries), strings and enumerable host
/// values are iterated. `index` counts positions in the final sequence.
#[derive(Default)]
pub struct EachBlock {
    parsed: DashMap<String, Arc<EachArgs>>,
}

impl EachBlock {
    fn args(&self, argument: &str) -> EvalResult<Arc<EachArgs>> {
        if let Some(hit) = self.parsed.get(argument) {
            return Ok(Arc::clone(hit.value()));
        }
        let args = Arc::new(parse_each_args(argument)?);
        Ok(Arc::clone(
            self.parsed
                .entry(argument.to_string())
                .or_insert(args)
                .value(),
        ))
    }
}

impl BlockHandler for EachBlock {
    fn name(&self) -> &str {
        "each"
    }

    fn validate(&self, block: &BlockFragment) -> Result<(), ParseError> {
        parse_each_args(&block.argument)?;
        validate_else_branches(block)
    }

    fn render(
        &self,
        interp: &mut Interpreter,
        block: &BlockFragment,
        frame: &ScopeFrame,
        out: &mut String,
    ) -> EvalResult<()> {
        let args = self.args(&block.argument)?;
        let alias = args.binding.as_deref();

        let source = interp.eval(&args.source, frame)?;
        let mut items = if source.is_nullish() {
            Vec::new()
        } else {
            interp
                .context()
                .capabilities()
                .enumerate(&source)
                .ok_or_else(|| {
                    argument_error("each", format_args!("'{}' is not enumerable", source.type_name()))
                })?
        };

        if let Some(filter) = &args.filter {
            let mut kept = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                let scope = item_scope(interp, frame, alias, &item, index);
                if interp.eval(filter, &scope)?.is_truthy() {
                    kept.push(item);
                }
            }
            items = kept;
        }

        if let Some(order_by) = &args.order_by {
            let mut keyed = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                let scope = item_scope(interp, frame, alias, &item, index);
                keyed.push((interp.eval(order_by, &scope)?, item));
            }
            keyed.sort_by(|(a, _), (b, _)| {
                let ordering = compare_values(a, b).unwrap_or(Ordering::Equal);
                if args.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
            items = keyed.into_iter().map(|(_, item)| item).collect();
        }

        if let Some(skip) = &args.skip {
            let n = count(interp, skip, frame)?;
            items.drain(..n.min(items.len()));
        }
        if let Some(take) = &args.take {
            let n = count(interp, take, frame)?;
            items.truncate(n);
        }

        if items.is_empty() {
            return render_else(interp, block, frame, out);
        }
        for (index, item) in items.iter().enumerate() {
            let scope = item_scope(interp, frame, alias, item, index);
            interp.render_fragments(&block.body, &scope, out)?;
        }
        Ok(())
    }
}

fn item_scope(
    interp: &Interpreter,
    frame: &ScopeFrame,
    alias: Option<&str>,
    item: &Value,
    index: usize,
) -> ScopeFrame {
    let scope = frame.child();
    bind_item(interp, &scope, alias, item);
    scope.set("index", Value::from(index));
    scope
}

fn count(interp: &mut Interpreter, expr: &stencil_ir::Expr, frame: &ScopeFrame) -> EvalResult<usize> {
    let value = interp.eval(expr, frame)?;
    let n = value
        .to_i64()
        .ok_or_else(|| argument_error("each", format_args!("'{value}' is not a count")))?;
    Ok(usize::try_from(n).unwrap_or(0))
}
