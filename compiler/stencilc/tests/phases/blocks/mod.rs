//! Block tests: built-in blocks composed together, and blocks registered by
//! an embedder.

use pretty_assertions::assert_eq;
use stencil_eval::{BlockHandler, EvalResult, Interpreter, ScopeFrame, TemplateContext, Value};
use stencil_ir::BlockFragment;
use stencil_parse::{ParseError, ParseErrorKind};

use crate::common::{eval, eval_with};

/// `{{#repeat n}}body{{/repeat}}` renders its body `n` times with `i` bound.
struct RepeatBlock;

impl BlockHandler for RepeatBlock {
    fn name(&self) -> &str {
        "repeat"
    }

    fn validate(&self, block: &BlockFragment) -> Result<(), ParseError> {
        if block.argument.is_empty() {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedExpression,
                "'repeat' needs a count",
                0,
            ));
        }
        Ok(())
    }

    fn render(
        &self,
        interp: &mut Interpreter,
        block: &BlockFragment,
        frame: &ScopeFrame,
        out: &mut String,
    ) -> EvalResult<()> {
        let expr = interp.context().expression(&block.argument)?;
        let count = interp.eval(&expr, frame)?.to_i64().unwrap_or(0);
        for i in 0..count {
            let child = frame.child();
            child.set("i", Value::Int(i));
            interp.render_fragments(&block.body, &child, out)?;
        }
        Ok(())
    }
}

fn with_repeat() -> TemplateContext {
    TemplateContext::builder().block(RepeatBlock).build()
}

// -- registered blocks --

#[test]
fn registered_blocks_render() {
    let out = with_repeat()
        .evaluate_template("{{#repeat 1 + 2}}[{{ i }}]{{/repeat}}", [])
        .unwrap();
    assert_eq!(out, "[0][1][2]");
}

#[test]
fn registered_blocks_validate_at_compile_time() {
    let err = with_repeat().compile("{{#repeat}}x{{/repeat}}", 0).unwrap_err();
    assert_eq!(err.message, "'repeat' needs a count");
}

#[test]
fn registered_blocks_nest_with_builtins() {
    let out = with_repeat()
        .evaluate_template(
            "{{#each ['a', 'b']}}{{#repeat 2}}{{ it }}{{ i }}{{/repeat}}{{/each}}",
            [],
        )
        .unwrap();
    assert_eq!(out, "a0a1b0b1");
}

// -- built-in composition --

#[test]
fn each_inside_with() {
    let order = Value::object_from([
        ("id", Value::Int(7)),
        ("items", Value::list(vec![Value::from("pen"), Value::from("ink")])),
    ]);
    let out = eval_with(
        "{{#with order}}#{{ id }}:{{#each items}} {{ it }}{{/each}}{{/with}}",
        &[("order", order)],
    );
    assert_eq!(out, "#7: pen ink");
}

#[test]
fn capture_then_markdown() {
    let out = eval("{{#capture md}}# {{ 'Title' }}{{/capture}}{{ md | markdown }}");
    assert_eq!(out.trim(), "<h1>Title</h1>");
}

#[test]
fn partials_render_inside_loops() {
    let out = eval("{{#partial item}}<li>{{ n }}</li>{{/partial}}<ul>{{#each [1, 2]}}{{ 'item' | partial({ n: it }) }}{{/each}}</ul>");
    assert_eq!(out, "<ul><li>1</li><li>2</li></ul>");
}

#[test]
fn raw_keeps_tags_for_client_templates() {
    assert_eq!(
        eval("<script>{{#raw}}{{ name }}{{/raw}}</script>"),
        "<script>{{ name }}</script>"
    );
}
