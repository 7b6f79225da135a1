//! Rendering tests: expressions, scope, arguments and layouts working
//! together.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use stencil_eval::{MemoryFiles, PageFormat, TemplateContext, Value};

use crate::common::{eval, eval_with, render_page, site};

// -- expressions --

#[test]
fn arithmetic_matches_host_evaluation() {
    assert_eq!(eval("{{ (1 + 2) * 3 }}"), "9");
    assert_eq!(eval("{{ 1 + 2 * 3 - 4 / 5.0 }}"), "6.2");
}

#[test]
fn filter_chains_apply_left_to_right() {
    assert_eq!(eval("{{ 1 | add(2) | multiply(3) }}"), "9");
    assert_eq!(eval("{{ [1, 2, 3] | map(it => it * it) | sum }}"), "14");
}

#[test]
fn conditionals_pick_a_branch() {
    let source = "BEFORE {{#if a < b}}YES{{else}}NO{{/if}} AFTER";
    let b = ("b", Value::Int(2));
    assert_eq!(eval_with(source, &[("a", Value::Int(1)), b.clone()]), "BEFORE YES AFTER");
    assert_eq!(eval_with(source, &[("a", Value::Int(3)), b]), "BEFORE NO AFTER");
}

#[test]
fn spreads_override_left_to_right() {
    assert_eq!(
        eval("{{ { a: 1, b: 2, ...{ b: 3, c: 4 } } | json }}"),
        "{\"a\":1,\"b\":3,\"c\":4}"
    );
    assert_eq!(eval("{{ [0, ...[1, 2], 3] | join }}"), "0,1,2,3");
}

// -- scope --

#[test]
fn unknown_variables_render_empty() {
    assert_eq!(eval("[{{ noSuchArg }}]"), "[]");
}

#[test]
fn nested_each_shadows_the_outer_binding() {
    let out = eval("{{#each [1, 2]}}{{#each ['a', 'b']}}{{it}}{{/each}}{{it}};{{/each}}");
    assert_eq!(out, "ab1;ab2;");
}

#[test]
fn each_index_follows_the_filtered_order() {
    let out = eval("{{#each n in [5, 1, 4, 2, 3] where n > 1 orderBy n skip 1}}{{index}}={{n}} {{/each}}");
    assert_eq!(out, "0=3 1=4 2=5 ");
}

// -- arguments --

#[test]
fn config_arguments_are_global() {
    let config = stencil_eval::ContextConfig::from_json(r#"{ "args": { "site": "docs", "n": 2 } }"#).unwrap();
    let context = TemplateContext::builder().config(config).build();
    assert_eq!(context.evaluate_template("{{ site }}:{{ n * 2 }}", []).unwrap(), "docs:4");
}

#[test]
fn render_arguments_shadow_globals() {
    let context = TemplateContext::builder()
        .files(MemoryFiles::new().with_file("index.html", "{{ name }}"))
        .arg("name", "global")
        .build();
    let page = context.compile_page("index").unwrap();
    assert_eq!(context.render(Arc::clone(&page)).result().unwrap(), "global");
    assert_eq!(context.render(page).with_arg("name", "local").result().unwrap(), "local");
}

// -- pages --

#[test]
fn rendering_twice_is_identical() {
    let context = site(&[
        ("_layout.html", "<body>{{ page }}</body>"),
        ("index.html", "{{ range(3) | join }}{{ 1 | assignTo: x }}{{ x }}"),
    ]);
    let first = render_page(&context, "index");
    assert_eq!(first, "<body>0,1,21</body>");
    assert_eq!(render_page(&context, "index"), first);
}

#[test]
fn partial_pages_cascade_to_the_root() {
    let context = site(&[
        ("_header-partial.html", "root header"),
        ("docs/_nav-partial.html", "docs nav"),
        ("docs/guide/intro.html", "{{ 'header' | partial }}|{{ 'nav' | partial }}"),
    ]);
    assert_eq!(render_page(&context, "docs/guide/intro"), "root header|docs nav");
}

#[test]
fn text_pages_are_not_encoded() {
    let context = site(&[("notes.txt", "{{ '<b>' }} & more")]);
    let page = context.compile_page("notes.txt").unwrap();
    let out = context
        .render(page)
        .with_format(PageFormat::from_extension("txt"))
        .result()
        .unwrap();
    assert_eq!(out, "<b> & more");
}

#[test]
fn async_and_sync_results_agree() {
    let context = site(&[("index.html", "{{ 'x' | delay(1) }}{{ 2 | add(3) }}")]);
    let page = context.compile_page("index").unwrap();
    let sync = context.render(Arc::clone(&page)).result().unwrap();
    let rendered = futures::executor::block_on(context.render(page).render_to_string());
    assert_eq!(sync, "x5");
    assert_eq!(rendered.unwrap(), sync);
}
