//! Page compilation tests.
//!
//! - Front matter splits off before the body compiles
//! - Syntax error positions are absolute in the page text
//! - Diagnostics render with a source snippet

use pretty_assertions::assert_eq;
use stencil_diagnostic::ErrorCode;
use stencil_eval::{ContextConfig, EvalErrorKind, Page, TemplateContext, Value};
use stencil_ir::PageFragment;
use stencil_parse::{compile_page, parse_front_matter, ParseErrorKind};

use crate::common::{emit_plain, eval};

// -- structure --

#[test]
fn comments_compile_to_nothing() {
    assert_eq!(eval("a{{* note *}}b"), "ab");
}

#[test]
fn nested_blocks_keep_their_else_branches() {
    let fragments = compile_page("{{#each items}}{{#if it}}y{{else}}n{{/if}}{{/each}}").unwrap();
    let [PageFragment::Block(each)] = fragments.as_slice() else {
        panic!("expected one block, got {fragments:?}");
    };
    assert_eq!(each.name, "each");
    let [PageFragment::Block(inner)] = each.body.as_slice() else {
        panic!("expected a nested block, got {:?}", each.body);
    };
    assert_eq!(inner.name, "if");
    assert_eq!(inner.else_branches.len(), 1);
}

#[test]
fn front_matter_becomes_page_arguments() {
    let context = TemplateContext::default();
    let page = Page::compile(&context, "about.html", "---\ntitle: About\ntags: a b\n---\n<h1>{{ title }}</h1>").unwrap();
    assert_eq!(page.arg("title"), Some(&Value::from("About")));
    assert_eq!(page.arg("tags"), Some(&Value::from("a b")));
    assert_eq!(page.fragments.first().and_then(PageFragment::as_text), Some("<h1>"));
}

#[test]
fn front_matter_body_offset() {
    let text = "<!--\ntitle: x\n-->\nbody";
    let front = parse_front_matter(text).unwrap();
    assert_eq!(&text[front.body_start..], "body");
    assert_eq!(front.get("title"), Some("x"));
}

#[test]
fn configured_verbatim_blocks_skip_compilation() {
    let config = ContextConfig {
        verbatim_blocks: vec!["raw".to_string(), "code".to_string()],
        ..ContextConfig::default()
    };
    let context = TemplateContext::builder().config(config).build();
    let fragments = context.compile("{{#code}}{{ not | parsed {{/code}}", 0).unwrap();
    let [PageFragment::Block(code)] = fragments.as_slice() else {
        panic!("expected one block, got {fragments:?}");
    };
    assert_eq!(code.body, vec![PageFragment::text("{{ not | parsed ")]);
}

// -- errors --

#[test]
fn body_errors_count_the_front_matter() {
    let text = "<!--\ntitle: x\n-->\nline\n{{#if a}}open";
    let err = Page::compile(&TemplateContext::default(), "a.html", text).unwrap_err();
    let EvalErrorKind::Parse(parse) = &err.kind else {
        panic!("expected a parse error, got {err:?}");
    };
    assert_eq!(parse.kind, ParseErrorKind::UnclosedBlock);
    assert_eq!(parse.position, text.find("{{#if").unwrap());
}

#[test]
fn unclosed_front_matter_fails() {
    let err = parse_front_matter("<!--\ntitle: x\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::FrontMatter);
    assert_eq!(err.kind.code(), ErrorCode::E1007);
}

#[test]
fn invalid_block_arguments_fail_at_compile_time() {
    let err = TemplateContext::default()
        .compile("{{#each x in}}{{/each}}", 0)
        .unwrap_err();
    assert!(err.kind.code().is_syntax_error());
}

// -- diagnostics --

#[test]
fn diagnostics_point_at_the_source_line() {
    let text = "<!--\ntitle: x\n-->\nline\n{{#if a}}open";
    let err = Page::compile(&TemplateContext::default(), "a.html", text).unwrap_err();
    let out = emit_plain(&err.to_diagnostic(), text, "a.html");
    assert!(out.starts_with("error[E1004]: End block for 'if' not found."), "{out}");
    assert!(out.contains("--> a.html:5:1"), "{out}");
    assert!(out.contains("{{#if a}}open"), "{out}");
    assert!(out.contains("blocks are closed with {{/name}}"), "{out}");
}

#[test]
fn separator_diagnostics_suggest_a_fix() {
    let text = "{{ a b }}";
    let err = compile_page(text).unwrap_err();
    let out = emit_plain(&err.to_diagnostic(), text, "t.html");
    assert!(out.contains("error[E1006]"), "{out}");
    assert!(out.contains("help: separate filters with `|`"), "{out}");
}
