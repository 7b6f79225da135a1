//! Error handling tests: capture directives, the error stack and the
//! diagnostics the CLI prints.

use pretty_assertions::assert_eq;
use stencil_diagnostic::ErrorCode;
use stencil_eval::{ContextConfig, EvalErrorKind, MemoryFiles, TemplateContext, Value};
use stencilc::{eval_source, CliError, CliOptions};

use crate::common::{emit_plain, eval, site};

fn debug_site(files: &[(&str, &str)]) -> TemplateContext {
    let memory = files
        .iter()
        .fold(MemoryFiles::new(), |memory, (path, text)| {
            memory.with_file(path, *text)
        });
    TemplateContext::builder()
        .config(ContextConfig {
            debug_mode: true,
            ..ContextConfig::default()
        })
        .files(memory)
        .build()
}

// -- propagation --

#[test]
fn thrown_messages_propagate_exactly() {
    let err = TemplateContext::default()
        .evaluate_template("{{ 'msg' | throw }}", [])
        .unwrap_err();
    assert_eq!(err.message, "msg");
    assert_eq!(err.code(), ErrorCode::E6004);
}

#[test]
fn unknown_filters_never_raise() {
    assert_eq!(eval("a{{ 1 | noSuchFilter(2) }}b"), "a{{ 1 | noSuchFilter(2) }}b");
}

#[test]
fn member_access_on_missing_roots_is_lenient() {
    assert_eq!(eval("[{{ nothing.here[0].deeper }}]"), "[]");
}

#[test]
fn out_of_range_indexes_on_values_fail() {
    let context = TemplateContext::builder()
        .arg("items", Value::list(vec![Value::Int(1), Value::Int(2)]))
        .arg("word", "ab")
        .build();
    for source in ["[{{ items[5] }}]", "[{{ items[-1] }}]", "[{{ word[2] }}]"] {
        let err = context.evaluate_template(source, []).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::Binding, "{source}");
    }
    let err = context.evaluate_template("{{ items[5] }}", []).unwrap_err();
    assert_eq!(err.message, "Index 5 is out of range for 'List' of length 2");
    assert_eq!(context.evaluate_template("{{ items[1] }}", []).unwrap(), "2");
}

// -- capture --

#[test]
fn captured_errors_continue_the_page_by_default() {
    let context = TemplateContext::builder()
        .config(ContextConfig {
            assign_exceptions_to: Some("error".to_string()),
            ..ContextConfig::default()
        })
        .build();
    let out = context
        .evaluate_template("a{{ 'x' | throw }}b{{ error.message }}", [])
        .unwrap();
    assert_eq!(out, "abx");
}

#[test]
fn production_mode_shows_only_the_message() {
    let context = site(&[("index.html", "{{ skipExecutingFiltersOnError }}{{ 'bad' | throw }}{{ htmlError }}")]);
    let page = context.compile_page("index").unwrap();
    assert_eq!(
        context.render(page).result().unwrap(),
        "<div class=\"alert alert-danger\">bad</div>"
    );
}

#[test]
fn debug_mode_shows_the_type_and_stack() {
    let context = debug_site(&[("index.html", "{{ skipExecutingFiltersOnError }}{{ 'bad' | throw }}{{ htmlError }}")]);
    let page = context.compile_page("index").unwrap();
    let out = context.render(page).result().unwrap();
    assert!(out.starts_with("<pre class=\"alert alert-danger\">Exception: bad\n"), "{out}");
    assert!(out.contains("StackTrace:"), "{out}");
    assert!(out.contains("at Page: index.html"), "{out}");
}

#[test]
fn errors_inside_partials_name_the_partial_page() {
    let context = site(&[
        ("_card-partial.html", "{{ 'inner' | throw }}"),
        ("index.html", "{{ 'card' | partial }}"),
    ]);
    let page = context.compile_page("index").unwrap();
    let err = context.render(page).result().unwrap_err();
    assert_eq!(err.message, "inner");
    assert!(err.frames.iter().any(|f| f == "Page: index.html"), "{:?}", err.frames);
}

#[test]
fn missing_pages_have_their_own_kind() {
    let err = TemplateContext::default().compile_page("nowhere").unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::PageNotFound { .. }));
    assert_eq!(err.code(), ErrorCode::E6006);
}

// -- diagnostics --

#[test]
fn render_errors_list_their_frames_as_notes() {
    let err = TemplateContext::default()
        .evaluate_template("{{ 'boom' | throw }}", [])
        .unwrap_err();
    let out = emit_plain(&err.to_diagnostic(), "{{ 'boom' | throw }}", "<eval>");
    assert!(out.starts_with("error[E6004]: boom"), "{out}");
    assert!(out.contains("= note: at Page: (one-time page)"), "{out}");
}

#[test]
fn cli_eval_reports_template_errors_with_their_source() {
    let err = eval_source("{{ 1 + }}", &CliOptions::default()).unwrap_err();
    let CliError::Template { error, path, text } = err else {
        panic!("expected a template error");
    };
    assert_eq!(path, "<eval>");
    assert_eq!(text.as_deref(), Some("{{ 1 + }}"));
    assert!(matches!(error.kind, EvalErrorKind::Parse(_)));
    assert!(error.code().is_syntax_error());
}

#[test]
fn cli_eval_binds_arguments() {
    let options = CliOptions::parse(&[
        "--arg".to_string(),
        "items=[1,2,3]".to_string(),
        "--arg=who=world".to_string(),
    ])
    .unwrap();
    assert_eq!(
        eval_source("{{ who }}: {{ items | sum }}", &options).unwrap(),
        "world: 6"
    );
}
