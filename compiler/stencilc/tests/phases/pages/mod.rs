//! Pages on disk: file-system lookup, page caching and the CLI commands.

use std::path::PathBuf;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use stencil_diagnostic::emitter::ColorMode;
use stencil_eval::{ContextConfig, FileSystemFiles, MemoryFiles, TemplateContext, VirtualFiles};
use stencilc::{check_sources, render_page, CliError, CliOptions};

use crate::common::{render_page as render_in, write_files};

fn options(args: &[&str]) -> CliOptions {
    let args: Vec<String> = args.iter().map(|s| (*s).to_string()).collect();
    CliOptions::parse(&args).unwrap()
}

// -- file system --

#[test]
fn file_system_sites_use_nearest_layouts_and_partials() {
    let dir = tempfile::tempdir().unwrap();
    write_files(
        dir.path(),
        &[
            ("_layout.html", "<html>{{ page }}</html>"),
            ("_footer-partial.html", "(c) {{ year }}"),
            ("blog/_layout.html", "<blog>{{ page }}</blog>"),
            ("blog/post.html", "<!--\nyear: 2024\n-->\n{{ title ?? 'untitled' }} {{ 'footer' | partial }}"),
            ("about.html", "about"),
        ],
    );
    let context = TemplateContext::builder()
        .files(FileSystemFiles::new(dir.path()))
        .build();
    assert_eq!(render_in(&context, "blog/post"), "<blog>untitled (c) 2024</blog>");
    assert_eq!(render_in(&context, "about"), "<html>about</html>");
}

#[test]
fn paths_cannot_escape_the_root() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &[("site/index.html", "inside"), ("secret.html", "outside")]);
    let context = TemplateContext::builder()
        .files(FileSystemFiles::new(dir.path().join("site")))
        .build();
    assert_eq!(render_in(&context, "index"), "inside");
    assert!(context.compile_page("../secret").is_err());
}

// -- caching --

#[test]
fn pages_are_compiled_once() {
    let files = Arc::new(MemoryFiles::new().with_file("index.html", "v1"));
    let context = TemplateContext::builder()
        .shared_files(Arc::clone(&files) as Arc<dyn VirtualFiles>)
        .build();
    let first = context.compile_page("index").unwrap();
    files.write("index.html", "v2");
    let second = context.compile_page("index").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(context.render(second).result().unwrap(), "v1");
}

#[test]
fn modified_pages_recompile_when_checking() {
    let files = Arc::new(MemoryFiles::new().with_file("index.html", "v1"));
    let context = TemplateContext::builder()
        .config(ContextConfig {
            check_for_modified_pages: true,
            ..ContextConfig::default()
        })
        .shared_files(Arc::clone(&files) as Arc<dyn VirtualFiles>)
        .build();
    assert_eq!(render_in(&context, "index"), "v1");
    files.write("index.html", "v2");
    assert_eq!(render_in(&context, "index"), "v2");
}

// -- cli render --

#[test]
fn cli_renders_pages_with_config_and_args() {
    let dir = tempfile::tempdir().unwrap();
    write_files(
        dir.path(),
        &[
            ("_layout.html", "[{{ site }}] {{ page }}"),
            ("index.html", "Hello {{ who }}"),
            ("site.json", r#"{ "args": { "site": "docs", "who": "config" } }"#),
        ],
    );
    let config = dir.path().join("site.json");
    let opts = options(&["--config", config.to_str().unwrap(), "--arg", "who=cli"]);
    let out = render_page(&dir.path().join("index.html"), &opts).unwrap();
    assert_eq!(out, "[docs] Hello cli");
}

#[test]
fn cli_renders_text_pages_unencoded() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &[("notes.txt", "{{ '<b>' }}")]);
    let out = render_page(&dir.path().join("notes.txt"), &CliOptions::default()).unwrap();
    assert_eq!(out, "<b>");
}

#[test]
fn cli_reports_missing_files_and_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &[("index.html", "x"), ("bad.json", "{ \"nope\": 1 }")]);

    let missing = render_page(&dir.path().join("missing.html"), &CliOptions::default()).unwrap_err();
    assert!(matches!(missing, CliError::Template { .. }), "{missing:?}");

    let bad = dir.path().join("bad.json");
    let err = render_page(
        &dir.path().join("index.html"),
        &options(&["--config", bad.to_str().unwrap()]),
    )
    .unwrap_err();
    assert!(matches!(err, CliError::Config { .. }), "{err:?}");
    assert!(err.to_string().starts_with("invalid config"), "{err}");
}

// -- cli check --

#[test]
fn check_reports_each_file_in_order() {
    let dir = tempfile::tempdir().unwrap();
    write_files(
        dir.path(),
        &[
            ("good.html", "{{#if a}}x{{/if}}"),
            ("bad.html", "line one\n{{#each items}}never closed"),
        ],
    );
    let paths: Vec<PathBuf> = ["good.html", "bad.html", "gone.html"]
        .iter()
        .map(|name| dir.path().join(name))
        .collect();
    let report = check_sources(&paths);

    assert_eq!(report.files.len(), 3);
    assert!(report.files[0].is_ok());
    assert_eq!(report.files[0].fragments, 1);
    assert!(!report.files[1].is_ok());
    assert!(report.files[2].read_error.is_some());
    assert_eq!(report.error_count(), 2);

    let mut out = Vec::new();
    report.emit(&mut out, ColorMode::Never, false);
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("OK: "), "{out}");
    assert!(out.contains("error[E1004]: End block for 'each' not found."), "{out}");
    assert!(out.contains("bad.html:2:1"), "{out}");
    assert!(out.contains("cannot find file"), "{out}");
    assert!(out.contains("aborting due to 2 previous errors"), "{out}");
}

#[test]
fn check_passes_clean_files() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), &[("a.html", "{{ 1 }}"), ("b.html", "<!--\ntitle: b\n-->\nplain")]);
    let report = check_sources(&[dir.path().join("a.html"), dir.path().join("b.html")]);
    assert!(!report.has_errors());
}

#[test]
fn check_warns_about_unknown_filters() {
    let dir = tempfile::tempdir().unwrap();
    write_files(
        dir.path(),
        &[("a.html", "{{ name | upper }}\n{{#if a}}{{ name | shout }}{{/if}}")],
    );
    let report = check_sources(&[dir.path().join("a.html")]);

    assert!(!report.has_errors());
    assert_eq!(report.warning_count(), 1);
    assert!(report.files[0].is_ok());

    let mut out = Vec::new();
    report.emit(&mut out, ColorMode::Never, false);
    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("warning[E6002]: unknown filter 'shout'"), "{out}");
    assert!(out.contains("a.html:2:20"), "{out}");
    assert!(out.contains("this tag renders as written"), "{out}");
    assert!(out.contains("OK: "), "{out}");
    assert!(out.contains("1 warning emitted"), "{out}");
}
