//! Compiled pages and the page cache.
//!
//! A page is compiled once per context and reused by every render. When the
//! context checks for modified pages, a cached page is compared against its
//! source's stamp at most once per recheck interval and recompiled when the
//! stamp moved.

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use parking_lot::Mutex;
use stencil_ir::PageFragment;
use stencil_parse::parse_front_matter;
use tracing::debug;

use crate::context::{cascade, normalize_path, parent_dir, FileStamp, TemplateContext};
use crate::errors::{page_not_found, EvalResult};
use crate::Value;

/// Front matter value that turns off the layout.
const NO_LAYOUT: &str = "none";

/// A compiled page.
#[derive(Debug)]
pub struct Page {
    /// Source path, or a placeholder for one-time pages.
    pub path: String,
    /// Front matter arguments, in declaration order.
    pub args: Vec<(String, Value)>,
    pub fragments: Arc<Vec<PageFragment>>,
    /// Front matter `layout`, if given.
    pub layout: Option<String>,
}

impl Page {
    /// Compile page text, splitting off its front matter.
    pub fn compile(context: &TemplateContext, path: &str, text: &str) -> EvalResult<Page> {
        let front = parse_front_matter(text)?;
        let fragments = context.compile(&text[front.body_start..], front.body_start)?;
        let layout = front.get("layout").map(str::to_string);
        Ok(Page {
            path: path.to_string(),
            args: front
                .args
                .into_iter()
                .map(|(key, value)| (key, Value::from(value)))
                .collect(),
            fragments: Arc::new(fragments),
            layout,
        })
    }

    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.args
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Directory the page lives in.
    pub fn dir(&self) -> &str {
        parent_dir(&self.path)
    }

    /// The layout this page renders in, if any.
    pub fn resolve_layout(&self, context: &TemplateContext) -> EvalResult<Option<Arc<Page>>> {
        let config = context.config();
        match self.layout.as_deref() {
            Some(NO_LAYOUT) => Ok(None),
            Some(name) => {
                let file = config.with_extension(name);
                let found = cascade(context.files(), self.dir(), &file)
                    .ok_or_else(|| page_not_found(name))?;
                context.compile_page(&found).map(Some)
            }
            None => {
                let file = config.with_extension(&config.default_layout_page);
                if self.file_name() == file {
                    return Ok(None);
                }
                cascade(context.files(), self.dir(), &file)
                    .map(|found| context.compile_page(&found))
                    .transpose()
            }
        }
    }

    fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }
}

/// Ad-hoc page source, compiled without caching.
pub struct OneTimePage;

impl OneTimePage {
    pub const PATH: &'static str = "(one-time page)";

    /// One-time pages never take a layout unless their front matter names
    /// one.
    pub fn compile(context: &TemplateContext, source: &str) -> EvalResult<Arc<Page>> {
        let mut page = Page::compile(context, Self::PATH, source)?;
        if page.layout.is_none() {
            page.layout = Some(NO_LAYOUT.to_string());
        }
        Ok(Arc::new(page))
    }
}

struct CachedPage {
    page: Arc<Page>,
    stamp: Option<FileStamp>,
    checked: Mutex<Instant>,
}

/// Compiled pages by resolved path.
#[derive(Default)]
pub(crate) struct PageCache {
    pages: DashMap<String, Arc<CachedPage>>,
}

impl PageCache {
    pub(crate) fn get_or_load(&self, context: &TemplateContext, path: &str) -> EvalResult<Arc<Page>> {
        let resolved = resolve_path(context, path).ok_or_else(|| page_not_found(path))?;

        if let Some(cached) = self.pages.get(&resolved).map(|entry| Arc::clone(entry.value())) {
            if !self.is_stale(context, &resolved, &cached) {
                debug!(path = %resolved, "page cache hit");
                return Ok(Arc::clone(&cached.page));
            }
            debug!(path = %resolved, "page changed, recompiling");
            let fresh = Arc::new(load(context, &resolved)?);
            self.pages.insert(resolved, Arc::clone(&fresh));
            return Ok(Arc::clone(&fresh.page));
        }

        debug!(path = %resolved, "page cache miss");
        let loaded = Arc::new(load(context, &resolved)?);
        let entry = self.pages.entry(resolved).or_insert(loaded);
        Ok(Arc::clone(&entry.value().page))
    }

    fn is_stale(&self, context: &TemplateContext, path: &str, cached: &CachedPage) -> bool {
        let config = context.config();
        if !config.checks_for_modified_pages() {
            return false;
        }
        {
            let mut checked = cached.checked.lock();
            if checked.elapsed() < config.recheck_interval() {
                return false;
            }
            *checked = Instant::now();
        }
        context.files().modified(path) != cached.stamp
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pages.len()
    }
}

fn load(context: &TemplateContext, path: &str) -> EvalResult<CachedPage> {
    let files = context.files();
    let stamp = files.modified(path);
    let text = files.read(path).ok_or_else(|| page_not_found(path))?;
    let page = Page::compile(context, path, &text)?;
    Ok(CachedPage {
        page: Arc::new(page),
        stamp,
        checked: Mutex::new(Instant::now()),
    })
}

/// `path`, then `path.html`, then `path/index.html`.
fn resolve_path(context: &TemplateContext, path: &str) -> Option<String> {
    let config = context.config();
    let path = normalize_path(path);
    let files = context.files();
    let index = config.with_extension(&config.index_page);
    let candidates = [
        path.clone(),
        config.with_extension(&path),
        if path.is_empty() {
            index
        } else {
            format!("{path}/{index}")
        },
    ];
    candidates
        .into_iter()
        .find(|candidate| !candidate.is_empty() && files.exists(candidate))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::context::{ContextConfig, MemoryFiles};
    use pretty_assertions::assert_eq;

    fn context_with(files: Arc<MemoryFiles>, config: ContextConfig) -> TemplateContext {
        TemplateContext::builder()
            .config(config)
            .shared_files(files)
            .build()
    }

    #[test]
    fn resolves_extension_and_index() {
        let files = Arc::new(
            MemoryFiles::new()
                .with_file("about.html", "about")
                .with_file("docs/index.html", "docs"),
        );
        let context = context_with(files, ContextConfig::default());
        assert_eq!(context.compile_page("/about").unwrap().path, "about.html");
        assert_eq!(context.compile_page("docs").unwrap().path, "docs/index.html");
        assert!(context.compile_page("missing").is_err());
    }

    #[test]
    fn front_matter_becomes_page_args() {
        let files = Arc::new(MemoryFiles::new().with_file(
            "index.html",
            "<!--\ntitle: Home\nlayout: none\n-->\nbody",
        ));
        let context = context_with(files, ContextConfig::default());
        let page = context.compile_page("index").unwrap();
        assert_eq!(page.arg("title"), Some(&Value::from("Home")));
        assert!(page.resolve_layout(&context).unwrap().is_none());
    }

    #[test]
    fn layout_cascades_from_the_page_directory() {
        let files = Arc::new(
            MemoryFiles::new()
                .with_file("_layout.html", "root {{ page }}")
                .with_file("docs/_layout.html", "docs {{ page }}")
                .with_file("docs/a/page.html", "a")
                .with_file("blog/post.html", "b"),
        );
        let context = context_with(files, ContextConfig::default());
        let docs = context.compile_page("docs/a/page").unwrap();
        let layout = docs.resolve_layout(&context).unwrap().unwrap();
        assert_eq!(layout.path, "docs/_layout.html");
        let blog = context.compile_page("blog/post").unwrap();
        assert_eq!(blog.resolve_layout(&context).unwrap().unwrap().path, "_layout.html");
        let root = context.compile_page("_layout").unwrap();
        assert!(root.resolve_layout(&context).unwrap().is_none());
    }

    #[test]
    fn named_layout_must_exist() {
        let files = Arc::new(MemoryFiles::new().with_file("p.html", "---\nlayout: alt\n---\nx"));
        let context = context_with(files, ContextConfig::default());
        let page = context.compile_page("p").unwrap();
        assert!(page.resolve_layout(&context).is_err());
    }

    #[test]
    fn pages_are_cached_until_modified() {
        let files = Arc::new(MemoryFiles::new().with_file("p.html", "one"));
        let context = context_with(Arc::clone(&files), ContextConfig::default());
        let first = context.compile_page("p").unwrap();
        files.write("p.html", "two");
        let second = context.compile_page("p").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(context.page_cache().len(), 1);
    }

    #[test]
    fn modified_pages_are_recompiled_when_checking() {
        let files = Arc::new(MemoryFiles::new().with_file("p.html", "one"));
        let config = ContextConfig {
            check_for_modified_pages: true,
            ..ContextConfig::default()
        };
        let context = context_with(Arc::clone(&files), config);
        let first = context.compile_page("p").unwrap();
        let unchanged = context.compile_page("p").unwrap();
        assert!(Arc::ptr_eq(&first, &unchanged));
        files.write("p.html", "two");
        let second = context.compile_page("p").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.fragments[0], PageFragment::text("two"));
    }

    #[test]
    fn recheck_waits_for_the_interval() {
        let files = Arc::new(MemoryFiles::new().with_file("p.html", "one"));
        let config = ContextConfig {
            check_for_modified_pages: true,
            check_for_modified_pages_after_ms: Some(60_000),
            ..ContextConfig::default()
        };
        let context = context_with(Arc::clone(&files), config);
        let first = context.compile_page("p").unwrap();
        files.write("p.html", "two");
        assert!(Arc::ptr_eq(&first, &context.compile_page("p").unwrap()));
    }
}
