//! Page renders.
//!
//! A [`PageResult`] is one render of a compiled page. Arguments are layered
//! into the page frame in increasing precedence: the layout's front matter,
//! the page's front matter, the model's properties and `model` itself, then
//! the render arguments. The page body renders first; when the page has a
//! layout, the body is bound as raw `page` and the layout renders in the
//! same frame.
//!
//! [`PageResult::result`] renders on the calling thread and parks it on
//! pending values. [`PageResult::render_to_string`] renders on a dedicated
//! thread and hands every pending value back to the awaiting task, so values
//! fed by other tasks on the caller's executor resolve.

mod html;

use std::sync::Arc;
use std::thread;

use futures::channel::oneshot;
use tracing::{debug, instrument};

use crate::cancel::CancellationToken;
use crate::context::TemplateContext;
use crate::errors::{EvalError, EvalResult};
use crate::interpreter::Interpreter;
use crate::page::Page;
use crate::pending::{answer_all, Suspender};
use crate::Value;

pub use html::{html_encode, PageFormat};

/// Layout choice made by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
enum LayoutChoice {
    /// Front matter, then the default layout.
    FromPage,
    Named(String),
    None,
}

#[derive(Clone)]
pub struct PageResult {
    context: TemplateContext,
    page: Arc<Page>,
    model: Option<Value>,
    args: Vec<(String, Value)>,
    layout: LayoutChoice,
    format: PageFormat,
    cancel: CancellationToken,
    rethrow: Option<bool>,
    assign_exceptions_to: Option<String>,
}

impl PageResult {
    pub fn new(context: &TemplateContext, page: Arc<Page>) -> Self {
        PageResult {
            context: context.clone(),
            page,
            model: None,
            args: Vec::new(),
            layout: LayoutChoice::FromPage,
            format: PageFormat::default(),
            cancel: CancellationToken::new(),
            rethrow: None,
            assign_exceptions_to: None,
        }
    }

    /// Bind `model` and splice its own properties into the page frame.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<Value>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.args.extend(args);
        self
    }

    /// Render inside the named layout instead of the page's own.
    #[must_use]
    pub fn with_layout(mut self, name: impl Into<String>) -> Self {
        self.layout = LayoutChoice::Named(name.into());
        self
    }

    #[must_use]
    pub fn without_layout(mut self) -> Self {
        self.layout = LayoutChoice::None;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: PageFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Fail on every error regardless of capture settings.
    #[must_use]
    pub fn rethrow_exceptions(mut self, on: bool) -> Self {
        self.rethrow = Some(on);
        self
    }

    /// Bind fragment errors under `name` instead of failing.
    #[must_use]
    pub fn assign_exceptions_to(mut self, name: impl Into<String>) -> Self {
        self.assign_exceptions_to = Some(name.into());
        self
    }

    pub fn page(&self) -> &Arc<Page> {
        &self.page
    }

    /// Token that cancels this render.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn layout(&self) -> EvalResult<Option<Arc<Page>>> {
        match &self.layout {
            LayoutChoice::FromPage => self.page.resolve_layout(&self.context),
            LayoutChoice::Named(name) => {
                let name = self.context.config().with_extension(name);
                self.context.compile_page(&name).map(Some)
            }
            LayoutChoice::None => Ok(None),
        }
    }

    /// Render to a string.
    pub fn result(&self) -> EvalResult<String> {
        self.render_with(None)
    }

    /// Render to a string. Pending filter results are awaited as the render
    /// reaches them.
    pub async fn render_to_string(&self) -> EvalResult<String> {
        let (suspender, suspended) = Suspender::channel();
        let (done, finished) = oneshot::channel();
        let render = self.clone();
        thread::Builder::new()
            .name("stencil-render".to_string())
            .spawn(move || {
                let _ = done.send(render.render_with(Some(suspender)));
            })
            .map_err(|err| EvalError::new(format!("cannot start render thread: {err}")))?;
        debug!(page = %self.page.path, "async render started");
        answer_all(suspended).await;
        finished
            .await
            .map_err(|_| EvalError::new("render thread stopped before finishing"))?
    }

    #[instrument(level = "debug", skip_all, fields(page = %self.page.path))]
    fn render_with(&self, suspender: Option<Suspender>) -> EvalResult<String> {
        let mut interp = Interpreter::new(self.context.clone())
            .with_format(self.format)
            .with_cancellation(self.cancel.clone())
            .with_page_dir(self.page.dir())
            .with_suspender(suspender);
        let state = interp.state_mut();
        if let Some(rethrow) = self.rethrow {
            state.rethrow = rethrow;
        }
        if let Some(name) = &self.assign_exceptions_to {
            state.assign_exceptions_to = Some(name.clone());
        }

        let layout = self.layout()?;
        let frame = self.context.globals().page();
        if let Some(layout) = &layout {
            frame.set_all(layout.args.iter().cloned());
        }
        frame.set_all(self.page.args.iter().cloned());
        if let Some(model) = &self.model {
            frame.set_all(self.context.capabilities().own_properties(model));
            frame.set("model", model.clone());
        }
        frame.set_all(self.args.iter().cloned());

        let mut body = String::new();
        interp.render_labeled(
            format!("Page: {}", self.page.path),
            &self.page.fragments,
            &frame,
            &mut body,
        )?;

        let Some(layout) = layout else {
            return Ok(body);
        };
        frame.set("page", Value::raw(body));
        let mut out = String::new();
        interp.render_labeled(
            format!("Layout: {}", layout.path),
            &layout.fragments,
            &frame,
            &mut out,
        )?;
        Ok(out)
    }
}
