//! Scope frames.
//!
//! A frame is a binding table plus a parent pointer fixed at creation, so
//! frames form a chain from the innermost block out to the context's global
//! frame. Tables are behind a lock because assignment filters write into
//! frames other than the current one.
//!
//! The global frame belongs to the context and is shared by every render; it
//! is never written to once built. Writes that would land there go to the
//! render's page frame instead.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Value;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// Context arguments. Read-only during renders.
    Global,
    /// One render (or one `evalSafe` / partial scope).
    Page,
    /// `each`, `with`, lambda calls, partial arguments.
    Block,
}

struct FrameInner {
    bindings: RwLock<FxHashMap<String, Value>>,
    parent: Option<ScopeFrame>,
    kind: FrameKind,
}

#[derive(Clone)]
pub struct ScopeFrame(Arc<FrameInner>);

impl ScopeFrame {
    fn with_parent(kind: FrameKind, parent: Option<ScopeFrame>) -> Self {
        ScopeFrame(Arc::new(FrameInner {
            bindings: RwLock::new(FxHashMap::default()),
            parent,
            kind,
        }))
    }

    /// A root frame holding `bindings`.
    pub fn global(bindings: impl IntoIterator<Item = (String, Value)>) -> Self {
        let frame = ScopeFrame::with_parent(FrameKind::Global, None);
        frame.0.bindings.write().extend(bindings);
        frame
    }

    /// A new page-level frame under this one.
    #[must_use]
    pub fn page(&self) -> Self {
        ScopeFrame::with_parent(FrameKind::Page, Some(self.clone()))
    }

    /// A new block-level frame under this one.
    #[must_use]
    pub fn child(&self) -> Self {
        ScopeFrame::with_parent(FrameKind::Block, Some(self.clone()))
    }

    pub fn kind(&self) -> FrameKind {
        self.0.kind
    }

    pub fn parent(&self) -> Option<&ScopeFrame> {
        self.0.parent.as_ref()
    }

    /// Nearest binding for `name`, innermost first.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let mut frame = Some(self);
        while let Some(current) = frame {
            if let Some(value) = current.0.bindings.read().get(name) {
                return Some(value.clone());
            }
            frame = current.parent();
        }
        None
    }

    /// `lookup`, with a miss reading as `Undefined`.
    pub fn resolve(&self, name: &str) -> Value {
        self.lookup(name).unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Bind in this frame, shadowing outer bindings.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.0.bindings.write().insert(name.into(), value);
    }

    pub fn set_all(&self, bindings: impl IntoIterator<Item = (String, Value)>) {
        self.0.bindings.write().extend(bindings);
    }

    /// Overwrite the nearest frame that already binds `name`; otherwise bind
    /// in the page frame. The global frame is never written.
    pub fn assign(&self, name: &str, value: Value) {
        let mut frame = Some(self);
        while let Some(current) = frame {
            if current.kind() == FrameKind::Global {
                break;
            }
            let mut bindings = current.0.bindings.write();
            if let Some(slot) = bindings.get_mut(name) {
                *slot = value;
                return;
            }
            drop(bindings);
            frame = current.parent();
        }
        self.page_frame().set(name, value);
    }

    /// Bind in the page frame regardless of inner bindings.
    pub fn assign_page(&self, name: &str, value: Value) {
        self.page_frame().set(name, value);
    }

    /// The nearest `Page` frame, or the innermost non-global frame when
    /// the chain has none.
    pub fn page_frame(&self) -> ScopeFrame {
        let mut frame = self;
        loop {
            if frame.kind() == FrameKind::Page {
                return frame.clone();
            }
            match frame.parent() {
                Some(parent) if parent.kind() != FrameKind::Global => frame = parent,
                _ => return frame.clone(),
            }
        }
    }

    /// Snapshot of this frame's own bindings.
    pub fn local_bindings(&self) -> FxHashMap<String, Value> {
        self.0.bindings.read().clone()
    }
}

impl fmt::Debug for ScopeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self.0.bindings.read().keys().cloned().collect();
        names.sort();
        f.debug_struct("ScopeFrame")
            .field("kind", &self.0.kind)
            .field("bindings", &names)
            .field("parent", &self.0.parent)
            .finish()
    }
}
