//! Stack safety for recursive parsing and rendering.
//!
//! Two separate concerns live here:
//!
//! - [`ensure_sufficient_stack`] grows the native stack on demand so deeply
//!   nested expressions never overflow it.
//! - [`DepthLimit`] caps logical nesting (partials including partials, `eval`
//!   rendering templates that render templates). Running out of the cap is a
//!   render error, not a crash.
//!
//! On WASM the stack is managed by the runtime and growth is a passthrough.

use std::cell::Cell;
use std::fmt;

/// Grow when less than this much stack remains (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if the red zone has been reached.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Default cap on nested page, partial and eval scopes.
pub const DEFAULT_MAX_NESTING: u32 = 64;

/// Returned when entering one more level would pass the limit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DepthExceeded {
    pub limit: u32,
}

impl fmt::Display for DepthExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Exceeded maximum nesting depth of {}", self.limit)
    }
}

impl std::error::Error for DepthExceeded {}

/// Per-render nesting counter.
///
/// Not `Sync`: every render owns its own limit.
#[derive(Debug)]
pub struct DepthLimit {
    current: Cell<u32>,
    max: u32,
}

impl DepthLimit {
    pub fn new(max: u32) -> Self {
        DepthLimit {
            current: Cell::new(0),
            max,
        }
    }

    /// Enter one level. The level is left when the guard drops.
    pub fn enter(&self) -> Result<DepthGuard<'_>, DepthExceeded> {
        let next = self.current.get() + 1;
        if next > self.max {
            return Err(DepthExceeded { limit: self.max });
        }
        self.current.set(next);
        Ok(DepthGuard { limit: self })
    }

    pub fn depth(&self) -> u32 {
        self.current.get()
    }

    pub fn max(&self) -> u32 {
        self.max
    }
}

impl Default for DepthLimit {
    fn default() -> Self {
        DepthLimit::new(DEFAULT_MAX_NESTING)
    }
}

/// RAII token for one nesting level.
#[must_use = "dropping the guard immediately leaves the level"]
pub struct DepthGuard<'a> {
    limit: &'a DepthLimit,
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        let current = self.limit.current.get();
        self.limit.current.set(current.saturating_sub(1));
    }
}
