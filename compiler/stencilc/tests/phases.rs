// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Phase-based template engine tests.
//!
//! Unit tests live next to the code in each crate; these drive the engine
//! end to end, from page text through compilation and rendering, the way an
//! embedder or the `stencil` CLI does.
//!
//! # Organization
//!
//! - `parse/` - Page compilation and syntax diagnostics (`stencil_parse`)
//! - `render/` - Expressions, arguments and layouts (`stencil_eval`)
//! - `blocks/` - Built-in and embedder-registered blocks
//! - `filters/` - Filter providers, services and exclusions
//! - `errors/` - Error capture, stack frames and diagnostics
//! - `pages/` - Pages on disk and the CLI commands
//! - `common/` - Shared test utilities
//!
//! # Running Phase Tests
//!
//! ```bash
//! # Run all phase tests
//! cargo test -p stencilc --test phases
//!
//! # Run specific phase
//! cargo test -p stencilc --test phases render
//! ```

#[path = "phases/common/mod.rs"]
mod common;

#[path = "phases/parse/mod.rs"]
mod parse;

#[path = "phases/render/mod.rs"]
mod render;

#[path = "phases/blocks/mod.rs"]
mod blocks;

#[path = "phases/filters/mod.rs"]
mod filters;

#[path = "phases/errors/mod.rs"]
mod errors;

#[path = "phases/pages/mod.rs"]
mod pages;
