//! Stencil CLI - render, evaluate and check templates from the command line.
//!
//! The binary is a thin argument parser over [`commands`]; every command has
//! a function returning its result so the integration tests can drive it
//! without a process.
//!
//! # Logging
//!
//! [`init_tracing`] installs a subscriber when `RUST_LOG` is set, e.g.
//! `RUST_LOG=stencil_eval=debug`. `STENCIL_LOG_TREE=1` prints spans as an
//! indented tree instead of flat lines.

pub mod commands;
pub mod options;

use std::sync::Once;

pub use commands::{check_sources, eval_source, render_page, CheckReport, CliError};
pub use options::{parse_arg, CliOptions};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing once per process. Does nothing unless `RUST_LOG` is
/// set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        if std::env::var("STENCIL_LOG_TREE").is_ok_and(|v| v == "1") {
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
