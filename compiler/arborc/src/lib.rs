//! Arbor compiler service
//!
//! [`LocalService`] plugs the parser, checker and emitter into the rewrite
//! engine:
//!
//! ```text
//! HostConfig ──► LocalService::load ──► ProgramGraph
//!                  │  parse main, then every import (breadth-first)
//!                  │  + std/prelude
//!                  ▼
//!              Context<LocalService> ──► check ──► emit (.abc units)
//! ```
//!
//! Sources come from a [`SourceProvider`]: [`FsSources`] reads the file
//! system, [`MemorySources`] serves an in-memory map (tests, editors).

mod prelude;
mod service;
mod sources;

pub use prelude::{PRELUDE_NAME, PRELUDE_SOURCE};
pub use service::{LocalService, UNIT_EXTENSION};
pub use sources::{FsSources, MemorySources, SourceProvider};

pub use arbor_engine::{Context, HostConfig, SourceEntry};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a hierarchical tracing subscriber.
///
/// Does nothing unless `ARBOR_LOG` is set, e.g.
/// `ARBOR_LOG=arbor_engine=debug`. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if let Ok(filter) = EnvFilter::try_from_env("ARBOR_LOG") {
            // Another subscriber may already be installed by the host.
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .try_init();
        }
    });
}
