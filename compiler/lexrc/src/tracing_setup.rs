//! Tracing subscriber for the `lexr` binary.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a hierarchical subscriber on stderr.
///
/// Does nothing unless `RUST_LOG` is set, e.g. `RUST_LOG=lexr_automaton=debug`
/// for per-condition construction or `RUST_LOG=lexr_runtime=trace` for
/// every match decision. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(EnvFilter::from_default_env())
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    });
}
