//! Structured logging setup.
//!
//! # Design Decisions
//! - `tracing` for structured events throughout the crate
//! - Level configurable via `RUST_LOG`, falling back to the given default
//! - Wiretap byte events are trace-level under the `filament::wiretap` target

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// `default_filter` applies when `RUST_LOG` is unset, e.g. `"filament=debug"`
/// or `"filament=debug,filament::wiretap=trace"`.
pub fn init(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
