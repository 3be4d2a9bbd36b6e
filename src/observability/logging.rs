//! Structured logging initialization.
//!
//! Uses the tracing crate; the filter comes from `RUST_LOG` when set,
//! otherwise from the supplied default directive.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// Call once, before anything logs. `default_directive` is used when
/// `RUST_LOG` is absent (e.g. "api_gateway=debug,tower_http=debug").
pub fn init(default_directive: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
