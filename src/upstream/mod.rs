//! Upstream subsystem: pooled clients and request forwarding.
//!
//! # Data Flow
//! ```text
//! Matched Route + inbound request
//!     → forwarder.rs (acquire slot, rewrite URI, strip/add headers)
//!     → pool.rs (per-target pooled client, connect budget)
//!     → backend
//!     → Return: upstream response + capacity guard, or ForwardError
//! ```
//!
//! # Design Decisions
//! - One pooled client per distinct backend target
//! - Request budget enforced by cancelling the in-flight call, not by
//!   abandoning it
//! - Every failure is translated into a typed error; callers build the
//!   client-facing response

use thiserror::Error;

pub mod forwarder;
pub mod pool;

pub use forwarder::Forwarder;
pub use pool::{Upstream, UpstreamGuard, UpstreamPool};

/// Errors that can occur while forwarding a request upstream.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Connection to the backend could not be established.
    #[error("failed to connect to upstream {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    /// The backend did not produce response headers within the route budget.
    #[error("upstream {target} exceeded its {budget_ms} ms request budget")]
    Timeout { target: String, budget_ms: u64 },

    /// The backend misbehaved mid-exchange (reset, malformed response).
    #[error("upstream {target} protocol error: {source}")]
    Protocol {
        target: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    /// The per-target connection bound is exhausted.
    #[error("upstream {target} is at its connection limit")]
    Exhausted { target: String },

    /// The rewritten request could not be assembled for this target.
    #[error("could not assemble upstream request for {0}")]
    InvalidRequest(String),

    /// No pooled client exists for the route's target.
    #[error("no upstream registered for target {0}")]
    Unregistered(String),
}
