//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarded request:
//!     → headers.rs (strip hop-by-hop, add X-Forwarded-*)
//! Relayed response:
//!     → headers.rs (strip hop-by-hop, add security headers)
//! ```
//!
//! # Design Decisions
//! - Hop-by-hop headers never cross the proxy boundary
//! - Security headers apply to every response regardless of route

pub mod headers;
