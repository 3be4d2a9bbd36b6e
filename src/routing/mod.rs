//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → table.rs (longest-prefix lookup)
//!     → Return: matched Route or no-match
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Validate (prefixes, targets)
//!     → Sort longest-prefix-first, stable
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Longest prefix wins; registration order breaks ties
//! - Deterministic: same path always matches the same route
//! - rewrite.rs is a pure function, applied only after a match

pub mod rewrite;
pub mod table;

pub use table::{Route, RouteError, RouteTable};
