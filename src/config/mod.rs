//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! environment (+ optional TOML file)
//!     → loader.rs (parse & deserialize, env overrides)
//!     → GatewayConfig (typed, immutable)
//!     → shared by value/Arc with all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields have defaults so the gateway runs with zero configuration
//! - Absent or invalid environment values fall back to documented defaults
//! - Only loader.rs touches the process environment

pub mod loader;
pub mod schema;

pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::RouteConfig;
pub use schema::SecurityConfig;
pub use schema::UpstreamConfig;
