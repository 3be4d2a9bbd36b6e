//! Reverse-proxy API gateway library.
//!
//! A single network-facing process that matches inbound request paths
//! against a routing table, rewrites the path, forwards the request to the
//! selected backend, and relays the streamed response back to the caller.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
