//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, health + catch-all proxy routes)
//!     → request.rs (request ID stamping)
//!     → routing decides the backend
//!     → upstream forwards the rewritten request
//!     → response.rs (relay stream, hop-by-hop strip, error mapping)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
