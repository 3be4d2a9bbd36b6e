//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Load config → Compile routes → Bind listener → Listening
//!
//! Shutdown (state.rs, shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight → Stopped
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Explicit state machine over a watch channel, not ambient callbacks
//! - Ordered shutdown: stop accepting, drain, exit 0

pub mod shutdown;
pub mod signals;
pub mod state;

pub use shutdown::Shutdown;
pub use state::ServerState;
