//! Server lifecycle state machine.
//!
//! # States
//! ```text
//! Stopped → Starting → Listening → Draining → Stopped
//! ```
//!
//! Published over a watch channel so tests and operators can observe
//! transitions without polling the server itself.

use tokio::sync::watch;

/// Lifecycle state of the gateway server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Not running (initial and terminal state).
    Stopped,
    /// Binding and assembling the service.
    Starting,
    /// Accepting connections.
    Listening,
    /// No longer accepting; in-flight requests completing.
    Draining,
}

/// Publishes lifecycle transitions to any number of observers.
#[derive(Debug)]
pub struct StateHandle {
    tx: watch::Sender<ServerState>,
}

impl StateHandle {
    /// Create a handle in the `Stopped` state.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ServerState::Stopped);
        Self { tx }
    }

    /// Publish a transition.
    pub fn set(&self, state: ServerState) {
        let _ = self.tx.send(state);
    }

    /// Current state.
    pub fn current(&self) -> ServerState {
        *self.tx.borrow()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ServerState> {
        self.tx.subscribe()
    }
}

impl Default for StateHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transitions_are_observable() {
        let handle = StateHandle::new();
        let mut rx = handle.subscribe();
        assert_eq!(*rx.borrow(), ServerState::Stopped);

        handle.set(ServerState::Starting);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), ServerState::Starting);

        handle.set(ServerState::Listening);
        handle.set(ServerState::Draining);
        handle.set(ServerState::Stopped);
        assert_eq!(handle.current(), ServerState::Stopped);
    }
}
