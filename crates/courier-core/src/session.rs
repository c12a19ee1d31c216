//! Per-connection session lifecycle.
//!
//! Each connection moves through `Connected -> Registered -> Disconnected`.
//! Registration is optional: a connection that never sends `add-user` stays
//! reachable only by handle and is still cleaned up on disconnect.

use std::sync::Arc;

use courier_protocol::ClientEvent;
use tracing::debug;

use crate::connection::ConnectionHandle;
use crate::registry::PresenceRegistry;
use crate::relay::RelayDispatcher;

/// Lifecycle phase of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Open, no identity registered yet.
    Connected,
    /// An identity has been registered on this connection.
    Registered,
    /// Closed. Terminal.
    Disconnected,
}

/// What applying a client event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    /// An identity was registered on this connection.
    Registered,
    /// A relay was attempted; `delivered` is false when the recipient was
    /// offline or its queue was unavailable.
    Relayed { delivered: bool },
    /// The event was ignored (session already disconnected).
    Ignored,
}

/// Wires connection events to the presence registry and relay dispatcher.
#[derive(Debug)]
pub struct Session {
    registry: Arc<PresenceRegistry>,
    relay: RelayDispatcher,
    handle: ConnectionHandle,
    phase: SessionPhase,
}

impl Session {
    /// Open a session for a freshly connected client.
    #[must_use]
    pub fn new(registry: Arc<PresenceRegistry>, handle: ConnectionHandle) -> Self {
        debug!(connection = handle.id(), "Session connected");
        Self {
            relay: RelayDispatcher::new(registry.clone()),
            registry,
            handle,
            phase: SessionPhase::Connected,
        }
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The handle addressing this session's connection.
    #[must_use]
    pub fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    /// Apply a client event.
    ///
    /// Events after disconnect are ignored; the terminal phase never
    /// transitions out.
    pub fn handle_event(&mut self, event: ClientEvent) -> EventOutcome {
        if self.phase == SessionPhase::Disconnected {
            return EventOutcome::Ignored;
        }

        match event {
            ClientEvent::AddUser { user_id } => {
                self.registry.register(user_id, self.handle.clone());
                self.phase = SessionPhase::Registered;
                EventOutcome::Registered
            }
            ClientEvent::SendMsg { to, msg } => {
                // Best-effort; an offline recipient is not an error.
                let delivered = self.relay.relay(&to, msg);
                EventOutcome::Relayed { delivered }
            }
        }
    }

    /// Tear down the session, removing any presence entry.
    ///
    /// Idempotent; safe to call for sessions that never registered.
    pub fn disconnect(&mut self) {
        if self.phase == SessionPhase::Disconnected {
            return;
        }
        self.registry.remove_by_connection(self.handle.id());
        self.phase = SessionPhase::Disconnected;
        debug!(connection = self.handle.id(), "Session disconnected");
    }
}
