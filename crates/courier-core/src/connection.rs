//! Connection handles.
//!
//! A [`ConnectionHandle`] is a cheap, cloneable reference to one active
//! connection's outbound queue. The transport layer owns the connection
//! itself; the registry only holds handles.

use std::sync::atomic::{AtomicU64, Ordering};

use courier_protocol::ServerEvent;
use tokio::sync::mpsc;
use tracing::trace;

/// A process-unique connection identifier.
pub type ConnectionId = u64;

/// Atomic counter for connection IDs.
static CONNECTION_SEQ: AtomicU64 = AtomicU64::new(1);

/// Allocate the next connection ID.
#[must_use]
pub fn next_connection_id() -> ConnectionId {
    CONNECTION_SEQ.fetch_add(1, Ordering::Relaxed)
}

/// A non-owning reference to one connection's outbound queue.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    tx: mpsc::Sender<ServerEvent>,
}

impl ConnectionHandle {
    /// Create a handle around an outbound queue sender.
    #[must_use]
    pub fn new(id: ConnectionId, tx: mpsc::Sender<ServerEvent>) -> Self {
        Self { id, tx }
    }

    /// Get the connection ID.
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue an event for delivery, fire-and-forget.
    ///
    /// Returns `true` if the event was queued. A closed or full queue drops
    /// the event; delivery is best-effort and unacknowledged.
    pub fn deliver(&self, event: ServerEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(e) => {
                trace!(connection = self.id, "Delivery dropped: {}", e);
                false
            }
        }
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn handle(capacity: usize) -> (ConnectionHandle, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (ConnectionHandle::new(next_connection_id(), tx), rx)
    }

    #[test]
    fn test_connection_ids_are_unique() {
        let a = next_connection_id();
        let b = next_connection_id();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_deliver_queues_event() {
        let (h, mut rx) = handle(4);
        assert!(h.deliver(ServerEvent::msg_receive(json!("hi"))));
        assert_eq!(rx.recv().await, Some(ServerEvent::msg_receive(json!("hi"))));
    }

    #[tokio::test]
    async fn test_deliver_to_closed_queue_is_dropped() {
        let (h, rx) = handle(4);
        drop(rx);
        assert!(!h.deliver(ServerEvent::msg_receive(json!("hi"))));
    }

    #[tokio::test]
    async fn test_deliver_to_full_queue_is_dropped() {
        let (h, _rx) = handle(1);
        assert!(h.deliver(ServerEvent::msg_receive(json!(1))));
        assert!(!h.deliver(ServerEvent::msg_receive(json!(2))));
    }

    #[tokio::test]
    async fn test_handle_equality_is_by_id() {
        let (tx, _rx) = mpsc::channel(1);
        let id = next_connection_id();
        let a = ConnectionHandle::new(id, tx.clone());
        let b = ConnectionHandle::new(id, tx);
        assert_eq!(a, b);
    }
}
