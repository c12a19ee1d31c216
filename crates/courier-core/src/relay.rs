//! Relay dispatch.
//!
//! Forwards a payload to a recipient's active connection, or drops it if the
//! recipient is offline. Delivery is strictly best-effort: no error to the
//! sender, no retry, no queuing beyond the recipient's outbound buffer.

use std::sync::Arc;

use courier_protocol::ServerEvent;
use tracing::{debug, trace};

use crate::registry::PresenceRegistry;

/// Dispatches point-to-point messages through the presence registry.
#[derive(Debug, Clone)]
pub struct RelayDispatcher {
    registry: Arc<PresenceRegistry>,
}

impl RelayDispatcher {
    /// Create a dispatcher over a shared registry.
    #[must_use]
    pub fn new(registry: Arc<PresenceRegistry>) -> Self {
        Self { registry }
    }

    /// Relay a payload to a recipient's active connection.
    ///
    /// Returns `true` if the payload was queued on the recipient's
    /// connection. An offline recipient or a full outbound queue drops the
    /// payload with no observable effect.
    pub fn relay(&self, to_user_id: &str, payload: serde_json::Value) -> bool {
        let Some(handle) = self.registry.lookup(to_user_id) else {
            debug!(to = %to_user_id, "Relay dropped: recipient offline");
            return false;
        };

        let delivered = handle.deliver(ServerEvent::msg_receive(payload));
        if delivered {
            trace!(to = %to_user_id, connection = handle.id(), "Relayed message");
        } else {
            debug!(to = %to_user_id, connection = handle.id(), "Relay dropped: queue unavailable");
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{next_connection_id, ConnectionHandle};
    use serde_json::json;
    use tokio::sync::mpsc;

    fn handle() -> (ConnectionHandle, mpsc::Receiver<ServerEvent>) {
        let (tx, rx) = mpsc::channel(8);
        (ConnectionHandle::new(next_connection_id(), tx), rx)
    }

    #[tokio::test]
    async fn test_relay_to_registered_recipient() {
        let registry = Arc::new(PresenceRegistry::new());
        let relay = RelayDispatcher::new(registry.clone());
        let (h1, mut rx1) = handle();
        let (h2, mut rx2) = handle();

        registry.register("alice", h1);
        registry.register("bob", h2);

        assert!(relay.relay("bob", json!("hi")));
        assert_eq!(rx2.recv().await, Some(ServerEvent::msg_receive(json!("hi"))));
        assert!(rx1.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_relay_to_unknown_recipient_is_silent() {
        let registry = Arc::new(PresenceRegistry::new());
        let relay = RelayDispatcher::new(registry);

        assert!(!relay.relay("carol", json!("hi")));
    }

    #[tokio::test]
    async fn test_relay_after_disconnect_delivers_nothing() {
        let registry = Arc::new(PresenceRegistry::new());
        let relay = RelayDispatcher::new(registry.clone());
        let (h, mut rx) = handle();

        registry.register("alice", h.clone());
        registry.remove_by_connection(h.id());

        assert!(!relay.relay("alice", json!("hi")));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_relay_reaches_latest_registration_only() {
        let registry = Arc::new(PresenceRegistry::new());
        let relay = RelayDispatcher::new(registry.clone());
        let (h1, mut rx1) = handle();
        let (h2, mut rx2) = handle();

        registry.register("alice", h1);
        registry.register("alice", h2);

        assert!(relay.relay("alice", json!("hello")));
        assert_eq!(
            rx2.recv().await,
            Some(ServerEvent::msg_receive(json!("hello")))
        );
        assert!(rx1.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_relay_payload_forwarded_verbatim() {
        let registry = Arc::new(PresenceRegistry::new());
        let relay = RelayDispatcher::new(registry.clone());
        let (h, mut rx) = handle();

        registry.register("bob", h);

        let payload = json!({"text": "hello", "attachments": [1, 2, 3]});
        assert!(relay.relay("bob", payload.clone()));
        assert_eq!(rx.recv().await, Some(ServerEvent::msg_receive(payload)));
    }
}
