//! Event types for the Courier protocol.
//!
//! Each event is a JSON object with an `event` discriminator. Payloads carry
//! arbitrary JSON (`serde_json::Value`) because relayed messages are opaque
//! to the server.

use serde::{Deserialize, Serialize};

/// An event sent by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ClientEvent {
    /// Register a user identity on this connection.
    ///
    /// The identity is an opaque string; it is not validated or
    /// authenticated by this service.
    #[serde(rename = "add-user")]
    AddUser {
        /// User identity to register.
        #[serde(rename = "userId")]
        user_id: String,
    },

    /// Relay a payload to another user's active connection.
    #[serde(rename = "send-msg")]
    SendMsg {
        /// Recipient user identity.
        to: String,
        /// Opaque message payload.
        msg: serde_json::Value,
    },
}

/// An event sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ServerEvent {
    /// A relayed payload delivered to the recipient.
    ///
    /// The misspelled event name is part of the wire contract.
    #[serde(rename = "msg-recieve")]
    MsgReceive {
        /// The relayed payload, forwarded verbatim.
        msg: serde_json::Value,
    },
}

impl ClientEvent {
    /// Create a new `add-user` event.
    #[must_use]
    pub fn add_user(user_id: impl Into<String>) -> Self {
        ClientEvent::AddUser {
            user_id: user_id.into(),
        }
    }

    /// Create a new `send-msg` event.
    #[must_use]
    pub fn send_msg(to: impl Into<String>, msg: serde_json::Value) -> Self {
        ClientEvent::SendMsg { to: to.into(), msg }
    }

    /// Get the wire name of this event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::AddUser { .. } => "add-user",
            ClientEvent::SendMsg { .. } => "send-msg",
        }
    }
}

impl ServerEvent {
    /// Create a new `msg-recieve` event.
    #[must_use]
    pub fn msg_receive(msg: serde_json::Value) -> Self {
        ServerEvent::MsgReceive { msg }
    }

    /// Get the wire name of this event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::MsgReceive { .. } => "msg-recieve",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_event_names() {
        assert_eq!(ClientEvent::add_user("alice").name(), "add-user");
        assert_eq!(ClientEvent::send_msg("bob", json!("hi")).name(), "send-msg");
    }

    #[test]
    fn test_server_event_wire_name_is_misspelled() {
        let event = ServerEvent::msg_receive(json!("hi"));
        assert_eq!(event.name(), "msg-recieve");

        let encoded = serde_json::to_string(&event).unwrap();
        assert!(encoded.contains(r#""event":"msg-recieve""#));
    }

    #[test]
    fn test_add_user_field_name() {
        let encoded = serde_json::to_string(&ClientEvent::add_user("alice")).unwrap();
        assert!(encoded.contains(r#""userId":"alice""#));
    }

    #[test]
    fn test_send_msg_carries_arbitrary_json() {
        let event = ClientEvent::send_msg("bob", json!({"text": "hello", "n": 3}));
        let encoded = serde_json::to_string(&event).unwrap();
        let decoded: ClientEvent = serde_json::from_str(&encoded).unwrap();
        assert_eq!(event, decoded);
    }
}
