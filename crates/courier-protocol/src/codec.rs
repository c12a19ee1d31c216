//! Codec for Courier events.
//!
//! Events travel as one JSON object per WebSocket text frame, so the codec
//! is a thin layer over `serde_json`. Decoding rejects anything that is not
//! a known event with the expected fields; callers drop such frames silently
//! rather than reporting them to the client.

use thiserror::Error;

use crate::events::{ClientEvent, ServerEvent};

/// Errors that can occur during encoding/decoding.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The frame is not a known event or has missing/wrong-typed fields.
    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// Serialization failed.
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Decode a client event from a text frame.
///
/// # Errors
///
/// Returns an error if the frame is not valid JSON, names an unknown event,
/// or is missing required fields.
pub fn decode_client(text: &str) -> Result<ClientEvent, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::Decode)
}

/// Encode a server event to a text frame.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_server(event: &ServerEvent) -> Result<String, ProtocolError> {
    serde_json::to_string(event).map_err(ProtocolError::Encode)
}
