//! # courier-protocol
//!
//! Wire event definitions for the Courier presence and relay service.
//!
//! Events are JSON objects exchanged over WebSocket text frames, tagged by
//! an `event` field. The event names are the wire contract; they match the
//! deployed clients exactly, including the historical misspelling of
//! `msg-recieve`.
//!
//! ## Events
//!
//! - `add-user` - register a user identity for presence
//! - `send-msg` - relay a payload to a recipient
//! - `msg-recieve` - server-to-client delivery of a relayed payload
//!
//! ## Example
//!
//! ```rust
//! use courier_protocol::{codec, ClientEvent};
//!
//! let event = codec::decode_client(r#"{"event":"add-user","userId":"alice"}"#).unwrap();
//! assert!(matches!(event, ClientEvent::AddUser { .. }));
//! ```

pub mod codec;
pub mod events;

pub use codec::{decode_client, encode_server, ProtocolError};
pub use events::{ClientEvent, ServerEvent};
