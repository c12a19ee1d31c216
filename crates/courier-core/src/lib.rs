//! # courier-core
//!
//! Presence tracking and message relay for the Courier service.
//!
//! This crate provides the fundamental building blocks:
//!
//! - **PresenceRegistry** - maps user identities to active connections
//! - **RelayDispatcher** - forwards payloads to a recipient's connection
//! - **Session** - per-connection lifecycle wiring events to the registry
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌──────────────────┐
//! │   Session   │────▶│  Registry   │◀────│ RelayDispatcher  │
//! └─────────────┘     └─────────────┘     └──────────────────┘
//!        │                                         │
//!        ▼                                         ▼
//!  register / cleanup                     ConnectionHandle.deliver
//! ```
//!
//! The registry is an explicitly owned instance shared via `Arc`; there is
//! no process-global state, and nothing is persisted across restarts.

pub mod connection;
pub mod registry;
pub mod relay;
pub mod session;

pub use connection::{ConnectionHandle, ConnectionId};
pub use registry::PresenceRegistry;
pub use relay::RelayDispatcher;
pub use session::{EventOutcome, Session, SessionPhase};
