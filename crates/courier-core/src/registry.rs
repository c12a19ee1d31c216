//! Presence registry.
//!
//! Maps user identities to active connection handles. Identities are opaque
//! strings supplied by clients; this subsystem does not validate or
//! authenticate them.
//!
//! A secondary map from connection ID back to identity makes disconnect
//! cleanup O(1) (disconnect events carry only the handle). Both maps are
//! kept consistent on every register/remove, which means a connection holds
//! at most one identity at a time: registering a new identity on the same
//! connection replaces the previous one.

use dashmap::DashMap;
use tracing::debug;

use crate::connection::{ConnectionHandle, ConnectionId};

/// Registry of online users.
///
/// Duplicate registration is last-writer-wins: a later `register` for the
/// same identity silently discards the earlier handle without closing its
/// connection. The stale connection stays open and unaddressable by identity
/// until its own disconnect.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    /// User identity -> active connection handle.
    by_user: DashMap<String, ConnectionHandle>,
    /// Connection ID -> user identity, for disconnect cleanup.
    by_connection: DashMap<ConnectionId, String>,
}

impl PresenceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user identity on a connection, overwriting any prior entry.
    ///
    /// Always succeeds. Returns the displaced handle if the identity was
    /// already registered elsewhere.
    pub fn register(
        &self,
        user_id: impl Into<String>,
        handle: ConnectionHandle,
    ) -> Option<ConnectionHandle> {
        let user_id = user_id.into();
        let connection_id = handle.id();

        // One identity per connection: drop the old identity entry if this
        // connection re-registers under a new name.
        if let Some(previous_user) = self.by_connection.insert(connection_id, user_id.clone()) {
            if previous_user != user_id {
                self.by_user.remove(&previous_user);
                debug!(
                    connection = connection_id,
                    user = %previous_user,
                    "Presence: identity replaced on re-register"
                );
            }
        }

        let displaced = self.by_user.insert(user_id.clone(), handle);
        if let Some(old) = &displaced {
            // The displaced connection no longer maps to this identity.
            if old.id() != connection_id {
                self.by_connection.remove(&old.id());
            }
        }

        debug!(user = %user_id, connection = connection_id, "Presence: user registered");
        displaced
    }

    /// Look up the active connection for a user identity.
    ///
    /// `None` means offline or unregistered.
    #[must_use]
    pub fn lookup(&self, user_id: &str) -> Option<ConnectionHandle> {
        self.by_user.get(user_id).map(|entry| entry.value().clone())
    }

    /// Check whether a user identity is currently registered.
    #[must_use]
    pub fn is_online(&self, user_id: &str) -> bool {
        self.by_user.contains_key(user_id)
    }

    /// Remove a user's entry if present; no-op otherwise.
    pub fn remove(&self, user_id: &str) -> Option<ConnectionHandle> {
        let removed = self.by_user.remove(user_id).map(|(_, handle)| handle);
        if let Some(handle) = &removed {
            self.by_connection.remove(&handle.id());
            debug!(user = %user_id, connection = handle.id(), "Presence: user removed");
        }
        removed
    }

    /// Remove the entry associated with a connection, if any.
    ///
    /// Used on disconnect, which carries only the handle. Returns the
    /// identity that was registered on the connection.
    pub fn remove_by_connection(&self, connection_id: ConnectionId) -> Option<String> {
        let (_, user_id) = self.by_connection.remove(&connection_id)?;
        self.by_user.remove(&user_id);
        debug!(user = %user_id, connection = connection_id, "Presence: user disconnected");
        Some(user_id)
    }

    /// Number of currently registered users.
    #[must_use]
    pub fn online_count(&self) -> usize {
        self.by_user.len()
    }
}
