//! Connection Registry
//!
//! Maps user ids to the one live connection that receives pushes for them.
//! Entries are created on `authenticate`, removed when the owning connection
//! closes, and never persisted.

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::ServerEvent;

/// Outgoing queue of a connection, drained by its writer task.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Push handle for one connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    connection_id: Uuid,
    sender: EventSender,
}

impl ConnectionHandle {
    pub fn new(connection_id: Uuid, sender: EventSender) -> Self {
        Self {
            connection_id,
            sender,
        }
    }

    pub fn connection_id(&self) -> Uuid {
        self.connection_id
    }

    /// Queue `event`; false once the writer side has gone away.
    pub fn send(&self, event: ServerEvent) -> bool {
        self.sender.send(event).is_ok()
    }

    pub fn is_open(&self) -> bool {
        !self.sender.is_closed()
    }
}

/// Single owner per user: registering again replaces the previous handle.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: DashMap<i64, ConnectionHandle>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `user_id` to `handle`, returning the handle it displaced.
    ///
    /// The displaced connection stays open; it just stops receiving pushes.
    pub fn register(&self, user_id: i64, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        let previous = self.connections.insert(user_id, handle);
        if let Some(ref old) = previous {
            tracing::debug!(
                user_id,
                replaced_connection = %old.connection_id,
                "Registry entry replaced"
            );
        }
        previous
    }

    /// Remove whatever is bound to `user_id`.
    pub fn unregister(&self, user_id: i64) -> Option<ConnectionHandle> {
        self.connections.remove(&user_id).map(|(_, handle)| handle)
    }

    /// Remove the binding only if it still belongs to `connection_id`.
    ///
    /// A connection closing after a newer one took over must not evict it.
    pub fn unregister_connection(&self, user_id: i64, connection_id: Uuid) -> bool {
        self.connections
            .remove_if(&user_id, |_, handle| handle.connection_id == connection_id)
            .is_some()
    }

    /// Live handle for `user_id`, if any.
    pub fn lookup(&self, user_id: i64) -> Option<ConnectionHandle> {
        self.connections
            .get(&user_id)
            .filter(|handle| handle.is_open())
            .map(|handle| handle.clone())
    }

    pub fn is_online(&self, user_id: i64) -> bool {
        self.lookup(user_id).is_some()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}
