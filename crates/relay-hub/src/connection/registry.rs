//! Connection registry
//!
//! The authoritative, concurrency-safe set of live connections, keyed by
//! connection id. Uses `DashMap` so membership changes are atomic with
//! respect to concurrent broadcast snapshots.

use super::{Connection, ConnectionId};
use dashmap::DashMap;
use std::sync::Arc;

/// Registry of currently live connections.
///
/// Membership mutates in exactly two places: insert when a connection
/// transitions to `Open`, remove when it reaches `Closed`. At any instant
/// the registry therefore holds exactly the connections in state `Open` or
/// `Closing` — never `Connecting`, never `Closed`.
///
/// Owned by one [`Hub`](crate::hub::Hub) instance; never a process-wide
/// singleton.
pub struct Registry<C> {
    connections: DashMap<ConnectionId, Arc<Connection<C>>>,
}

impl<C> Registry<C> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a connection.
    pub(crate) fn insert(&self, connection: Arc<Connection<C>>) {
        let id = connection.id();
        self.connections.insert(id, connection);
        tracing::debug!(connection_id = %id, "connection registered");
    }

    /// Deregister a connection.
    pub(crate) fn remove(&self, id: ConnectionId) -> Option<Arc<Connection<C>>> {
        let removed = self.connections.remove(&id).map(|(_, conn)| conn);
        if removed.is_some() {
            tracing::debug!(connection_id = %id, "connection deregistered");
        }
        removed
    }

    /// Look up a connection by id.
    pub fn get(&self, id: ConnectionId) -> Option<Arc<Connection<C>>> {
        self.connections.get(&id).map(|r| r.clone())
    }

    /// Check whether an id is currently registered.
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Number of live connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Point-in-time snapshot of the membership.
    ///
    /// Broadcast iterates the snapshot, not the live map, so connections
    /// joining mid-broadcast are excluded and removals cannot invalidate
    /// the iteration.
    pub fn snapshot(&self) -> Vec<Arc<Connection<C>>> {
        self.connections.iter().map(|r| r.value().clone()).collect()
    }
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("connections", &self.connections.len())
            .finish()
    }
}
