use std::collections::{BTreeSet, HashMap};

use super::connection_handle::ConnectionId;

/// [PresenceRegistry] keeps track of which display name each joined connection uses
///
/// A connection has at most one entry. Display names are not unique, several connections
/// may share one, which is why the user list is de-duplicated by name rather than by connection.
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    names: HashMap<ConnectionId, String>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        PresenceRegistry {
            names: HashMap::new(),
        }
    }

    /// Record the display name of a connection, returns the name it replaced if it had joined before
    pub fn insert(&mut self, connection_id: ConnectionId, name: String) -> Option<String> {
        self.names.insert(connection_id, name)
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&str> {
        self.names.get(connection_id).map(String::as_str)
    }

    /// Removes the entry of a connection and returns its display name
    /// Returns None if the connection has no entry, e.g. it never joined or already left
    pub fn remove(&mut self, connection_id: &ConnectionId) -> Option<String> {
        self.names.remove(connection_id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Distinct display names in ascending lexical order
    pub fn unique_names(&self) -> Vec<String> {
        self.names
            .values()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect()
    }
}
