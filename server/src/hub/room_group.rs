use std::collections::HashMap;

use comms::event::Event;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use super::connection_handle::{ConnectionHandle, ConnectionId};

#[derive(Debug, Default)]
/// [RoomGroup] is the set of connections that currently receive the chat room broadcasts
///
/// Delivery is fire-and-forget. A member whose outbox is full or closed misses that one event,
/// the other members and the broadcasting connection are unaffected.
pub struct RoomGroup {
    members: HashMap<ConnectionId, mpsc::Sender<Event>>,
}

impl RoomGroup {
    pub fn new() -> Self {
        RoomGroup {
            members: HashMap::new(),
        }
    }

    /// Add a connection to the group, returns true if it was not a member yet
    pub fn add(&mut self, connection: &ConnectionHandle) -> bool {
        self.members
            .insert(connection.id().clone(), connection.outbox().clone())
            .is_none()
    }

    /// Remove a connection from the group, returns true if it was a member
    pub fn remove(&mut self, connection_id: &ConnectionId) -> bool {
        self.members.remove(connection_id).is_some()
    }

    #[cfg(test)]
    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.members.contains_key(connection_id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Send an event to every member, returns how many members accepted it
    pub fn broadcast(&self, event: &Event) -> usize {
        self.members
            .iter()
            .filter(|(connection_id, outbox)| deliver(connection_id, outbox, event))
            .count()
    }

    /// Send an event to every member except `origin`, returns how many members accepted it
    pub fn broadcast_to_others(&self, origin: &ConnectionId, event: &Event) -> usize {
        self.members
            .iter()
            .filter(|(connection_id, _)| *connection_id != origin)
            .filter(|(connection_id, outbox)| deliver(connection_id, outbox, event))
            .count()
    }
}

fn deliver(connection_id: &ConnectionId, outbox: &mpsc::Sender<Event>, event: &Event) -> bool {
    match outbox.try_send(event.clone()) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            warn!(%connection_id, "outbox is full, dropping event for slow member");
            false
        }
        Err(TrySendError::Closed(_)) => {
            debug!(%connection_id, "outbox is closed, member is going away");
            false
        }
    }
}
