use chrono::Utc;
use comms::event::{self, Event};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{
    connection_handle::{ConnectionHandle, ConnectionId},
    error::{HubError, RequiredField},
    presence_registry::PresenceRegistry,
    room_group::RoomGroup,
};

/// [ChatHub] owns the presence registry and the room group of the single chat room
///
/// Every operation locks the registry once for its read or mutation and then broadcasts.
/// The broadcast is not atomic with the mutation, a user list published by a concurrent
/// operation may be stale until the next membership change recomputes it.
/// The two locks are never held at the same time.
#[derive(Debug, Default)]
pub struct ChatHub {
    presence: Mutex<PresenceRegistry>,
    group: Mutex<RoomGroup>,
}

impl ChatHub {
    pub fn new() -> Self {
        ChatHub {
            presence: Mutex::new(PresenceRegistry::new()),
            group: Mutex::new(RoomGroup::new()),
        }
    }

    /// Record the display name of the connection, add it to the room group
    /// and broadcast that it joined followed by the refreshed user list
    ///
    /// Joining again from the same connection replaces its display name.
    pub async fn join_chat_room(
        &self,
        connection: &ConnectionHandle,
        name: &str,
    ) -> Result<(), HubError> {
        if name.trim().is_empty() {
            return Err(HubError::Validation(RequiredField::Username));
        }

        let replaced = self
            .presence
            .lock()
            .await
            .insert(connection.id().clone(), String::from(name));

        let members = {
            let mut group = self.group.lock().await;
            group.add(connection);
            group.len()
        };

        info!(connection_id = %connection.id(), name, ?replaced, members, "user joined the chat room");

        self.broadcast(Event::RoomParticipation(
            event::RoomParticipationBroadcastEvent {
                username: String::from(name),
                status: event::RoomParticipationStatus::Joined,
            },
        ))
        .await;
        self.broadcast_user_list().await;

        Ok(())
    }

    /// Broadcast a message of the connection to every member, the sender included
    pub async fn send_message(
        &self,
        connection_id: &ConnectionId,
        message: &str,
    ) -> Result<(), HubError> {
        if message.trim().is_empty() {
            return Err(HubError::Validation(RequiredField::Message));
        }

        let username = self
            .display_name(connection_id)
            .await
            .ok_or(HubError::MissingPresence)?;

        self.broadcast(Event::UserMessage(event::UserMessageBroadcastEvent {
            username,
            content: String::from(message),
            timestamp: Utc::now(),
        }))
        .await;

        Ok(())
    }

    /// Remove the connection from the room group and the registry,
    /// then broadcast that it left followed by the refreshed user list
    pub async fn leave_chat_room(&self, connection_id: &ConnectionId) -> Result<(), HubError> {
        self.remove_presence(connection_id)
            .await
            .map(|_| ())
            .ok_or(HubError::MissingPresence)
    }

    /// Cleanup for a connection that went away, however it went away
    ///
    /// Has the same visible effects as [ChatHub::leave_chat_room] if the connection had joined,
    /// a connection that never joined or already left is only dropped from the group.
    pub async fn disconnect(&self, connection_id: &ConnectionId) {
        if self.remove_presence(connection_id).await.is_none() {
            debug!(%connection_id, "disconnected connection had no presence entry");
        }
    }

    /// Tell every other member that the connection started or stopped typing
    /// Silently ignored if the connection has not joined
    pub async fn set_typing(&self, connection_id: &ConnectionId, is_typing: bool) {
        let Some(username) = self.display_name(connection_id).await else {
            debug!(%connection_id, "ignoring typing signal of a connection that has not joined");
            return;
        };

        let event = Event::UserTyping(event::UserTypingBroadcastEvent {
            username,
            is_typing,
            timestamp: Utc::now(),
        });

        self.group
            .lock()
            .await
            .broadcast_to_others(connection_id, &event);
    }

    /// Distinct display names of the joined connections in ascending order
    pub async fn get_users(&self) -> Vec<String> {
        self.presence.lock().await.unique_names()
    }

    async fn display_name(&self, connection_id: &ConnectionId) -> Option<String> {
        self.presence
            .lock()
            .await
            .get(connection_id)
            .map(String::from)
    }

    /// Shared by leave and disconnect. The registry entry is removed in a single step,
    /// so only one of two racing callers observes the name and broadcasts the departure.
    async fn remove_presence(&self, connection_id: &ConnectionId) -> Option<String> {
        let username = self.presence.lock().await.remove(connection_id);

        self.group.lock().await.remove(connection_id);

        let username = username?;

        info!(%connection_id, name = %username, "user left the chat room");

        self.broadcast(Event::RoomParticipation(
            event::RoomParticipationBroadcastEvent {
                username: username.clone(),
                status: event::RoomParticipationStatus::Left,
            },
        ))
        .await;
        self.broadcast_user_list().await;

        Some(username)
    }

    async fn broadcast_user_list(&self) {
        let users = self.get_users().await;

        self.broadcast(Event::UserList(event::UserListBroadcastEvent { users }))
            .await;
    }

    async fn broadcast(&self, event: Event) {
        self.group.lock().await.broadcast(&event);
    }
}
