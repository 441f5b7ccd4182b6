use std::sync::Arc;

use anyhow::Context;
use comms::{
    command::UserCommand,
    event::{self, Event},
};
use tokio::sync::mpsc;
use tracing::debug;

use crate::hub::{ChatHub, ConnectionHandle, ConnectionId};

pub(super) struct ChatSession {
    connection: ConnectionHandle,
    hub: Arc<ChatHub>,
    mpsc_rx: mpsc::Receiver<Event>,
}

impl ChatSession {
    pub fn new(connection_id: ConnectionId, hub: Arc<ChatHub>, outbox_capacity: usize) -> Self {
        let (connection, mpsc_rx) = ConnectionHandle::with_outbox(connection_id, outbox_capacity);

        ChatSession {
            connection,
            hub,
            mpsc_rx,
        }
    }

    pub fn connection_id(&self) -> &ConnectionId {
        self.connection.id()
    }

    /// Handle a user command by invoking the matching hub operation
    ///
    /// # Returns
    ///
    /// The reply to write back to this connection only, if the command has one.
    /// Failed operations are answered with an error event, the session keeps going.
    pub async fn handle_user_command(&mut self, cmd: UserCommand) -> Option<Event> {
        let connection_id = self.connection.id();

        let result = match cmd {
            UserCommand::JoinChatRoom(cmd) => {
                self.hub.join_chat_room(&self.connection, &cmd.name).await
            }
            UserCommand::SendMessage(cmd) => {
                self.hub.send_message(connection_id, &cmd.message).await
            }
            UserCommand::LeaveChatRoom(_) => self.hub.leave_chat_room(connection_id).await,
            UserCommand::SetTyping(cmd) => {
                self.hub.set_typing(connection_id, cmd.is_typing).await;
                Ok(())
            }
            UserCommand::GetUsers(_) => {
                return Some(Event::Users(event::UsersReplyEvent {
                    users: self.hub.get_users().await,
                }));
            }
            // quitting is handled by the session loop, it ends the connection
            UserCommand::Quit(_) => Ok(()),
        };

        match result {
            Ok(()) => None,
            Err(err) => {
                debug!(%connection_id, error = %err, "rejected user command");
                Some(err.into())
            }
        }
    }

    /// Run the disconnect cleanup of the hub for this connection
    pub async fn disconnect(&self) {
        self.hub.disconnect(self.connection.id()).await;
    }

    /// Receive an event that the hub pushed to this connection's outbox
    pub async fn recv(&mut self) -> anyhow::Result<Event> {
        self.mpsc_rx
            .recv()
            .await
            .context("could not recv from the outbox channel")
    }
}
