use chrono::{DateTime, Utc};
use circular_queue::CircularQueue;
use comms::event::{self, RoomParticipationStatus};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBoxItem {
    Message {
        username: String,
        content: String,
        timestamp: DateTime<Utc>,
        /// Sent under the local display name
        mine: bool,
    },
    Notification(String),
}

const MAX_MESSAGES_TO_STORE: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerConnectionStatus {
    Uninitalized,
    Connecting,
    Connected { addr: String },
    Errored { err: String },
}

/// State holds the state of the application
#[derive(Debug, Clone)]
pub struct State {
    pub server_connection_status: ServerConnectionStatus,
    /// Address offered on the connect page
    pub server_addr: String,
    /// Identity assigned by the server on connect
    pub connection_id: String,
    /// Set when a join is sent, cleared on leave or disconnect
    pub has_joined: bool,
    /// The name last used to join, offered again for the next join
    pub preferred_name: String,
    /// Distinct display names of the room members
    pub users: Vec<String>,
    /// History of recorded messages
    pub messages: CircularQueue<MessageBoxItem>,
    /// Who the typing indicator currently shows
    pub typing_user: Option<String>,
    /// Timer since the connection was made
    pub timer: usize,
}

impl State {
    pub fn new(server_addr: String, preferred_name: String) -> Self {
        State {
            server_connection_status: ServerConnectionStatus::Uninitalized,
            server_addr,
            connection_id: String::new(),
            has_joined: false,
            preferred_name,
            users: Vec::new(),
            messages: CircularQueue::with_capacity(MAX_MESSAGES_TO_STORE),
            typing_user: None,
            timer: 0,
        }
    }

    pub fn handle_server_event(&mut self, event: &event::Event) {
        match event {
            event::Event::LoginSuccessful(event) => {
                self.connection_id = event.connection_id.clone();
            }
            event::Event::RoomParticipation(event) => {
                self.messages.push(MessageBoxItem::Notification(format!(
                    "{} has {} the room",
                    event.username,
                    match event.status {
                        RoomParticipationStatus::Joined => "joined",
                        RoomParticipationStatus::Left => "left",
                    }
                )));
            }
            event::Event::UserMessage(event) => {
                self.messages.push(MessageBoxItem::Message {
                    username: event.username.clone(),
                    content: event.content.clone(),
                    timestamp: event.timestamp,
                    mine: self.is_local_name(&event.username),
                });
            }
            event::Event::UserTyping(event) => {
                if self.is_local_name(&event.username) {
                    return;
                }

                if event.is_typing {
                    self.typing_user = Some(event.username.clone());
                } else if self.typing_user.as_deref() == Some(event.username.as_str()) {
                    self.typing_user = None;
                }
            }
            event::Event::UserList(event::UserListBroadcastEvent { users })
            | event::Event::Users(event::UsersReplyEvent { users }) => {
                self.users = users.clone();
            }
            event::Event::Error(event) => {
                self.messages.push(MessageBoxItem::Notification(format!(
                    "error: {}",
                    event.message
                )));
            }
        }
    }

    fn is_local_name(&self, username: &str) -> bool {
        self.has_joined && self.preferred_name == username
    }

    pub fn mark_connection_request_start(&mut self) {
        self.server_connection_status = ServerConnectionStatus::Connecting;
    }

    /// Processes the result of a connection request to change the state of the application
    pub fn process_connection_request_result(&mut self, result: anyhow::Result<String>) {
        self.server_connection_status = match result {
            Ok(addr) => {
                self.server_addr = addr.clone();
                ServerConnectionStatus::Connected { addr }
            }
            Err(err) => ServerConnectionStatus::Errored {
                err: err.to_string(),
            },
        }
    }

    /// Forgets everything tied to the lost connection, keeping the address and the name
    pub fn process_disconnect(&mut self, reason: String) {
        let mut state = State::new(
            std::mem::take(&mut self.server_addr),
            std::mem::take(&mut self.preferred_name),
        );
        state.server_connection_status = ServerConnectionStatus::Errored { err: reason };

        *self = state;
    }

    pub fn mark_joined(&mut self, name: String) {
        self.preferred_name = name;
        self.has_joined = true;
    }

    pub fn mark_left(&mut self) {
        self.has_joined = false;
        self.users.clear();
        self.typing_user = None;
    }

    pub fn tick_timer(&mut self) {
        self.timer += 1;
    }
}
