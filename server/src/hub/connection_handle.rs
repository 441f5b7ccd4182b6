use std::fmt;

use comms::event::Event;
use nanoid::nanoid;
use tokio::sync::mpsc;

/// Opaque, server assigned identity of a single live connection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn generate() -> Self {
        ConnectionId(nanoid!())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        ConnectionId(String::from(value))
    }
}

#[derive(Debug, Clone)]
/// [ConnectionHandle] pairs a connection identity with the sending side of its outbox.
///
/// The hub keeps a clone of the handle's outbox in the room group while the connection is joined,
/// the session that owns the connection drains the receiving side onto the socket.
pub struct ConnectionHandle {
    /// The identity of the connection
    id: ConnectionId,
    /// The channel to use for sending events to this connection only
    outbox: mpsc::Sender<Event>,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, outbox: mpsc::Sender<Event>) -> Self {
        ConnectionHandle { id, outbox }
    }

    /// Create a handle together with a fresh bounded outbox
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn with_outbox(id: ConnectionId, capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (outbox, outbox_rx) = mpsc::channel(capacity);

        (ConnectionHandle::new(id, outbox), outbox_rx)
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub(super) fn outbox(&self) -> &mpsc::Sender<Event> {
        &self.outbox
    }
}
