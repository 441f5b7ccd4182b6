use std::{sync::Arc, time::Duration};

use anyhow::Context;
use comms::{
    command::UserCommand,
    event::{self, Event},
    transport::{self, server::CommandStream, server::EventWriter},
};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::broadcast,
};
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

use crate::hub::{ChatHub, ConnectionId};

use self::chat_session::ChatSession;

mod chat_session;

/// How long a single event may take to reach a client before the session gives up on it
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Given a client stream and the chat hub, handles the connection
/// until the client quits, or the stream is closed for some reason, or the server shuts down
///
/// However the session ends, the hub's disconnect cleanup runs for the connection,
/// so the other users are notified if the connection had joined.
pub async fn handle_user_session<S>(
    hub: Arc<ChatHub>,
    outbox_capacity: usize,
    quit_rx: broadcast::Receiver<()>,
    stream: S,
) -> anyhow::Result<()>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let connection_id = ConnectionId::generate();
    // Split the stream into a command stream and an event writer with better ergonomics
    let (commands, mut event_writer) = transport::server::split_stream(stream);

    // Chat Session abstracts the hub interaction and the outbox of this connection
    let mut chat_session = ChatSession::new(connection_id, hub, outbox_capacity);

    info!(connection_id = %chat_session.connection_id(), "connection opened");

    let result = run_session(
        &mut chat_session,
        commands,
        &mut event_writer,
        quit_rx,
        WRITE_TIMEOUT,
    )
    .await;

    chat_session.disconnect().await;

    match result.as_ref() {
        Ok(()) => info!(connection_id = %chat_session.connection_id(), "connection closed"),
        Err(err) => {
            warn!(connection_id = %chat_session.connection_id(), error = ?err, "connection closed with error")
        }
    }

    result
}

async fn run_session<W>(
    chat_session: &mut ChatSession,
    mut commands: CommandStream,
    event_writer: &mut EventWriter<W>,
    mut quit_rx: broadcast::Receiver<()>,
    write_timeout: Duration,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    // Welcoming the connection with its server assigned identity
    let welcome = Event::LoginSuccessful(event::LoginSuccessfulReplyEvent {
        connection_id: String::from(chat_session.connection_id().as_str()),
    });
    write_event(event_writer, &welcome, write_timeout).await?;

    loop {
        tokio::select! {
            cmd = commands.next() => match cmd {
                // If the client closes the stream, or sends a quit cmd
                // the caller runs the disconnect cleanup so other users are notified about the departure
                None | Some(Ok(UserCommand::Quit(_))) => break,
                // Handle a valid user command, replies are only written to this connection
                Some(Ok(cmd)) => {
                    if let Some(reply) = chat_session.handle_user_command(cmd).await {
                        write_event(event_writer, &reply, write_timeout).await?;
                    }
                }
                // The stream itself failed, there is nothing left to read
                Some(Err(err)) if err.downcast_ref::<std::io::Error>().is_some() => {
                    return Err(err);
                }
                // A line that is not a known command, skip it and keep the session alive
                Some(Err(err)) => {
                    warn!(connection_id = %chat_session.connection_id(), error = ?err, "skipping unreadable command");
                }
            },
            // Events pushed by the hub are sent to the client
            Ok(event) = chat_session.recv() => {
                write_event(event_writer, &event, write_timeout).await?;
            }
            // If the server is shutting down, stop serving the connection
            Ok(_) = quit_rx.recv() => {
                debug!(connection_id = %chat_session.connection_id(), "server is shutting down, closing the connection");
                break;
            }
        }
    }

    Ok(())
}

/// Write one event, failing when the client does not take it within `write_timeout`
async fn write_event<W>(
    event_writer: &mut EventWriter<W>,
    event: &Event,
    write_timeout: Duration,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    tokio::time::timeout(write_timeout, event_writer.write(event))
        .await
        .context("timed out writing an event to the client")?
}
