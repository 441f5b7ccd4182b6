use std::{net::SocketAddr, time::Duration};

use anyhow::{anyhow, Context, Result};
use chat_hub_server::server::ChatServer;
use comms::{
    command::{self, UserCommand},
    event::{self, Event, RoomParticipationStatus},
    transport::{
        self,
        client::{CommandWriter, EventStream},
    },
};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::{tcp::OwnedReadHalf, TcpListener, TcpStream},
    sync::oneshot,
    task::JoinHandle,
    time::timeout,
};
use tokio_stream::StreamExt;

const READ_TIMEOUT: Duration = Duration::from_secs(2);
const SILENCE_TIMEOUT: Duration = Duration::from_millis(200);

struct TestClient {
    connection_id: String,
    events: EventStream,
    commands: CommandWriter,
}

impl TestClient {
    async fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .await
            .context("failed to connect to server")?;
        let (mut events, commands) = transport::client::split_tcp_stream(stream);

        let connection_id = match timeout(READ_TIMEOUT, events.next()).await? {
            Some(Ok(Event::LoginSuccessful(event))) => event.connection_id,
            other => return Err(anyhow!("expected a login event, got {:?}", other)),
        };

        Ok(TestClient {
            connection_id,
            events,
            commands,
        })
    }

    async fn send(&mut self, command: UserCommand) -> Result<()> {
        self.commands.write(&command).await
    }

    async fn join(&mut self, name: &str) -> Result<()> {
        self.send(UserCommand::JoinChatRoom(command::JoinChatRoomCommand {
            name: name.into(),
        }))
        .await
    }

    async fn next_event(&mut self) -> Result<Event> {
        timeout(READ_TIMEOUT, self.events.next())
            .await
            .context("timed out waiting for an event")?
            .context("server closed the connection")?
    }

    async fn expect_silence(&mut self) -> Result<()> {
        match timeout(SILENCE_TIMEOUT, self.events.next()).await {
            Err(_) => Ok(()),
            Ok(event) => Err(anyhow!("expected no event, got {:?}", event)),
        }
    }
}

fn participation(username: &str, status: RoomParticipationStatus) -> Event {
    Event::RoomParticipation(event::RoomParticipationBroadcastEvent {
        username: username.into(),
        status,
    })
}

fn user_list(users: &[&str]) -> Event {
    Event::UserList(event::UserListBroadcastEvent {
        users: users.iter().map(|u| u.to_string()).collect(),
    })
}

async fn start_server() -> Result<(SocketAddr, oneshot::Sender<()>, JoinHandle<Result<()>>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let server = ChatServer::new(listener, 32);
    let addr = server.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(server.run_until(async move {
        let _ = shutdown_rx.await;
    }));

    Ok((addr, shutdown_tx, handle))
}

#[tokio::test]
async fn chat_room_roundtrip() -> Result<()> {
    let (addr, shutdown_tx, server) = start_server().await?;

    let mut alice = TestClient::connect(addr).await?;
    let mut bob = TestClient::connect(addr).await?;
    assert_ne!(alice.connection_id, bob.connection_id);

    alice.join("alice").await?;
    assert_eq!(
        alice.next_event().await?,
        participation("alice", RoomParticipationStatus::Joined)
    );
    assert_eq!(alice.next_event().await?, user_list(&["alice"]));

    // bob has not joined, so the room is not heard yet
    bob.expect_silence().await?;

    bob.join("bob").await?;
    for client in [&mut alice, &mut bob] {
        assert_eq!(
            client.next_event().await?,
            participation("bob", RoomParticipationStatus::Joined)
        );
        assert_eq!(client.next_event().await?, user_list(&["alice", "bob"]));
    }

    // messages reach everyone, the sender included
    alice
        .send(UserCommand::SendMessage(command::SendMessageCommand {
            message: "hello".into(),
        }))
        .await?;
    for client in [&mut alice, &mut bob] {
        match client.next_event().await? {
            Event::UserMessage(message) => {
                assert_eq!(message.username, "alice");
                assert_eq!(message.content, "hello");
            }
            other => panic!("expected a message, got {:?}", other),
        }
    }

    // typing only reaches the others
    bob.send(UserCommand::SetTyping(command::SetTypingCommand {
        is_typing: true,
    }))
    .await?;
    match alice.next_event().await? {
        Event::UserTyping(typing) => {
            assert_eq!(typing.username, "bob");
            assert!(typing.is_typing);
        }
        other => panic!("expected a typing event, got {:?}", other),
    }
    bob.expect_silence().await?;

    // alice drops the connection without leaving
    drop(alice);
    assert_eq!(
        bob.next_event().await?,
        participation("alice", RoomParticipationStatus::Left)
    );
    assert_eq!(bob.next_event().await?, user_list(&["bob"]));

    bob.send(UserCommand::GetUsers(command::GetUsersCommand))
        .await?;
    assert_eq!(
        bob.next_event().await?,
        Event::Users(event::UsersReplyEvent {
            users: vec!["bob".into()]
        })
    );

    let _ = shutdown_tx.send(());
    server.await??;

    Ok(())
}

#[tokio::test]
async fn errors_only_reach_the_caller() -> Result<()> {
    let (addr, shutdown_tx, server) = start_server().await?;

    let mut alice = TestClient::connect(addr).await?;
    let mut stranger = TestClient::connect(addr).await?;

    alice.join("alice").await?;
    alice.next_event().await?;
    alice.next_event().await?;

    stranger.join("   ").await?;
    assert_eq!(
        stranger.next_event().await?,
        Event::Error(event::ErrorReplyEvent {
            message: "username is required".into()
        })
    );

    stranger
        .send(UserCommand::SendMessage(command::SendMessageCommand {
            message: "hi".into(),
        }))
        .await?;
    assert_eq!(
        stranger.next_event().await?,
        Event::Error(event::ErrorReplyEvent {
            message: "user info not found".into()
        })
    );

    // typing while unjoined is silently ignored
    stranger
        .send(UserCommand::SetTyping(command::SetTypingCommand {
            is_typing: true,
        }))
        .await?;
    stranger.expect_silence().await?;

    alice.expect_silence().await?;

    let _ = shutdown_tx.send(());
    server.await??;

    Ok(())
}

#[tokio::test]
async fn leave_twice_reports_missing_presence() -> Result<()> {
    let (addr, shutdown_tx, server) = start_server().await?;

    let mut alice = TestClient::connect(addr).await?;
    let mut bob = TestClient::connect(addr).await?;

    alice.join("alice").await?;
    alice.next_event().await?;
    alice.next_event().await?;
    bob.join("bob").await?;
    for client in [&mut alice, &mut bob] {
        client.next_event().await?;
        client.next_event().await?;
    }

    alice
        .send(UserCommand::LeaveChatRoom(command::LeaveChatRoomCommand))
        .await?;
    alice
        .send(UserCommand::LeaveChatRoom(command::LeaveChatRoomCommand))
        .await?;

    assert_eq!(
        alice.next_event().await?,
        Event::Error(event::ErrorReplyEvent {
            message: "user info not found".into()
        })
    );
    alice.expect_silence().await?;

    assert_eq!(
        bob.next_event().await?,
        participation("alice", RoomParticipationStatus::Left)
    );
    assert_eq!(bob.next_event().await?, user_list(&["bob"]));
    bob.expect_silence().await?;

    let _ = shutdown_tx.send(());
    server.await??;

    Ok(())
}

async fn read_raw_event(lines: &mut Lines<BufReader<OwnedReadHalf>>) -> Result<Event> {
    let line = timeout(READ_TIMEOUT, lines.next_line())
        .await
        .context("timed out waiting for an event")??
        .context("server closed the connection")?;

    Ok(serde_json::from_str(&line)?)
}

#[tokio::test]
async fn unreadable_lines_are_skipped() -> Result<()> {
    let (addr, shutdown_tx, server) = start_server().await?;

    let mut bob = TestClient::connect(addr).await?;
    bob.join("bob").await?;
    bob.next_event().await?;
    bob.next_event().await?;

    let (reader, mut writer) = TcpStream::connect(addr).await?.into_split();
    let mut lines = BufReader::new(reader).lines();
    assert!(matches!(
        read_raw_event(&mut lines).await?,
        Event::LoginSuccessful(_)
    ));

    writer
        .write_all(b"{\"_ct\":\"join_chat_room\",\"n\":\"alice\"}\r\n")
        .await?;
    read_raw_event(&mut lines).await?;
    read_raw_event(&mut lines).await?;

    // neither broken json nor invalid utf-8 ends the session
    writer
        .write_all(b"not json\r\n{\"_ct\":\"send_message\",\"m\":\"\xff\xfe\"}\r\n")
        .await?;
    writer.write_all(b"{\"_ct\":\"get_users\"}\r\n").await?;
    assert_eq!(
        read_raw_event(&mut lines).await?,
        Event::Users(event::UsersReplyEvent {
            users: vec!["alice".into(), "bob".into()]
        })
    );

    // alice is still in the room, bob only saw the join
    assert_eq!(
        bob.next_event().await?,
        participation("alice", RoomParticipationStatus::Joined)
    );
    assert_eq!(bob.next_event().await?, user_list(&["alice", "bob"]));
    bob.expect_silence().await?;

    let _ = shutdown_tx.send(());
    server.await??;

    Ok(())
}

#[tokio::test]
async fn quit_command_and_shutdown_close_connections() -> Result<()> {
    let (addr, shutdown_tx, server) = start_server().await?;

    let mut alice = TestClient::connect(addr).await?;
    let mut bob = TestClient::connect(addr).await?;

    alice.join("alice").await?;
    alice.next_event().await?;
    alice.next_event().await?;

    alice.send(UserCommand::Quit(command::QuitCommand)).await?;
    assert!(timeout(READ_TIMEOUT, alice.events.next()).await?.is_none());

    let _ = shutdown_tx.send(());
    assert!(timeout(READ_TIMEOUT, bob.events.next()).await?.is_none());

    server.await??;

    Ok(())
}
