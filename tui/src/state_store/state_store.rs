use std::time::Duration;

use anyhow::{anyhow, Context};
use comms::{
    command::{self, UserCommand},
    transport::{
        self,
        client::{CommandWriter, EventStream},
    },
};
use tokio::{
    net::TcpStream,
    sync::{
        broadcast,
        mpsc::{self, UnboundedReceiver, UnboundedSender},
    },
    time::{sleep, Instant},
};
use tokio_stream::StreamExt;

use crate::{Interrupted, Terminator};

use super::{action::Action, State};

/// How long the message box has to stay untouched before the typing signal is withdrawn
const TYPING_QUIET_PERIOD: Duration = Duration::from_secs(1);

pub struct StateStore {
    state_tx: UnboundedSender<State>,
    server_addr: String,
    preferred_name: String,
}

impl StateStore {
    pub fn new(server_addr: String, preferred_name: String) -> (Self, UnboundedReceiver<State>) {
        let (state_tx, state_rx) = mpsc::unbounded_channel::<State>();

        (
            StateStore {
                state_tx,
                server_addr,
                preferred_name,
            },
            state_rx,
        )
    }
}

type ServerHandle = (EventStream, CommandWriter);

async fn create_server_handle(addr: &str) -> anyhow::Result<ServerHandle> {
    let stream = TcpStream::connect(addr).await?;
    let (event_stream, command_writer) = transport::client::split_tcp_stream(stream);

    Ok((event_stream, command_writer))
}

async fn set_typing(command_writer: &mut CommandWriter, is_typing: bool) -> anyhow::Result<()> {
    command_writer
        .write(&UserCommand::SetTyping(command::SetTypingCommand {
            is_typing,
        }))
        .await
        .context("could not send the typing status")
}

impl StateStore {
    pub async fn main_loop(
        self,
        mut terminator: Terminator,
        mut action_rx: UnboundedReceiver<Action>,
        mut interrupt_rx: broadcast::Receiver<Interrupted>,
    ) -> anyhow::Result<Interrupted> {
        let mut opt_server_handle: Option<ServerHandle> = None;
        let mut state = State::new(self.server_addr.clone(), self.preferred_name.clone());

        // the initial state once
        self.state_tx.send(state.clone())?;

        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        // armed while a `SetTyping(true)` is waiting to be withdrawn
        let typing_timeout = sleep(TYPING_QUIET_PERIOD);
        tokio::pin!(typing_timeout);
        let mut typing_armed = false;

        let result = loop {
            if let Some((event_stream, command_writer)) = opt_server_handle.as_mut() {
                let outcome: anyhow::Result<()> = tokio::select! {
                    // Handle the server events as they come in
                    maybe_event = event_stream.next() => match maybe_event {
                        Some(Ok(event)) => {
                            state.handle_server_event(&event);
                            Ok(())
                        },
                        // server disconnected, we need to reset the state
                        None => Err(anyhow!("server closed the connection")),
                        Some(Err(err)) if err.downcast_ref::<std::io::Error>().is_some() => Err(err),
                        // an event this client does not understand, skip it
                        Some(Err(_)) => Ok(()),
                    },
                    // Handle the actions coming from the UI
                    // and process them to do async operations
                    Some(action) = action_rx.recv() => match action {
                        Action::JoinChatRoom { name } => {
                            let name = name.trim().to_string();
                            if name.is_empty() {
                                Ok(())
                            } else {
                                let joined = command_writer
                                    .write(&UserCommand::JoinChatRoom(command::JoinChatRoomCommand {
                                        name: name.clone(),
                                    }))
                                    .await
                                    .context("could not join the chat room");
                                state.mark_joined(name);

                                // the roster broadcast may have raced the join, ask for it
                                match joined {
                                    Ok(()) => command_writer
                                        .write(&UserCommand::GetUsers(command::GetUsersCommand))
                                        .await
                                        .context("could not request the user list"),
                                    Err(err) => Err(err),
                                }
                            }
                        },
                        Action::SendMessage { content } => {
                            if content.trim().is_empty() || !state.has_joined {
                                Ok(())
                            } else {
                                typing_armed = false;

                                match command_writer
                                    .write(&UserCommand::SendMessage(command::SendMessageCommand {
                                        message: content,
                                    }))
                                    .await
                                    .context("could not send message")
                                {
                                    Ok(()) => set_typing(command_writer, false).await,
                                    Err(err) => Err(err),
                                }
                            }
                        },
                        Action::KeyStroke => {
                            if state.has_joined {
                                typing_timeout.as_mut().reset(Instant::now() + TYPING_QUIET_PERIOD);
                                typing_armed = true;

                                set_typing(command_writer, true).await
                            } else {
                                Ok(())
                            }
                        },
                        Action::LeaveChatRoom => {
                            typing_armed = false;
                            state.mark_left();

                            command_writer
                                .write(&UserCommand::LeaveChatRoom(command::LeaveChatRoomCommand))
                                .await
                                .context("could not leave the chat room")
                        },
                        Action::Exit => {
                            // best effort, the server cleans up on disconnect anyway
                            let _ = command_writer
                                .write(&UserCommand::Quit(command::QuitCommand))
                                .await;
                            let _ = terminator.terminate(Interrupted::UserInt);

                            break Interrupted::UserInt;
                        },
                        Action::ConnectToServerRequest { .. } => Ok(()),
                    },
                    // Withdraw the typing signal once the message box has been quiet long enough
                    () = &mut typing_timeout, if typing_armed => {
                        typing_armed = false;

                        set_typing(command_writer, false).await
                    },
                    // Tick to terminate the select every N milliseconds
                    _ = ticker.tick() => {
                        state.tick_timer();
                        Ok(())
                    },
                    // Catch and handle interrupt signal to gracefully shutdown
                    Ok(interrupted) = interrupt_rx.recv() => {
                        break interrupted;
                    }
                };

                if let Err(err) = outcome {
                    opt_server_handle = None;
                    typing_armed = false;
                    state.process_disconnect(format!("{:#}", err));
                }
            } else {
                tokio::select! {
                    Some(action) = action_rx.recv() => match action {
                        Action::ConnectToServerRequest { addr } => {
                            state.mark_connection_request_start();
                            // emit event to re-render any part depending on the connection status
                            self.state_tx.send(state.clone())?;

                            match create_server_handle(&addr).await {
                                Ok(server_handle) => {
                                    // set the server handle and change status for further processing
                                    let _ = opt_server_handle.insert(server_handle);
                                    state.process_connection_request_result(Ok(addr));
                                    // ticker needs to be resetted to avoid showing time spent inputting and connecting to the server address
                                    ticker.reset();
                                },
                                Err(err) => {
                                    state.process_connection_request_result(Err(err));
                                }
                            }
                        },
                        Action::Exit => {
                            let _ = terminator.terminate(Interrupted::UserInt);

                            break Interrupted::UserInt;
                        },
                        _ => (),
                    },
                    // Catch and handle interrupt signal to gracefully shutdown
                    Ok(interrupted) = interrupt_rx.recv() => {
                        break interrupted;
                    }
                }
            }

            self.state_tx.send(state.clone())?;
        };

        Ok(result)
    }
}
