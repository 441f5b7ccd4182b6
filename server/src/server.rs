use std::{future::Future, net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::{net::TcpListener, sync::broadcast, task::JoinSet};
use tracing::{debug, info, warn};

use crate::{hub::ChatHub, session};

/// [ChatServer] accepts TCP connections and runs one session task per connection
/// against a single shared [ChatHub]
pub struct ChatServer {
    listener: TcpListener,
    hub: Arc<ChatHub>,
    outbox_capacity: usize,
}

impl ChatServer {
    pub fn new(listener: TcpListener, outbox_capacity: usize) -> Self {
        ChatServer {
            listener,
            hub: Arc::new(ChatHub::new()),
            outbox_capacity,
        }
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve connections until `shutdown` resolves, then tell every session to close
    /// and wait for all of them to finish
    pub async fn run_until<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let ChatServer {
            listener,
            hub,
            outbox_capacity,
        } = self;
        let mut join_set: JoinSet<()> = JoinSet::new();
        let (quit_tx, _) = broadcast::channel::<()>(1);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Server interrupted. Gracefully shutting down.");
                    // no sessions may be listening, which is fine
                    let _ = quit_tx.send(());
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((socket, peer)) => {
                        let session = session::handle_user_session(
                            hub.clone(),
                            outbox_capacity,
                            quit_tx.subscribe(),
                            socket,
                        );

                        join_set.spawn(async move {
                            if session.await.is_err() {
                                debug!(%peer, "session of peer ended with error");
                            }
                        });
                    }
                    Err(err) => warn!(error = ?err, "failed to accept connection"),
                },
                // reap finished sessions so the set does not grow with every connection
                Some(result) = join_set.join_next(), if !join_set.is_empty() => {
                    if let Err(err) = result {
                        warn!(error = ?err, "session task failed");
                    }
                }
            }
        }

        while let Some(result) = join_set.join_next().await {
            result.context("session task failed to join")?;
        }

        Ok(())
    }
}
