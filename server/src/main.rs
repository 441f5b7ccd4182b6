use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use chat_hub_server::{config::ServerConfig, server::ChatServer};

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ServerConfig::parse();
    let listener = TcpListener::bind(config.listen_addr())
        .await
        .with_context(|| format!("could not bind to {}", config.listen_addr()))?;
    let server = ChatServer::new(listener, config.outbox_capacity.get());

    info!("Listening on {}", server.local_addr()?);

    server
        .run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(error = ?err, "failed to install ctrl-c handler");
            }
        })
        .await?;

    info!("Server shut down");

    Ok(())
}
