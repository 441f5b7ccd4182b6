use std::{
    net::{IpAddr, SocketAddr},
    num::NonZeroUsize,
};

use clap::Parser;

/// Single room chat hub with presence and typing indicators
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct ServerConfig {
    /// Interface the server should bind to.
    #[arg(long, env = "CHAT_HUB_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port the server should listen on. Use 0 for an ephemeral port.
    #[arg(long, env = "CHAT_HUB_PORT", default_value_t = 8080)]
    pub port: u16,

    /// How many undelivered events a single connection may queue before
    /// further broadcasts to it are dropped.
    #[arg(long, env = "CHAT_HUB_OUTBOX_CAPACITY", default_value = "100")]
    pub outbox_capacity: NonZeroUsize,
}

impl ServerConfig {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "chat-hub-server",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
            "--outbox-capacity",
            "16",
        ])
        .unwrap();

        assert_eq!(config.listen_addr(), "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.outbox_capacity.get(), 16);
    }

    #[test]
    fn test_zero_outbox_capacity_is_rejected() {
        let result =
            ServerConfig::try_parse_from(["chat-hub-server", "--outbox-capacity", "0"]);

        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let result = ServerConfig::try_parse_from(["chat-hub-server", "--host", "not-an-ip"]);

        assert!(result.is_err());
    }
}
