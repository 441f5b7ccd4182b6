/// Transport over byte streams for a client to be able to interact with the server
#[cfg(feature = "client")]
pub mod client;
#[cfg(any(feature = "client", feature = "server"))]
mod common;
/// Transport over byte streams for a server to interact with a single client connection
#[cfg(feature = "server")]
pub mod server;
