//! Single room chat hub.
//!
//! - [`hub`] holds the presence registry and the room group, and implements
//!   join, send, leave, typing and user list operations.
//! - [`session`] drives one client connection: it reads commands, invokes the hub
//!   and writes events back.
//! - [`server`] accepts connections and shuts the sessions down gracefully.
//! - [`config`] parses the command line and environment configuration.

pub mod config;
pub mod hub;
pub mod server;
pub mod session;
