/// Set of commands which the chat hub can receive and process
pub mod command;
/// Set of events split into Broadcast and Reply events according to their audience
pub mod event;
/// Implementation of event and command transportation as JSON lines over byte streams.
/// Requires 'server' or 'client' features to be enabled and will bring in tokio dependency alongside with other dependencies
pub mod transport;
