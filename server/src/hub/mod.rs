mod chat_hub;
mod connection_handle;
mod error;
mod presence_registry;
mod room_group;

pub use self::chat_hub::ChatHub;
pub use self::connection_handle::{ConnectionHandle, ConnectionId};
pub use self::error::{HubError, RequiredField};
