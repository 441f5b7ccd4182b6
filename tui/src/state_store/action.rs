/// Actions the UI asks the [super::StateStore] to carry out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ConnectToServerRequest { addr: String },
    JoinChatRoom { name: String },
    SendMessage { content: String },
    /// The message box was edited while joined
    KeyStroke,
    LeaveChatRoom,
    Exit,
}
