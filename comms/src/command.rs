use serde::{Deserialize, Serialize};

/// User Command for joining the chat room under a display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinChatRoomCommand {
    // The display name to join with.
    #[serde(rename = "n")]
    pub name: String,
}

/// User Command for sending a message to everyone in the chat room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendMessageCommand {
    // The text of the message.
    #[serde(rename = "m")]
    pub message: String,
}

/// User Command for leaving the chat room while keeping the connection open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveChatRoomCommand;

/// User Command for signalling that the user started or stopped typing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetTypingCommand {
    #[serde(rename = "it")]
    pub is_typing: bool,
}

/// User Command for fetching the current user list. Answered only to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetUsersCommand;

/// User Command for quitting the whole chat session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuitCommand;

/// A user command which can be sent to the server by a single connection.
/// All commands are processed by the chat hub in the context of the connection that sent them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "_ct", rename_all = "snake_case")]
pub enum UserCommand {
    JoinChatRoom(JoinChatRoomCommand),
    SendMessage(SendMessageCommand),
    LeaveChatRoom(LeaveChatRoomCommand),
    SetTyping(SetTypingCommand),
    GetUsers(GetUsersCommand),
    Quit(QuitCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    // given a command enum, and an expect string, asserts that command is serialized / deserialized appropiately
    fn assert_command_serialization(command: &UserCommand, expected: &str) {
        let serialized = serde_json::to_string(&command).unwrap();
        assert_eq!(serialized, expected);
        let deserialized: UserCommand = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, *command);
    }

    #[test]
    fn test_join_chat_room_command() {
        let command = UserCommand::JoinChatRoom(JoinChatRoomCommand {
            name: "alice".to_string(),
        });

        assert_command_serialization(&command, r#"{"_ct":"join_chat_room","n":"alice"}"#);
    }

    #[test]
    fn test_send_message_command() {
        let command = UserCommand::SendMessage(SendMessageCommand {
            message: "hello".to_string(),
        });

        assert_command_serialization(&command, r#"{"_ct":"send_message","m":"hello"}"#);
    }

    #[test]
    fn test_leave_chat_room_command() {
        let command = UserCommand::LeaveChatRoom(LeaveChatRoomCommand);

        assert_command_serialization(&command, r#"{"_ct":"leave_chat_room"}"#);
    }

    #[test]
    fn test_set_typing_command() {
        let command = UserCommand::SetTyping(SetTypingCommand { is_typing: true });

        assert_command_serialization(&command, r#"{"_ct":"set_typing","it":true}"#);
    }

    #[test]
    fn test_get_users_command() {
        let command = UserCommand::GetUsers(GetUsersCommand);

        assert_command_serialization(&command, r#"{"_ct":"get_users"}"#);
    }

    #[test]
    fn test_quit_command() {
        let command = UserCommand::Quit(QuitCommand);

        assert_command_serialization(&command, r#"{"_ct":"quit"}"#);
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        let result = serde_json::from_str::<UserCommand>(r#"{"_ct":"join_room","r":"general"}"#);

        assert!(result.is_err());
    }
}
