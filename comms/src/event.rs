use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sent to a connection right after it is accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginSuccessfulReplyEvent {
    /// The server assigned identity of the connection
    #[serde(rename = "cid")]
    pub connection_id: String,
}

/// Users new room participation status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomParticipationStatus {
    Joined,
    Left,
}

/// A user has joined or left the chat room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomParticipationBroadcastEvent {
    /// The display name of the user that has joined or left
    #[serde(rename = "u")]
    pub username: String,
    /// The new status of the user in the room
    #[serde(rename = "s")]
    pub status: RoomParticipationStatus,
}

/// A user has sent a message to the chat room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMessageBroadcastEvent {
    /// The display name of the user that has sent the message
    #[serde(rename = "u")]
    pub username: String,
    /// The content of the message
    #[serde(rename = "c")]
    pub content: String,
    /// When the server received the message, in UTC
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
}

/// A user has started or stopped typing. Never delivered back to the typing user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTypingBroadcastEvent {
    #[serde(rename = "u")]
    pub username: String,
    #[serde(rename = "it")]
    pub is_typing: bool,
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
}

/// The refreshed roster of the room, sent after every membership change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserListBroadcastEvent {
    /// Distinct display names in ascending order
    #[serde(rename = "us")]
    pub users: Vec<String>,
}

/// Answer to a [crate::command::UserCommand::GetUsers] command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsersReplyEvent {
    /// Distinct display names in ascending order
    #[serde(rename = "us")]
    pub users: Vec<String>,
}

/// A command of the receiving connection could not be processed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReplyEvent {
    /// Human readable reason
    #[serde(rename = "m")]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
/// Events that can be sent to the client
/// Broadcast events are sent to every member of the chat room,
/// Reply events only to the connection whose command caused them
pub enum Event {
    LoginSuccessful(LoginSuccessfulReplyEvent),
    RoomParticipation(RoomParticipationBroadcastEvent),
    UserMessage(UserMessageBroadcastEvent),
    UserTyping(UserTypingBroadcastEvent),
    UserList(UserListBroadcastEvent),
    Users(UsersReplyEvent),
    Error(ErrorReplyEvent),
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    // given an event enum, and an expect string, asserts that event is serialized / deserialized appropiately
    fn assert_event_serialization(event: &Event, expected: &str) {
        let serialized = serde_json::to_string(&event).unwrap();
        assert_eq!(serialized, expected);
        let deserialized: Event = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, *event);
    }

    fn fixed_timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn test_login_successful_event() {
        let event = Event::LoginSuccessful(LoginSuccessfulReplyEvent {
            connection_id: "abc".to_string(),
        });

        assert_event_serialization(&event, r#"{"t":"login_successful","cid":"abc"}"#);
    }

    #[test]
    fn test_room_participation_join_event() {
        let event = Event::RoomParticipation(RoomParticipationBroadcastEvent {
            username: "alice".to_string(),
            status: RoomParticipationStatus::Joined,
        });

        assert_event_serialization(
            &event,
            r#"{"t":"room_participation","u":"alice","s":"joined"}"#,
        );
    }

    #[test]
    fn test_room_participation_leave_event() {
        let event = Event::RoomParticipation(RoomParticipationBroadcastEvent {
            username: "alice".to_string(),
            status: RoomParticipationStatus::Left,
        });

        assert_event_serialization(
            &event,
            r#"{"t":"room_participation","u":"alice","s":"left"}"#,
        );
    }

    #[test]
    fn test_user_message_event() {
        let event = Event::UserMessage(UserMessageBroadcastEvent {
            username: "alice".to_string(),
            content: "hello".to_string(),
            timestamp: fixed_timestamp(),
        });

        assert_event_serialization(
            &event,
            r#"{"t":"user_message","u":"alice","c":"hello","ts":"2024-01-02T03:04:05Z"}"#,
        );
    }

    #[test]
    fn test_user_typing_event() {
        let event = Event::UserTyping(UserTypingBroadcastEvent {
            username: "alice".to_string(),
            is_typing: false,
            timestamp: fixed_timestamp(),
        });

        assert_event_serialization(
            &event,
            r#"{"t":"user_typing","u":"alice","it":false,"ts":"2024-01-02T03:04:05Z"}"#,
        );
    }

    #[test]
    fn test_user_list_event() {
        let event = Event::UserList(UserListBroadcastEvent {
            users: vec!["alice".to_string(), "bob".to_string()],
        });

        assert_event_serialization(&event, r#"{"t":"user_list","us":["alice","bob"]}"#);
    }

    #[test]
    fn test_users_reply_event() {
        let event = Event::Users(UsersReplyEvent { users: vec![] });

        assert_event_serialization(&event, r#"{"t":"users","us":[]}"#);
    }

    #[test]
    fn test_error_event() {
        let event = Event::Error(ErrorReplyEvent {
            message: "user info not found".to_string(),
        });

        assert_event_serialization(&event, r#"{"t":"error","m":"user info not found"}"#);
    }
}
