use std::fmt;

use comms::event::{ErrorReplyEvent, Event};

/// A required field of a command that was empty or only whitespace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    Username,
    Message,
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequiredField::Username => f.write_str("username"),
            RequiredField::Message => f.write_str("message"),
        }
    }
}

/// Failures of hub operations. Reported to the calling connection only, never broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum HubError {
    #[error("{0} is required")]
    Validation(RequiredField),
    /// The connection has no presence entry, it never joined or has already left
    #[error("user info not found")]
    MissingPresence,
}

impl From<HubError> for Event {
    fn from(err: HubError) -> Self {
        Event::Error(ErrorReplyEvent {
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            HubError::Validation(RequiredField::Username).to_string(),
            "username is required"
        );
        assert_eq!(
            HubError::Validation(RequiredField::Message).to_string(),
            "message is required"
        );
        assert_eq!(HubError::MissingPresence.to_string(), "user info not found");
    }

    #[test]
    fn test_error_becomes_error_reply_event() {
        let event: Event = HubError::MissingPresence.into();

        assert_eq!(
            event,
            Event::Error(ErrorReplyEvent {
                message: "user info not found".into()
            })
        );
    }
}
