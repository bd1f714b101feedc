use serde::{Deserialize, Serialize};

/// Role type for a message.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System role.
    System,

    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

/// One turn of the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// The role of the message.
    pub role: MessageRole,

    /// The text content of the message.
    pub content: String,
}

impl Message {
    /// Create a new `Message` with the given role and content.
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new system `Message`.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a new user `Message`.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create a new assistant `Message`.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

impl From<&str> for Message {
    fn from(content: &str) -> Self {
        Self::user(content)
    }
}

impl From<String> for Message {
    fn from(content: String) -> Self {
        Self::user(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serialization() {
        let message = Message::user("Hello");
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"Hello"}"#);

        let message = Message::system("Be brief.");
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"Be brief."}"#);
    }

    #[test]
    fn message_deserialization() {
        let json = r#"{"role":"assistant","content":"Hi there!"}"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message, Message::assistant("Hi there!"));
    }

    #[test]
    fn message_from_str_is_user() {
        let message: Message = "ping".into();
        assert_eq!(message.role, MessageRole::User);
        assert_eq!(message.content, "ping");
    }
}
