use serde::Serialize;

pub const SYSTEM_PROMPT: &str = "You are a helpful assistant that improves writing";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Build the two-message rewrite prompt: a fixed system message, then a user
/// message carrying the guidelines and the text to improve.
pub fn build_messages(guidelines: &str, text: &str) -> [ChatMessage; 2] {
    let mut user = String::new();
    user.push_str("Update and improve the following text using the following guidelines:\n");
    user.push_str("GUIDELINES:\n");
    user.push_str(guidelines);
    user.push_str("\nTEXT:\n");
    user.push_str(text);
    user.push('\n');

    [
        ChatMessage {
            role: ChatRole::System,
            content: SYSTEM_PROMPT.to_string(),
        },
        ChatMessage {
            role: ChatRole::User,
            content: user,
        },
    ]
}
