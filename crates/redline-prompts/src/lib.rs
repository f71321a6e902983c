pub mod guidelines;
pub mod rewrite;

pub use guidelines::{load_guidelines, DEFAULT_GUIDELINES};
pub use rewrite::{build_messages, ChatMessage, ChatRole, SYSTEM_PROMPT};
