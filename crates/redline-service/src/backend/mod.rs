pub mod mock;
pub mod openai;

use async_trait::async_trait;
use redline_core::writing::WritingResponse;
use redline_prompts::ChatMessage;
use thiserror::Error;

pub use mock::MockBackend;
pub use openai::{OpenAiBackend, OpenAiConfig};

use crate::ServiceError;

/// Failures talking to the generation service or reading its answer.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("provider returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("completion was empty")]
    EmptyCompletion,

    #[error("model refused: {0}")]
    Refused(String),

    #[error("completion did not match schema: {0}")]
    Malformed(String),
}

impl From<BackendError> for ServiceError {
    fn from(e: BackendError) -> Self {
        ServiceError::Upstream(e.to_string())
    }
}

/// A text-generation service that answers with a [`WritingResponse`].
///
/// Implementations send exactly one request per `complete` call and never
/// retry.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Model identifier recorded on traced calls.
    fn model(&self) -> &str;

    async fn complete(&self, messages: &[ChatMessage]) -> Result<WritingResponse, BackendError>;
}
