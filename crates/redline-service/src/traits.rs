use async_trait::async_trait;
use redline_core::call::{CallDetail, CallRecord};
use redline_core::feedback::{Feedback, FeedbackReceipt};
use redline_core::writing::Rewrite;
use redline_core::RedlineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("generation service failed: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<redline_db::DbError> for ServiceError {
    fn from(e: redline_db::DbError) -> Self {
        match e {
            redline_db::DbError::NotFound(msg) => ServiceError::NotFound(msg),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<RedlineError> for ServiceError {
    fn from(e: RedlineError) -> Self {
        match e {
            RedlineError::NotFound(msg) => ServiceError::NotFound(msg),
            RedlineError::InvalidInput(msg) => ServiceError::InvalidInput(msg),
            RedlineError::Database(msg) => ServiceError::Internal(msg),
        }
    }
}

/// Rewrite text and collect feedback on the result.
///
/// `LocalService` runs against a completion backend and the local call store.
/// The server holds one behind its router state.
#[async_trait]
pub trait WritingService: Send + Sync {
    /// Guidelines every rewrite is steered by. Fixed for the service lifetime.
    fn guidelines(&self) -> &str;

    /// Rewrite `text` with exactly one traced completion request.
    /// The returned call id identifies that request for later feedback.
    async fn rewrite(&self, text: &str) -> Result<Rewrite, ServiceError>;

    /// Attach a reaction and/or note to a traced call.
    async fn record_feedback(
        &self,
        call_id: &str,
        feedback: &Feedback,
    ) -> Result<FeedbackReceipt, ServiceError>;

    async fn get_call(&self, call_id: &str) -> Result<CallDetail, ServiceError>;
    async fn list_calls(&self, limit: usize) -> Result<Vec<CallRecord>, ServiceError>;
}
