use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use redline_core::writing::WritingResponse;
use redline_prompts::ChatMessage;

use super::{BackendError, CompletionBackend};

/// A scripted backend for tests.
///
/// Queued outcomes are returned in order; once the queue is drained the
/// default outcome is returned for every further call.
pub struct MockBackend {
    queued: Mutex<VecDeque<Result<WritingResponse, BackendError>>>,
    default: Result<WritingResponse, BackendError>,
    calls: AtomicUsize,
    last_messages: Mutex<Option<Vec<ChatMessage>>>,
}

impl MockBackend {
    fn with_default(default: Result<WritingResponse, BackendError>) -> Self {
        Self {
            queued: Mutex::new(VecDeque::new()),
            default,
            calls: AtomicUsize::new(0),
            last_messages: Mutex::new(None),
        }
    }

    /// Always answer with the given rewrite and no commentary.
    pub fn success(rewritten_text: &str) -> Self {
        Self::with_default(Ok(WritingResponse {
            commentary: None,
            rewritten_text: Some(rewritten_text.to_string()),
        }))
    }

    /// Always answer with the given structured response.
    pub fn responding(response: WritingResponse) -> Self {
        Self::with_default(Ok(response))
    }

    /// Always fail with `error`.
    pub fn failure(error: BackendError) -> Self {
        Self::with_default(Err(error))
    }

    /// Queue a one-off outcome ahead of the default.
    pub fn then(self, outcome: Result<WritingResponse, BackendError>) -> Self {
        if let Ok(mut queued) = self.queued.lock() {
            queued.push_back(outcome);
        }
        self
    }

    /// How many completions have been requested.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The messages sent with the most recent request.
    pub fn last_messages(&self) -> Option<Vec<ChatMessage>> {
        self.last_messages.lock().ok().and_then(|m| m.clone())
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<WritingResponse, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_messages.lock() {
            *last = Some(messages.to_vec());
        }
        let next = self.queued.lock().ok().and_then(|mut q| q.pop_front());
        next.unwrap_or_else(|| self.default.clone())
    }
}
