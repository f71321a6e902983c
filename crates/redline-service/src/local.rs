use std::sync::Arc;

use async_trait::async_trait;
use redline_core::call::{CallDetail, CallRecord};
use redline_core::feedback::{
    AnnotationKind, CreateAnnotation, Feedback, FeedbackReceipt, FEEDBACK_ACK,
};
use redline_core::writing::Rewrite;
use redline_db::Database;
use redline_prompts::build_messages;
use serde_json::json;
use tracing::info;

use crate::backend::CompletionBackend;
use crate::{CallTracer, ServiceError, WritingService};

const REWRITE_OP: &str = "rewrite";

/// Local implementation: completions from a backend, calls and feedback in the
/// local store.
pub struct LocalService {
    db: Arc<dyn Database>,
    backend: Arc<dyn CompletionBackend>,
    tracer: CallTracer,
    guidelines: String,
}

impl LocalService {
    pub fn new(
        db: Arc<dyn Database>,
        backend: Arc<dyn CompletionBackend>,
        guidelines: String,
    ) -> Self {
        let tracer = CallTracer::new(db.clone());
        Self {
            db,
            backend,
            tracer,
            guidelines,
        }
    }
}

#[async_trait]
impl WritingService for LocalService {
    fn guidelines(&self) -> &str {
        &self.guidelines
    }

    async fn rewrite(&self, text: &str) -> Result<Rewrite, ServiceError> {
        if text.trim().is_empty() {
            return Err(ServiceError::InvalidInput("text is empty".into()));
        }

        let messages = build_messages(&self.guidelines, text);
        let inputs = json!({ "guidelines": self.guidelines, "text": text });
        let backend = self.backend.clone();

        let traced = self
            .tracer
            .trace(REWRITE_OP, Some(self.backend.model()), inputs, async move {
                let resp = backend.complete(&messages).await?;
                if resp.rewritten().is_none() {
                    return Err(ServiceError::Upstream(
                        "completion carried no rewritten text".into(),
                    ));
                }
                Ok(resp)
            })
            .await?;

        let improved_text = traced
            .output
            .rewritten()
            .map(str::to_string)
            .ok_or_else(|| ServiceError::Internal("rewrite vanished after validation".into()))?;

        info!(
            call_id = %traced.call_id,
            backend = self.backend.name(),
            "rewrite complete"
        );
        Ok(Rewrite {
            call_id: traced.call_id,
            improved_text,
            commentary: traced.output.commentary,
        })
    }

    async fn record_feedback(
        &self,
        call_id: &str,
        feedback: &Feedback,
    ) -> Result<FeedbackReceipt, ServiceError> {
        feedback.validate()?;
        // Resolve first so an unknown id fails before anything is written.
        let call = self.db.get_call(call_id).await?;

        let mut annotations = Vec::new();
        if let Some(score) = feedback.score {
            annotations.push(
                self.db
                    .create_annotation(&CreateAnnotation {
                        call_id: call.id.clone(),
                        kind: AnnotationKind::Reaction,
                        value: score.emoji().to_string(),
                    })
                    .await?,
            );
        }
        if let Some(note) = feedback.note_text() {
            annotations.push(
                self.db
                    .create_annotation(&CreateAnnotation {
                        call_id: call.id.clone(),
                        kind: AnnotationKind::Note,
                        value: note.to_string(),
                    })
                    .await?,
            );
        }

        info!(call_id = %call.id, count = annotations.len(), "feedback attached");
        Ok(FeedbackReceipt {
            message: FEEDBACK_ACK.to_string(),
            annotations,
        })
    }

    async fn get_call(&self, call_id: &str) -> Result<CallDetail, ServiceError> {
        let call = self.db.get_call(call_id).await?;
        let annotations = self.db.list_annotations(call_id).await?;
        Ok(CallDetail { call, annotations })
    }

    async fn list_calls(&self, limit: usize) -> Result<Vec<CallRecord>, ServiceError> {
        Ok(self.db.list_calls(limit).await?)
    }
}
