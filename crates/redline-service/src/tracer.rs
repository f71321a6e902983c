use std::future::Future;
use std::sync::Arc;

use redline_core::call::{CallStatus, CreateCall};
use redline_db::Database;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::ServiceError;

/// An operation's output paired with the id of the call record it produced.
#[derive(Debug, Clone)]
pub struct Traced<T> {
    pub call_id: String,
    pub output: T,
}

/// Records operations as calls in the store.
///
/// The call id is minted before the operation runs and handed back together
/// with its output, so there is no window where a result exists without its id.
#[derive(Clone)]
pub struct CallTracer {
    db: Arc<dyn Database>,
}

impl CallTracer {
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    /// Run `op` as a traced call named `op_name`.
    ///
    /// The record is `running` while `op` is pending, then `succeeded` with the
    /// serialized output or `failed` with the error text. Operation errors are
    /// returned unchanged after the record is closed.
    pub async fn trace<T, F>(
        &self,
        op_name: &str,
        model: Option<&str>,
        inputs: Value,
        op: F,
    ) -> Result<Traced<T>, ServiceError>
    where
        T: Serialize,
        F: Future<Output = Result<T, ServiceError>>,
    {
        let call = self
            .db
            .create_call(&CreateCall {
                op_name: op_name.to_string(),
                model: model.map(str::to_string),
                inputs,
            })
            .await?;

        match op.await {
            Ok(output) => {
                let value = serde_json::to_value(&output)
                    .map_err(|e| ServiceError::Internal(format!("serialize output: {e}")))?;
                self.db
                    .finish_call(&call.id, CallStatus::Succeeded, Some(&value), None)
                    .await?;
                info!(call_id = %call.id, op = op_name, "call succeeded");
                Ok(Traced {
                    call_id: call.id,
                    output,
                })
            }
            Err(e) => {
                let msg = e.to_string();
                warn!(call_id = %call.id, op = op_name, "call failed: {msg}");
                if let Err(db_err) = self
                    .db
                    .finish_call(&call.id, CallStatus::Failed, None, Some(&msg))
                    .await
                {
                    warn!(call_id = %call.id, "failed to close call record: {db_err}");
                }
                Err(e)
            }
        }
    }
}
