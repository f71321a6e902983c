use redline_core::call::CallDetail;
use redline_core::feedback::{Feedback, FeedbackReceipt};
use redline_core::session::SessionState;
use redline_core::writing::Rewrite;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

use crate::ServiceError;

/// Async HTTP client for a running redline server.
pub struct HttpService {
    base_url: String,
    client: Client,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
        }
    }

    /// Check if the server is reachable.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        let resp = self
            .client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Internal(format!("connection failed: {e}")))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Internal(format!(
                "health check failed: {}",
                resp.status()
            )))
        }
    }

    pub async fn guidelines(&self) -> Result<String, ServiceError> {
        let v: Value = self.get_json("/api/guidelines").await?;
        v["guidelines"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| ServiceError::Internal("response missing guidelines".into()))
    }

    pub async fn create_session(&self) -> Result<SessionState, ServiceError> {
        self.post_json("/api/sessions", &json!({})).await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<SessionState, ServiceError> {
        self.get_json(&format!("/api/sessions/{session_id}")).await
    }

    pub async fn rewrite(&self, session_id: &str, text: &str) -> Result<Rewrite, ServiceError> {
        self.post_json(
            &format!("/api/sessions/{session_id}/rewrite"),
            &json!({ "text": text }),
        )
        .await
    }

    /// Attach feedback to the session's most recent rewrite.
    pub async fn submit_feedback(
        &self,
        session_id: &str,
        feedback: &Feedback,
    ) -> Result<FeedbackReceipt, ServiceError> {
        self.post_json(&format!("/api/sessions/{session_id}/feedback"), feedback)
            .await
    }

    pub async fn get_call(&self, call_id: &str) -> Result<CallDetail, ServiceError> {
        self.get_json(&format!("/api/calls/{call_id}")).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let resp = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }

    async fn post_json<B: serde::Serialize + ?Sized, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        handle_response(resp).await
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Internal(format!("json decode: {e}")))
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    let msg = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            v["error"]
                .as_str()
                .or_else(|| v["warning"].as_str())
                .map(String::from)
        })
        .unwrap_or(body);

    match status {
        StatusCode::NOT_FOUND => ServiceError::NotFound(msg),
        StatusCode::BAD_REQUEST => ServiceError::InvalidInput(msg),
        StatusCode::CONFLICT => ServiceError::Conflict(msg),
        StatusCode::BAD_GATEWAY => ServiceError::Upstream(msg),
        _ => ServiceError::Internal(msg),
    }
}
