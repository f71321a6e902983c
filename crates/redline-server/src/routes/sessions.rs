use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use redline_core::feedback::Feedback;
use redline_core::session::SessionState;
use redline_service::ServiceError;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{to_error, AppState};

/// Shown instead of a result when the submitted text is blank.
pub const EMPTY_TEXT_WARNING: &str = "Please enter some text to check.";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session))
        .route("/api/sessions/{id}/rewrite", post(rewrite))
        .route("/api/sessions/{id}/feedback", post(submit_feedback))
}

#[derive(Debug, Deserialize)]
struct RewriteInput {
    #[serde(default)]
    text: String,
}

fn lookup(state: &AppState, id: &str) -> Result<SessionState, (StatusCode, Json<Value>)> {
    state
        .sessions
        .get(id)
        .ok_or_else(|| to_error(ServiceError::NotFound(format!("session {id}"))))
}

async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let session = state.sessions.create();
    info!(session_id = %session.id, "session created");
    (StatusCode::CREATED, Json(json!(session)))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    lookup(&state, &id).map(|s| Json(json!(s)))
}

/// Rewrite the submitted text and make it the session's current result.
/// Blank text gets a warning and never reaches the generation service.
async fn rewrite(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<RewriteInput>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    lookup(&state, &id)?;

    if input.text.trim().is_empty() {
        warn!(session_id = %id, "rejected empty submission");
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "warning": EMPTY_TEXT_WARNING })),
        ));
    }

    let rewrite = state.service.rewrite(&input.text).await.map_err(to_error)?;
    state
        .sessions
        .record_rewrite(&id, &rewrite)
        .ok_or_else(|| to_error(ServiceError::NotFound(format!("session {id}"))))?;

    Ok(Json(json!(rewrite)))
}

/// Attach feedback to the call behind the session's most recent rewrite.
async fn submit_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(feedback): Json<Feedback>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let session = lookup(&state, &id)?;
    let call_id = session.last_call_id.ok_or_else(|| {
        to_error(ServiceError::Conflict(
            "no rewrite in this session to attach feedback to".into(),
        ))
    })?;

    let receipt = state
        .service
        .record_feedback(&call_id, &feedback)
        .await
        .map_err(to_error)?;
    Ok((StatusCode::CREATED, Json(json!(receipt))))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use redline_service::{BackendError, MockBackend};
    use tower::ServiceExt;

    use super::*;
    use crate::test_helpers::{test_router, test_router_with_backend};

    async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn new_session(app: &axum::Router) -> String {
        let (status, body) = send(app, "POST", "/api/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn create_then_get_session() {
        let app = test_router().await;
        let id = new_session(&app).await;
        let (status, body) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], id.as_str());
        assert!(body["last_call_id"].is_null());
    }

    #[tokio::test]
    async fn unknown_session_is_404() {
        let app = test_router().await;
        let (status, _) = send(&app, "GET", "/api/sessions/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(
            &app,
            "POST",
            "/api/sessions/nope/rewrite",
            Some(json!({ "text": "hello" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn blank_text_warns_without_calling_backend() {
        let backend = std::sync::Arc::new(MockBackend::success("unused"));
        let app = test_router_with_backend(backend.clone()).await;
        let id = new_session(&app).await;

        for text in ["", "   ", "\n\t "] {
            let (status, body) = send(
                &app,
                "POST",
                &format!("/api/sessions/{id}/rewrite"),
                Some(json!({ "text": text })),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["warning"], EMPTY_TEXT_WARNING);
        }
        assert_eq!(backend.call_count(), 0);

        let (_, session) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
        assert!(session["improved_text"].is_null());
    }

    #[tokio::test]
    async fn rewrite_updates_session() {
        let app = test_router().await;
        let id = new_session(&app).await;
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/sessions/{id}/rewrite"),
            Some(json!({ "text": "A rather long sentence." })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let call_id = body["call_id"].as_str().unwrap();
        assert!(!call_id.is_empty());
        assert!(!body["improved_text"].as_str().unwrap().is_empty());

        let (_, session) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(session["last_call_id"], call_id);
        assert_eq!(session["improved_text"], body["improved_text"]);
    }

    #[tokio::test]
    async fn second_rewrite_replaces_call_id() {
        let app = test_router().await;
        let id = new_session(&app).await;
        let uri = format!("/api/sessions/{id}/rewrite");
        let (_, first) = send(&app, "POST", &uri, Some(json!({ "text": "one" }))).await;
        let (_, second) = send(&app, "POST", &uri, Some(json!({ "text": "two" }))).await;
        assert_ne!(first["call_id"], second["call_id"]);

        let (_, session) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
        assert_eq!(session["last_call_id"], second["call_id"]);
    }

    #[tokio::test]
    async fn backend_failure_is_bad_gateway_and_keeps_session() {
        let backend = std::sync::Arc::new(MockBackend::failure(BackendError::Transport(
            "connection reset".into(),
        )));
        let app = test_router_with_backend(backend).await;
        let id = new_session(&app).await;
        let (status, body) = send(
            &app,
            "POST",
            &format!("/api/sessions/{id}/rewrite"),
            Some(json!({ "text": "hello" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().contains("connection reset"));

        let (_, session) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
        assert!(session["last_call_id"].is_null());
    }

    #[tokio::test]
    async fn feedback_before_rewrite_is_conflict() {
        let app = test_router().await;
        let id = new_session(&app).await;
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/sessions/{id}/feedback"),
            Some(json!({ "score": "thumbs_up" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn feedback_targets_latest_rewrite() {
        let app = test_router().await;
        let id = new_session(&app).await;
        let uri = format!("/api/sessions/{id}/rewrite");
        let (_, first) = send(&app, "POST", &uri, Some(json!({ "text": "one" }))).await;
        let (_, second) = send(&app, "POST", &uri, Some(json!({ "text": "two" }))).await;

        let (status, receipt) = send(
            &app,
            "POST",
            &format!("/api/sessions/{id}/feedback"),
            Some(json!({ "score": "👎", "text": "Lost my meaning." })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(receipt["message"], redline_core::FEEDBACK_ACK);
        assert_eq!(receipt["annotations"].as_array().unwrap().len(), 2);

        let first_id = first["call_id"].as_str().unwrap();
        let second_id = second["call_id"].as_str().unwrap();
        let (_, old) = send(&app, "GET", &format!("/api/calls/{first_id}"), None).await;
        let (_, new) = send(&app, "GET", &format!("/api/calls/{second_id}"), None).await;
        assert!(old["annotations"].as_array().unwrap().is_empty());
        assert_eq!(new["annotations"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_feedback_is_bad_request() {
        let app = test_router().await;
        let id = new_session(&app).await;
        send(
            &app,
            "POST",
            &format!("/api/sessions/{id}/rewrite"),
            Some(json!({ "text": "one" })),
        )
        .await;
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/sessions/{id}/feedback"),
            Some(json!({ "text": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
