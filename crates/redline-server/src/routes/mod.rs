pub mod calls;
pub mod health;
pub mod sessions;
pub mod ui;

use std::sync::Arc;

use axum::{http::StatusCode, Json, Router};
use redline_service::{ServiceError, WritingService};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::session::SessionStore;

pub struct InnerAppState {
    pub service: Arc<dyn WritingService>,
    pub sessions: SessionStore,
}

pub type AppState = Arc<InnerAppState>;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(ui::routes())
        .merge(health::routes())
        .merge(sessions::routes())
        .merge(calls::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub(crate) fn to_error(e: ServiceError) -> (StatusCode, Json<Value>) {
    let status = match &e {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ServiceError::Conflict(_) => StatusCode::CONFLICT,
        ServiceError::Upstream(_) => StatusCode::BAD_GATEWAY,
        ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("request failed: {e}");
    }
    (status, Json(json!({ "error": e.to_string() })))
}
