use axum::{extract::State, response::Html, routing::get, Json, Router};
use serde_json::{json, Value};

use super::AppState;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/api/guidelines", get(guidelines))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn guidelines(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "guidelines": state.service.guidelines() }))
}
