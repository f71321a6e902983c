pub mod config;
mod routes;
pub mod session;
pub mod test_helpers;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use redline_service::WritingService;
use tokio::net::TcpListener;

use session::SessionStore;

/// Build the full application router around a writing service.
pub fn build_app(service: Arc<dyn WritingService>) -> Router {
    let state = Arc::new(routes::InnerAppState {
        service,
        sessions: SessionStore::default(),
    });
    routes::build_router(state)
}

pub async fn serve(listener: TcpListener, service: Arc<dyn WritingService>) -> Result<()> {
    let app = build_app(service);
    axum::serve(listener, app).await?;
    Ok(())
}
