//! In-process fixtures: in-memory SQLite, a scripted completion backend, and
//! a server bound to a random local port.

use std::sync::Arc;

use axum::Router;
use redline_db::{Database, SqliteDatabase};
use redline_service::{CompletionBackend, LocalService, MockBackend, WritingService};
use tokio::net::TcpListener;

pub const TEST_GUIDELINES: &str = "Make it concise.";
pub const TEST_REWRITE: &str = "This sentence could be shorter.";

/// Build a service over in-memory SQLite with the given backend.
pub fn test_service(
    guidelines: &str,
    backend: Arc<dyn CompletionBackend>,
) -> Arc<dyn WritingService> {
    let db: Arc<dyn Database> = Arc::new(
        SqliteDatabase::open_in_memory().expect("in-memory sqlite should always open"),
    );
    Arc::new(LocalService::new(db, backend, guidelines.to_string()))
}

/// Router whose backend always rewrites to [`TEST_REWRITE`].
pub async fn test_router() -> Router {
    test_router_with_backend(Arc::new(MockBackend::success(TEST_REWRITE))).await
}

pub async fn test_router_with_backend(backend: Arc<dyn CompletionBackend>) -> Router {
    crate::build_app(test_service(TEST_GUIDELINES, backend))
}

/// A running test server with base_url and background task handle.
pub struct TestServer {
    pub base_url: String,
    _handle: tokio::task::JoinHandle<()>,
}

/// Spawn a test server on a random port with the default mock backend.
pub async fn spawn_test_server() -> TestServer {
    spawn_test_server_with(TEST_GUIDELINES, Arc::new(MockBackend::success(TEST_REWRITE))).await
}

pub async fn spawn_test_server_with(
    guidelines: &str,
    backend: Arc<dyn CompletionBackend>,
) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("test listener address");
    let base_url = format!("http://{addr}");
    let app = crate::build_app(test_service(guidelines, backend));
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    TestServer {
        base_url,
        _handle: handle,
    }
}
