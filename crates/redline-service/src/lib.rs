pub mod backend;
mod http;
mod local;
mod tracer;
mod traits;

pub use backend::{BackendError, CompletionBackend, MockBackend, OpenAiBackend, OpenAiConfig};
pub use http::HttpService;
pub use local::LocalService;
pub use tracer::{CallTracer, Traced};
pub use traits::{ServiceError, WritingService};
