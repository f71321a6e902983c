pub mod call;
pub mod error;
pub mod feedback;
pub mod session;
pub mod writing;

pub use call::{CallDetail, CallRecord, CallStatus, CreateCall};
pub use error::RedlineError;
pub use feedback::{
    Annotation, AnnotationKind, CreateAnnotation, Feedback, FeedbackReceipt, Reaction, FEEDBACK_ACK,
};
pub use session::SessionState;
pub use writing::{Rewrite, WritingResponse};
