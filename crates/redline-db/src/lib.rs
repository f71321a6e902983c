pub mod sqlite;

use std::path::PathBuf;

use async_trait::async_trait;
use redline_core::call::{CallRecord, CallStatus, CreateCall};
use redline_core::feedback::{Annotation, CreateAnnotation};
use serde_json::Value;
use thiserror::Error;

pub use sqlite::SqliteDatabase;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Where the call store lives on disk.
#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    /// Explicit database file. Falls back to `data_dir()/redline.db`.
    pub sqlite_path: Option<String>,
}

/// Storage for traced calls and the feedback annotations attached to them.
#[async_trait]
pub trait Database: Send + Sync {
    // -- Calls --
    async fn create_call(&self, input: &CreateCall) -> Result<CallRecord, DbError>;
    async fn finish_call(
        &self,
        id: &str,
        status: CallStatus,
        output: Option<&Value>,
        error_message: Option<&str>,
    ) -> Result<CallRecord, DbError>;
    async fn get_call(&self, id: &str) -> Result<CallRecord, DbError>;
    async fn list_calls(&self, limit: usize) -> Result<Vec<CallRecord>, DbError>;

    // -- Annotations --
    async fn create_annotation(&self, input: &CreateAnnotation) -> Result<Annotation, DbError>;
    async fn list_annotations(&self, call_id: &str) -> Result<Vec<Annotation>, DbError>;
}

/// Default data directory: `$XDG_DATA_HOME/redline`, else `~/.local/share/redline`.
pub fn data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local/share")
    } else {
        PathBuf::from(".")
    };
    base.join("redline")
}
