pub(crate) mod migrations;
pub mod queries;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;
use serde_json::Value;

use redline_core::call::{CallRecord, CallStatus, CreateCall};
use redline_core::feedback::{Annotation, CreateAnnotation};

use crate::{Database, DbConfig, DbError};

/// Extension trait that converts `rusqlite::Result<T>` into `Result<T, DbError>`
/// so query modules can write `.to_db()?`.
pub(crate) trait SqliteResultExt<T> {
    fn to_db(self) -> Result<T, DbError>;
}

impl<T> SqliteResultExt<T> for rusqlite::Result<T> {
    fn to_db(self) -> Result<T, DbError> {
        self.map_err(map_sqlite_err)
    }
}

#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    pub fn open(config: &DbConfig) -> Result<Self, DbError> {
        let path = config
            .sqlite_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| crate::data_dir().join("redline.db"));
        std::fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))?;
        Self::open_path(&path)
    }

    pub fn open_path(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path).to_db()?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )
        .to_db()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory().to_db()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;").to_db()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub(crate) fn with_conn<F, T>(&self, f: F) -> Result<T, DbError>
    where
        F: FnOnce(&Connection) -> Result<T, DbError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| DbError::Internal("lock poisoned".into()))?;
        f(&conn)
    }

    fn run_migrations(&self) -> Result<(), DbError> {
        self.with_conn(migrations::run)
    }
}

/// Map a `rusqlite::Error` into a `DbError::Internal`.
pub(crate) fn map_sqlite_err(e: rusqlite::Error) -> DbError {
    DbError::Internal(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_in_memory_returns_working_db() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        db.with_conn(|conn| {
            let count: i64 = conn
                .query_row(
                    "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name IN ('calls', 'annotations')",
                    [],
                    |row| row.get(0),
                )
                .to_db()?;
            assert_eq!(count, 2);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn open_path_creates_file() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("test.db");
        assert!(!db_path.exists());

        let _db = SqliteDatabase::open_path(&db_path).unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn open_with_config_creates_parent_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("nested/dir/redline.db");
        let config = DbConfig {
            sqlite_path: Some(db_path.to_string_lossy().to_string()),
        };
        let _db = SqliteDatabase::open(&config).unwrap();
        assert!(db_path.exists());
    }

    #[test]
    fn reopen_keeps_migrations_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let db_path = tmp.path().join("test.db");
        drop(SqliteDatabase::open_path(&db_path).unwrap());
        let db = SqliteDatabase::open_path(&db_path).unwrap();
        let version: i64 = db
            .with_conn(|conn| {
                conn.query_row("SELECT MAX(version) FROM schema_version", [], |r| r.get(0))
                    .to_db()
            })
            .unwrap();
        assert_eq!(version, migrations::LATEST_VERSION);
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    // -- Calls --
    async fn create_call(&self, input: &CreateCall) -> Result<CallRecord, DbError> {
        let db = self.clone();
        let input = input.clone();
        tokio::task::spawn_blocking(move || db.create_call_sync(&input))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn finish_call(
        &self,
        id: &str,
        status: CallStatus,
        output: Option<&Value>,
        error_message: Option<&str>,
    ) -> Result<CallRecord, DbError> {
        let db = self.clone();
        let id = id.to_string();
        let output = output.cloned();
        let error_message = error_message.map(str::to_string);
        tokio::task::spawn_blocking(move || {
            db.finish_call_sync(&id, status, output.as_ref(), error_message.as_deref())
        })
        .await
        .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn get_call(&self, id: &str) -> Result<CallRecord, DbError> {
        let db = self.clone();
        let id = id.to_string();
        tokio::task::spawn_blocking(move || db.get_call_sync(&id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn list_calls(&self, limit: usize) -> Result<Vec<CallRecord>, DbError> {
        let db = self.clone();
        tokio::task::spawn_blocking(move || db.list_calls_sync(limit))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }

    // -- Annotations --
    async fn create_annotation(&self, input: &CreateAnnotation) -> Result<Annotation, DbError> {
        let db = self.clone();
        let input = input.clone();
        tokio::task::spawn_blocking(move || db.create_annotation_sync(&input))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
    async fn list_annotations(&self, call_id: &str) -> Result<Vec<Annotation>, DbError> {
        let db = self.clone();
        let call_id = call_id.to_string();
        tokio::task::spawn_blocking(move || db.list_annotations_sync(&call_id))
            .await
            .map_err(|e| DbError::Internal(e.to_string()))?
    }
}
