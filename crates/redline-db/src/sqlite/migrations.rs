use rusqlite::Connection;
use tracing::info;

use super::SqliteResultExt;
use crate::DbError;

pub(crate) const LATEST_VERSION: i64 = 1;

pub fn run(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )
    .to_db()?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |r| r.get(0),
        )
        .unwrap_or(0);

    if current_version < 1 {
        // v1: traced calls and their feedback annotations
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS calls (
                id            TEXT PRIMARY KEY,
                op_name       TEXT NOT NULL,
                model         TEXT,
                inputs        TEXT NOT NULL,
                output        TEXT,
                status        TEXT NOT NULL DEFAULT 'running'
                                  CHECK(status IN ('running', 'succeeded', 'failed')),
                error_message TEXT,
                started_at    TEXT NOT NULL,
                ended_at      TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_calls_started ON calls(started_at);

            CREATE TABLE IF NOT EXISTS annotations (
                id         TEXT PRIMARY KEY,
                call_id    TEXT NOT NULL REFERENCES calls(id) ON DELETE CASCADE,
                kind       TEXT NOT NULL CHECK(kind IN ('reaction', 'note')),
                value      TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_annotations_call ON annotations(call_id);",
        )
        .to_db()?;

        conn.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (1, datetime('now'))",
            [],
        )
        .to_db()?;
        info!("applied call store migration v1");
    }

    Ok(())
}
