use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Row};
use serde_json::Value;

use redline_core::call::{CallRecord, CallStatus, CreateCall};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn json_column(idx: usize, raw: &str) -> rusqlite::Result<Value> {
    serde_json::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_call(row: &Row) -> rusqlite::Result<CallRecord> {
    let inputs_raw: String = row.get("inputs")?;
    let inputs = json_column(3, &inputs_raw)?;
    let output_raw: Option<String> = row.get("output")?;
    let output = match output_raw {
        Some(raw) => Some(json_column(4, &raw)?),
        None => None,
    };
    let status_str: String = row.get("status")?;
    let status = CallStatus::parse_str(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            Type::Text,
            format!("unknown call status: {status_str}").into(),
        )
    })?;
    Ok(CallRecord {
        id: row.get("id")?,
        op_name: row.get("op_name")?,
        model: row.get("model")?,
        inputs,
        output,
        status,
        error_message: row.get("error_message")?,
        started_at: row.get("started_at")?,
        ended_at: row.get("ended_at")?,
    })
}

fn not_found(id: &str) -> impl FnOnce(rusqlite::Error) -> DbError + '_ {
    move |e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound(format!("call {id}")),
        other => DbError::Internal(other.to_string()),
    }
}

impl SqliteDatabase {
    pub fn create_call_sync(&self, input: &CreateCall) -> Result<CallRecord, DbError> {
        self.with_conn(|conn| {
            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            let inputs = input.inputs.to_string();
            conn.execute(
                "INSERT INTO calls (id, op_name, model, inputs, status, started_at)
                 VALUES (?1, ?2, ?3, ?4, 'running', ?5)",
                params![id, input.op_name, input.model, inputs, now],
            )
            .to_db()?;
            conn.query_row("SELECT * FROM calls WHERE id = ?1", params![id], row_to_call)
                .to_db()
        })
    }

    pub fn finish_call_sync(
        &self,
        id: &str,
        status: CallStatus,
        output: Option<&Value>,
        error_message: Option<&str>,
    ) -> Result<CallRecord, DbError> {
        self.with_conn(|conn| {
            let output = output.map(Value::to_string);
            let changed = conn
                .execute(
                    "UPDATE calls SET status = ?1, output = ?2, error_message = ?3, ended_at = ?4
                     WHERE id = ?5",
                    params![status.as_str(), output, error_message, Utc::now(), id],
                )
                .to_db()?;
            if changed == 0 {
                return Err(DbError::NotFound(format!("call {id}")));
            }
            conn.query_row("SELECT * FROM calls WHERE id = ?1", params![id], row_to_call)
                .to_db()
        })
    }

    pub fn get_call_sync(&self, id: &str) -> Result<CallRecord, DbError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT * FROM calls WHERE id = ?1", params![id], row_to_call)
                .map_err(not_found(id))
        })
    }

    pub fn list_calls_sync(&self, limit: usize) -> Result<Vec<CallRecord>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM calls ORDER BY started_at DESC, rowid DESC LIMIT ?1")
                .to_db()?;
            let calls = stmt
                .query_map(params![limit as i64], row_to_call)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(calls)
        })
    }
}
