use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};

use redline_core::feedback::{Annotation, AnnotationKind, CreateAnnotation};

use super::super::{SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_annotation(row: &Row) -> rusqlite::Result<Annotation> {
    let kind_str: String = row.get("kind")?;
    let kind = AnnotationKind::parse_str(&kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("unknown annotation kind: {kind_str}").into(),
        )
    })?;
    Ok(Annotation {
        id: row.get("id")?,
        call_id: row.get("call_id")?,
        kind,
        value: row.get("value")?,
        created_at: row.get("created_at")?,
    })
}

impl SqliteDatabase {
    /// Append an annotation to a call. Never updates an existing one: the
    /// same feedback sent twice yields two rows.
    pub fn create_annotation_sync(&self, input: &CreateAnnotation) -> Result<Annotation, DbError> {
        self.with_conn(|conn| {
            let exists: Option<String> = conn
                .query_row(
                    "SELECT id FROM calls WHERE id = ?1",
                    params![input.call_id],
                    |r| r.get(0),
                )
                .optional()
                .to_db()?;
            if exists.is_none() {
                return Err(DbError::NotFound(format!("call {}", input.call_id)));
            }

            let id = uuid::Uuid::new_v4().to_string();
            let now = Utc::now();
            conn.execute(
                "INSERT INTO annotations (id, call_id, kind, value, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, input.call_id, input.kind.as_str(), input.value, now],
            )
            .to_db()?;
            conn.query_row(
                "SELECT * FROM annotations WHERE id = ?1",
                params![id],
                row_to_annotation,
            )
            .to_db()
        })
    }

    pub fn list_annotations_sync(&self, call_id: &str) -> Result<Vec<Annotation>, DbError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT * FROM annotations WHERE call_id = ?1
                     ORDER BY created_at, rowid",
                )
                .to_db()?;
            let annotations = stmt
                .query_map(params![call_id], row_to_annotation)
                .to_db()?
                .collect::<Result<Vec<_>, _>>()
                .to_db()?;
            Ok(annotations)
        })
    }
}

#[cfg(test)]
mod tests {
    use redline_core::call::CreateCall;
    use serde_json::json;

    use super::*;

    fn db_with_call() -> (SqliteDatabase, String) {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let call = db
            .create_call_sync(&CreateCall {
                op_name: "rewrite".into(),
                model: None,
                inputs: json!({}),
            })
            .unwrap();
        (db, call.id)
    }

    #[test]
    fn create_and_list_annotations() {
        let (db, call_id) = db_with_call();
        let reaction = db
            .create_annotation_sync(&CreateAnnotation {
                call_id: call_id.clone(),
                kind: AnnotationKind::Reaction,
                value: "👍".into(),
            })
            .unwrap();
        assert_eq!(reaction.kind, AnnotationKind::Reaction);
        assert_eq!(reaction.value, "👍");

        db.create_annotation_sync(&CreateAnnotation {
            call_id: call_id.clone(),
            kind: AnnotationKind::Note,
            value: "nice and short".into(),
        })
        .unwrap();

        let all = db.list_annotations_sync(&call_id).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].kind, AnnotationKind::Reaction);
        assert_eq!(all[1].kind, AnnotationKind::Note);
    }

    #[test]
    fn duplicate_annotations_are_kept() {
        let (db, call_id) = db_with_call();
        let input = CreateAnnotation {
            call_id: call_id.clone(),
            kind: AnnotationKind::Reaction,
            value: "👍".into(),
        };
        let a = db.create_annotation_sync(&input).unwrap();
        let b = db.create_annotation_sync(&input).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(db.list_annotations_sync(&call_id).unwrap().len(), 2);
    }

    #[test]
    fn annotation_for_unknown_call_is_not_found() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let err = db
            .create_annotation_sync(&CreateAnnotation {
                call_id: "ghost".into(),
                kind: AnnotationKind::Note,
                value: "hello".into(),
            })
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[test]
    fn list_annotations_empty_for_fresh_call() {
        let (db, call_id) = db_with_call();
        assert!(db.list_annotations_sync(&call_id).unwrap().is_empty());
    }
}
