//! Registration record database operations

use chrono::Utc;
use rusqlite::Result as SqliteResult;
use std::str::FromStr;

use crate::models::{EventType, Record};
use super::super::Database;
use super::{parse_timestamp, storage_timestamp};

const RECORD_COLUMNS: &str =
    "id, composition_id, event, tracking_id, registration_number, status, payload, created_at";

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<Record> {
    let event: String = row.get(2)?;
    let payload: String = row.get(6)?;
    let created_at: String = row.get(7)?;

    Ok(Record {
        id: row.get(0)?,
        composition_id: row.get(1)?,
        event: EventType::from_str(&event).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?,
        tracking_id: row.get(3)?,
        registration_number: row.get(4)?,
        status: row.get(5)?,
        payload: serde_json::from_str(&payload).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?,
        created_at: parse_timestamp(7, &created_at)?,
    })
}

impl Database {
    /// Insert a record or replace the one with the same composition id
    pub fn upsert_record(
        &self,
        composition_id: &str,
        event: EventType,
        tracking_id: Option<&str>,
        registration_number: Option<&str>,
        status: &str,
        payload: &serde_json::Value,
    ) -> SqliteResult<Record> {
        let conn = self.conn.lock().unwrap();
        let now = storage_timestamp(&Utc::now());

        conn.execute(
            "INSERT INTO records (composition_id, event, tracking_id, registration_number, status, payload, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(composition_id) DO UPDATE SET
                event = ?2, tracking_id = ?3, registration_number = ?4, status = ?5, payload = ?6",
            rusqlite::params![
                composition_id,
                event.to_string(),
                tracking_id,
                registration_number,
                status,
                payload.to_string(),
                &now,
            ],
        )?;

        conn.query_row(
            &format!("SELECT {} FROM records WHERE composition_id = ?1", RECORD_COLUMNS),
            [composition_id],
            row_to_record,
        )
    }

    /// Records with id greater than `after_id`, in id order, at most `limit` of them
    pub fn list_records_after(&self, after_id: i64, limit: usize) -> SqliteResult<Vec<Record>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM records WHERE id > ?1 ORDER BY id LIMIT ?2",
            RECORD_COLUMNS
        ))?;

        let records = stmt
            .query_map(rusqlite::params![after_id, limit as i64], row_to_record)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(records)
    }

    pub fn count_records(&self) -> SqliteResult<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_support::temp_db;
    use crate::models::EventType;
    use serde_json::json;

    #[test]
    fn test_upsert_replaces_by_composition_id() {
        let (_dir, db) = temp_db();
        let first = db
            .upsert_record("comp-1", EventType::Birth, Some("B123"), None, "DECLARED", &json!({"child": {}}))
            .unwrap();
        let second = db
            .upsert_record("comp-1", EventType::Birth, Some("B123"), Some("2024B1"), "REGISTERED", &json!({}))
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.status, "REGISTERED");
        assert_eq!(second.registration_number.as_deref(), Some("2024B1"));
        assert_eq!(db.count_records().unwrap(), 1);
    }

    #[test]
    fn test_list_records_after_pages_in_id_order() {
        let (_dir, db) = temp_db();
        for i in 0..5 {
            let event = if i % 2 == 0 { EventType::Birth } else { EventType::Death };
            db.upsert_record(&format!("comp-{}", i), event, None, None, "DECLARED", &json!({})).unwrap();
        }

        let first = db.list_records_after(0, 2).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].event, EventType::Death);

        let rest = db.list_records_after(first[1].id, 10).unwrap();
        assert_eq!(rest.len(), 3);
        assert_eq!(rest[0].composition_id, "comp-2");
    }
}
