//! User audit log database operations

use chrono::{DateTime, Utc};
use rusqlite::Result as SqliteResult;

use crate::models::{NewUserAuditEntry, SortOrder, UserAuditEntry, UserAuditPage, UserAuditQuery};
use super::super::Database;
use super::{parse_timestamp, storage_timestamp};

impl Database {
    /// Append an audit entry for a practitioner
    pub fn record_user_audit(
        &self,
        practitioner_id: &str,
        entry: &NewUserAuditEntry,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
        time: DateTime<Utc>,
    ) -> SqliteResult<UserAuditEntry> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO user_audit_log (practitioner_id, action, ip_address, user_agent, tracking_id, composition_id, event, time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                practitioner_id,
                &entry.action,
                ip_address,
                user_agent,
                &entry.tracking_id,
                &entry.composition_id,
                &entry.event,
                storage_timestamp(&time),
            ],
        )?;

        Ok(UserAuditEntry {
            id: conn.last_insert_rowid(),
            practitioner_id: practitioner_id.to_string(),
            action: entry.action.clone(),
            ip_address: ip_address.map(|s| s.to_string()),
            user_agent: user_agent.map(|s| s.to_string()),
            tracking_id: entry.tracking_id.clone(),
            composition_id: entry.composition_id.clone(),
            event: entry.event.clone(),
            time,
        })
    }

    /// List audit entries in a time window, with the total before pagination
    pub fn list_user_audit(&self, query: &UserAuditQuery) -> SqliteResult<UserAuditPage> {
        let conn = self.conn.lock().unwrap();
        let start = storage_timestamp(&query.time_start);
        let end = storage_timestamp(&query.time_end);

        // ?3 is NULL when no practitioner filter applies
        let filter = "FROM user_audit_log WHERE time >= ?1 AND time <= ?2 AND (?3 IS NULL OR practitioner_id = ?3)";

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) {}", filter),
            rusqlite::params![&start, &end, &query.practitioner_id],
            |row| row.get(0),
        )?;

        let order = match query.sort_order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        let mut stmt = conn.prepare(&format!(
            "SELECT id, practitioner_id, action, ip_address, user_agent, tracking_id, composition_id, event, time
             {} ORDER BY time {}, id {} LIMIT ?4 OFFSET ?5",
            filter, order, order
        ))?;

        let results = stmt
            .query_map(
                rusqlite::params![
                    &start,
                    &end,
                    &query.practitioner_id,
                    query.count as i64,
                    query.skip as i64,
                ],
                |row| {
                    let time: String = row.get(8)?;
                    Ok(UserAuditEntry {
                        id: row.get(0)?,
                        practitioner_id: row.get(1)?,
                        action: row.get(2)?,
                        ip_address: row.get(3)?,
                        user_agent: row.get(4)?,
                        tracking_id: row.get(5)?,
                        composition_id: row.get(6)?,
                        event: row.get(7)?,
                        time: parse_timestamp(8, &time)?,
                    })
                },
            )?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(UserAuditPage {
            total: total as usize,
            results,
        })
    }
}
