//! Informant SMS notification database operations

use chrono::Utc;
use rusqlite::Result as SqliteResult;

use crate::models::InformantSmsNotification;
use super::super::Database;
use super::{parse_timestamp, storage_timestamp};

impl Database {
    /// List all informant SMS notifications ordered by id
    pub fn list_informant_sms_notifications(&self) -> SqliteResult<Vec<InformantSmsNotification>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT id, name, enabled, created_at, updated_at FROM informant_sms_notifications ORDER BY id",
        )?;

        let notifications = stmt
            .query_map([], |row| {
                let id: i64 = row.get(0)?;
                let enabled: i64 = row.get(2)?;
                let created_at: String = row.get(3)?;
                let updated_at: String = row.get(4)?;

                Ok(InformantSmsNotification {
                    id: id.to_string(),
                    name: row.get(1)?,
                    enabled: enabled != 0,
                    created_at: parse_timestamp(3, &created_at)?,
                    updated_at: parse_timestamp(4, &updated_at)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(notifications)
    }

    /// Write new name/enabled values for the given notifications in one transaction.
    ///
    /// Every written row gets a fresh `updated_at`. Returns the number of rows changed.
    pub fn update_informant_sms_notifications(
        &self,
        notifications: &[InformantSmsNotification],
    ) -> SqliteResult<usize> {
        let mut conn = self.conn.lock().unwrap();
        let now = storage_timestamp(&Utc::now());

        let tx = conn.transaction()?;
        let mut changed = 0;
        for notification in notifications {
            // Ids are surfaced as strings; anything non-numeric cannot match a row
            let Ok(id) = notification.id.parse::<i64>() else {
                continue;
            };
            changed += tx.execute(
                "UPDATE informant_sms_notifications SET name = ?1, enabled = ?2, updated_at = ?3 WHERE id = ?4",
                rusqlite::params![
                    &notification.name,
                    if notification.enabled { 1 } else { 0 },
                    &now,
                    id,
                ],
            )?;
        }
        tx.commit()?;

        Ok(changed)
    }
}
