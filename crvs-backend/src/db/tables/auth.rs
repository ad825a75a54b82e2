//! Auth session database operations

use chrono::{Duration, Utc};
use rusqlite::{OptionalExtension, Result as SqliteResult};
use uuid::Uuid;

use crate::models::{parse_scopes, Session};
use super::super::Database;
use super::{parse_timestamp, storage_timestamp};

const SESSION_COLUMNS: &str = "id, token, user_id, scopes, created_at, expires_at";

fn row_to_session(row: &rusqlite::Row) -> rusqlite::Result<Session> {
    let scopes: String = row.get(3)?;
    let created_at: String = row.get(4)?;
    let expires_at: String = row.get(5)?;

    Ok(Session {
        id: row.get(0)?,
        token: row.get(1)?,
        user_id: row.get(2)?,
        scopes: parse_scopes(&scopes),
        created_at: parse_timestamp(4, &created_at)?,
        expires_at: parse_timestamp(5, &expires_at)?,
    })
}

impl Database {
    /// Create a session with a fresh random token
    pub fn create_session(
        &self,
        user_id: Option<&str>,
        scopes: &[&str],
        ttl: Duration,
    ) -> SqliteResult<Session> {
        let token = Uuid::new_v4().simple().to_string();
        self.upsert_session(&token, user_id, scopes, ttl)
    }

    /// Insert a session with a known token, replacing its scopes and expiry if it exists
    pub fn upsert_session(
        &self,
        token: &str,
        user_id: Option<&str>,
        scopes: &[&str],
        ttl: Duration,
    ) -> SqliteResult<Session> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();
        let expires_at = now + ttl;
        let scopes = scopes.join(",");

        conn.execute(
            "INSERT INTO auth_sessions (token, user_id, scopes, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(token) DO UPDATE SET user_id = ?2, scopes = ?3, expires_at = ?5",
            rusqlite::params![token, user_id, &scopes, storage_timestamp(&now), storage_timestamp(&expires_at)],
        )?;

        conn.query_row(
            &format!("SELECT {} FROM auth_sessions WHERE token = ?1", SESSION_COLUMNS),
            [token],
            row_to_session,
        )
    }

    /// Return the session for a token if it exists and has not expired
    pub fn validate_session(&self, token: &str) -> SqliteResult<Option<Session>> {
        let conn = self.conn.lock().unwrap();

        let session = conn
            .query_row(
                &format!("SELECT {} FROM auth_sessions WHERE token = ?1", SESSION_COLUMNS),
                [token],
                row_to_session,
            )
            .optional()?;

        Ok(session.filter(|s| s.expires_at > Utc::now()))
    }

    /// Remove expired sessions, returning how many were deleted
    pub fn cleanup_expired_sessions(&self) -> SqliteResult<usize> {
        let conn = self.conn.lock().unwrap();
        let now = storage_timestamp(&Utc::now());
        conn.execute("DELETE FROM auth_sessions WHERE expires_at <= ?1", [&now])
    }
}
