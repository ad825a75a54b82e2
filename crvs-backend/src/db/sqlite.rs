//! SQLite database - schema definitions and connection management
//!
//! This file contains:
//! - Database struct definition
//! - Connection management (new, init)
//! - Schema creation and seeding
//!
//! All database operations are in the tables/ subdirectory.

use chrono::Utc;
use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;
use std::sync::Mutex;

use super::tables::storage_timestamp;
use crate::models::NotificationName;

/// Main database wrapper with connection pooling via Mutex
pub struct Database {
    pub(crate) conn: Mutex<Connection>,
}

impl Database {
    /// Create a new database connection and initialize schema
    pub fn new(database_url: &str) -> SqliteResult<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = Path::new(database_url).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).ok();
            }
        }

        let conn = Connection::open(database_url)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init()?;
        Ok(db)
    }

    /// Initialize all database tables and seed defaults
    fn init(&self) -> SqliteResult<()> {
        let conn = self.conn.lock().unwrap();

        // Auth sessions; scopes are a comma separated list
        conn.execute(
            "CREATE TABLE IF NOT EXISTS auth_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                token TEXT UNIQUE NOT NULL,
                user_id TEXT,
                scopes TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS informant_sms_notifications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT UNIQUE NOT NULL,
                enabled INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        // Application config, one JSON document per key (LOGIN_BACKGROUND, ...)
        conn.execute(
            "CREATE TABLE IF NOT EXISTS application_config (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS user_audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                practitioner_id TEXT NOT NULL,
                action TEXT NOT NULL,
                ip_address TEXT,
                user_agent TEXT,
                tracking_id TEXT,
                composition_id TEXT,
                event TEXT,
                time TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_user_audit_practitioner_time
                ON user_audit_log (practitioner_id, time)",
            [],
        )?;

        // Registration records, source of truth for the search index
        conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                composition_id TEXT UNIQUE NOT NULL,
                event TEXT NOT NULL,
                tracking_id TEXT,
                registration_number TEXT,
                status TEXT NOT NULL,
                payload TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        // Seed informant SMS notifications with defaults if empty
        let notification_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM informant_sms_notifications", [], |row| row.get(0))?;

        if notification_count == 0 {
            let now = storage_timestamp(&Utc::now());
            for name in NotificationName::defaults() {
                conn.execute(
                    "INSERT INTO informant_sms_notifications (name, enabled, created_at, updated_at) VALUES (?1, 1, ?2, ?3)",
                    rusqlite::params![&name, &now, &now],
                )?;
            }
            log::info!("Seeded {} informant SMS notifications", NotificationName::defaults().len());
        }

        Ok(())
    }
}
