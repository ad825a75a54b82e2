//! Database model modules - extends Database with domain-specific methods
//!
//! Each module adds `impl Database` blocks with methods for a specific table group.

mod application_config;          // application_config
mod auth;                        // auth_sessions
mod informant_sms_notifications; // informant_sms_notifications
mod records;                     // records
mod user_audit;                  // user_audit_log

use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width timestamp so that text comparison orders chronologically
pub(crate) fn storage_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse an RFC 3339 column into a UTC timestamp
pub(crate) fn parse_timestamp(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}
