//! Application config database operations

use chrono::Utc;
use rusqlite::{OptionalExtension, Result as SqliteResult};

use crate::models::{ApplicationConfig, LoginBackground, LOGIN_BACKGROUND_KEY};
use super::super::Database;
use super::storage_timestamp;

impl Database {
    /// Load the public application config; unparseable entries are skipped
    pub fn get_application_config(&self) -> SqliteResult<ApplicationConfig> {
        let conn = self.conn.lock().unwrap();

        let login_background: Option<String> = conn
            .query_row(
                "SELECT value FROM application_config WHERE key = ?1",
                [LOGIN_BACKGROUND_KEY],
                |row| row.get(0),
            )
            .optional()?;

        let login_background = login_background.and_then(|json| {
            serde_json::from_str::<LoginBackground>(&json)
                .map_err(|e| log::warn!("Ignoring malformed {} config: {}", LOGIN_BACKGROUND_KEY, e))
                .ok()
        });

        Ok(ApplicationConfig { login_background })
    }

    /// Store the login background, replacing any previous value
    pub fn set_login_background(&self, background: &LoginBackground) -> SqliteResult<ApplicationConfig> {
        let value = serde_json::to_string(background)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let now = storage_timestamp(&Utc::now());

        {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                "INSERT INTO application_config (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
                rusqlite::params![LOGIN_BACKGROUND_KEY, &value, &now],
            )?;
        }

        self.get_application_config()
    }
}

#[cfg(test)]
mod tests {
    use crate::db::test_support::temp_db;
    use crate::models::{ImageFit, LoginBackground};

    #[test]
    fn test_empty_config_has_no_background() {
        let (_dir, db) = temp_db();
        assert!(db.get_application_config().unwrap().login_background.is_none());
    }

    #[test]
    fn test_set_login_background_replaces() {
        let (_dir, db) = temp_db();
        db.set_login_background(&LoginBackground {
            background_color: Some("36304E".to_string()),
            ..Default::default()
        })
        .unwrap();

        let config = db
            .set_login_background(&LoginBackground {
                background_image: Some("data:image/png;base64,AAAA".to_string()),
                image_fit: Some(ImageFit::Tile),
                ..Default::default()
            })
            .unwrap();

        let background = config.login_background.unwrap();
        assert!(background.background_color.is_none());
        assert_eq!(background.image_fit, Some(ImageFit::Tile));
    }
}
