use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// SMS notifications that can be sent to the informant of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum NotificationName {
    #[strum(serialize = "birthInProgressSMS")]
    BirthInProgress,
    #[strum(serialize = "birthDeclarationSMS")]
    BirthDeclaration,
    #[strum(serialize = "birthRejectionSMS")]
    BirthRejection,
    #[strum(serialize = "birthRegistrationSMS")]
    BirthRegistration,
    #[strum(serialize = "deathInProgressSMS")]
    DeathInProgress,
    #[strum(serialize = "deathDeclarationSMS")]
    DeathDeclaration,
    #[strum(serialize = "deathRegistrationSMS")]
    DeathRegistration,
    #[strum(serialize = "deathRejectionSMS")]
    DeathRejection,
}

impl NotificationName {
    /// Key of the message text in the country config notification content
    pub fn resource_key(&self) -> &'static str {
        match self {
            Self::BirthInProgress => "birthInProgressNotification",
            Self::BirthDeclaration => "birthDeclarationNotification",
            Self::BirthRejection => "birthRejectionNotification",
            Self::BirthRegistration => "birthRegistrationNotification",
            Self::DeathInProgress => "deathInProgressNotification",
            Self::DeathDeclaration => "deathDeclarationNotification",
            Self::DeathRegistration => "deathRegistrationNotification",
            Self::DeathRejection => "deathRejectionNotification",
        }
    }

    /// Names seeded into an empty store, in seeding order
    pub fn defaults() -> Vec<String> {
        Self::iter().map(|n| n.to_string()).collect()
    }
}

/// Informant SMS notification toggle as stored by the config service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InformantSmsNotification {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

/// One item of the update payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateInformantSmsNotificationItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl UpdateInformantSmsNotificationItem {
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("\"id\" is not allowed to be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("\"name\" is not allowed to be empty".to_string());
        }
        Ok(())
    }

    /// Whether applying this item would change the stored notification
    pub fn modifies(&self, existing: &InformantSmsNotification) -> bool {
        self.id == existing.id
            && (self.name != existing.name
                || self.enabled.is_some_and(|enabled| enabled != existing.enabled))
    }
}
