use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Default page size of the audit history
pub const DEFAULT_AUDIT_PAGE_SIZE: usize = 10;
/// Largest page size a caller may request
pub const MAX_AUDIT_PAGE_SIZE: usize = 100;

/// A user action recorded for the audit history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAuditEntry {
    pub id: i64,
    pub practitioner_id: String,
    pub action: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composition_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    pub time: DateTime<Utc>,
}

/// Fields of an audit entry that the caller supplies
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserAuditEntry {
    pub action: String,
    pub tracking_id: Option<String>,
    pub composition_id: Option<String>,
    pub event: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filter for listing audit entries
#[derive(Debug, Clone)]
pub struct UserAuditQuery {
    pub practitioner_id: Option<String>,
    pub time_start: DateTime<Utc>,
    pub time_end: DateTime<Utc>,
    pub skip: usize,
    pub count: usize,
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserAuditPage {
    pub total: usize,
    pub results: Vec<UserAuditEntry>,
}
