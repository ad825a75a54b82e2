use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventType {
    Birth,
    Death,
    Marriage,
}

/// A registration record as held in the record store.
///
/// `payload` carries the event-specific details (names, dates, places) as
/// free-form JSON; the search documents are composed from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: i64,
    pub composition_id: String,
    pub event: EventType,
    pub tracking_id: Option<String>,
    pub registration_number: Option<String>,
    pub status: String,
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
