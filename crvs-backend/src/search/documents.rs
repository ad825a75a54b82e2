//! Search documents composed from registration records
//!
//! Documents are flat: nested payload values (`child.firstNames`, ...) become
//! camelCase top-level fields (`childFirstNames`, ...). Absent values are
//! left out rather than indexed as null.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{EventType, Record};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchDocument {
    pub composition_id: String,
    pub event: EventType,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Payload path -> document field, shared by every event type
const COMMON_FIELDS: &[(&str, &str)] = &[
    ("/informant/firstNames", "informantFirstNames"),
    ("/informant/familyName", "informantFamilyName"),
    ("/eventLocationId", "eventLocationId"),
    ("/declarationLocationId", "declarationLocationId"),
];

const BIRTH_FIELDS: &[(&str, &str)] = &[
    ("/child/firstNames", "childFirstNames"),
    ("/child/familyName", "childFamilyName"),
    ("/child/gender", "gender"),
    ("/child/birthDate", "childDoB"),
    ("/mother/firstNames", "motherFirstNames"),
    ("/mother/familyName", "motherFamilyName"),
    ("/mother/birthDate", "motherDoB"),
    ("/father/firstNames", "fatherFirstNames"),
    ("/father/familyName", "fatherFamilyName"),
    ("/father/birthDate", "fatherDoB"),
];

const DEATH_FIELDS: &[(&str, &str)] = &[
    ("/deceased/firstNames", "deceasedFirstNames"),
    ("/deceased/familyName", "deceasedFamilyName"),
    ("/deceased/gender", "gender"),
    ("/deceased/birthDate", "deceasedDoB"),
    ("/deceased/deathDate", "deathDate"),
    ("/spouse/firstNames", "spouseFirstNames"),
    ("/spouse/familyName", "spouseFamilyName"),
];

const MARRIAGE_FIELDS: &[(&str, &str)] = &[
    ("/bride/firstNames", "brideFirstNames"),
    ("/bride/familyName", "brideFamilyName"),
    ("/bride/birthDate", "brideDoB"),
    ("/groom/firstNames", "groomFirstNames"),
    ("/groom/familyName", "groomFamilyName"),
    ("/groom/birthDate", "groomDoB"),
    ("/marriageDate", "marriageDate"),
    ("/witnessOne/firstNames", "witnessOneFirstNames"),
    ("/witnessOne/familyName", "witnessOneFamilyName"),
    ("/witnessTwo/firstNames", "witnessTwoFirstNames"),
    ("/witnessTwo/familyName", "witnessTwoFamilyName"),
];

/// Build the search document for a record, dispatching on its event type
pub fn compose_document(record: &Record) -> SearchDocument {
    match record.event {
        EventType::Birth => compose_with(record, BIRTH_FIELDS),
        EventType::Death => compose_with(record, DEATH_FIELDS),
        EventType::Marriage => compose_with(record, MARRIAGE_FIELDS),
    }
}

fn compose_with(record: &Record, event_fields: &[(&str, &str)]) -> SearchDocument {
    let mut fields = Map::new();

    fields.insert("type".to_string(), Value::String(record.status.clone()));
    fields.insert("createdAt".to_string(), Value::String(record.created_at.to_rfc3339()));
    if let Some(tracking_id) = &record.tracking_id {
        fields.insert("trackingId".to_string(), Value::String(tracking_id.clone()));
    }
    if let Some(registration_number) = &record.registration_number {
        fields.insert(
            "registrationNumber".to_string(),
            Value::String(registration_number.clone()),
        );
    }

    for (pointer, field) in event_fields.iter().chain(COMMON_FIELDS) {
        if let Some(value) = record.payload.pointer(pointer).filter(|v| !v.is_null()) {
            fields.insert(field.to_string(), value.clone());
        }
    }

    SearchDocument {
        composition_id: record.composition_id.clone(),
        event: record.event,
        fields,
    }
}
