use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use crate::middleware::session_auth::require_scope;
use crate::models::{EventType, SCOPE_NATLSYSADMIN, SCOPE_REGISTER};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/records").route(web::post().to(upsert_record)));
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRecordRequest {
    composition_id: String,
    event: EventType,
    tracking_id: Option<String>,
    registration_number: Option<String>,
    status: String,
    #[serde(default = "empty_payload")]
    payload: serde_json::Value,
}

fn empty_payload() -> serde_json::Value {
    serde_json::json!({})
}

async fn upsert_record(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<UpsertRecordRequest>,
) -> impl Responder {
    if let Err(resp) = require_scope(&state.db, &req, &[SCOPE_REGISTER, SCOPE_NATLSYSADMIN]) {
        return resp;
    }
    let mut body = body.into_inner();
    if body.payload.is_null() {
        body.payload = empty_payload();
    }

    if body.composition_id.trim().is_empty() || body.status.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "compositionId and status are required"
        }));
    }

    match state.db.upsert_record(
        &body.composition_id,
        body.event,
        body.tracking_id.as_deref(),
        body.registration_number.as_deref(),
        &body.status,
        &body.payload,
    ) {
        Ok(record) => {
            log::debug!("Stored {} record {}", record.event, record.composition_id);
            HttpResponse::Ok().json(record)
        }
        Err(e) => {
            log::error!("Failed to store record {}: {}", body.composition_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}
