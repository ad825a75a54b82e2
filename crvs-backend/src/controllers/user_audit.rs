//! User audit history

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::{DateTime, Months, Utc};
use serde::Deserialize;

use crate::middleware::session_auth::{require_scope, validate_request};
use crate::models::{
    NewUserAuditEntry, SortOrder, UserAuditQuery, DEFAULT_AUDIT_PAGE_SIZE, MAX_AUDIT_PAGE_SIZE,
    SCOPE_NATLSYSADMIN, SCOPE_SYSADMIN,
};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/user-audit")
            .route("", web::get().to(list_user_audit))
            .route("", web::post().to(record_user_audit)),
    );
}

/// Query parameters for listing audit entries
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    practitioner_id: Option<String>,
    time_start: Option<DateTime<Utc>>,
    time_end: Option<DateTime<Utc>>,
    skip: Option<usize>,
    count: Option<usize>,
    sort_order: Option<SortOrder>,
}

impl ListParams {
    fn into_query(self, now: DateTime<Utc>) -> Result<UserAuditQuery, String> {
        let time_end = self.time_end.unwrap_or(now);
        let time_start = match self.time_start {
            Some(start) => start,
            None => time_end
                .checked_sub_months(Months::new(1))
                .ok_or_else(|| "timeEnd is out of range".to_string())?,
        };
        if time_start > time_end {
            return Err("timeStart must not be after timeEnd".to_string());
        }

        Ok(UserAuditQuery {
            practitioner_id: self.practitioner_id.filter(|p| !p.is_empty()),
            time_start,
            time_end,
            skip: self.skip.unwrap_or(0),
            count: self.count.unwrap_or(DEFAULT_AUDIT_PAGE_SIZE).clamp(1, MAX_AUDIT_PAGE_SIZE),
            sort_order: self.sort_order.unwrap_or_default(),
        })
    }
}

async fn list_user_audit(
    state: web::Data<AppState>,
    req: HttpRequest,
    params: web::Query<ListParams>,
) -> impl Responder {
    if let Err(resp) = require_scope(&state.db, &req, &[SCOPE_NATLSYSADMIN, SCOPE_SYSADMIN]) {
        return resp;
    }

    let query = match params.into_inner().into_query(Utc::now()) {
        Ok(query) => query,
        Err(error) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": error }));
        }
    };

    match state.db.list_user_audit(&query) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(e) => {
            log::error!("Failed to list user audit entries: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn record_user_audit(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<NewUserAuditEntry>,
) -> impl Responder {
    let session = match validate_request(&state.db, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };
    let entry = body.into_inner();

    if entry.action.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "action is required"
        }));
    }

    let practitioner_id = session.user_id.clone().unwrap_or_else(|| format!("session-{}", session.id));
    let ip_address = req.connection_info().realip_remote_addr().map(|s| s.to_string());
    let user_agent = req
        .headers()
        .get("User-Agent")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string());

    match state.db.record_user_audit(
        &practitioner_id,
        &entry,
        ip_address.as_deref(),
        user_agent.as_deref(),
        Utc::now(),
    ) {
        Ok(recorded) => HttpResponse::Created().json(recorded),
        Err(e) => {
            log::error!("Failed to record user audit entry: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}
