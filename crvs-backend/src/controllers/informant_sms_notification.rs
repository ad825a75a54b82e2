//! Informant SMS notification toggles (config service)

use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::middleware::session_auth::require_scope;
use crate::models::{InformantSmsNotification, UpdateInformantSmsNotificationItem, SCOPE_NATLSYSADMIN};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/informantSMSNotification")
            .route(web::get().to(get_informant_sms_notifications))
            .route(web::put().to(update_informant_sms_notifications)),
    );
}

/// Stored notifications with the payload applied, keeping only the ones that change
fn modified_notifications(
    existing: &[InformantSmsNotification],
    payload: &[UpdateInformantSmsNotificationItem],
) -> Vec<InformantSmsNotification> {
    existing
        .iter()
        .filter_map(|stored| {
            let item = payload.iter().find(|item| item.modifies(stored))?;
            Some(InformantSmsNotification {
                name: item.name.clone(),
                enabled: item.enabled.unwrap_or(stored.enabled),
                ..stored.clone()
            })
        })
        .collect()
}

async fn get_informant_sms_notifications(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> impl Responder {
    if let Err(resp) = require_scope(&state.db, &req, &[SCOPE_NATLSYSADMIN]) {
        return resp;
    }

    match state.db.list_informant_sms_notifications() {
        Ok(notifications) => HttpResponse::Ok().json(notifications),
        Err(e) => {
            log::error!("Failed to list informant SMS notifications: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Could not get informantSMSNotification"
            }))
        }
    }
}

async fn update_informant_sms_notifications(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<Vec<UpdateInformantSmsNotificationItem>>,
) -> impl Responder {
    if let Err(resp) = require_scope(&state.db, &req, &[SCOPE_NATLSYSADMIN]) {
        return resp;
    }
    let payload = body.into_inner();

    if let Some(error) = payload.iter().find_map(|item| item.validate().err()) {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": error }));
    }

    let existing = match state.db.list_informant_sms_notifications() {
        Ok(existing) if !existing.is_empty() => existing,
        Ok(_) => {
            log::error!("No Informant SMS notifications found");
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Could not update informantSMSNotification"
            }));
        }
        Err(e) => {
            log::error!("Failed to load informant SMS notifications: {}", e);
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Could not update informantSMSNotification"
            }));
        }
    };

    let modified = modified_notifications(&existing, &payload);
    if let Err(e) = state.db.update_informant_sms_notifications(&modified) {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("Failed to update existing question. {}", e)
        }));
    }
    log::info!("Updated {} informant SMS notifications", modified.len());

    match state.db.list_informant_sms_notifications() {
        Ok(notifications) => HttpResponse::Created().json(notifications),
        Err(e) => {
            log::error!("Failed to reload informant SMS notifications: {}", e);
            HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Could not update informantSMSNotification"
            }))
        }
    }
}
