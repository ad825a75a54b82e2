//! Public application config and the login background setting

use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::middleware::session_auth::require_scope;
use crate::models::{LoginBackground, SCOPE_NATLSYSADMIN};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/application-config")
            .route("", web::get().to(get_application_config))
            .route("/login-background", web::put().to(update_login_background)),
    );
}

/// Read by the login page before anyone is signed in, so no session is required
async fn get_application_config(state: web::Data<AppState>) -> impl Responder {
    match state.db.get_application_config() {
        Ok(config) => HttpResponse::Ok().json(serde_json::json!({ "config": config })),
        Err(e) => {
            log::error!("Failed to load application config: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn update_login_background(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<LoginBackground>,
) -> impl Responder {
    if let Err(resp) = require_scope(&state.db, &req, &[SCOPE_NATLSYSADMIN]) {
        return resp;
    }

    let background = match body.into_inner().normalized() {
        Ok(background) => background,
        Err(error) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": error }));
        }
    };

    match state.db.set_login_background(&background) {
        Ok(config) => {
            log::info!(
                "Updated login background: color={:?}, has_image={}, fit={:?}",
                background.background_color,
                background.background_image.is_some(),
                background.image_fit
            );
            HttpResponse::Ok().json(serde_json::json!({ "config": config }))
        }
        Err(e) => {
            log::error!("Failed to save login background: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}
