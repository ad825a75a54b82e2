// Session authentication helpers
// Controllers call `require_scope` at the top of protected handlers; the
// returned session carries the caller's scopes and user id.

use actix_web::{HttpRequest, HttpResponse};
use std::sync::Arc;

use crate::db::Database;
use crate::models::Session;

pub fn extract_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim_start_matches("Bearer ").to_string())
        .filter(|s| !s.is_empty())
}

/// Validate the session attached to the request
pub fn validate_request(db: &Arc<Database>, req: &HttpRequest) -> Result<Session, HttpResponse> {
    let token = extract_token(req).ok_or_else(|| {
        HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "No authorization token provided"
        }))
    })?;

    match db.validate_session(&token) {
        Ok(Some(session)) => Ok(session),
        Ok(None) => Err(HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid or expired session"
        }))),
        Err(e) => {
            log::error!("Session validation error: {}", e);
            Err(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })))
        }
    }
}

/// Validate the session and require at least one of `scopes`
pub fn require_scope(
    db: &Arc<Database>,
    req: &HttpRequest,
    scopes: &[&str],
) -> Result<Session, HttpResponse> {
    let session = validate_request(db, req)?;
    if !session.has_any_scope(scopes) {
        return Err(HttpResponse::Forbidden().json(serde_json::json!({
            "error": format!("Requires one of the scopes: {}", scopes.join(", "))
        })));
    }
    Ok(session)
}
