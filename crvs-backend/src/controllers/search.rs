use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::middleware::session_auth::require_scope;
use crate::models::SCOPE_NATLSYSADMIN;
use crate::search::JobStart;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/search/reindex")
            .route("", web::post().to(start_reindex))
            .route("/{job_id}", web::get().to(get_reindex_job)),
    );
}

async fn start_reindex(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Err(resp) = require_scope(&state.db, &req, &[SCOPE_NATLSYSADMIN]) {
        return resp;
    }

    match state.reindex_jobs.start(state.reindexer.clone()) {
        JobStart::Started(job) => {
            log::info!(
                "[search] Started reindex job {} into {}",
                job.job_id,
                job.index.as_deref().unwrap_or_default()
            );
            HttpResponse::Accepted().json(serde_json::json!({
                "jobId": job.job_id,
                "status": job.status,
            }))
        }
        JobStart::AlreadyRunning(job) => HttpResponse::Conflict().json(serde_json::json!({
            "error": format!("Reindex job {} is already running", job.job_id),
            "jobId": job.job_id,
            "status": job.status,
        })),
    }
}

async fn get_reindex_job(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    if let Err(resp) = require_scope(&state.db, &req, &[SCOPE_NATLSYSADMIN]) {
        return resp;
    }

    let job_id = path.into_inner();
    match state.reindex_jobs.get(&job_id) {
        Some(job) => HttpResponse::Ok().json(job),
        None => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("Reindex job {} not found", job_id)
        })),
    }
}
