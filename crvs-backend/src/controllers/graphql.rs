//! Gateway entry point.
//!
//! Operations are dispatched by `operationName`; resolver failures are
//! reported in the `errors` array of a 200 response.

use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::gateway::protocol::{GraphQlRequest, GraphQlResponse};
use crate::gateway::ResolverContext;
use crate::middleware::session_auth::validate_request;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/graphql").route(web::post().to(execute)));
}

async fn execute(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<GraphQlRequest>,
) -> impl Responder {
    let session = match validate_request(&state.db, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };
    let authorization = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let request = body.into_inner();

    let ctx = ResolverContext {
        session: &session,
        authorization: &authorization,
    };
    match state
        .resolvers
        .execute(&ctx, &request.operation_name, &request.variables)
        .await
    {
        Ok((operation, result)) => HttpResponse::Ok().json(GraphQlResponse::success(operation, result)),
        Err(e) => {
            log::warn!("[gateway] {} failed: {}", request.operation_name, e);
            HttpResponse::Ok().json(GraphQlResponse::error(e.to_string()))
        }
    }
}
