use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

mod config;
mod controllers;
mod db;
mod gateway;
mod middleware;
mod models;
mod search;

use config::Config;
use db::Database;
use gateway::{HttpConfigService, Resolvers};
use models::SCOPE_NATLSYSADMIN;
use search::retry::{RetryPolicy, DEFAULT_RETRIES};
use search::{HttpSearchBackend, ReindexJobs, Reindexer};

pub struct AppState {
    pub db: Arc<Database>,
    pub resolvers: Arc<Resolvers>,
    pub reindexer: Arc<Reindexer>,
    pub reindex_jobs: Arc<ReindexJobs>,
}

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    log::info!("Initializing database at {}", config.database_url);
    let db = Database::new(&config.database_url)
        .map_err(|e| startup_error("Failed to initialize database", e))?;
    let db = Arc::new(db);

    match db.cleanup_expired_sessions() {
        Ok(0) => {}
        Ok(n) => log::info!("Removed {} expired sessions", n),
        Err(e) => log::warn!("Failed to clean up expired sessions: {}", e),
    }

    if let Some(token) = &config.bootstrap_admin_token {
        db.upsert_session(
            token,
            None,
            &[SCOPE_NATLSYSADMIN],
            chrono::Duration::hours(config.session_ttl_hours),
        )
        .map_err(|e| startup_error("Failed to create bootstrap session", e))?;
        log::info!("Bootstrap natlsysadmin session valid for {} hours", config.session_ttl_hours);
    }

    log::info!(
        "[gateway] Config service at {}, country config at {}",
        config.application_config_url,
        config.country_config_url
    );
    let config_service = HttpConfigService::new(&config.application_config_url, &config.country_config_url)
        .map_err(|e| startup_error("Invalid config service URL", e))?;
    let resolvers = Arc::new(Resolvers::new(Arc::new(config_service)));

    log::info!("[search] Search engine at {}, alias {}", config.search_url, config.search_index_name);
    let backend = HttpSearchBackend::new(&config.search_url)
        .map_err(|e| startup_error("Invalid search URL", e))?;
    let reindexer = Arc::new(
        Reindexer::new(db.clone(), Arc::new(backend), &config.search_index_name)
            .with_batch_size(config.search_batch_size)
            .with_policy(RetryPolicy {
                retries: DEFAULT_RETRIES,
                wait: std::time::Duration::from_millis(config.search_retry_wait_ms),
            }),
    );
    let reindex_jobs = Arc::new(ReindexJobs::new());

    log::info!("Starting CRVS backend on port {}", port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                db: Arc::clone(&db),
                resolvers: Arc::clone(&resolvers),
                reindexer: Arc::clone(&reindexer),
                reindex_jobs: Arc::clone(&reindex_jobs),
            }))
            .app_data(web::JsonConfig::default().limit(4 * 1024 * 1024))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config)
            .configure(controllers::graphql::config)
            .configure(controllers::informant_sms_notification::config)
            .configure(controllers::application_config::config)
            .configure(controllers::user_audit::config)
            .configure(controllers::records::config)
            .configure(controllers::search::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
