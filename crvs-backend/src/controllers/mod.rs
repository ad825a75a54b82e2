pub mod application_config;
pub mod graphql;
pub mod health;
pub mod informant_sms_notification;
pub mod records;
pub mod search;
pub mod user_audit;

#[cfg(test)]
pub(crate) mod test_support {
    use actix_web::web;
    use std::sync::Arc;

    use crate::config::Config;
    use crate::db::Database;
    use crate::gateway::{ConfigService, HttpConfigService, Resolvers};
    use crate::search::retry::{RetryPolicy, DEFAULT_RETRIES};
    use crate::search::{HttpSearchBackend, ReindexJobs, Reindexer, SearchBackend};
    use crate::AppState;

    pub fn test_config() -> Config {
        Config {
            port: 7070,
            database_url: ":memory:".to_string(),
            application_config_url: "http://127.0.0.1:9".to_string(),
            country_config_url: "http://127.0.0.1:9".to_string(),
            search_url: "http://127.0.0.1:9".to_string(),
            search_index_name: "ocrvs".to_string(),
            search_batch_size: 500,
            search_retry_wait_ms: 0,
            bootstrap_admin_token: None,
            session_ttl_hours: 24,
        }
    }

    /// App state whose downstream services are unreachable
    pub fn test_state(db: Database) -> web::Data<AppState> {
        let config = test_config();
        let config_service = Arc::new(
            HttpConfigService::new(&config.application_config_url, &config.country_config_url).unwrap(),
        );
        let backend = Arc::new(HttpSearchBackend::new(&config.search_url).unwrap());
        test_state_with(db, config_service, backend)
    }

    pub fn test_state_with(
        db: Database,
        config_service: Arc<dyn ConfigService>,
        backend: Arc<dyn SearchBackend>,
    ) -> web::Data<AppState> {
        let config = test_config();
        let db = Arc::new(db);
        let reindexer = Arc::new(
            Reindexer::new(db.clone(), backend, &config.search_index_name)
                .with_batch_size(config.search_batch_size)
                .with_policy(RetryPolicy {
                    retries: DEFAULT_RETRIES,
                    wait: std::time::Duration::from_millis(config.search_retry_wait_ms),
                }),
        );
        web::Data::new(AppState {
            db,
            resolvers: Arc::new(Resolvers::new(config_service)),
            reindexer,
            reindex_jobs: Arc::new(ReindexJobs::new()),
        })
    }

    pub fn bearer(token: &str) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", token))
    }
}
