use std::env;

/// Default alias and index prefix in the search engine
pub const DEFAULT_SEARCH_INDEX_NAME: &str = "ocrvs";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Base URL of the config service, used by the gateway resolvers
    pub application_config_url: String,
    /// Base URL of the country configuration service (notification content)
    pub country_config_url: String,
    pub search_url: String,
    pub search_index_name: String,
    /// Records per bulk request during a reindex
    pub search_batch_size: usize,
    /// Wait between bulk retries in milliseconds
    pub search_retry_wait_ms: u64,
    /// When set, a natlsysadmin session with this token is ensured at startup
    pub bootstrap_admin_token: Option<String>,
    pub session_ttl_hours: i64,
}

impl Config {
    pub fn from_env() -> Self {
        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "7070".to_string())
            .parse()
            .expect("PORT must be a valid number");

        Self {
            port,
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "./.db/crvs.db".to_string()),
            application_config_url: env::var("APPLICATION_CONFIG_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", port)),
            country_config_url: env::var("COUNTRY_CONFIG_URL")
                .unwrap_or_else(|_| "http://localhost:3040".to_string()),
            search_url: env::var("SEARCH_URL").unwrap_or_else(|_| "http://localhost:9200".to_string()),
            search_index_name: env::var("SEARCH_INDEX_NAME")
                .unwrap_or_else(|_| DEFAULT_SEARCH_INDEX_NAME.to_string()),
            search_batch_size: env::var("SEARCH_BATCH_SIZE")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .expect("SEARCH_BATCH_SIZE must be a valid number"),
            search_retry_wait_ms: env::var("SEARCH_RETRY_WAIT_MS")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("SEARCH_RETRY_WAIT_MS must be a valid number"),
            bootstrap_admin_token: env::var("BOOTSTRAP_ADMIN_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            session_ttl_hours: env::var("SESSION_TTL_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .expect("SESSION_TTL_HOURS must be a valid number"),
        }
    }
}
