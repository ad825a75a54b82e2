//! Gateway resolvers
//!
//! The gateway is the single entry point of the admin UI. Each operation checks
//! the caller's scopes, then proxies to the config service over HTTP.

pub mod config_service;
pub mod protocol;
pub mod resolvers;

pub use config_service::{ConfigService, HttpConfigService};
pub use resolvers::{ResolverContext, Resolvers};

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The caller lacks the scope the operation needs
    #[error("{0}")]
    Forbidden(String),
    /// The config service rejected or failed a proxied call
    #[error("{0}")]
    ConfigService(String),
    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus { url: String, status: u16 },
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Invalid service URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),
    #[error("Invalid variables: {0}")]
    InvalidVariables(String),
}
