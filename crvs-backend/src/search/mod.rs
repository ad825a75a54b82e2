//! Search indexing
//!
//! The record store is the source of truth; the search engine holds a
//! derived, rebuildable copy behind an alias.

pub mod client;
pub mod documents;
pub mod jobs;
pub mod reindex;
pub mod retry;

pub use client::{HttpSearchBackend, SearchBackend};
pub use jobs::{JobStart, ReindexJobs};
pub use reindex::Reindexer;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search engine returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Search request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed search engine response: {0}")]
    MalformedResponse(String),
    #[error("Document {0} couldn't be inserted")]
    DocumentDropped(String),
    #[error("No indices match {0}")]
    NoIndices(String),
    #[error("Record store error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl SearchError {
    /// Whether the whole request may succeed if sent again
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => retry::RetryPolicy::is_retryable_status(*status),
            Self::Http(e) => retry::is_reqwest_error_retryable(e),
            _ => false,
        }
    }
}
