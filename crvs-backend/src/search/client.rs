//! Search engine REST client
//!
//! Speaks the Elasticsearch-compatible REST API: index creation, `_bulk`
//! ingestion, `_cat/indices` listing and `_aliases` updates.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::SearchError;

const REQUEST_TIMEOUT_SECS: u64 = 120;

/// One `index` action of a bulk request
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOperation {
    pub index: String,
    pub id: String,
    pub document: Value,
}

/// Per-item outcome of a bulk request, in request order
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemResult {
    pub id: String,
    pub status: u16,
    pub error: Option<String>,
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn create_index(&self, index: &str, settings: Value) -> Result<(), SearchError>;

    async fn bulk(&self, operations: &[BulkOperation]) -> Result<Vec<BulkItemResult>, SearchError>;

    /// Names of the indices matching a wildcard pattern
    async fn list_indices(&self, pattern: &str) -> Result<Vec<String>, SearchError>;

    async fn update_aliases(&self, actions: Value) -> Result<(), SearchError>;
}

/// Serialize operations as newline-delimited JSON for `_bulk`
pub fn bulk_body(operations: &[BulkOperation]) -> String {
    let mut body = String::new();
    for op in operations {
        body.push_str(&json!({ "index": { "_index": op.index, "_id": op.id } }).to_string());
        body.push('\n');
        body.push_str(&op.document.to_string());
        body.push('\n');
    }
    body
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    #[serde(default)]
    items: Vec<std::collections::HashMap<String, BulkResponseItem>>,
}

#[derive(Debug, Deserialize)]
struct BulkResponseItem {
    #[serde(rename = "_id", default)]
    id: String,
    status: u16,
    #[serde(default)]
    error: Option<Value>,
}

/// Flatten the `items` of a `_bulk` response body
pub fn parse_bulk_response(body: &str) -> Result<Vec<BulkItemResult>, SearchError> {
    let response: BulkResponse =
        serde_json::from_str(body).map_err(|e| SearchError::MalformedResponse(e.to_string()))?;

    response
        .items
        .into_iter()
        .map(|item| {
            let (_, result) = item.into_iter().next().ok_or_else(|| {
                SearchError::MalformedResponse("empty bulk response item".to_string())
            })?;
            Ok(BulkItemResult {
                id: result.id,
                status: result.status,
                error: result.error.map(|e| match e.get("reason").and_then(|r| r.as_str()) {
                    Some(reason) => reason.to_string(),
                    None => e.to_string(),
                }),
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct CatIndex {
    index: String,
}

/// `SearchBackend` over the engine's REST API with reqwest
pub struct HttpSearchBackend {
    client: Client,
    base_url: String,
}

impl HttpSearchBackend {
    pub fn new(base_url: &str) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn expect_success(response: reqwest::Response) -> Result<String, SearchError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn create_index(&self, index: &str, settings: Value) -> Result<(), SearchError> {
        let response = self
            .client
            .put(self.url(index))
            .json(&json!({ "settings": settings }))
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }

    async fn bulk(&self, operations: &[BulkOperation]) -> Result<Vec<BulkItemResult>, SearchError> {
        let response = self
            .client
            .post(self.url("_bulk"))
            .header("Content-Type", "application/x-ndjson")
            .body(bulk_body(operations))
            .send()
            .await?;
        let body = Self::expect_success(response).await?;
        parse_bulk_response(&body)
    }

    async fn list_indices(&self, pattern: &str) -> Result<Vec<String>, SearchError> {
        let response = self
            .client
            .get(self.url(&format!("_cat/indices/{}", pattern)))
            .query(&[("format", "json")])
            .send()
            .await?;
        let body = Self::expect_success(response).await?;
        let indices: Vec<CatIndex> =
            serde_json::from_str(&body).map_err(|e| SearchError::MalformedResponse(e.to_string()))?;
        Ok(indices.into_iter().map(|i| i.index).collect())
    }

    async fn update_aliases(&self, actions: Value) -> Result<(), SearchError> {
        let response = self
            .client
            .post(self.url("_aliases"))
            .json(&actions)
            .send()
            .await?;
        Self::expect_success(response).await?;
        Ok(())
    }
}
