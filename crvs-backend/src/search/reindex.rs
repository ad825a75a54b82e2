//! Rebuilds the search index from the record store.
//!
//! Each run writes into a fresh timestamped index (`ocrvs-20240523000000`);
//! `update_aliases` then points the search alias at the newest one, so
//! readers never see a half-built index.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use super::client::{BulkOperation, SearchBackend};
use super::documents::{compose_document, SearchDocument};
use super::retry::RetryPolicy;
use super::SearchError;
use crate::db::Database;

/// Records read from the store and sent per bulk request
pub const DEFAULT_BATCH_SIZE: usize = 500;

pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d%H%M%S").to_string()
}

pub fn format_index_name(index_name: &str, timestamp: &str) -> String {
    format!("{}-{}", index_name, timestamp)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReindexOutcome {
    pub index: String,
    pub documents: usize,
}

pub struct Reindexer {
    db: Arc<Database>,
    backend: Arc<dyn SearchBackend>,
    index_name: String,
    policy: RetryPolicy,
    batch_size: usize,
}

impl Reindexer {
    pub fn new(db: Arc<Database>, backend: Arc<dyn SearchBackend>, index_name: &str) -> Self {
        Self {
            db,
            backend,
            index_name: index_name.to_string(),
            policy: RetryPolicy::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Stream every record into a new index named after `timestamp`
    pub async fn reindex(&self, timestamp: &str) -> Result<ReindexOutcome, SearchError> {
        let started = Instant::now();
        let index = format_index_name(&self.index_name, timestamp);
        log::info!("[search] Reindexing to {}", index);

        self.backend
            .create_index(
                &index,
                json!({
                    "number_of_shards": 1,
                    "number_of_replicas": 1
                }),
            )
            .await?;

        let mut after_id = 0;
        let mut documents = 0;
        loop {
            let records = self.db.list_records_after(after_id, self.batch_size)?;
            let Some(last) = records.last() else {
                break;
            };
            after_id = last.id;

            let batch: Vec<SearchDocument> = records.iter().map(compose_document).collect();
            documents += batch.len();
            self.index_batch(&index, batch).await?;
        }

        log::info!(
            "[search] Finished reindexing to {} in {:.2} seconds",
            index,
            started.elapsed().as_secs_f64()
        );

        Ok(ReindexOutcome { index, documents })
    }

    /// Point the alias at the latest timestamped index, returning that index
    pub async fn update_aliases(&self) -> Result<String, SearchError> {
        let pattern = format!("{}-*", self.index_name);
        let mut indices = self.backend.list_indices(&pattern).await?;
        indices.sort();
        let latest = indices
            .pop()
            .ok_or_else(|| SearchError::NoIndices(pattern.clone()))?;

        self.backend
            .update_aliases(json!({
                "actions": [
                    { "remove": { "alias": self.index_name, "index": pattern } },
                    { "add": { "alias": self.index_name, "index": latest } }
                ]
            }))
            .await?;

        log::info!("[search] Alias {} now points to {}", self.index_name, latest);
        Ok(latest)
    }

    /// Bulk-index a batch; items rejected with 429 are retried, anything else is fatal
    async fn index_batch(&self, index: &str, batch: Vec<SearchDocument>) -> Result<(), SearchError> {
        let mut pending = batch;
        let mut attempt = 0;

        loop {
            let operations = pending
                .iter()
                .map(|doc| {
                    Ok(BulkOperation {
                        index: index.to_string(),
                        id: doc.composition_id.clone(),
                        document: serde_json::to_value(doc)
                            .map_err(|e| SearchError::MalformedResponse(e.to_string()))?,
                    })
                })
                .collect::<Result<Vec<_>, SearchError>>()?;

            let items = self.send_bulk(&operations).await?;
            if items.len() != pending.len() {
                return Err(SearchError::MalformedResponse(format!(
                    "bulk response has {} items for {} documents",
                    items.len(),
                    pending.len()
                )));
            }

            let mut retry = Vec::new();
            for (doc, item) in pending.into_iter().zip(items) {
                if (200..300).contains(&item.status) {
                    continue;
                }
                if RetryPolicy::is_retryable_item_status(item.status) {
                    retry.push(doc);
                } else {
                    log::error!(
                        "[search] Document {} rejected with {}: {}",
                        doc.composition_id,
                        item.status,
                        item.error.unwrap_or_default()
                    );
                    return Err(SearchError::DocumentDropped(doc.composition_id));
                }
            }

            if retry.is_empty() {
                return Ok(());
            }
            if !self.policy.allows(attempt) {
                return Err(SearchError::DocumentDropped(retry[0].composition_id.clone()));
            }

            attempt += 1;
            log::warn!(
                "[search] {} documents rejected with 429, retry {}/{}",
                retry.len(),
                attempt,
                self.policy.retries
            );
            tokio::time::sleep(self.policy.wait).await;
            pending = retry;
        }
    }

    /// Send one bulk request, retrying transient request failures
    async fn send_bulk(
        &self,
        operations: &[BulkOperation],
    ) -> Result<Vec<super::client::BulkItemResult>, SearchError> {
        let mut attempt = 0;
        loop {
            match self.backend.bulk(operations).await {
                Ok(items) => return Ok(items),
                Err(e) if e.is_retryable() && self.policy.allows(attempt) => {
                    attempt += 1;
                    log::warn!("[search] Bulk request failed ({}), retry {}/{}", e, attempt, self.policy.retries);
                    tokio::time::sleep(self.policy.wait).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_db;
    use crate::models::EventType;
    use crate::search::client::BulkItemResult;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-memory engine; `reject` maps a document id to the statuses it returns, in order
    #[derive(Default)]
    struct FakeBackend {
        created: Mutex<Vec<(String, Value)>>,
        indexed: Mutex<HashMap<String, Vec<String>>>,
        reject: Mutex<HashMap<String, Vec<u16>>>,
        bulk_calls: Mutex<usize>,
        failing_requests: Mutex<u32>,
        existing: Mutex<Vec<String>>,
        alias_actions: Mutex<Option<Value>>,
    }

    #[async_trait]
    impl SearchBackend for FakeBackend {
        async fn create_index(&self, index: &str, settings: Value) -> Result<(), SearchError> {
            self.created.lock().unwrap().push((index.to_string(), settings));
            Ok(())
        }

        async fn bulk(&self, operations: &[BulkOperation]) -> Result<Vec<BulkItemResult>, SearchError> {
            *self.bulk_calls.lock().unwrap() += 1;
            {
                let mut failing = self.failing_requests.lock().unwrap();
                if *failing > 0 {
                    *failing -= 1;
                    return Err(SearchError::Status { status: 503, body: "unavailable".to_string() });
                }
            }

            let mut reject = self.reject.lock().unwrap();
            let mut indexed = self.indexed.lock().unwrap();
            Ok(operations
                .iter()
                .map(|op| {
                    let status = reject
                        .get_mut(&op.id)
                        .and_then(|statuses| (!statuses.is_empty()).then(|| statuses.remove(0)))
                        .unwrap_or(201);
                    if status == 201 {
                        indexed.entry(op.index.clone()).or_default().push(op.id.clone());
                    }
                    BulkItemResult { id: op.id.clone(), status, error: None }
                })
                .collect())
        }

        async fn list_indices(&self, _pattern: &str) -> Result<Vec<String>, SearchError> {
            Ok(self.existing.lock().unwrap().clone())
        }

        async fn update_aliases(&self, actions: Value) -> Result<(), SearchError> {
            *self.alias_actions.lock().unwrap() = Some(actions);
            Ok(())
        }
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy { retries: 3, wait: Duration::ZERO }
    }

    fn seed_records(db: &Database, count: usize) {
        for i in 0..count {
            let event = match i % 3 {
                0 => EventType::Birth,
                1 => EventType::Death,
                _ => EventType::Marriage,
            };
            db.upsert_record(&format!("comp-{}", i), event, None, None, "REGISTERED", &json!({}))
                .unwrap();
        }
    }

    #[test]
    fn test_index_name_format() {
        let now = Utc.with_ymd_and_hms(2024, 5, 23, 0, 0, 0).unwrap();
        assert_eq!(
            format_index_name("ocrvs", &format_timestamp(now)),
            "ocrvs-20240523000000"
        );
    }

    #[tokio::test]
    async fn test_reindex_streams_all_records_in_batches() {
        let (_dir, db) = temp_db();
        let db = Arc::new(db);
        seed_records(&db, 7);
        let backend = Arc::new(FakeBackend::default());
        let reindexer = Reindexer::new(db, backend.clone(), "ocrvs")
            .with_policy(fast_policy())
            .with_batch_size(3);

        let outcome = reindexer.reindex("20240523000000").await.unwrap();

        assert_eq!(outcome.index, "ocrvs-20240523000000");
        assert_eq!(outcome.documents, 7);
        assert_eq!(*backend.bulk_calls.lock().unwrap(), 3);
        let created = backend.created.lock().unwrap();
        assert_eq!(created[0].0, "ocrvs-20240523000000");
        assert_eq!(created[0].1["number_of_shards"], 1);
        assert_eq!(backend.indexed.lock().unwrap()["ocrvs-20240523000000"].len(), 7);
    }

    #[tokio::test]
    async fn test_rejected_items_are_retried() {
        let (_dir, db) = temp_db();
        let db = Arc::new(db);
        seed_records(&db, 2);
        let backend = Arc::new(FakeBackend::default());
        backend.reject.lock().unwrap().insert("comp-1".to_string(), vec![429, 429]);
        let reindexer = Reindexer::new(db, backend.clone(), "ocrvs").with_policy(fast_policy());

        reindexer.reindex("1").await.unwrap();

        assert_eq!(*backend.bulk_calls.lock().unwrap(), 3);
        assert_eq!(backend.indexed.lock().unwrap()["ocrvs-1"], vec!["comp-0", "comp-1"]);
    }

    #[tokio::test]
    async fn test_document_dropped_after_retries() {
        let (_dir, db) = temp_db();
        let db = Arc::new(db);
        seed_records(&db, 1);
        let backend = Arc::new(FakeBackend::default());
        backend.reject.lock().unwrap().insert("comp-0".to_string(), vec![429; 10]);
        let reindexer = Reindexer::new(db, backend.clone(), "ocrvs").with_policy(fast_policy());

        let err = reindexer.reindex("1").await.unwrap_err();
        assert_eq!(err.to_string(), "Document comp-0 couldn't be inserted");
        assert_eq!(*backend.bulk_calls.lock().unwrap(), 4);
    }

    #[tokio::test]
    async fn test_non_retryable_item_fails_immediately() {
        let (_dir, db) = temp_db();
        let db = Arc::new(db);
        seed_records(&db, 1);
        let backend = Arc::new(FakeBackend::default());
        backend.reject.lock().unwrap().insert("comp-0".to_string(), vec![400]);
        let reindexer = Reindexer::new(db, backend.clone(), "ocrvs").with_policy(fast_policy());

        assert!(matches!(
            reindexer.reindex("1").await,
            Err(SearchError::DocumentDropped(id)) if id == "comp-0"
        ));
        assert_eq!(*backend.bulk_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_transient_request_failure_is_retried() {
        let (_dir, db) = temp_db();
        let db = Arc::new(db);
        seed_records(&db, 1);
        let backend = Arc::new(FakeBackend::default());
        *backend.failing_requests.lock().unwrap() = 2;
        let reindexer = Reindexer::new(db, backend.clone(), "ocrvs").with_policy(fast_policy());

        let outcome = reindexer.reindex("1").await.unwrap();
        assert_eq!(outcome.documents, 1);
        assert_eq!(*backend.bulk_calls.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_empty_store_creates_empty_index() {
        let (_dir, db) = temp_db();
        let backend = Arc::new(FakeBackend::default());
        let reindexer = Reindexer::new(Arc::new(db), backend.clone(), "ocrvs");

        let outcome = reindexer.reindex("1").await.unwrap();
        assert_eq!(outcome.documents, 0);
        assert_eq!(*backend.bulk_calls.lock().unwrap(), 0);
        assert_eq!(backend.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_aliases_points_to_latest() {
        let (_dir, db) = temp_db();
        let backend = Arc::new(FakeBackend::default());
        *backend.existing.lock().unwrap() = vec![
            "ocrvs-20240523000000".to_string(),
            "ocrvs-20240601120000".to_string(),
            "ocrvs-20231231235959".to_string(),
        ];
        let reindexer = Reindexer::new(Arc::new(db), backend.clone(), "ocrvs");

        let latest = reindexer.update_aliases().await.unwrap();
        assert_eq!(latest, "ocrvs-20240601120000");

        let actions = backend.alias_actions.lock().unwrap().clone().unwrap();
        assert_eq!(actions["actions"][0]["remove"]["index"], "ocrvs-*");
        assert_eq!(actions["actions"][1]["add"]["alias"], "ocrvs");
        assert_eq!(actions["actions"][1]["add"]["index"], "ocrvs-20240601120000");
    }

    #[tokio::test]
    async fn test_update_aliases_without_indices() {
        let (_dir, db) = temp_db();
        let backend = Arc::new(FakeBackend::default());
        let reindexer = Reindexer::new(Arc::new(db), backend.clone(), "ocrvs");

        assert!(matches!(reindexer.update_aliases().await, Err(SearchError::NoIndices(_))));
        assert!(backend.alias_actions.lock().unwrap().is_none());
    }
}
