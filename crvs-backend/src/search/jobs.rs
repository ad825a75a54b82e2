//! Background reindex jobs
//!
//! A job runs a full reindex followed by the alias swap. Job state lives in
//! memory only; a restart forgets finished jobs.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use super::reindex::{format_index_name, format_timestamp, Reindexer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReindexJobStatus {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReindexJob {
    pub job_id: String,
    pub status: ReindexJobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Finished jobs kept for status lookups; older ones are dropped
pub const MAX_FINISHED_JOBS: usize = 20;

/// Result of asking for a new reindex
#[derive(Debug, Clone)]
pub enum JobStart {
    Started(ReindexJob),
    /// Only one reindex may run at a time; this is the one in progress
    AlreadyRunning(ReindexJob),
}

#[derive(Default)]
struct JobsState {
    jobs: HashMap<String, ReindexJob>,
    /// Timestamp of the most recent start, so index names never repeat
    last_started: Option<DateTime<Utc>>,
}

pub struct ReindexJobs {
    state: RwLock<JobsState>,
}

impl ReindexJobs {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(JobsState::default()),
        }
    }

    /// Spawn a reindex + alias swap unless one is already running
    pub fn start(self: &Arc<Self>, reindexer: Arc<Reindexer>) -> JobStart {
        let mut state = match self.state.write() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(running) = state.jobs.values().find(|j| j.status == ReindexJobStatus::Running) {
            return JobStart::AlreadyRunning(running.clone());
        }

        let mut started_at = Utc::now();
        if let Some(last) = state.last_started {
            if format_timestamp(started_at) <= format_timestamp(last) {
                started_at = last + Duration::seconds(1);
            }
        }
        state.last_started = Some(started_at);

        let timestamp = format_timestamp(started_at);
        let job = ReindexJob {
            job_id: Uuid::new_v4().to_string(),
            status: ReindexJobStatus::Running,
            index: Some(format_index_name(reindexer.index_name(), &timestamp)),
            documents: None,
            error: None,
            started_at,
            finished_at: None,
        };
        prune_finished(&mut state.jobs, MAX_FINISHED_JOBS);
        state.jobs.insert(job.job_id.clone(), job.clone());
        drop(state);

        let jobs = Arc::clone(self);
        let job_id = job.job_id.clone();
        tokio::spawn(async move {
            let result = match reindexer.reindex(&timestamp).await {
                Ok(outcome) => reindexer.update_aliases().await.map(|_| outcome),
                Err(e) => Err(e),
            };

            match result {
                Ok(outcome) => {
                    log::info!("[search] Reindex job {} completed: {}", job_id, outcome.index);
                    jobs.finish(&job_id, |job| {
                        job.status = ReindexJobStatus::Completed;
                        job.index = Some(outcome.index);
                        job.documents = Some(outcome.documents);
                    });
                }
                Err(e) => {
                    log::error!("[search] Reindex job {} failed: {}", job_id, e);
                    jobs.finish(&job_id, |job| {
                        job.status = ReindexJobStatus::Failed;
                        job.error = Some(e.to_string());
                    });
                }
            }
        });

        JobStart::Started(job)
    }

    pub fn get(&self, job_id: &str) -> Option<ReindexJob> {
        self.state.read().ok()?.jobs.get(job_id).cloned()
    }

    fn finish(&self, job_id: &str, update: impl FnOnce(&mut ReindexJob)) {
        let mut state = match self.state.write() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(job) = state.jobs.get_mut(job_id) {
            update(job);
            job.finished_at = Some(Utc::now());
        }
    }
}

impl Default for ReindexJobs {
    fn default() -> Self {
        Self::new()
    }
}

/// Drop the oldest finished jobs so that at most `keep` remain
fn prune_finished(jobs: &mut HashMap<String, ReindexJob>, keep: usize) {
    let mut finished: Vec<(DateTime<Utc>, String)> = jobs
        .values()
        .filter(|j| j.status != ReindexJobStatus::Running)
        .map(|j| (j.finished_at.unwrap_or(j.started_at), j.job_id.clone()))
        .collect();
    if finished.len() <= keep {
        return;
    }
    finished.sort();
    let excess = finished.len() - keep;
    for (_, job_id) in finished.into_iter().take(excess) {
        jobs.remove(&job_id);
    }
}
