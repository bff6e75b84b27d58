//! In-process [`JobStore`] backed by a map.
//!
//! Useful for tests and single-process embedding. Rows are stored as
//! clones, so a job read back from the store re-derives its payload from
//! the handler just like a row loaded from a database would.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use deferred_core::{Error, Job, JobStore, NewJob, Result};

#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<Uuid, Job>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored jobs, failed ones included.
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn runnable(job: &Job, now: DateTime<Utc>) -> bool {
        !job.is_locked() && !job.failed() && job.run_at.map_or(true, |at| at <= now)
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn create(&self, new_job: NewJob) -> Result<Job> {
        let job = new_job.into_job(Utc::now());
        self.rows.write().await.insert(job.id, job.clone());
        debug!(job_id = %job.id, "Stored new job");
        Ok(job)
    }

    async fn get(&self, job_id: Uuid) -> Result<Option<Job>> {
        Ok(self.rows.read().await.get(&job_id).cloned())
    }

    async fn claim_next(&self, worker: &str, now: DateTime<Utc>) -> Result<Option<Job>> {
        let mut rows = self.rows.write().await;

        let next = rows
            .values_mut()
            .filter(|job| Self::runnable(job, now))
            .min_by_key(|job| (job.priority, job.run_at, job.created_at, job.id));

        Ok(next.map(|job| {
            job.lock(worker, now);
            debug!(job_id = %job.id, locked_by = worker, "Claimed job");
            job.clone()
        }))
    }

    async fn save(&self, job: &Job) -> Result<()> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&job.id) {
            Some(row) => {
                *row = job.clone();
                Ok(())
            }
            None => Err(Error::NotFound(job.id)),
        }
    }

    async fn destroy(&self, job_id: Uuid) -> Result<()> {
        self.rows
            .write()
            .await
            .remove(&job_id)
            .map(|_| ())
            .ok_or(Error::NotFound(job_id))
    }
}
