//! Storage contract the lifecycle core depends on.
//!
//! The core only ever calls [`JobStore::create`]. The remaining methods are
//! what a worker loop needs to claim a job, run it, and persist whatever the
//! invocation computed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::job::{Job, NewJob};

/// Repository for job rows.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a new job. Implementations build the row with
    /// [`NewJob::into_job`] so an unset `run_at` defaults to now.
    async fn create(&self, new_job: NewJob) -> Result<Job>;

    /// Load a job by ID.
    async fn get(&self, job_id: Uuid) -> Result<Option<Job>>;

    /// Atomically lock the next runnable job for `worker`.
    ///
    /// A runnable job is unlocked, not failed, and due at `now`. Ties are
    /// broken by priority, then `run_at`, then arrival order.
    async fn claim_next(&self, worker: &str, now: DateTime<Utc>) -> Result<Option<Job>>;

    /// Write every persisted field of `job` back.
    async fn save(&self, job: &Job) -> Result<()>;

    /// Remove a finished job.
    async fn destroy(&self, job_id: Uuid) -> Result<()>;
}
