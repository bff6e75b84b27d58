//! A store bundled with the defaults threaded through enqueue and retry.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use deferred_core::defaults::WORKER_NAME;
use deferred_core::{Job, JobStore, Result};

use crate::config::JobConfig;
use crate::enqueue::{self, EnqueueArgs};
use crate::invocation::Invocation;
use crate::retry::{self, Disposition, RetryPolicy};

/// Entry point for producers and workers sharing one store.
pub struct JobQueue<S: JobStore + ?Sized> {
    store: Arc<S>,
    config: JobConfig,
    policy: RetryPolicy,
    worker_name: String,
}

impl<S: JobStore + ?Sized> JobQueue<S> {
    pub fn new(store: Arc<S>, config: JobConfig) -> Self {
        let policy = RetryPolicy::from_config(&config);
        Self {
            store,
            config,
            policy,
            worker_name: format!("{} pid:{}", WORKER_NAME, std::process::id()),
        }
    }

    /// Name recorded in `locked_by` for jobs this queue claims.
    pub fn with_worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn worker_name(&self) -> &str {
        &self.worker_name
    }

    /// Enqueue with this queue's defaults.
    pub async fn enqueue(&self, args: impl Into<EnqueueArgs>) -> Result<Job> {
        enqueue::enqueue(self.store.as_ref(), &self.config, args).await
    }

    /// Claim the next runnable job, run it, and persist the result.
    ///
    /// Returns `None` when nothing is due.
    pub async fn work_one(&self) -> Result<Option<(Invocation, Disposition)>> {
        let now = Utc::now();
        let Some(job) = self.store.claim_next(&self.worker_name, now).await? else {
            debug!(worker = %self.worker_name, "No runnable job");
            return Ok(None);
        };

        retry::perform_claimed(self.store.as_ref(), &self.policy, job, now)
            .await
            .map(Some)
    }
}
