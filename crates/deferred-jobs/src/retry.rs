//! Deciding what happens to a job after it ran.

use chrono::{DateTime, Utc};
use tracing::{debug, error, instrument, warn};

use deferred_core::{Error, Job, JobStore, Result};

use crate::config::JobConfig;
use crate::invocation::{self, Invocation};

/// What the store should do with a job after an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Finished; remove the row.
    Destroy,
    /// Failed but retryable; save with the new `run_at`.
    Reschedule { run_at: DateTime<Utc> },
    /// Failed for good; save with `failed_at` set.
    Fail,
}

/// Attempt limit applied to failed invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: i32,
}

impl RetryPolicy {
    pub fn new(max_attempts: i32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn from_config(config: &JobConfig) -> Self {
        Self::new(config.max_attempts)
    }

    /// Apply `invocation` to `job` and say how to persist it.
    ///
    /// `attempts` already counts the failure. Once it reaches
    /// `max_attempts`, or the payload can never run again, the job is marked
    /// failed. Every failure releases the lock. A job that was already failed
    /// when it was invoked is not modified.
    pub fn disposition(
        &self,
        job: &mut Job,
        invocation: &Invocation,
        now: DateTime<Utc>,
    ) -> Disposition {
        let next_run_at = match invocation {
            Invocation::Succeeded => return Disposition::Destroy,
            Invocation::Failed {
                error: Error::JobFailed(_),
                ..
            } => return Disposition::Fail,
            Invocation::Failed { next_run_at, .. } => *next_run_at,
        };

        job.unlock();
        job.updated_at = now;

        match next_run_at {
            Some(run_at) if job.attempts < self.max_attempts => {
                job.run_at = Some(run_at);
                debug!(
                    subsystem = "jobs",
                    op = "retry",
                    job_id = %job.id,
                    attempts = job.attempts,
                    run_at = %run_at,
                    "Rescheduling job"
                );
                Disposition::Reschedule { run_at }
            }
            _ => {
                job.mark_failed(now);
                warn!(
                    subsystem = "jobs",
                    op = "retry",
                    job_id = %job.id,
                    attempts = job.attempts,
                    "Job permanently failed"
                );
                Disposition::Fail
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&JobConfig::default())
    }
}

/// Run a claimed job and persist the result through `store`.
///
/// Returns the invocation alongside the disposition so the caller can see
/// the error a failed job raised. A job that is already permanently failed
/// is refused with [`Error::JobFailed`] and nothing is written.
#[instrument(skip_all, fields(subsystem = "jobs", op = "perform", job_id = %job.id))]
pub async fn perform_claimed<S>(
    store: &S,
    policy: &RetryPolicy,
    mut job: Job,
    now: DateTime<Utc>,
) -> Result<(Invocation, Disposition)>
where
    S: JobStore + ?Sized,
{
    if job.failed() {
        warn!("Refusing to perform a permanently failed job");
        return Err(Error::JobFailed(job.id));
    }

    let invocation = invocation::invoke(&mut job, now);
    let disposition = policy.disposition(&mut job, &invocation, now);

    let persisted = match disposition {
        Disposition::Destroy => store.destroy(job.id).await,
        Disposition::Reschedule { .. } | Disposition::Fail => store.save(&job).await,
    };
    if let Err(e) = persisted {
        error!(error = %e, ?disposition, "Failed to persist job result");
        return Err(e);
    }

    Ok((invocation, disposition))
}
