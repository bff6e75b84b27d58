//! Running a claimed job through its lifecycle hooks.
//!
//! ```text
//!             ┌─ perform ok ──▶ success ─┐
//! before ─────┤                          ├──▶ after
//!             └─ perform err ─▶ error ───┘
//! ```
//!
//! `after` runs exactly once on every path out of an invocation that got as
//! far as dispatching `before`.

use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use deferred_core::{Error, Job, Payload, Result};

use crate::hooks::{self, Hook};

/// Result of one invocation.
#[derive(Debug)]
pub enum Invocation {
    Succeeded,
    Failed {
        error: Error,
        /// When the job may run again, or `None` if it never can.
        next_run_at: Option<DateTime<Utc>>,
    },
}

impl Invocation {
    pub fn is_success(&self) -> bool {
        matches!(self, Invocation::Succeeded)
    }
}

/// Run `job` once, propagating any error.
///
/// The payload is materialized before any hook fires, so an undecodable
/// handler fails with [`Error::Deserialization`] and runs no hooks. An error
/// from `perform` is shown to the `error` hook and returned unchanged; if the
/// `error` hook itself fails, that is logged and the `perform` error still
/// wins. An error from `after` replaces whatever the body returned.
pub fn invoke_job(job: &Job) -> Result<()> {
    if job.failed() {
        return Err(Error::JobFailed(job.id));
    }
    let payload = job.payload_object()?;

    let body = run(job, payload);
    let after = hooks::dispatch(job, Hook::After);

    match (body, after) {
        (Ok(()), after) => after,
        (Err(error), Ok(())) => Err(error),
        (Err(error), Err(after_error)) => {
            warn!(
                subsystem = "jobs",
                op = "invoke",
                job_id = %job.id,
                error = %error,
                "after hook failed; replacing the in-flight error"
            );
            Err(after_error)
        }
    }
}

fn run(job: &Job, payload: &dyn Payload) -> Result<()> {
    hooks::dispatch(job, Hook::Before)?;

    if let Err(source) = payload.perform() {
        if let Err(hook_error) = hooks::dispatch(job, Hook::Error(source.as_ref())) {
            warn!(
                subsystem = "jobs",
                job_id = %job.id,
                error = %hook_error,
                "error hook failed"
            );
        }
        return Err(Error::Perform(source));
    }

    hooks::dispatch(job, Hook::Success)
}

/// Run `job` once and classify the result.
///
/// On failure counts the attempt, records `last_error`, and computes the
/// next run time from the new `attempts`. A job that was already failed is
/// left untouched. Lock bookkeeping is left to the caller.
pub fn invoke(job: &mut Job, now: DateTime<Utc>) -> Invocation {
    let start = Instant::now();

    match invoke_job(job) {
        Ok(()) => {
            info!(
                subsystem = "jobs",
                op = "invoke",
                job_id = %job.id,
                job_name = job.name().unwrap_or_default(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Job completed"
            );
            Invocation::Succeeded
        }
        Err(error @ Error::JobFailed(_)) => {
            debug!(
                subsystem = "jobs",
                op = "invoke",
                job_id = %job.id,
                "Refusing to run a permanently failed job"
            );
            Invocation::Failed {
                error,
                next_run_at: None,
            }
        }
        Err(error) => {
            job.attempts += 1;
            let next_run_at = job.reschedule_at(now).ok();
            job.last_error = Some(error.to_string());
            warn!(
                subsystem = "jobs",
                op = "invoke",
                job_id = %job.id,
                job_name = job.name().unwrap_or_default(),
                attempts = job.attempts,
                run_at = ?next_run_at,
                error = %error,
                duration_ms = start.elapsed().as_millis() as u64,
                "Job failed"
            );
            Invocation::Failed { error, next_run_at }
        }
    }
}
