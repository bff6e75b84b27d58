//! Lifecycle hook dispatch.
//!
//! Hooks are optional [`Payload`](deferred_core::Payload) methods. A payload
//! that does not override one gets the trait's no-op default, so dispatching
//! an unimplemented hook is silent.

use tracing::debug;

use deferred_core::{Error, Job, Result};

/// Raised error handed to the `error` hook.
pub type HookError<'a> = &'a (dyn std::error::Error + Send + Sync + 'static);

/// A named point in a job's lifecycle.
#[derive(Debug, Clone, Copy)]
pub enum Hook<'a> {
    /// The job row was persisted.
    Enqueue,
    /// Invocation is starting.
    Before,
    /// `perform` returned normally.
    Success,
    /// `perform` raised the carried error.
    Error(HookError<'a>),
    /// Invocation is exiting, on every path.
    After,
}

impl Hook<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Hook::Enqueue => "enqueue",
            Hook::Before => "before",
            Hook::Success => "success",
            Hook::Error(_) => "error",
            Hook::After => "after",
        }
    }
}

/// Invoke `hook` on the job's payload.
///
/// Materializes the payload if needed. An error raised by the hook comes
/// back as [`Error::Hook`] for the caller to handle.
pub fn dispatch(job: &Job, hook: Hook<'_>) -> Result<()> {
    let payload = job.payload_object()?;
    debug!(
        subsystem = "jobs",
        op = "hook",
        job_id = %job.id,
        hook = hook.name(),
        "Dispatching job hook"
    );

    let outcome = match hook {
        Hook::Enqueue => payload.enqueue(job),
        Hook::Before => payload.before(job),
        Hook::Success => payload.success(job),
        Hook::Error(error) => payload.error(job, error),
        Hook::After => payload.after(job),
    };

    outcome.map_err(|source| Error::Hook {
        hook: hook.name(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use deferred_core::{BoxError, NewJob, Payload};
    use serde::{Deserialize, Serialize};
    use std::sync::Mutex;

    static SEEN: Mutex<Vec<String>> = Mutex::new(Vec::new());

    fn seen_for(tag: &str) -> Vec<String> {
        SEEN.lock()
            .unwrap()
            .iter()
            .filter_map(|entry| entry.strip_prefix(&format!("{tag}:")).map(String::from))
            .collect()
    }

    #[derive(Serialize, Deserialize)]
    struct Plain {}

    #[typetag::serde]
    impl Payload for Plain {
        fn perform(&self) -> std::result::Result<(), BoxError> {
            Ok(())
        }
    }

    #[derive(Serialize, Deserialize)]
    struct Observed {
        tag: String,
    }

    #[typetag::serde]
    impl Payload for Observed {
        fn perform(&self) -> std::result::Result<(), BoxError> {
            Ok(())
        }

        fn before(&self, job: &Job) -> std::result::Result<(), BoxError> {
            SEEN.lock()
                .unwrap()
                .push(format!("{}:before:{}", self.tag, job.priority));
            Ok(())
        }

        fn error(&self, _job: &Job, error: HookError<'_>) -> std::result::Result<(), BoxError> {
            SEEN.lock()
                .unwrap()
                .push(format!("{}:error:{}", self.tag, error));
            Ok(())
        }

        fn after(&self, _job: &Job) -> std::result::Result<(), BoxError> {
            Err("after exploded".into())
        }
    }

    fn job_for(payload: Box<dyn Payload>) -> Job {
        NewJob::new(payload, 7, None, None)
            .unwrap()
            .into_job(chrono::Utc::now())
    }

    #[test]
    fn test_hook_names() {
        let err: BoxError = "x".into();
        assert_eq!(Hook::Enqueue.name(), "enqueue");
        assert_eq!(Hook::Before.name(), "before");
        assert_eq!(Hook::Success.name(), "success");
        assert_eq!(Hook::Error(err.as_ref()).name(), "error");
        assert_eq!(Hook::After.name(), "after");
    }

    #[test]
    fn test_missing_hooks_are_noops() {
        let job = job_for(Box::new(Plain {}));
        let err: BoxError = "ignored".into();
        for hook in [
            Hook::Enqueue,
            Hook::Before,
            Hook::Success,
            Hook::Error(err.as_ref()),
            Hook::After,
        ] {
            assert!(dispatch(&job, hook).is_ok());
        }
    }

    #[test]
    fn test_hook_receives_job() {
        let job = job_for(Box::new(Observed {
            tag: "receives".into(),
        }));
        dispatch(&job, Hook::Before).unwrap();
        assert_eq!(seen_for("receives"), vec!["before:7"]);
    }

    #[test]
    fn test_error_hook_receives_raised_value() {
        let job = job_for(Box::new(Observed {
            tag: "raised".into(),
        }));
        let err: BoxError = "connection reset".into();
        dispatch(&job, Hook::Error(err.as_ref())).unwrap();
        assert_eq!(seen_for("raised"), vec!["error:connection reset"]);
    }

    #[test]
    fn test_hook_error_propagates() {
        let job = job_for(Box::new(Observed {
            tag: "propagates".into(),
        }));
        match dispatch(&job, Hook::After) {
            Err(Error::Hook { hook, source }) => {
                assert_eq!(hook, "after");
                assert_eq!(source.to_string(), "after exploded");
            }
            other => panic!("Expected hook error, got {:?}", other),
        }
    }

    #[test]
    fn test_undecodable_payload_fails_dispatch() {
        let mut job = job_for(Box::new(Plain {}));
        job.set_handler("{}");
        let err = dispatch(&job, Hook::Before).unwrap_err();
        assert!(err.is_deserialization());
    }
}
