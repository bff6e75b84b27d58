//! Turning a payload into a persisted job.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value as JsonValue};
use tracing::{info, instrument};

use deferred_core::{Error, Job, JobStore, NewJob, Payload, Result};

use crate::config::JobConfig;
use crate::hooks::{self, Hook};

/// Message for an enqueue call without a performable payload.
pub const NOT_PERFORMABLE: &str = "Cannot enqueue items which do not respond to perform";

/// Explicit field set for [`enqueue`].
///
/// Unset fields fall back to [`JobConfig`]. `extra` is handed to the store
/// verbatim for backend-specific columns.
#[derive(Debug, Default)]
pub struct EnqueueOptions {
    pub payload_object: Option<Box<dyn Payload>>,
    pub priority: Option<i32>,
    pub run_at: Option<DateTime<Utc>>,
    pub context: Option<String>,
    pub extra: Map<String, JsonValue>,
}

impl EnqueueOptions {
    pub fn new(payload: impl Payload + 'static) -> Self {
        Self {
            payload_object: Some(Box::new(payload)),
            ..Self::default()
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_run_at(mut self, run_at: DateTime<Utc>) -> Self {
        self.run_at = Some(run_at);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a backend-specific field.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// The two calling shapes [`enqueue`] accepts.
#[derive(Debug)]
pub enum EnqueueArgs {
    /// A structured option set.
    Options(EnqueueOptions),
    /// `(payload, priority, run_at, context)` with optional trailing values.
    Positional(
        Option<Box<dyn Payload>>,
        Option<i32>,
        Option<DateTime<Utc>>,
        Option<String>,
    ),
}

impl EnqueueArgs {
    /// Positional shape carrying only a payload.
    pub fn payload(payload: impl Payload + 'static) -> Self {
        EnqueueArgs::Positional(Some(Box::new(payload)), None, None, None)
    }

    /// Resolve defaults and validate into the field set a store persists.
    pub fn normalize(self, config: &JobConfig) -> Result<NewJob> {
        let (payload, priority, run_at, context, extra) = match self {
            EnqueueArgs::Options(options) => (
                options.payload_object,
                options.priority,
                options.run_at,
                options.context,
                options.extra,
            ),
            EnqueueArgs::Positional(payload, priority, run_at, context) => {
                (payload, priority, run_at, context, Map::new())
            }
        };

        let payload = payload.ok_or_else(|| Error::InvalidArgument(NOT_PERFORMABLE.into()))?;

        Ok(NewJob::new(
            payload,
            priority.unwrap_or(config.default_priority),
            run_at,
            context.or_else(|| config.context.clone()),
        )?
        .with_extra(extra))
    }
}

impl From<EnqueueOptions> for EnqueueArgs {
    fn from(options: EnqueueOptions) -> Self {
        EnqueueArgs::Options(options)
    }
}

impl From<Box<dyn Payload>> for EnqueueArgs {
    fn from(payload: Box<dyn Payload>) -> Self {
        EnqueueArgs::Positional(Some(payload), None, None, None)
    }
}

/// Validate, persist, and announce a new job.
///
/// Nothing is written when the payload is missing. If the payload's
/// `enqueue` hook fails the row already exists and the hook's error is
/// returned.
#[instrument(skip_all, fields(subsystem = "jobs", op = "enqueue"))]
pub async fn enqueue<S>(store: &S, config: &JobConfig, args: impl Into<EnqueueArgs>) -> Result<Job>
where
    S: JobStore + ?Sized,
{
    let new_job = args.into().normalize(config)?;
    let job = store.create(new_job).await?;

    hooks::dispatch(&job, Hook::Enqueue)?;

    info!(
        job_id = %job.id,
        job_name = job.name().unwrap_or("<undecodable>"),
        priority = job.priority,
        queue = job.queue.as_deref().unwrap_or(""),
        run_at = ?job.run_at,
        "Job enqueued"
    );

    Ok(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deferred_core::BoxError;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Ping {}

    #[typetag::serde]
    impl Payload for Ping {
        fn perform(&self) -> std::result::Result<(), BoxError> {
            Ok(())
        }
    }

    fn config() -> JobConfig {
        JobConfig::default()
            .with_default_priority(3)
            .with_context("default-queue")
    }

    #[test]
    fn test_positional_falls_back_to_config() {
        let new_job = EnqueueArgs::payload(Ping {}).normalize(&config()).unwrap();
        assert_eq!(new_job.priority, 3);
        assert_eq!(new_job.queue.as_deref(), Some("default-queue"));
        assert!(new_job.run_at.is_none());
        assert!(new_job.extra.is_empty());
        assert_eq!(new_job.handler, r#"{"type":"Ping"}"#);
    }

    #[test]
    fn test_positional_trailing_values() {
        let at = Utc::now();
        let args = EnqueueArgs::Positional(Some(Box::new(Ping {})), Some(-1), Some(at), None);
        let new_job = args.normalize(&config()).unwrap();
        assert_eq!(new_job.priority, -1);
        assert_eq!(new_job.run_at, Some(at));
        assert_eq!(new_job.queue.as_deref(), Some("default-queue"));
    }

    #[test]
    fn test_options_override_and_extra() {
        let options = EnqueueOptions::new(Ping {})
            .with_priority(9)
            .with_context("reports")
            .with_extra("tenant_id", 42);
        let new_job = EnqueueArgs::from(options).normalize(&config()).unwrap();
        assert_eq!(new_job.priority, 9);
        assert_eq!(new_job.queue.as_deref(), Some("reports"));
        assert_eq!(new_job.extra["tenant_id"], 42);
    }

    #[test]
    fn test_options_without_fields_use_defaults() {
        let new_job = EnqueueArgs::from(EnqueueOptions::new(Ping {}))
            .normalize(&config())
            .unwrap();
        assert_eq!(new_job.priority, 3);
        assert_eq!(new_job.queue.as_deref(), Some("default-queue"));
    }

    #[test]
    fn test_missing_payload_rejected_for_every_shape() {
        let shapes = [
            EnqueueArgs::Options(EnqueueOptions::default()),
            EnqueueArgs::Options(EnqueueOptions {
                priority: Some(1),
                ..EnqueueOptions::default()
            }),
            EnqueueArgs::Positional(None, None, None, None),
            EnqueueArgs::Positional(None, Some(1), Some(Utc::now()), Some("q".into())),
        ];
        for args in shapes {
            match args.normalize(&config()) {
                Err(Error::InvalidArgument(msg)) => assert_eq!(msg, NOT_PERFORMABLE),
                other => panic!("Expected invalid argument, got {:?}", other),
            }
        }
    }
}
