//! The persisted job record.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::backoff;
use crate::codec;
use crate::error::{DeserializationError, Result};
use crate::payload::Payload;

/// A unit of deferred work: serialized payload plus scheduling, lock, and
/// failure metadata.
///
/// `handler` is the source of truth. The payload object and display name are
/// derived from it on first access and cached for the life of this
/// instance; they are never persisted. A clone, or a row reloaded from
/// storage, starts with empty caches.
#[derive(Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    /// Lower values run first.
    pub priority: i32,
    /// Earliest time the job may run.
    pub run_at: Option<DateTime<Utc>>,
    /// Logical partition tag used by selection.
    pub queue: Option<String>,
    handler: String,
    /// Failed executions that were retried.
    pub attempts: i32,
    pub last_error: Option<String>,
    locked_at: Option<DateTime<Utc>>,
    locked_by: Option<String>,
    failed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Backend-specific columns passed through verbatim from enqueue.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, JsonValue>,

    #[serde(skip)]
    payload: OnceCell<Box<dyn Payload>>,
    #[serde(skip)]
    name: OnceCell<String>,
}

impl Job {
    /// Serialized payload text.
    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// Replace the handler text directly, as a backend loading a row does.
    ///
    /// Drops any cached payload so the next access re-derives it.
    pub fn set_handler(&mut self, handler: impl Into<String>) {
        self.handler = handler.into();
        self.payload = OnceCell::new();
        self.name = OnceCell::new();
    }

    /// The payload, restored from `handler` on first access.
    pub fn payload_object(&self) -> std::result::Result<&dyn Payload, DeserializationError> {
        self.payload
            .get_or_try_init(|| codec::deserialize(&self.handler))
            .map(|payload| &**payload)
    }

    /// Store a new payload, re-serializing the handler.
    pub fn set_payload_object(&mut self, payload: Box<dyn Payload>) -> Result<()> {
        self.handler = codec::serialize(payload.as_ref())?;
        self.payload = OnceCell::with_value(payload);
        self.name = OnceCell::new();
        Ok(())
    }

    /// The payload's display name, or its registered type name.
    pub fn name(&self) -> std::result::Result<&str, DeserializationError> {
        self.name
            .get_or_try_init(|| {
                let payload = self.payload_object()?;
                Ok(payload
                    .display_name()
                    .unwrap_or_else(|| payload.typetag_name().to_string()))
            })
            .map(String::as_str)
    }

    pub fn locked_at(&self) -> Option<DateTime<Utc>> {
        self.locked_at
    }

    pub fn locked_by(&self) -> Option<&str> {
        self.locked_by.as_deref()
    }

    pub fn is_locked(&self) -> bool {
        self.locked_at.is_some()
    }

    /// Record a claim by `worker`. Both lock fields are set together.
    pub fn lock(&mut self, worker: impl Into<String>, at: DateTime<Utc>) {
        self.locked_at = Some(at);
        self.locked_by = Some(worker.into());
    }

    /// Release the claim. Not persisted until the caller saves the job.
    pub fn unlock(&mut self) {
        self.locked_at = None;
        self.locked_by = None;
    }

    pub fn failed_at(&self) -> Option<DateTime<Utc>> {
        self.failed_at
    }

    /// True once the job is terminally failed.
    pub fn failed(&self) -> bool {
        self.failed_at.is_some()
    }

    /// Mark the job permanently failed. Later calls keep the first timestamp.
    pub fn mark_failed(&mut self, at: DateTime<Utc>) {
        self.failed_at.get_or_insert(at);
    }

    /// Apply the storage default for an unset `run_at`.
    pub fn set_default_run_at(&mut self, now: DateTime<Utc>) {
        self.run_at.get_or_insert(now);
    }

    /// Next eligible run time after a failure at `now`.
    ///
    /// Defers to the payload's own curve when it has one.
    pub fn reschedule_at(
        &self,
        now: DateTime<Utc>,
    ) -> std::result::Result<DateTime<Utc>, DeserializationError> {
        let payload = self.payload_object()?;
        Ok(payload
            .reschedule_at(now, self.attempts)
            .unwrap_or_else(|| backoff::default_run_at(self.attempts, now)))
    }
}

impl Clone for Job {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            priority: self.priority,
            run_at: self.run_at,
            queue: self.queue.clone(),
            handler: self.handler.clone(),
            attempts: self.attempts,
            last_error: self.last_error.clone(),
            locked_at: self.locked_at,
            locked_by: self.locked_by.clone(),
            failed_at: self.failed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            extra: self.extra.clone(),
            payload: OnceCell::new(),
            name: OnceCell::new(),
        }
    }
}

impl std::fmt::Debug for Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("priority", &self.priority)
            .field("run_at", &self.run_at)
            .field("queue", &self.queue)
            .field("handler", &self.handler)
            .field("attempts", &self.attempts)
            .field("last_error", &self.last_error)
            .field("locked_at", &self.locked_at)
            .field("locked_by", &self.locked_by)
            .field("failed_at", &self.failed_at)
            .finish_non_exhaustive()
    }
}

/// Normalized field set for a job that has not been persisted yet.
///
/// Built by enqueue and handed to [`JobStore::create`](crate::JobStore::create).
#[derive(Debug)]
pub struct NewJob {
    pub payload: Box<dyn Payload>,
    pub handler: String,
    pub priority: i32,
    pub run_at: Option<DateTime<Utc>>,
    pub queue: Option<String>,
    pub extra: Map<String, JsonValue>,
}

impl NewJob {
    /// Serialize `payload` and capture the scheduling fields.
    pub fn new(
        payload: Box<dyn Payload>,
        priority: i32,
        run_at: Option<DateTime<Utc>>,
        queue: Option<String>,
    ) -> Result<Self> {
        let handler = codec::serialize(payload.as_ref())?;
        Ok(Self {
            payload,
            handler,
            priority,
            run_at,
            queue,
            extra: Map::new(),
        })
    }

    /// Attach backend-specific fields.
    pub fn with_extra(mut self, extra: Map<String, JsonValue>) -> Self {
        self.extra = extra;
        self
    }

    /// Build the row a store persists, defaulting `run_at` to `now`.
    ///
    /// The returned job keeps the original payload object cached.
    pub fn into_job(self, now: DateTime<Utc>) -> Job {
        let mut job = Job {
            id: Uuid::now_v7(),
            priority: self.priority,
            run_at: self.run_at,
            queue: self.queue,
            handler: self.handler,
            attempts: 0,
            last_error: None,
            locked_at: None,
            locked_by: None,
            failed_at: None,
            created_at: now,
            updated_at: now,
            extra: self.extra,
            payload: OnceCell::with_value(self.payload),
            name: OnceCell::new(),
        };
        job.set_default_run_at(now);
        job
    }
}
