//! The unit of work a job carries.
//!
//! A payload is any serializable type implementing [`Payload`]. Only
//! [`Payload::perform`] is required; every other method is an optional
//! capability whose default is "not implemented":
//!
//! | Capability | Default | Used by |
//! |------------|---------|---------|
//! | `display_name` | `None` (type name is used) | [`Job::name`] |
//! | `reschedule_at` | `None` (default backoff curve) | [`Job::reschedule_at`] |
//! | `enqueue`, `before`, `success`, `error`, `after` | no-op | hook dispatch |
//!
//! Implementations register with `#[typetag::serde]` so a job's handler can
//! name the concrete type and be restored later.

use chrono::{DateTime, Utc};

use crate::error::BoxError;
use crate::job::Job;

/// Work that can be stored in a job handler and performed later.
///
/// ```ignore
/// #[derive(Serialize, Deserialize)]
/// struct SendWelcomeEmail { user_id: i64 }
///
/// #[typetag::serde]
/// impl Payload for SendWelcomeEmail {
///     fn perform(&self) -> Result<(), BoxError> {
///         mailer::welcome(self.user_id)?;
///         Ok(())
///     }
/// }
/// ```
#[typetag::serde(tag = "type")]
pub trait Payload: Send + Sync {
    /// Do the work. Any error is reported to the `error` hook and then
    /// returned to the caller unchanged.
    fn perform(&self) -> Result<(), BoxError>;

    /// Human-readable name for logs and dashboards.
    fn display_name(&self) -> Option<String> {
        None
    }

    /// Payload-specific retry curve. Returning `None` selects the default.
    fn reschedule_at(&self, _now: DateTime<Utc>, _attempts: i32) -> Option<DateTime<Utc>> {
        None
    }

    /// Called once after the job row has been persisted.
    fn enqueue(&self, _job: &Job) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called at the start of every invocation.
    fn before(&self, _job: &Job) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called after `perform` returns successfully.
    fn success(&self, _job: &Job) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called with the error `perform` raised.
    fn error(
        &self,
        _job: &Job,
        _error: &(dyn std::error::Error + Send + Sync + 'static),
    ) -> Result<(), BoxError> {
        Ok(())
    }

    /// Called on every exit path of an invocation.
    fn after(&self, _job: &Job) -> Result<(), BoxError> {
        Ok(())
    }
}

impl std::fmt::Debug for dyn Payload + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Payload")
            .field("type", &self.typetag_name())
            .finish()
    }
}
