//! Process-wide job defaults, threaded explicitly into enqueue and retry.

use deferred_core::defaults::{DEFAULT_PRIORITY, MAX_ATTEMPTS};

/// Defaults applied when a caller leaves a field unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    /// Priority for jobs enqueued without one.
    pub default_priority: i32,
    /// Queue tag for jobs enqueued without one.
    pub context: Option<String>,
    /// Failed attempts before a job is marked permanently failed.
    pub max_attempts: i32,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            default_priority: DEFAULT_PRIORITY,
            context: None,
            max_attempts: MAX_ATTEMPTS,
        }
    }
}

impl JobConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `JOB_DEFAULT_PRIORITY` | `0` | Priority when none is given |
    /// | `JOB_CONTEXT` | unset | Queue tag when none is given |
    /// | `JOB_MAX_ATTEMPTS` | `25` | Attempts before permanent failure |
    pub fn from_env() -> Self {
        let default_priority = std::env::var("JOB_DEFAULT_PRIORITY")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(DEFAULT_PRIORITY);

        let context = std::env::var("JOB_CONTEXT")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let max_attempts = std::env::var("JOB_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(MAX_ATTEMPTS)
            .max(1);

        Self {
            default_priority,
            context,
            max_attempts,
        }
    }

    /// Set the default priority.
    pub fn with_default_priority(mut self, priority: i32) -> Self {
        self.default_priority = priority;
        self
    }

    /// Set the default queue tag.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Set the attempt limit.
    pub fn with_max_attempts(mut self, max: i32) -> Self {
        self.max_attempts = max.max(1);
        self
    }
}
