//! Error types for the deferred job queue.

use thiserror::Error;

/// Opaque error raised by a payload's `perform` or one of its hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias using deferred's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// A job's handler text could not be turned back into a payload.
///
/// Carries the underlying cause's message and the raw handler so operators
/// can see exactly what was stored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Job failed to load: {message}. Handler: {handler:?}")]
pub struct DeserializationError {
    /// Message of the underlying decode failure.
    pub message: String,
    /// The handler text that failed to decode.
    pub handler: String,
}

impl DeserializationError {
    pub fn new(message: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            handler: handler.into(),
        }
    }
}

/// Core error type for deferred operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Payload could not be reconstructed from its handler
    #[error(transparent)]
    Deserialization(#[from] DeserializationError),

    /// Caller passed something that cannot be enqueued
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The payload's `perform` raised; the source is carried unchanged
    #[error("{0}")]
    Perform(#[source] BoxError),

    /// A lifecycle hook raised
    #[error("Hook {hook} failed: {source}")]
    Hook {
        hook: &'static str,
        #[source]
        source: BoxError,
    },

    /// Payload could not be serialized into a handler
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Storage collaborator failed
    #[error("Store error: {0}")]
    Store(String),

    /// Job is permanently failed and must not run again
    #[error("Job {0} is permanently failed")]
    JobFailed(uuid::Uuid),

    /// Job row not found
    #[error("Job not found: {0}")]
    NotFound(uuid::Uuid),
}

impl Error {
    /// True when the payload could not be materialized at all.
    ///
    /// Such a job can never run, so workers fail it permanently.
    pub fn is_deserialization(&self) -> bool {
        matches!(self, Error::Deserialization(_))
    }

    /// The error raised by `perform`, if this is an execution failure.
    pub fn perform_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Error::Perform(source) => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_deserialization_error_display() {
        let err = DeserializationError::new("unknown variant `Gone`", r#"{"type":"Gone"}"#);
        assert_eq!(
            err.to_string(),
            r#"Job failed to load: unknown variant `Gone`. Handler: "{\"type\":\"Gone\"}""#
        );
    }

    #[test]
    fn test_deserialization_is_transparent() {
        let inner = DeserializationError::new("bad", "x");
        let err: Error = inner.clone().into();
        assert_eq!(err.to_string(), inner.to_string());
        assert!(err.is_deserialization());
    }

    #[test]
    fn test_error_display_invalid_argument() {
        let err = Error::InvalidArgument("no payload".to_string());
        assert_eq!(err.to_string(), "Invalid argument: no payload");
    }

    #[test]
    fn test_perform_error_keeps_source_message() {
        let source: BoxError = "disk full".into();
        let err = Error::Perform(source);
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(err.perform_error().map(|e| e.to_string()).as_deref(), Some("disk full"));
        assert!(!err.is_deserialization());
    }

    #[test]
    fn test_hook_error_display() {
        let err = Error::Hook {
            hook: "after",
            source: "boom".into(),
        };
        assert_eq!(err.to_string(), "Hook after failed: boom");
        assert!(err.perform_error().is_none());
    }

    #[test]
    fn test_error_display_job_failed() {
        let id = Uuid::nil();
        let err = Error::JobFailed(id);
        assert_eq!(err.to_string(), format!("Job {} is permanently failed", id));
    }

    #[test]
    fn test_error_display_not_found() {
        let id = Uuid::nil();
        let err = Error::NotFound(id);
        assert_eq!(err.to_string(), format!("Job not found: {}", id));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
