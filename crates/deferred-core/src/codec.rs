//! Handler codec: freezes a payload into text and restores it.
//!
//! Handlers are JSON documents tagged with the payload's registered type
//! name, e.g. `{"type":"SendWelcomeEmail","user_id":7}`. Restoring a handler
//! whose type is not registered in the running binary fails with
//! [`DeserializationError`] rather than panicking.

use tracing::debug;

use crate::error::{DeserializationError, Result};
use crate::payload::Payload;

/// Serialize a payload into handler text.
pub fn serialize(payload: &(dyn Payload + 'static)) -> Result<String> {
    Ok(serde_json::to_string(payload)?)
}

/// Restore a payload from handler text.
pub fn deserialize(handler: &str) -> std::result::Result<Box<dyn Payload>, DeserializationError> {
    serde_json::from_str::<Box<dyn Payload>>(handler).map_err(|e| {
        debug!(subsystem = "jobs", op = "deserialize", error = %e, "Failed to decode job handler");
        DeserializationError::new(e.to_string(), handler)
    })
}
