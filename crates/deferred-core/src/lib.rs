//! # deferred-core
//!
//! Core types and contracts for the deferred job queue.
//!
//! This crate provides the job entity, the payload trait and its handler
//! codec, the default retry curve, and the storage trait backends implement.
//! Enqueueing and running jobs lives in `deferred-jobs`.

pub mod backoff;
pub mod codec;
pub mod defaults;
pub mod error;
pub mod job;
pub mod payload;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{BoxError, DeserializationError, Error, Result};
pub use job::{Job, NewJob};
pub use payload::Payload;
pub use traits::JobStore;

