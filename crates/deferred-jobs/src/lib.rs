//! # deferred-jobs
//!
//! Job lifecycle for the deferred queue.
//!
//! This crate provides:
//! - Enqueueing payloads with explicit, configurable defaults
//! - Lifecycle hook dispatch (`enqueue`, `before`, `success`, `error`, `after`)
//! - Invocation with an `after` hook guaranteed on every exit path
//! - Retry dispositions built on the payload's or the default backoff curve
//! - An in-memory store for tests and embedding
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use deferred_jobs::{EnqueueOptions, JobConfig, JobQueue, MemoryStore};
//!
//! let queue = JobQueue::new(Arc::new(MemoryStore::new()), JobConfig::from_env());
//!
//! queue.enqueue(EnqueueOptions::new(SendWelcomeEmail { user_id: 7 }).with_priority(-1)).await?;
//!
//! while let Some((invocation, disposition)) = queue.work_one().await? {
//!     println!("{:?} -> {:?}", invocation, disposition);
//! }
//! ```

pub mod config;
pub mod enqueue;
pub mod hooks;
pub mod invocation;
pub mod memory;
pub mod queue;
pub mod retry;

// Re-export core types
pub use deferred_core::*;

pub use config::JobConfig;
pub use enqueue::{enqueue, EnqueueArgs, EnqueueOptions, NOT_PERFORMABLE};
pub use hooks::{dispatch, Hook};
pub use invocation::{invoke, invoke_job, Invocation};
pub use memory::MemoryStore;
pub use queue::JobQueue;
pub use retry::{perform_claimed, Disposition, RetryPolicy};
