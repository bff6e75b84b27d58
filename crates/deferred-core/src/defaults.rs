//! Centralized default constants for the deferred job queue.
//!
//! Every crate references these instead of defining its own magic numbers.

// =============================================================================
// ENQUEUE
// =============================================================================

/// Priority assigned when the caller gives none. Lower values run first.
pub const DEFAULT_PRIORITY: i32 = 0;

// =============================================================================
// RETRY
// =============================================================================

/// Attempts after which a failing job is marked permanently failed.
pub const MAX_ATTEMPTS: i32 = 25;

/// Exponent of the default backoff curve (`attempts ^ 4`).
pub const BACKOFF_EXPONENT: u32 = 4;

/// Constant seconds added on top of the polynomial term.
pub const BACKOFF_BASE_SECS: i64 = 5;

// =============================================================================
// LOCKING
// =============================================================================

/// Name recorded in `locked_by` when a worker gives none.
pub const WORKER_NAME: &str = "deferred-worker";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_defaults_are_sane() {
        const {
            assert!(MAX_ATTEMPTS > 0);
            assert!(BACKOFF_BASE_SECS > 0);
        }
    }
}
