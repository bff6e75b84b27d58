//! Default retry curve.
//!
//! `run_at = now + attempts^4 + 5` seconds: 6s after the first failure, 21s
//! after the second, ~2.8h after the tenth. The curve is uncapped; payloads
//! that need a ceiling or jitter override [`Payload::reschedule_at`].
//!
//! [`Payload::reschedule_at`]: crate::Payload::reschedule_at

use chrono::{DateTime, TimeDelta, Utc};

use crate::defaults::{BACKOFF_BASE_SECS, BACKOFF_EXPONENT};

/// Delay before the next attempt after `attempts` failures.
pub fn default_delay(attempts: i32) -> TimeDelta {
    let secs = i64::from(attempts.max(0))
        .saturating_pow(BACKOFF_EXPONENT)
        .saturating_add(BACKOFF_BASE_SECS);
    TimeDelta::try_seconds(secs).unwrap_or(TimeDelta::MAX)
}

/// Next eligible run time after `attempts` failures, measured from `now`.
///
/// Saturates at the latest representable instant instead of overflowing.
pub fn default_run_at(attempts: i32, now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_add_signed(default_delay(attempts))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
