//! Wall-clock timestamps for operation records and events.
//!
//! Simulated durations (grace periods, operation lengths) use the async
//! runtime's monotonic clock instead; these timestamps are only for display.

use chrono::{DateTime, Utc};

/// UTC timestamp attached to events and the robot's last operation.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
