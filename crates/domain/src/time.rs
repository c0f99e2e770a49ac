//! Wall-clock timestamps.
//!
//! Scheduling inside the action loop uses a monotonic clock; these UTC
//! timestamps only label finished recovery sequences for status readers.

use chrono::{DateTime, Utc};

pub type Timestamp = DateTime<Utc>;

#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}
