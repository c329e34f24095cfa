//! Observed cache state

use chrono::{DateTime, Duration, Utc};

/// An immutable `(value, modification time)` pair, produced by every
/// successful read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSnapshot<T> {
    value: T,
    modification_time: DateTime<Utc>,
}

impl<T> CacheSnapshot<T> {
    pub fn new(value: T, modification_time: DateTime<Utc>) -> Self {
        Self {
            value,
            modification_time,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn modification_time(&self) -> DateTime<Utc> {
        self.modification_time
    }

    /// Time elapsed since the modification time, measured now
    pub fn age(&self) -> Duration {
        self.age_at(Utc::now())
    }

    /// Time elapsed since the modification time, measured at `now`.
    /// Negative when the modification time lies in the future.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.modification_time)
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn into_parts(self) -> (T, DateTime<Utc>) {
        (self.value, self.modification_time)
    }
}
