//! Intended next cache state and write-time policy

use chrono::{DateTime, Duration, Utc};

/// The next state requested by an update callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheUpdate<T> {
    value: T,
    modification_time: DateTime<Utc>,
}

impl<T> CacheUpdate<T> {
    pub fn new(value: T, modification_time: DateTime<Utc>) -> Self {
        Self {
            value,
            modification_time,
        }
    }

    /// Update stamped with the current time
    pub fn now(value: T) -> Self {
        Self::new(value, Utc::now())
    }

    /// Update whose modification time is `now - age`, clamped to the
    /// representable range
    pub fn from_age(value: T, age: Duration, now: DateTime<Utc>) -> Self {
        let clamped = if age > Duration::zero() {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        };
        let modification_time = now.checked_sub_signed(age).unwrap_or(clamped);
        Self::new(value, modification_time)
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn modification_time(&self) -> DateTime<Utc> {
        self.modification_time
    }

    pub fn into_parts(self) -> (T, DateTime<Utc>) {
        (self.value, self.modification_time)
    }
}

/// Modification time to stamp on a written entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteTime {
    /// The time of the write
    #[default]
    Now,
    /// An explicit timestamp
    At(DateTime<Utc>),
    /// Keep the modification time of the present entry, or use the time of
    /// the write when no entry is present
    Preserve,
}

impl WriteTime {
    /// Resolve against the present entry's modification time (if any)
    pub(crate) fn resolve(self, present: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            WriteTime::Now => now,
            WriteTime::At(when) => when,
            WriteTime::Preserve => present.unwrap_or(now),
        }
    }
}

impl From<DateTime<Utc>> for WriteTime {
    fn from(when: DateTime<Utc>) -> Self {
        WriteTime::At(when)
    }
}

impl From<Option<DateTime<Utc>>> for WriteTime {
    fn from(when: Option<DateTime<Utc>>) -> Self {
        when.map_or(WriteTime::Preserve, WriteTime::At)
    }
}
