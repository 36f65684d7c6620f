//! Reference clock for rule evaluation.

use chrono::{DateTime, FixedOffset, Utc};

use crate::datetime::to_jakarta;

/// Source of the "current" instant, in Asia/Jakarta.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        to_jakarta(&Utc::now())
    }
}

/// A pinned instant, for reproducible runs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    instant: DateTime<FixedOffset>,
}

impl FixedClock {
    pub fn new<Tz: chrono::TimeZone>(instant: DateTime<Tz>) -> Self {
        Self {
            instant: to_jakarta(&instant),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.instant
    }
}
