//! Wall-clock access, injectable so the fallback walk stays deterministic

use chrono::{NaiveDateTime, Utc};
use chrono_tz::Asia::Seoul;

pub trait Clock: Send + Sync {
    /// Current local time in the market's timezone
    fn now(&self) -> NaiveDateTime;
}

/// Asia/Seoul wall clock; bank publications follow KST
#[derive(Debug, Clone, Copy, Default)]
pub struct SeoulClock;

impl Clock for SeoulClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&Seoul).naive_local()
    }
}

/// Clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
