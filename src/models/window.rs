// Half-open aggregation window [start, end).

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// One fixed-length aggregation interval. `end` is always `start + length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, length: TimeDelta) -> Self {
        Self {
            start,
            end: start + length,
        }
    }

    pub fn length(&self) -> TimeDelta {
        self.end - self.start
    }

    /// True when `ts` falls in `[start, end)`.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {})",
            self.start.format("%Y-%m-%dT%H:%M:%SZ"),
            self.end.format("%Y-%m-%dT%H:%M:%SZ")
        )
    }
}
