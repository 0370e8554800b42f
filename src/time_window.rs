// Window boundaries: alignment from local midnight in the processing offset, explicit starts,
// and enumeration of missed windows for backfill.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta, Timelike, Utc};

use crate::config::AggregationConfig;
use crate::error::{AggregationError, Result};
use crate::models::TimeWindow;

/// Strict format accepted for explicit interval starts (e.g. `INTERVAL_START`).
pub const EXPLICIT_START_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";
const EXPLICIT_START_LEN: usize = "YYYY-MM-DDTHH:MM:SSZ".len();

/// Computes aligned windows of a fixed length. Alignment is measured from midnight in `offset`.
#[derive(Debug, Clone, Copy)]
pub struct WindowCalculator {
    length: TimeDelta,
    offset: FixedOffset,
}

impl WindowCalculator {
    pub fn new(length: TimeDelta, offset: FixedOffset) -> anyhow::Result<Self> {
        anyhow::ensure!(
            length > TimeDelta::zero(),
            "window length must be positive, got {}s",
            length.num_seconds()
        );
        Ok(Self { length, offset })
    }

    pub fn from_config(config: &AggregationConfig) -> anyhow::Result<Self> {
        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
            anyhow::anyhow!(
                "aggregation.utc_offset_minutes out of range: {}",
                config.utc_offset_minutes
            )
        })?;
        Self::new(TimeDelta::minutes(config.interval_minutes as i64), offset)
    }

    pub fn length(&self) -> TimeDelta {
        self.length
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Window containing the current wall-clock time.
    pub fn current_window(&self) -> TimeWindow {
        self.current_window_at(Utc::now())
    }

    /// Window containing `now`: start floored to a multiple of the length since local midnight.
    pub fn current_window_at(&self, now: DateTime<Utc>) -> TimeWindow {
        let since_midnight = self.elapsed_since_local_midnight(now);
        let len_ms = self.length.num_milliseconds();
        let floored = TimeDelta::milliseconds(since_midnight.num_milliseconds() / len_ms * len_ms);
        let remainder = since_midnight - floored;
        TimeWindow::new(now - remainder, self.length)
    }

    /// Start of the grid window containing `ts`; `ts` itself when it is already on the grid.
    pub fn grid_floor(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        self.current_window_at(ts).start
    }

    /// Local midnight (in the processing offset) of the day containing `now`, as UTC.
    pub fn start_of_day_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.elapsed_since_local_midnight(now)
    }

    /// Window starting exactly at an explicit `YYYY-MM-DDTHH:MM:SSZ` instant (not re-aligned).
    pub fn window_from_explicit_start(&self, start_iso: &str) -> Result<TimeWindow> {
        let start = parse_explicit_start(start_iso)?;
        Ok(TimeWindow::new(start, self.length))
    }

    /// Missed windows from `last_processed_end` up to (not including) `current_start`.
    pub fn missing_windows(
        &self,
        last_processed_end: DateTime<Utc>,
        current_start: DateTime<Utc>,
    ) -> MissingWindows {
        enumerate_missing_windows(last_processed_end, current_start, self.length)
    }

    fn elapsed_since_local_midnight(&self, now: DateTime<Utc>) -> TimeDelta {
        let local = now.with_timezone(&self.offset).time();
        TimeDelta::seconds(local.num_seconds_from_midnight() as i64)
            + TimeDelta::nanoseconds(local.nanosecond() as i64)
    }
}

/// Parses the strict explicit-start format as UTC. chrono's parser tolerates unpadded fields,
/// leading whitespace and signed years, so the value must also re-format to exactly `input`.
pub fn parse_explicit_start(input: &str) -> Result<DateTime<Utc>> {
    if input.len() != EXPLICIT_START_LEN {
        return Err(AggregationError::malformed_timestamp(input));
    }
    let naive = NaiveDateTime::parse_from_str(input, EXPLICIT_START_FORMAT)
        .map_err(|_| AggregationError::malformed_timestamp(input))?;
    if naive.format(EXPLICIT_START_FORMAT).to_string() != input {
        return Err(AggregationError::malformed_timestamp(input));
    }
    Ok(naive.and_utc())
}

/// Contiguous windows `[last_end, last_end + length), ...` stopping before `current_start`.
/// Empty when `last_end >= current_start` or `length` is not positive.
pub fn enumerate_missing_windows(
    last_end: DateTime<Utc>,
    current_start: DateTime<Utc>,
    length: TimeDelta,
) -> MissingWindows {
    MissingWindows {
        next_start: last_end,
        stop: current_start,
        length,
    }
}

/// Lazy iterator over missed windows. Cloning restarts from the clone point.
#[derive(Debug, Clone)]
pub struct MissingWindows {
    next_start: DateTime<Utc>,
    stop: DateTime<Utc>,
    length: TimeDelta,
}

impl Iterator for MissingWindows {
    type Item = TimeWindow;

    fn next(&mut self) -> Option<TimeWindow> {
        if self.length <= TimeDelta::zero() || self.next_start >= self.stop {
            return None;
        }
        let window = TimeWindow::new(self.next_start, self.length);
        self.next_start = window.end;
        Some(window)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.length <= TimeDelta::zero() || self.next_start >= self.stop {
            return (0, Some(0));
        }
        let span = (self.stop - self.next_start).num_milliseconds();
        let len = self.length.num_milliseconds();
        let n = ((span + len - 1) / len) as usize;
        (n, Some(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, h, m, s).unwrap()
    }

    #[test]
    fn parse_explicit_start_accepts_strict_format() {
        assert_eq!(parse_explicit_start("2024-03-10T09:15:00Z").unwrap(), utc(9, 15, 0));
    }

    #[test]
    fn parse_explicit_start_rejects_other_formats() {
        for bad in [
            "2024-03-10 09:15:00",
            "2024-03-10T09:15:00+00:00",
            "2024-03-10T09:15Z",
            "2024-3-1T9:5:0Z",
            " 2024-03-10T09:15:00Z",
            "+2024-03-10T09:15:00Z",
            "2024-03-10T09:15:00Z ",
            "",
        ] {
            let err = parse_explicit_start(bad).unwrap_err();
            assert!(matches!(err, AggregationError::MalformedTimestamp { .. }), "{bad}");
        }
    }

    #[test]
    fn missing_windows_size_hint_matches_count() {
        let it = enumerate_missing_windows(utc(0, 0, 0), utc(1, 0, 0), TimeDelta::minutes(15));
        assert_eq!(it.size_hint(), (4, Some(4)));
        assert_eq!(it.count(), 4);
    }

    #[test]
    fn missing_windows_zero_length_is_empty() {
        let mut it = enumerate_missing_windows(utc(0, 0, 0), utc(1, 0, 0), TimeDelta::zero());
        assert!(it.next().is_none());
    }
}
