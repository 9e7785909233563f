use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Seconds since the unix epoch.
pub type Timestamp = i64;

/// Half-open interval `[start, end)` on the scheduling time line.
///
/// A slot with `start == end` is a **point** in time. It is contained in every slot that covers
/// its start instant and overlaps every such slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl TimeSlot {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        debug_assert!(start <= end, "TimeSlot start must not be after end");
        Self { start, end }
    }

    /// Builds a slot, returning `None` when `start > end`.
    pub fn try_new(start: Timestamp, end: Timestamp) -> Option<Self> {
        if start > end {
            return None;
        }
        Some(Self { start, end })
    }

    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    pub fn is_point(&self) -> bool {
        self.start == self.end
    }

    pub fn contains_instant(&self, t: Timestamp) -> bool {
        self.start <= t && t < self.end
    }

    /// Returns `true` if `other` lies completely inside this slot.
    pub fn contains_slot(&self, other: &TimeSlot) -> bool {
        if other.is_point() {
            return self.start <= other.start && other.start <= self.end;
        }
        self.start <= other.start && other.end <= self.end
    }

    /// Half-open overlap test. Slots that merely touch (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        match (self.is_point(), other.is_point()) {
            (true, true) => self.start == other.start,
            (true, false) => other.contains_instant(self.start),
            (false, true) => self.contains_instant(other.start),
            (false, false) => self.start < other.end && other.start < self.end,
        }
    }

    /// Returns the common part of both slots, or `None` if they do not overlap.
    pub fn intersection(&self, other: &TimeSlot) -> Option<TimeSlot> {
        if !self.overlaps(other) {
            return None;
        }
        let start = self.start.max(other.start);
        let end = self.end.min(other.end).max(start);
        Some(TimeSlot { start, end })
    }
}

/// Formats a timestamp as `YYYY-MM-DD HH:MM` (UTC). Falls back to raw seconds when out of range.
pub fn format_timestamp(t: Timestamp) -> String {
    match DateTime::from_timestamp(t, 0) {
        Some(date_time) => date_time.format("%Y-%m-%d %H:%M").to_string(),
        None => t.to_string(),
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", format_timestamp(self.start), format_timestamp(self.end))
    }
}
