//! Half-day interval model
//!
//! A task occupies a closed range of half-days. Each endpoint is a
//! [`SlotPoint`] (calendar date + morning/afternoon) and endpoints order
//! lexicographically: by date, then `Morning < Afternoon`.
//!
//! Requirements and projects only carry calendar dates, see [`DateRange`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IntervalError {
    #[error("Interval ends before it starts: {start} to {end}")]
    Inverted { start: String, end: String },

    #[error("Invalid time slot: expected 'morning' or 'afternoon', got '{0}'")]
    InvalidSlot(String),
}

/// Half of a working day
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HalfDaySlot {
    #[default]
    #[serde(alias = "morning")]
    Morning,
    #[serde(alias = "afternoon")]
    Afternoon,
}

impl HalfDaySlot {
    pub fn label(&self) -> &'static str {
        match self {
            HalfDaySlot::Morning => "morning",
            HalfDaySlot::Afternoon => "afternoon",
        }
    }
}

impl fmt::Display for HalfDaySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HalfDaySlot {
    type Err = IntervalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" | "am" => Ok(HalfDaySlot::Morning),
            "afternoon" | "pm" => Ok(HalfDaySlot::Afternoon),
            _ => Err(IntervalError::InvalidSlot(s.to_string())),
        }
    }
}

/// A specific half-day: `(date, slot)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotPoint {
    pub date: NaiveDate,
    pub slot: HalfDaySlot,
}

impl SlotPoint {
    pub fn new(date: NaiveDate, slot: HalfDaySlot) -> Self {
        Self { date, slot }
    }

    pub fn morning(date: NaiveDate) -> Self {
        Self::new(date, HalfDaySlot::Morning)
    }

    pub fn afternoon(date: NaiveDate) -> Self {
        Self::new(date, HalfDaySlot::Afternoon)
    }

    /// The half-day immediately after this one
    ///
    /// Saturates at the last representable date.
    pub fn next(self) -> Self {
        match self.slot {
            HalfDaySlot::Morning => Self::afternoon(self.date),
            HalfDaySlot::Afternoon => self.date.succ_opt().map_or(self, Self::morning),
        }
    }
}

impl fmt::Display for SlotPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.slot)
    }
}

/// Closed half-day range occupied by a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct TaskInterval {
    start: SlotPoint,
    end: SlotPoint,
}

impl TaskInterval {
    /// Creates an interval, rejecting an end that precedes the start
    pub fn new(start: SlotPoint, end: SlotPoint) -> Result<Self, IntervalError> {
        if end < start {
            return Err(IntervalError::Inverted {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> SlotPoint {
        self.start
    }

    pub fn end(&self) -> SlotPoint {
        self.end
    }

    /// Returns true if the interval starts and ends on the same date
    pub fn is_single_day(&self) -> bool {
        self.start.date == self.end.date
    }

    /// Calendar dates covered, slots dropped
    pub fn date_range(&self) -> DateRange {
        DateRange {
            start: self.start.date,
            end: self.end.date,
        }
    }

    /// Closed-interval overlap on the composite `(date, slot)` key
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.end < other.start || other.end < self.start)
    }

    /// Conflict test used for per-person scheduling
    ///
    /// Two single-day intervals on the same date conflict only when their
    /// slot ranges intersect, so a morning-only task and an afternoon-only
    /// task can share a day. If either side spans several dates, any shared
    /// calendar date is a conflict, even when the shared date is only
    /// half-occupied by each side.
    pub fn slot_conflict(&self, other: &Self) -> bool {
        if self.end.date < other.start.date || other.end.date < self.start.date {
            return false;
        }

        if self.is_single_day() && other.is_single_day() && self.start.date == other.start.date {
            return self.start.slot <= other.end.slot && other.start.slot <= self.end.slot;
        }

        true
    }
}

/// Unchecked wire form, validated through [`TaskInterval::new`]
#[derive(Deserialize)]
struct RawInterval {
    start: SlotPoint,
    end: SlotPoint,
}

impl TryFrom<RawInterval> for TaskInterval {
    type Error = IntervalError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl fmt::Display for TaskInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Returns true if two intervals share at least one half-day
pub fn overlaps(a: &TaskInterval, b: &TaskInterval) -> bool {
    a.overlaps(b)
}

/// Orders two intervals by their end point (`Less` means `a` ends first)
pub fn compare_end(a: &TaskInterval, b: &TaskInterval) -> Ordering {
    a.end.cmp(&b.end)
}

/// Picks the interval that ends first; the earliest in iteration order wins ties
pub fn earliest_end<'a>(
    intervals: impl IntoIterator<Item = &'a TaskInterval>,
) -> Option<&'a TaskInterval> {
    intervals.into_iter().fold(None, |best, current| match best {
        Some(best) if compare_end(current, best) != Ordering::Less => Some(best),
        _ => Some(current),
    })
}

/// Closed calendar-date range carried by requirements and projects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, IntervalError> {
        if end < start {
            return Err(IntervalError::Inverted {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// Returns true if the ranges share at least one date
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.end < other.start || self.start > other.end)
    }

    /// Returns true if `other` lies fully inside this range
    pub fn contains(&self, other: &Self) -> bool {
        other.start >= self.start && other.end <= self.end
    }
}

#[derive(Deserialize)]
struct RawRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawRange> for DateRange {
    type Error = IntervalError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}
