//! Workday calendar
//!
//! A calendar answers one question, "is this date a working day?", and
//! everything else (end-date resolution, workday counts) is derived from it.
//! Callers inject the calendar they want; nothing here reads ambient state.
//!
//! [`HolidayCalendar`] is a fixed rule table. Precedence for a date:
//! 1. listed as a make-up working day → workday (even on a weekend)
//! 2. listed as a holiday → not a workday
//! 3. otherwise a workday unless its weekday is part of the weekend

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Decides whether a calendar date is a working day
pub trait WorkCalendar {
    fn is_workday(&self, date: NaiveDate) -> bool;

    /// Returns the date on which the `n`th workday counted from `start` falls
    ///
    /// `start` itself counts as workday #1 when it is a workday. With `n == 0`
    /// the start date is returned unchanged.
    fn add_workdays(&self, start: NaiveDate, n: u32) -> NaiveDate {
        if n == 0 {
            return start;
        }

        let mut current = start;
        let mut counted = u32::from(self.is_workday(start));

        while counted < n {
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
            if self.is_workday(current) {
                counted += 1;
            }
        }

        current
    }

    /// Counts workdays in the closed range `[from, to]`, 0 when `from > to`
    fn workdays_between(&self, from: NaiveDate, to: NaiveDate) -> u32 {
        if from > to {
            return 0;
        }

        from.iter_days()
            .take_while(|d| *d <= to)
            .filter(|d| self.is_workday(*d))
            .count() as u32
    }
}

impl<C: WorkCalendar + ?Sized> WorkCalendar for &C {
    fn is_workday(&self, date: NaiveDate) -> bool {
        (**self).is_workday(date)
    }
}

/// Absolute number of calendar days between two dates
pub fn days_between(a: NaiveDate, b: NaiveDate) -> u64 {
    b.signed_duration_since(a).num_days().unsigned_abs()
}

/// Built-in rule tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CalendarPreset {
    /// Saturday and Sunday off, no public holidays
    Weekends,
    /// Mainland China public holidays and make-up working days (2024-2025)
    #[default]
    CnMainland,
}

impl CalendarPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarPreset::Weekends => "weekends",
            CalendarPreset::CnMainland => "cn-mainland",
        }
    }

    pub fn calendar(&self) -> HolidayCalendar {
        match self {
            CalendarPreset::Weekends => HolidayCalendar::weekends(),
            CalendarPreset::CnMainland => HolidayCalendar::cn_mainland(),
        }
    }
}

type Ymd = (i32, u32, u32);

const CN_HOLIDAYS: &[(Ymd, Ymd)] = &[
    ((2024, 1, 1), (2024, 1, 1)),
    ((2024, 2, 10), (2024, 2, 17)),
    ((2024, 4, 4), (2024, 4, 6)),
    ((2024, 5, 1), (2024, 5, 5)),
    ((2024, 6, 10), (2024, 6, 10)),
    ((2024, 9, 15), (2024, 9, 17)),
    ((2024, 10, 1), (2024, 10, 7)),
    ((2025, 1, 1), (2025, 1, 1)),
    ((2025, 1, 28), (2025, 2, 4)),
    ((2025, 4, 4), (2025, 4, 6)),
    ((2025, 5, 1), (2025, 5, 5)),
    ((2025, 5, 31), (2025, 6, 2)),
    ((2025, 10, 1), (2025, 10, 8)),
];

const CN_MAKEUP_WORKDAYS: &[Ymd] = &[
    (2024, 2, 4),
    (2024, 2, 18),
    (2024, 4, 7),
    (2024, 4, 28),
    (2024, 5, 11),
    (2024, 9, 14),
    (2024, 9, 29),
    (2024, 10, 12),
    (2025, 1, 26),
    (2025, 2, 8),
    (2025, 4, 27),
    (2025, 9, 28),
    (2025, 10, 11),
];

fn ymd((y, m, d): Ymd) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Weekend rule plus explicit holiday and make-up working day lists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayCalendar {
    /// Indexed by `Weekday::num_days_from_monday`
    weekend: [bool; 7],
    holidays: BTreeSet<NaiveDate>,
    makeup_workdays: BTreeSet<NaiveDate>,
}

impl Default for HolidayCalendar {
    fn default() -> Self {
        Self::weekends()
    }
}

impl HolidayCalendar {
    /// Saturday/Sunday weekend with no holidays
    pub fn weekends() -> Self {
        Self {
            weekend: [false, false, false, false, false, true, true],
            holidays: BTreeSet::new(),
            makeup_workdays: BTreeSet::new(),
        }
    }

    /// Mainland China table: weekends plus the published holiday schedule
    pub fn cn_mainland() -> Self {
        let holidays = CN_HOLIDAYS.iter().flat_map(|&(from, to)| {
            match (ymd(from), ymd(to)) {
                (Some(from), Some(to)) => from.iter_days().take_while(|d| *d <= to).collect::<Vec<_>>(),
                _ => Vec::new(),
            }
        });
        let workdays = CN_MAKEUP_WORKDAYS.iter().filter_map(|&d| ymd(d));

        Self::weekends().with_holidays(holidays).with_workdays(workdays)
    }

    /// Replaces the set of weekend weekdays
    pub fn with_weekend(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.weekend = [false; 7];
        for day in days {
            self.weekend[day.num_days_from_monday() as usize] = true;
        }
        self
    }

    /// Adds holiday dates
    pub fn with_holidays(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.holidays.extend(dates);
        self
    }

    /// Adds make-up working dates
    pub fn with_workdays(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.makeup_workdays.extend(dates);
        self
    }

    /// Returns true if `day` is part of the weekend
    pub fn is_weekend(&self, day: Weekday) -> bool {
        self.weekend[day.num_days_from_monday() as usize]
    }

    /// Returns true if at least one weekday is a regular working day
    pub fn has_regular_workdays(&self) -> bool {
        self.weekend.iter().any(|off| !off)
    }
}

impl WorkCalendar for HolidayCalendar {
    fn is_workday(&self, date: NaiveDate) -> bool {
        if self.makeup_workdays.contains(&date) {
            return true;
        }
        if self.holidays.contains(&date) {
            return false;
        }
        !self.is_weekend(date.weekday())
    }
}
