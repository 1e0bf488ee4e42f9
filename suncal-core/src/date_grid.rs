//! Sunday-first month grid.
//!
//! A grid always covers whole weeks: it starts on the Sunday on or before the
//! 1st of the month and ends on the Saturday on or after its last day, so the
//! first and last rows carry days of the neighbouring months.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

use crate::error::{CalError, CalResult};

/// A (year, month) pair identifying the displayed month.
///
/// Stored as the first day of the month so every accessor is infallible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "YearMonthRepr")]
pub struct YearMonth {
    first: NaiveDate,
}

#[derive(Serialize)]
struct YearMonthRepr {
    year: i32,
    month: u32,
}

impl From<YearMonth> for YearMonthRepr {
    fn from(ym: YearMonth) -> Self {
        YearMonthRepr {
            year: ym.year(),
            month: ym.month(),
        }
    }
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> CalResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(CalError::InvalidMonth(month));
        }
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| CalError::InvalidDate(format!("{year}-{month:02}")))?;
        Ok(YearMonth { first })
    }

    /// The month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        YearMonth {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        (28..=31)
            .rev()
            .find_map(|day| self.first.with_day(day))
            .unwrap_or(self.first)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// The previous month, wrapping December into the previous year.
    pub fn prev(self) -> Self {
        let (year, month) = match self.month() {
            1 => (self.year() - 1, 12),
            m => (self.year(), m - 1),
        };
        YearMonth::new(year, month).unwrap_or(self)
    }

    /// The next month, wrapping January into the next year.
    pub fn next(self) -> Self {
        let (year, month) = match self.month() {
            12 => (self.year() + 1, 1),
            m => (self.year(), m + 1),
        };
        YearMonth::new(year, month).unwrap_or(self)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year(), self.month())
    }
}

/// Weeks of the month as rows of seven dates, Sunday first.
///
/// Returns 4 to 6 rows; 4 only happens for a 28-day February that starts on
/// a Sunday.
pub fn month_grid(cursor: YearMonth) -> Vec<[NaiveDate; 7]> {
    let first = cursor.first_day();
    let last = cursor.last_day();

    let start = first - Days::new(u64::from(first.weekday().num_days_from_sunday()));
    let end = last + Days::new(u64::from(6 - last.weekday().num_days_from_sunday()));
    let weeks = ((end - start).num_days() + 1) / 7;

    (0..weeks as u64)
        .map(|week| {
            let sunday = start + Days::new(week * 7);
            std::array::from_fn(|i| sunday + Days::new(i as u64))
        })
        .collect()
}
