//! Presentation model for one displayed month.
//!
//! Everything here is recomputed on every render and never persisted.

use chrono::NaiveDate;
use serde::Serialize;

use crate::constants::WEEK_LABELS;
use crate::date_grid::{YearMonth, month_grid};
use crate::event_store::{EventEntry, EventMap};

/// One day of the grid plus its display flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub is_sunday: bool,
    pub is_saturday: bool,
    pub has_event: bool,
}

impl GridCell {
    pub fn day(&self) -> u32 {
        chrono::Datelike::day(&self.date)
    }

    /// CSS classes for the calendar table cell.
    pub fn css_classes(&self) -> Vec<&'static str> {
        let flags = [
            (!self.in_month, "out"),
            (self.is_today, "today"),
            (self.is_sunday, "sun"),
            (self.is_saturday, "sat"),
            (self.has_event, "has-event"),
        ];
        flags
            .into_iter()
            .filter_map(|(on, class)| on.then_some(class))
            .collect()
    }
}

/// A rendered month: caption, header, grid and the month's event list.
#[derive(Debug, Clone, Serialize)]
pub struct MonthView {
    pub cursor: YearMonth,
    pub caption: String,
    pub week_labels: [&'static str; 7],
    pub weeks: Vec<[GridCell; 7]>,
    pub events: Vec<EventEntry>,
}

/// Build the presentation model for `cursor`.
pub fn render(cursor: YearMonth, today: NaiveDate, events: &EventMap) -> MonthView {
    let weeks = month_grid(cursor)
        .into_iter()
        .map(|week| {
            std::array::from_fn(|column| {
                let date = week[column];
                GridCell {
                    date,
                    in_month: cursor.contains(date),
                    is_today: date == today,
                    is_sunday: column == 0,
                    is_saturday: column == 6,
                    has_event: events.has_events(date),
                }
            })
        })
        .collect();

    MonthView {
        cursor,
        caption: month_caption(cursor),
        week_labels: WEEK_LABELS,
        weeks,
        events: events.in_month(cursor),
    }
}

/// Caption shown above the grid, e.g. `2024年 3月`.
pub fn month_caption(cursor: YearMonth) -> String {
    format!("{}年 {}月", cursor.year(), cursor.month())
}

/// Initial value of the add-event date picker: the 1st of the displayed
/// month, but never later than today.
pub fn default_event_date(cursor: YearMonth, today: NaiveDate) -> NaiveDate {
    cursor.first_day().min(today)
}
