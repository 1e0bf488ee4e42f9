//! The calendar page template.
//!
//! Markup lives in `templates/calendar.html`; askama escapes every
//! interpolated value, event titles included.

use askama::Template;
use chrono::NaiveDate;
use suncal_core::MonthView;

use crate::state::Flash;

/// One entry of the month picker.
pub struct MonthOption {
    pub value: u32,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "calendar.html")]
pub struct CalendarPage<'a> {
    pub view: &'a MonthView,
    /// Initial value of the add form's date input.
    pub default_date: NaiveDate,
    pub flash: Option<&'a Flash>,
    pub min_year: i32,
    pub max_year: i32,
    pub months: Vec<MonthOption>,
}

impl<'a> CalendarPage<'a> {
    pub fn new(
        view: &'a MonthView,
        default_date: NaiveDate,
        flash: Option<&'a Flash>,
        min_year: i32,
        max_year: i32,
    ) -> Self {
        let months = (1..=12)
            .map(|value| MonthOption {
                value,
                selected: value == view.cursor.month(),
            })
            .collect();

        CalendarPage {
            view,
            default_date,
            flash,
            min_year,
            max_year,
            months,
        }
    }
}
