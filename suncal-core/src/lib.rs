//! Core types for the suncal calendar.
//!
//! This crate holds everything the server renders from:
//! - `date_grid` for the Sunday-first month matrix and the `YearMonth` cursor
//! - `event_store` for the date -> titles map and its JSON file
//! - `render` for the per-cell presentation model
//! - `app_state` for the session state machine driven by the UI

pub mod app_state;
pub mod config;
pub mod constants;
pub mod date_grid;
pub mod error;
pub mod event_store;
pub mod render;

pub use app_state::{Action, AppState, Outcome, Transition};
pub use crate::config::SuncalConfig;
pub use date_grid::{YearMonth, month_grid};
pub use error::{CalError, CalResult};
pub use event_store::{EventEntry, EventMap, EventStore, LoadStatus, Loaded};
pub use render::{GridCell, MonthView, default_event_date, month_caption, render};
