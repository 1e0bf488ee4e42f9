//! Session state: the displayed month plus the in-memory event map.
//!
//! All mutation goes through [`AppState::apply`]. Event changes are flushed
//! to the store before `apply` returns, and subscribers are told about every
//! successful transition so the UI layer can re-render.

use chrono::NaiveDate;
use serde::Serialize;

use crate::date_grid::YearMonth;
use crate::error::CalResult;
use crate::event_store::{EventMap, EventStore, LoadStatus};
use crate::render::{MonthView, render};

/// A user action against the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    PrevMonth,
    NextMonth,
    GoToday(NaiveDate),
    /// Direct jump from the year/month pickers. The month is already valid by
    /// construction of `YearMonth`.
    SetCursor(YearMonth),
    AddEvent { date: NaiveDate, title: String },
    DeleteEvent { date: NaiveDate, index: usize },
}

/// What an action ended up doing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Moved { cursor: YearMonth },
    Added { date: NaiveDate, title: String },
    Deleted { date: NaiveDate, title: String },
    /// Blank title; nothing changed and nothing was saved.
    Ignored,
}

/// Passed to subscribers after each successful `apply`.
#[derive(Debug)]
pub struct Transition<'a> {
    pub action: &'a Action,
    pub outcome: &'a Outcome,
    pub cursor: YearMonth,
}

type Subscriber = Box<dyn Fn(&Transition<'_>) + Send + Sync>;

pub struct AppState {
    cursor: YearMonth,
    events: EventMap,
    store: EventStore,
    load_status: LoadStatus,
    subscribers: Vec<Subscriber>,
}

impl AppState {
    /// Load events from `store` and start on today's month.
    pub fn open(store: EventStore, today: NaiveDate) -> Self {
        let loaded = store.load();
        match &loaded.status {
            LoadStatus::Loaded => {
                tracing::info!(path = %store.path().display(), dates = loaded.events.len(), "Events loaded");
            }
            LoadStatus::Missing => {
                tracing::info!(path = %store.path().display(), "No events file yet, starting empty");
            }
            LoadStatus::Unusable(reason) => {
                tracing::warn!(path = %store.path().display(), %reason, "Events file unusable, starting empty");
            }
        }

        AppState {
            cursor: YearMonth::from_date(today),
            events: loaded.events,
            store,
            load_status: loaded.status,
            subscribers: Vec::new(),
        }
    }

    pub fn cursor(&self) -> YearMonth {
        self.cursor
    }

    pub fn events(&self) -> &EventMap {
        &self.events
    }

    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// How the events file looked when the session started.
    pub fn load_status(&self) -> &LoadStatus {
        &self.load_status
    }

    /// Register a callback run after every successful transition, in
    /// registration order.
    pub fn subscribe<F>(&mut self, subscriber: F)
    where
        F: Fn(&Transition<'_>) + Send + Sync + 'static,
    {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Render the current month.
    pub fn view(&self, today: NaiveDate) -> MonthView {
        render(self.cursor, today, &self.events)
    }

    /// Run one transition.
    ///
    /// Runs synchronously, file save included. A failed delete or a failed
    /// save leaves the map as it was before the action, so memory never shows
    /// events the file does not have.
    pub fn apply(&mut self, action: Action) -> CalResult<Outcome> {
        let outcome = match &action {
            Action::PrevMonth => self.move_to(self.cursor.prev()),
            Action::NextMonth => self.move_to(self.cursor.next()),
            Action::GoToday(today) => self.move_to(YearMonth::from_date(*today)),
            Action::SetCursor(cursor) => self.move_to(*cursor),
            Action::AddEvent { date, title } => {
                let previous = self.events.clone();
                if self.events.add(*date, title) {
                    self.save_or_restore(previous)?;
                    Outcome::Added {
                        date: *date,
                        title: title.trim().to_string(),
                    }
                } else {
                    Outcome::Ignored
                }
            }
            Action::DeleteEvent { date, index } => {
                let previous = self.events.clone();
                let title = self.events.remove(*date, *index)?;
                self.save_or_restore(previous)?;
                Outcome::Deleted { date: *date, title }
            }
        };

        let transition = Transition {
            action: &action,
            outcome: &outcome,
            cursor: self.cursor,
        };
        for subscriber in &self.subscribers {
            subscriber(&transition);
        }

        Ok(outcome)
    }

    fn save_or_restore(&mut self, previous: EventMap) -> CalResult<()> {
        let result = self.store.save(&self.events);
        if result.is_err() {
            self.events = previous;
        }
        result
    }

    fn move_to(&mut self, cursor: YearMonth) -> Outcome {
        self.cursor = cursor;
        Outcome::Moved { cursor }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalError;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn open(dir: &TempDir, today: &str) -> AppState {
        AppState::open(EventStore::new(dir.path().join("events.json")), date(today))
    }

    #[test]
    fn test_open_starts_on_today_month() {
        let dir = TempDir::new().unwrap();
        let state = open(&dir, "2024-03-15");

        assert_eq!(state.cursor(), ym(2024, 3));
        assert_eq!(state.load_status(), &LoadStatus::Missing);
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_navigation_across_year_boundary() {
        let dir = TempDir::new().unwrap();
        let mut state = open(&dir, "2024-12-01");

        state.apply(Action::NextMonth).unwrap();
        assert_eq!(state.cursor(), ym(2025, 1));

        state.apply(Action::PrevMonth).unwrap();
        assert_eq!(state.cursor(), ym(2024, 12));
    }

    #[test]
    fn test_set_cursor_and_go_today() {
        let dir = TempDir::new().unwrap();
        let mut state = open(&dir, "2024-03-15");

        let outcome = state.apply(Action::SetCursor(ym(1999, 7))).unwrap();
        assert_eq!(outcome, Outcome::Moved { cursor: ym(1999, 7) });

        state.apply(Action::GoToday(date("2024-03-15"))).unwrap();
        assert_eq!(state.cursor(), ym(2024, 3));
    }

    #[test]
    fn test_add_event_persists() {
        let dir = TempDir::new().unwrap();
        let mut state = open(&dir, "2024-03-15");

        let outcome = state
            .apply(Action::AddEvent {
                date: date("2024-03-10"),
                title: " Shoot ".to_string(),
            })
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Added {
                date: date("2024-03-10"),
                title: "Shoot".to_string()
            }
        );
        let reloaded = state.store().load();
        assert_eq!(reloaded.status, LoadStatus::Loaded);
        assert_eq!(reloaded.events.titles(date("2024-03-10")), ["Shoot"]);
    }

    #[test]
    fn test_blank_title_does_not_touch_file() {
        let dir = TempDir::new().unwrap();
        let mut state = open(&dir, "2024-03-15");

        let outcome = state
            .apply(Action::AddEvent {
                date: date("2024-03-10"),
                title: "   ".to_string(),
            })
            .unwrap();

        assert_eq!(outcome, Outcome::Ignored);
        assert!(!state.store().path().exists());
    }

    #[test]
    fn test_delete_event_persists_and_prunes() {
        let dir = TempDir::new().unwrap();
        let mut state = open(&dir, "2024-03-15");
        state
            .apply(Action::AddEvent {
                date: date("2024-03-10"),
                title: "A".to_string(),
            })
            .unwrap();

        let outcome = state
            .apply(Action::DeleteEvent {
                date: date("2024-03-10"),
                index: 0,
            })
            .unwrap();

        assert_eq!(
            outcome,
            Outcome::Deleted {
                date: date("2024-03-10"),
                title: "A".to_string()
            }
        );
        assert_eq!(std::fs::read_to_string(state.store().path()).unwrap(), "{}");
    }

    #[test]
    fn test_stale_delete_is_invalid_index() {
        let dir = TempDir::new().unwrap();
        let mut state = open(&dir, "2024-03-15");

        let err = state
            .apply(Action::DeleteEvent {
                date: date("2024-03-10"),
                index: 0,
            })
            .unwrap_err();

        assert!(matches!(err, CalError::InvalidIndex { .. }));
        assert!(!state.store().path().exists());
    }

    #[test]
    fn test_failed_save_rolls_back_add_and_delete() {
        let dir = TempDir::new().unwrap();
        let mut state = open(&dir, "2024-03-15");
        state
            .apply(Action::AddEvent {
                date: date("2024-03-10"),
                title: "A".to_string(),
            })
            .unwrap();
        let saved = state.events().clone();

        // Swap the file for a non-empty directory so the next save fails
        let path = state.store().path().to_path_buf();
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        let err = state
            .apply(Action::AddEvent {
                date: date("2024-03-11"),
                title: "B".to_string(),
            })
            .unwrap_err();
        assert!(matches!(err, CalError::Save { .. }));
        assert_eq!(state.events(), &saved);

        let err = state
            .apply(Action::DeleteEvent {
                date: date("2024-03-10"),
                index: 0,
            })
            .unwrap_err();
        assert!(matches!(err, CalError::Save { .. }));
        assert_eq!(state.events(), &saved);
    }

    #[test]
    fn test_subscribers_see_each_transition() {
        let dir = TempDir::new().unwrap();
        let mut state = open(&dir, "2024-03-15");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        state.subscribe(move |t| sink.lock().unwrap().push((t.outcome.clone(), t.cursor)));

        state.apply(Action::NextMonth).unwrap();
        state
            .apply(Action::AddEvent {
                date: date("2024-04-01"),
                title: "".to_string(),
            })
            .unwrap();
        let _ = state.apply(Action::DeleteEvent {
            date: date("2024-04-01"),
            index: 3,
        });

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (Outcome::Moved { cursor: ym(2024, 4) }, ym(2024, 4)),
                (Outcome::Ignored, ym(2024, 4)),
            ]
        );
    }

    #[test]
    fn test_reopen_sees_saved_events() {
        let dir = TempDir::new().unwrap();
        {
            let mut state = open(&dir, "2024-03-15");
            for (d, title) in [("2024-03-05", "B"), ("2024-03-01", "A")] {
                state
                    .apply(Action::AddEvent {
                        date: date(d),
                        title: title.to_string(),
                    })
                    .unwrap();
            }
        }

        let state = open(&dir, "2024-03-15");
        let view = state.view(date("2024-03-15"));
        let titles: Vec<&str> = view.events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }
}
