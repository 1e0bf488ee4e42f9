//! Dated event titles and the JSON file they live in.
//!
//! The file is a single object mapping `YYYY-MM-DD` to the titles filed under
//! that date, in insertion order:
//!
//! ```json
//! {
//!   "2024-03-10": [
//!     "写真撮影（午前）"
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::date_grid::YearMonth;
use crate::error::{CalError, CalResult};

/// Date -> ordered titles. A date never maps to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventMap(BTreeMap<NaiveDate, Vec<String>>);

/// One row of a month's event list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventEntry {
    pub date: NaiveDate,
    /// Position within the date's list; this is the index `remove` takes.
    pub index: usize,
    pub title: String,
}

impl EventMap {
    pub fn new() -> Self {
        EventMap::default()
    }

    /// Append a title under `date`.
    ///
    /// The title is trimmed first. Returns false, leaving the map untouched,
    /// when nothing is left after trimming.
    pub fn add(&mut self, date: NaiveDate, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        self.0.entry(date).or_default().push(title.to_string());
        true
    }

    /// Remove and return the title at `index` under `date`.
    ///
    /// Drops the date entirely once its last title is gone.
    pub fn remove(&mut self, date: NaiveDate, index: usize) -> CalResult<String> {
        let titles = self
            .0
            .get_mut(&date)
            .filter(|titles| index < titles.len())
            .ok_or(CalError::InvalidIndex { date, index })?;

        let title = titles.remove(index);
        if titles.is_empty() {
            self.0.remove(&date);
        }
        Ok(title)
    }

    pub fn titles(&self, date: NaiveDate) -> &[String] {
        self.0.get(&date).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn has_events(&self, date: NaiveDate) -> bool {
        !self.titles(date).is_empty()
    }

    /// Number of dates with at least one event.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &Vec<String>)> {
        self.0.iter()
    }

    /// Every event of the month, ordered by date then insertion order.
    pub fn in_month(&self, cursor: YearMonth) -> Vec<EventEntry> {
        self.0
            .range(cursor.first_day()..=cursor.last_day())
            .flat_map(|(date, titles)| {
                titles.iter().enumerate().map(|(index, title)| EventEntry {
                    date: *date,
                    index,
                    title: title.clone(),
                })
            })
            .collect()
    }

    fn prune_empty(&mut self) {
        self.0.retain(|_, titles| !titles.is_empty());
    }
}

/// Why `load` came back with the map it did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded,
    /// The file does not exist yet.
    Missing,
    /// The file exists but could not be read or parsed.
    Unusable(String),
}

/// Result of reading the events file. `events` is empty unless `status` is
/// `Loaded`.
#[derive(Debug)]
pub struct Loaded {
    pub events: EventMap,
    pub status: LoadStatus,
}

/// The JSON file backing an `EventMap`.
#[derive(Debug, Clone)]
pub struct EventStore {
    path: PathBuf,
}

impl EventStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        EventStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the events file.
    ///
    /// Never fails: a missing or broken file gives an empty map, with the
    /// reason reported through `LoadStatus`.
    pub fn load(&self) -> Loaded {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Loaded {
                    events: EventMap::new(),
                    status: LoadStatus::Missing,
                };
            }
            Err(e) => return unusable(format!("read failed: {e}")),
        };

        match serde_json::from_str::<EventMap>(&content) {
            Ok(mut events) => {
                events.prune_empty();
                tracing::debug!(path = %self.path.display(), dates = events.len(), "Loaded events");
                Loaded {
                    events,
                    status: LoadStatus::Loaded,
                }
            }
            Err(e) => unusable(format!("parse failed: {e}")),
        }
    }

    /// Overwrite the events file with `events`.
    ///
    /// Writes to a sibling temp file and renames it into place.
    pub fn save(&self, events: &EventMap) -> CalResult<()> {
        let content = serde_json::to_string_pretty(events)
            .map_err(|e| CalError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| self.save_error(source))?;
        }

        let temp = self.temp_path();
        std::fs::write(&temp, content).map_err(|source| self.save_error(source))?;
        if let Err(source) = std::fs::rename(&temp, &self.path) {
            if let Err(e) = std::fs::remove_file(&temp) {
                tracing::warn!(path = %temp.display(), error = %e, "Could not remove temp file");
            }
            return Err(self.save_error(source));
        }

        tracing::debug!(path = %self.path.display(), dates = events.len(), "Saved events");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn save_error(&self, source: std::io::Error) -> CalError {
        CalError::Save {
            path: self.path.clone(),
            source,
        }
    }
}

fn unusable(reason: String) -> Loaded {
    Loaded {
        events: EventMap::new(),
        status: LoadStatus::Unusable(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn store_in(dir: &TempDir) -> EventStore {
        EventStore::new(dir.path().join("events.json"))
    }

    #[test]
    fn test_add_trims_and_appends_in_order() {
        let mut map = EventMap::new();
        assert!(map.add(date("2024-03-10"), "  Shoot  "));
        assert!(map.add(date("2024-03-10"), "Review"));

        assert_eq!(map.titles(date("2024-03-10")), ["Shoot", "Review"]);
    }

    #[test]
    fn test_add_ignores_blank_title() {
        let mut map = EventMap::new();
        assert!(!map.add(date("2024-03-10"), "   "));
        assert!(!map.add(date("2024-03-10"), ""));
        assert!(map.is_empty());
    }

    #[test]
    fn test_add_then_remove_restores_prior_state() {
        let mut map = EventMap::new();
        map.add(date("2024-03-01"), "Existing");
        let before = map.clone();

        map.add(date("2024-03-10"), "Shoot");
        assert_eq!(map.remove(date("2024-03-10"), 0).unwrap(), "Shoot");

        assert_eq!(map, before);
    }

    #[test]
    fn test_removing_last_title_prunes_date() {
        let mut map = EventMap::new();
        map.add(date("2024-03-10"), "A");

        map.remove(date("2024-03-10"), 0).unwrap();

        assert!(map.is_empty());
        assert!(!map.has_events(date("2024-03-10")));
    }

    #[test]
    fn test_remove_keeps_remaining_order() {
        let mut map = EventMap::new();
        for title in ["A", "B", "C"] {
            map.add(date("2024-03-10"), title);
        }

        assert_eq!(map.remove(date("2024-03-10"), 1).unwrap(), "B");
        assert_eq!(map.titles(date("2024-03-10")), ["A", "C"]);
    }

    #[test]
    fn test_remove_out_of_range_is_invalid_index() {
        let mut map = EventMap::new();
        map.add(date("2024-03-10"), "A");

        let err = map.remove(date("2024-03-10"), 1).unwrap_err();
        assert!(matches!(err, CalError::InvalidIndex { index: 1, .. }));

        let err = map.remove(date("2024-03-11"), 0).unwrap_err();
        assert!(matches!(err, CalError::InvalidIndex { index: 0, .. }));

        assert_eq!(map.titles(date("2024-03-10")), ["A"]);
    }

    #[test]
    fn test_in_month_sorted_by_date_then_insertion() {
        let mut map = EventMap::new();
        map.add(date("2024-03-05"), "B");
        map.add(date("2024-03-01"), "A");
        map.add(date("2024-03-05"), "C");
        map.add(date("2024-02-29"), "outside");
        map.add(date("2024-04-01"), "outside");

        let march = map.in_month(YearMonth::new(2024, 3).unwrap());
        let rows: Vec<(String, usize, &str)> = march
            .iter()
            .map(|e| (e.date.to_string(), e.index, e.title.as_str()))
            .collect();

        assert_eq!(
            rows,
            vec![
                ("2024-03-01".to_string(), 0, "A"),
                ("2024-03-05".to_string(), 0, "B"),
                ("2024-03-05".to_string(), 1, "C"),
            ]
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let loaded = store_in(&dir).load();

        assert_eq!(loaded.status, LoadStatus::Missing);
        assert!(loaded.events.is_empty());
    }

    #[test]
    fn test_load_malformed_file_is_unusable() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), "{ not json").unwrap();

        let loaded = store.load();

        assert!(matches!(loaded.status, LoadStatus::Unusable(_)));
        assert!(loaded.events.is_empty());
    }

    #[test]
    fn test_load_rejects_non_date_keys() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"tomorrow": ["A"]}"#).unwrap();

        assert!(matches!(store.load().status, LoadStatus::Unusable(_)));
    }

    #[test]
    fn test_load_prunes_empty_lists() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"{"2024-03-10": [], "2024-03-11": ["A"]}"#).unwrap();

        let loaded = store.load();

        assert_eq!(loaded.status, LoadStatus::Loaded);
        assert_eq!(loaded.events.len(), 1);
        assert!(!loaded.events.has_events(date("2024-03-10")));
    }

    #[test]
    fn test_save_writes_pretty_utf8_json() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut map = EventMap::new();
        map.add(date("2024-03-10"), "写真撮影（午前）");

        store.save(&map).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content, "{\n  \"2024-03-10\": [\n    \"写真撮影（午前）\"\n  ]\n}");
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn test_save_of_loaded_map_is_stable() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut map = EventMap::new();
        map.add(date("2024-03-10"), "A");
        map.add(date("2024-01-02"), "B");
        map.add(date("2024-03-10"), "C");
        store.save(&map).unwrap();
        let first = std::fs::read_to_string(store.path()).unwrap();

        store.save(&store.load().events).unwrap();
        store.save(&store.load().events).unwrap();

        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), first);
        assert_eq!(store.load().events, map);
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = EventStore::new(dir.path().join("nested/data/events.json"));

        store.save(&EventMap::new()).unwrap();

        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "{}");
    }

    #[test]
    fn test_save_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes the final rename fail
        let store = store_in(&dir);
        std::fs::create_dir(store.path()).unwrap();
        std::fs::write(store.path().join("keep"), "x").unwrap();

        let err = store.save(&EventMap::new()).unwrap_err();
        assert!(matches!(err, CalError::Save { .. }));
        assert!(!store.temp_path().exists());
    }
}
