/// Default location of the events file, relative to the working directory.
pub const DEFAULT_EVENTS_FILE: &str = "events.json";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8501;

/// Bounds of the year input on the calendar page.
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

/// Week header labels, Sunday first.
pub const WEEK_LABELS: [&str; 7] = ["日", "月", "火", "水", "木", "金", "土"];
