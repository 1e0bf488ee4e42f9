use std::sync::Arc;

use chrono::{Local, NaiveDate};
use suncal_core::{AppState, EventStore, SuncalConfig, Transition};
use tokio::sync::{Mutex, MutexGuard};

/// One-shot message shown on the next page render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flash {
    Success(String),
    Error(String),
}

impl Flash {
    /// CSS modifier for the banner.
    pub fn class(&self) -> &'static str {
        match self {
            Flash::Success(_) => "success",
            Flash::Error(_) => "error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Flash::Success(message) | Flash::Error(message) => message,
        }
    }
}

/// The single calendar session this server drives.
pub struct Session {
    pub app: AppState,
    pub flash: Option<Flash>,
}

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    session: Arc<Mutex<Session>>,
    config: Arc<SuncalConfig>,
    // Pinned "today" for tests; the local date otherwise
    fixed_today: Option<NaiveDate>,
}

impl ServerState {
    pub fn new(config: SuncalConfig) -> Self {
        Self::build(config, None)
    }

    #[cfg(test)]
    pub fn with_today(config: SuncalConfig, today: NaiveDate) -> Self {
        Self::build(config, Some(today))
    }

    fn build(config: SuncalConfig, fixed_today: Option<NaiveDate>) -> Self {
        let today = fixed_today.unwrap_or_else(local_today);
        let mut app = AppState::open(EventStore::new(config.events_path()), today);
        app.subscribe(log_transition);

        ServerState {
            session: Arc::new(Mutex::new(Session { app, flash: None })),
            config: Arc::new(config),
            fixed_today,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.fixed_today.unwrap_or_else(local_today)
    }

    pub fn config(&self) -> &SuncalConfig {
        &self.config
    }

    /// Lock the session. Event saves run synchronously inside `apply` while
    /// this guard is held, so each write completes before the next request
    /// sees the map. Fine for one local user and a small file.
    pub async fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().await
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn log_transition(transition: &Transition<'_>) {
    tracing::info!(
        action = ?transition.action,
        outcome = ?transition.outcome,
        cursor = %transition.cursor,
        "Transition"
    );
}
