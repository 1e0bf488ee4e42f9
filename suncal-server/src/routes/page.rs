//! The calendar page and the form posts behind its controls.
//!
//! Every form post applies one transition and redirects back to `/`, which
//! re-renders the whole page from the session.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    response::{Html, Redirect},
    routing::{get, post},
};
use serde::Deserialize;
use suncal_core::{Action, CalError, Outcome, default_event_date};

use crate::html::CalendarPage;
use crate::routes::{AppError, parse_date, picked_month};
use crate::state::{Flash, ServerState};

const NOT_FOUND_MESSAGE: &str = "見つかりませんでした";
const SAVE_FAILED_MESSAGE: &str = "保存できませんでした";

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/", get(index))
        .route("/prev", post(prev_month))
        .route("/next", post(next_month))
        .route("/today", post(go_today))
        .route("/cursor", post(set_cursor))
        .route("/events", post(add_event))
        .route("/events/delete", post(delete_event))
}

/// GET / - Render the displayed month
async fn index(State(state): State<ServerState>) -> Result<Html<String>, AppError> {
    let today = state.today();
    let mut session = state.session().await;
    let flash = session.flash.take();
    let view = session.app.view(today);

    let page = CalendarPage::new(
        &view,
        default_event_date(view.cursor, today),
        flash.as_ref(),
        state.config().min_year,
        state.config().max_year,
    );
    Ok(Html(page.render()?))
}

/// POST /prev - Stays put on the first month of the configured range
async fn prev_month(State(state): State<ServerState>) -> Result<Redirect, AppError> {
    step(&state, Action::PrevMonth).await
}

/// POST /next - Stays put on the last month of the configured range
async fn next_month(State(state): State<ServerState>) -> Result<Redirect, AppError> {
    step(&state, Action::NextMonth).await
}

async fn step(state: &ServerState, action: Action) -> Result<Redirect, AppError> {
    let mut session = state.session().await;
    let cursor = session.app.cursor();
    let target = match action {
        Action::PrevMonth => cursor.prev(),
        _ => cursor.next(),
    };

    if state.config().check_year(target.year()).is_err() {
        tracing::debug!(%cursor, "Navigation stopped at year bound");
    } else {
        session.app.apply(action)?;
    }
    Ok(Redirect::to("/"))
}

/// POST /today
async fn go_today(State(state): State<ServerState>) -> Result<Redirect, AppError> {
    let today = state.today();
    navigate(&state, Action::GoToday(today)).await
}

#[derive(Deserialize)]
pub struct CursorForm {
    pub year: i32,
    pub month: u32,
}

/// POST /cursor - Jump to the month picked in the year/month inputs
async fn set_cursor(
    State(state): State<ServerState>,
    Form(form): Form<CursorForm>,
) -> Result<Redirect, AppError> {
    let cursor = picked_month(state.config(), form.year, form.month)?;
    navigate(&state, Action::SetCursor(cursor)).await
}

async fn navigate(state: &ServerState, action: Action) -> Result<Redirect, AppError> {
    state.session().await.app.apply(action)?;
    Ok(Redirect::to("/"))
}

#[derive(Deserialize)]
pub struct AddEventForm {
    pub date: String,
    #[serde(default)]
    pub title: String,
}

/// POST /events - Add an event; blank titles are dropped silently
async fn add_event(
    State(state): State<ServerState>,
    Form(form): Form<AddEventForm>,
) -> Result<Redirect, AppError> {
    let date = parse_date(&form.date)?;
    let mut session = state.session().await;

    match session.app.apply(Action::AddEvent {
        date,
        title: form.title,
    }) {
        Ok(Outcome::Added { date, title }) => {
            session.flash = Some(Flash::Success(format!("追加しました：{date}「{title}」")));
        }
        Ok(_) => {}
        Err(e @ CalError::Save { .. }) => session.flash = Some(save_failed(&e)),
        Err(e) => return Err(e.into()),
    }

    Ok(Redirect::to("/"))
}

#[derive(Deserialize)]
pub struct DeleteEventForm {
    pub date: String,
    pub index: usize,
}

/// POST /events/delete - Delete one row of the month's event list
async fn delete_event(
    State(state): State<ServerState>,
    Form(form): Form<DeleteEventForm>,
) -> Result<Redirect, AppError> {
    let date = parse_date(&form.date)?;
    let mut session = state.session().await;

    match session.app.apply(Action::DeleteEvent {
        date,
        index: form.index,
    }) {
        Ok(Outcome::Deleted { date, title }) => {
            session.flash = Some(Flash::Success(format!("削除しました：{date}「{title}」")));
        }
        Ok(_) => {}
        // Row already gone, e.g. deleted from another tab
        Err(CalError::InvalidIndex { date, index }) => {
            tracing::warn!(%date, index, "Delete of missing event");
            session.flash = Some(Flash::Error(format!("{NOT_FOUND_MESSAGE}：{date} #{index}")));
        }
        Err(e @ CalError::Save { .. }) => session.flash = Some(save_failed(&e)),
        Err(e) => return Err(e.into()),
    }

    Ok(Redirect::to("/"))
}

/// The session already rolled back, so the page keeps showing what is on disk.
fn save_failed(err: &CalError) -> Flash {
    tracing::error!(error = %err, "Event change not saved");
    Flash::Error(format!("{SAVE_FAILED_MESSAGE}：{err}"))
}
