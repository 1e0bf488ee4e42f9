//! JSON endpoints over the same session as the page

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get},
};
use serde::{Deserialize, Serialize};
use suncal_core::{Action, EventMap, MonthView, Outcome, render};

use crate::routes::{AppError, parse_date, picked_month};
use crate::state::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/month", get(month))
        .route("/api/events", get(list_events).post(create_event))
        .route("/api/events/{date}/{index}", delete(delete_event))
}

#[derive(Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /api/month?year=&month= - Grid and event list for a month
///
/// Without both parameters the session's displayed month is used. Asking for
/// a month does not move the session cursor.
async fn month(
    State(state): State<ServerState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthView>, AppError> {
    let today = state.today();
    let session = state.session().await;

    let cursor = match (query.year, query.month) {
        (Some(year), Some(month)) => picked_month(state.config(), year, month)?,
        _ => session.app.cursor(),
    };

    Ok(Json(render(cursor, today, session.app.events())))
}

/// GET /api/events - Every stored event
async fn list_events(State(state): State<ServerState>) -> Json<EventMap> {
    Json(state.session().await.app.events().clone())
}

/// Request body for creating an event
#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub date: String,
    pub title: String,
}

#[derive(Serialize)]
pub struct CreateEventResponse {
    /// False when the title was blank and nothing was stored.
    pub added: bool,
}

#[derive(Serialize)]
pub struct DeleteEventResponse {
    pub title: String,
}

/// POST /api/events - Add an event
async fn create_event(
    State(state): State<ServerState>,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<CreateEventResponse>, AppError> {
    let date = parse_date(&req.date)?;
    let outcome = state.session().await.app.apply(Action::AddEvent {
        date,
        title: req.title,
    })?;

    Ok(Json(CreateEventResponse {
        added: matches!(outcome, Outcome::Added { .. }),
    }))
}

/// DELETE /api/events/:date/:index - Remove one event
async fn delete_event(
    State(state): State<ServerState>,
    Path((date, index)): Path<(String, usize)>,
) -> Result<Json<DeleteEventResponse>, AppError> {
    let date = parse_date(&date)?;
    let outcome = state
        .session()
        .await
        .app
        .apply(Action::DeleteEvent { date, index })?;

    match outcome {
        Outcome::Deleted { title, .. } => Ok(Json(DeleteEventResponse { title })),
        other => Err(anyhow::anyhow!("Unexpected outcome for delete: {other:?}").into()),
    }
}
