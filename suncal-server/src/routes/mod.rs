pub mod api;
pub mod page;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Serialize;
use suncal_core::{CalError, CalResult, SuncalConfig, YearMonth};

use crate::state::ServerState;

/// All routes, with state attached.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(page::router())
        .merge(api::router())
        .with_state(state)
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert errors to HTTP responses
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        match self.0.downcast_ref::<CalError>() {
            Some(CalError::InvalidIndex { .. }) => StatusCode::NOT_FOUND,
            Some(
                CalError::InvalidMonth(_)
                | CalError::InvalidDate(_)
                | CalError::YearOutOfRange { .. },
            ) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

fn parse_date(s: &str) -> CalResult<NaiveDate> {
    s.trim()
        .parse()
        .map_err(|_| CalError::InvalidDate(format!("'{s}' (expected YYYY-MM-DD)")))
}

/// A month picked by the user, checked against the configured year range.
fn picked_month(config: &SuncalConfig, year: i32, month: u32) -> CalResult<YearMonth> {
    config.check_year(year)?;
    YearMonth::new(year, month)
}
