//! services/api/src/web/calendar.rs
//!
//! Calendar endpoints. Every view is rebuilt from the current document
//! collection on each request.

use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use scando_core::calendar::{self, AgendaEntry};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Agenda<'a> {
    date: NaiveDate,
    tasks: Vec<AgendaEntry<'a>>,
}

async fn agenda_for(
    app_state: &AppState,
    date: NaiveDate,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    app_state
        .organizer
        .read(|store| {
            serde_json::to_value(Agenda {
                date,
                tasks: calendar::tasks_for_date(store.documents(), date).collect(),
            })
        })
        .await
        .map(Json)
        .map_err(|e| {
            error!("Failed to serialize agenda for {}: {:?}", date, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to build agenda".to_string(),
            )
        })
}

/// Tasks due today, by the server's local date.
#[utoipa::path(
    get,
    path = "/calendar/today",
    responses((status = 200, description = "Today's tasks tagged with their documents"))
)]
pub async fn today_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    agenda_for(&app_state, chrono::Local::now().date_naive()).await
}

/// Tasks due on a given date.
#[utoipa::path(
    get,
    path = "/calendar/{date}",
    params(("date" = String, Path, description = "Date as YYYY-MM-DD")),
    responses(
        (status = 200, description = "Tasks due on the date, tagged with their documents"),
        (status = 400, description = "Malformed date")
    )
)]
pub async fn date_handler(
    State(app_state): State<Arc<AppState>>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    agenda_for(&app_state, date).await
}

/// Per-day indicators for a month grid.
#[utoipa::path(
    get,
    path = "/calendar/{year}/{month}",
    params(
        ("year" = i32, Path, description = "Calendar year"),
        ("month" = u32, Path, description = "Month, 1 through 12")
    ),
    responses(
        (status = 200, description = "Month overview"),
        (status = 404, description = "Invalid month")
    )
)]
pub async fn month_handler(
    State(app_state): State<Arc<AppState>>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<calendar::MonthOverview>, (StatusCode, String)> {
    app_state
        .organizer
        .read(|store| calendar::month_overview(store.documents(), year, month))
        .await
        .map(Json)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("{}-{:02} is not a valid month", year, month),
            )
        })
}
