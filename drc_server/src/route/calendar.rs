use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{Days, Weekday};
use drc_core::{garbage_calendar, ical::generator::Emitter, schedule::CollectionScheduler};
use serde::Deserialize;

use crate::{route::error_response, state::AppState};

#[derive(Debug, Clone, Deserialize)]
pub struct QueryParams {
    address: String,
    weekday: Weekday,
}

/// Handle calendar requests.
///
/// The `address` and `weekday` must be given in the query string.
pub async fn handler(
    State(state): State<Arc<AppState>>,
    Query(query_params): Query<QueryParams>,
) -> Result<Response, (StatusCode, String)> {
    let rules = state.rules.current();
    let scheduler = CollectionScheduler::new(query_params.weekday, &rules);
    let start = (state.today)();
    let Some(end) = start.checked_add_days(Days::new(state.days_ahead)) else {
        log::warn!("a calendar of {} days from {start} is not representable", state.days_ahead);
        return Err((
            StatusCode::BAD_REQUEST,
            String::from("the calendar ends after the last representable date"),
        ));
    };
    let ical_calendar = garbage_calendar::get(&query_params.address, &scheduler, start, end)
        .map_err(error_response)?;
    let response = ([(CONTENT_TYPE, "text/calendar")], ical_calendar.generate()).into_response();
    Ok(response)
}
