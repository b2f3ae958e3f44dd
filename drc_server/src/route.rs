pub mod calendar;
pub mod next;

use axum::http::StatusCode;
use drc_core::error::ScheduleError;

/// Map a failed schedule computation to a response.
fn error_response(err: anyhow::Error) -> (StatusCode, String) {
    let status = match err.downcast_ref::<ScheduleError>() {
        Some(ScheduleError::NotFound { .. }) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    log::warn!("{status}: {err:#}");
    (status, err.to_string())
}
