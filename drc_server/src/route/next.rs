use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Weekday;
use drc_core::schedule::{Collection, CollectionScheduler};
use serde::Deserialize;

use crate::{route::error_response, state::AppState};

#[derive(Debug, Clone, Deserialize)]
pub struct QueryParams {
    weekday: Weekday,
}

/// Handle requests for the next collection.
///
/// The `weekday` must be given in the query string.
pub async fn handler(
    State(state): State<Arc<AppState>>,
    Query(query_params): Query<QueryParams>,
) -> Result<Json<Collection>, (StatusCode, String)> {
    let rules = state.rules.current();
    let scheduler = CollectionScheduler::new(query_params.weekday, &rules);
    let collection = scheduler
        .next_collection((state.today)())
        .map_err(|err| error_response(err.into()))?;
    Ok(Json(collection))
}
