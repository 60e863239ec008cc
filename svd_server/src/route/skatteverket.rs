use axum::{
    extract::{Query, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use svd_core::{calendar, options::Options};

use crate::AppState;

static FETCH_FAILED: &str = "Failed to fetch data from Skatteverket";

/// Handle company calendar requests.
///
/// Invalid query parameters are rejected by the `Query` extractor, any failure to get the dates
/// results in a generic error without details of the upstream response.
pub async fn company_handler(
    State(state): State<AppState>,
    Query(options): Query<Options>,
) -> Result<Response, (StatusCode, &'static str)> {
    let calendar = calendar::get(&state.client, &options)
        .await
        .map_err(|err| {
            tracing::error!(
                error = ?err,
                unavailable = err.is_unavailable(),
                malformed = err.is_malformed(),
                "could not build calendar"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, FETCH_FAILED)
        })?;
    let response = ([(CONTENT_TYPE, "text/calendar")], calendar.generate()).into_response();
    Ok(response)
}
