use axum::{extract::State, Json};

use crate::positions::{CombinedResponse, TracksResponse};
use crate::web::api::error::{ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/api/combined",
    tag = "positions",
    responses(
        (status = 200, description = "Positions from the last 24 hours with current weather", body = CombinedResponse),
        (status = 500, description = "Unexpected internal failure", body = ErrorResponse)
    )
)]
pub async fn combined(State(state): State<AppState>) -> ApiResult<Json<CombinedResponse>> {
    let response = state.aggregator.combine().await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/tracks",
    tag = "positions",
    responses(
        (status = 200, description = "Positions grouped into one track per identifier", body = TracksResponse),
        (status = 500, description = "Unexpected internal failure", body = ErrorResponse)
    )
)]
pub async fn tracks(State(state): State<AppState>) -> ApiResult<Json<TracksResponse>> {
    let combined = state.aggregator.combine().await?;
    Ok(Json(TracksResponse::from(combined)))
}
