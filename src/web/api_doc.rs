use utoipa::OpenApi;

use crate::positions::{CombinedResponse, EnrichedPosition, PositionRecord, Track, TracksResponse};

use super::api::error::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::combined::combined,
        super::api::combined::tracks,
    ),
    components(
        schemas(
            CombinedResponse,
            EnrichedPosition,
            PositionRecord,
            TracksResponse,
            Track,
            ErrorResponse,
        )
    ),
    info(
        title = "Treasure Atlas API",
        description = "Balloon positions from the hourly treasure feed, enriched with current weather",
        version = "0.1.0"
    ),
    tags(
        (name = "positions", description = "Aggregated balloon positions")
    )
)]
pub struct ApiDoc;
