mod error;
mod extract;
mod tracks;
mod types;

pub use error::ExtractError;
pub use extract::{extract_positions, DEFAULT_MAX_DEPTH};
pub use tracks::{group_tracks, Track, TracksResponse};
pub use types::{CombinedResponse, EnrichedPosition, PositionRecord};
