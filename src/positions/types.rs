use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::feed::HourCode;

/// A single latitude/longitude hit found in a feed document.
///
/// `lat` and `lon` may be non-finite when the source value could not be
/// read as a number; such values serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PositionRecord {
    pub id: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub alt: Option<f64>,
}

impl PositionRecord {
    pub fn has_finite_coordinates(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// A position tagged with the hour it came from and the weather at its
/// coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EnrichedPosition {
    #[schema(value_type = String, example = "00")]
    pub hour: HourCode,
    #[serde(flatten)]
    pub position: PositionRecord,
    /// Upstream `current_weather` object, passed through untouched.
    #[schema(value_type = Option<Object>)]
    pub weather: Option<Value>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CombinedResponse {
    /// Milliseconds since the Unix epoch at assembly time.
    pub timestamp: i64,
    pub count: usize,
    pub data: Vec<EnrichedPosition>,
}

impl CombinedResponse {
    pub fn assemble(data: Vec<EnrichedPosition>) -> Self {
        CombinedResponse {
            timestamp: chrono::Utc::now().timestamp_millis(),
            count: data.len(),
            data,
        }
    }
}
