use serde::Serialize;
use std::collections::HashMap;
use utoipa::ToSchema;

use super::types::{CombinedResponse, EnrichedPosition};

/// All records sharing one identifier, in the order they were aggregated.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Track {
    pub id: String,
    /// `[lat, lon]` pairs with finite coordinates only.
    #[schema(value_type = Vec<Vec<f64>>)]
    pub path: Vec<[f64; 2]>,
    pub points: usize,
    pub latest: Option<EnrichedPosition>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TracksResponse {
    pub timestamp: i64,
    pub count: usize,
    pub tracks: Vec<Track>,
}

impl From<CombinedResponse> for TracksResponse {
    fn from(combined: CombinedResponse) -> Self {
        let tracks = group_tracks(&combined.data);
        TracksResponse {
            timestamp: combined.timestamp,
            count: tracks.len(),
            tracks,
        }
    }
}

/// Group positions by identifier, falling back to `"lat,lon"` for
/// anonymous records. Tracks keep first-appearance order.
pub fn group_tracks(data: &[EnrichedPosition]) -> Vec<Track> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut grouped: Vec<(String, Vec<&EnrichedPosition>)> = Vec::new();

    for entry in data {
        let key = track_key(entry);
        match index.get(&key).copied() {
            Some(i) => grouped[i].1.push(entry),
            None => {
                index.insert(key.clone(), grouped.len());
                grouped.push((key, vec![entry]));
            }
        }
    }

    grouped
        .into_iter()
        .map(|(id, entries)| {
            let path = entries
                .iter()
                .filter(|e| e.position.has_finite_coordinates())
                .map(|e| [e.position.lat, e.position.lon])
                .collect();
            let latest = entries
                .last()
                .copied()
                .filter(|e| e.position.has_finite_coordinates())
                .cloned();
            Track {
                id,
                path,
                points: entries.len(),
                latest,
            }
        })
        .collect()
}

fn track_key(entry: &EnrichedPosition) -> String {
    match entry.position.id.as_deref() {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("{},{}", entry.position.lat, entry.position.lon),
    }
}
