use serde_json::{Map, Value};

use super::error::ExtractError;
use super::types::PositionRecord;

/// Deepest container nesting accepted by default. Matches the recursion
/// limit serde_json applies while parsing.
pub const DEFAULT_MAX_DEPTH: usize = 128;

const LATITUDE_KEYS: &[&str] = &["lat", "latitude"];
const LONGITUDE_KEYS: &[&str] = &["lon", "lng", "longitude"];
const ALTITUDE_KEYS: &[&str] = &["alt", "altitude"];
const ID_KEYS: &[&str] = &["id", "uuid"];

/// Collect every object in `root` that carries both a latitude-like and a
/// longitude-like key.
///
/// The walk is depth-first in document order. A matched object is not
/// descended into, so positions nested inside a position are not reported.
/// Any object or array nested deeper than `max_depth` aborts the walk with
/// [`ExtractError::DepthExceeded`].
pub fn extract_positions(
    root: &Value,
    max_depth: usize,
) -> Result<Vec<PositionRecord>, ExtractError> {
    let mut found = Vec::new();
    let mut stack: Vec<(&Value, usize)> = vec![(root, 0)];

    while let Some((node, depth)) = stack.pop() {
        match node {
            Value::Object(map) => {
                if depth > max_depth {
                    return Err(ExtractError::DepthExceeded { max_depth });
                }
                if is_position(map) {
                    found.push(to_record(map));
                    continue;
                }
                // Reversed so the first key is popped first.
                stack.extend(map.values().rev().map(|child| (child, depth + 1)));
            }
            Value::Array(items) => {
                if depth > max_depth {
                    return Err(ExtractError::DepthExceeded { max_depth });
                }
                stack.extend(items.iter().rev().map(|child| (child, depth + 1)));
            }
            _ => {}
        }
    }

    Ok(found)
}

fn is_position(map: &Map<String, Value>) -> bool {
    has_any(map, LATITUDE_KEYS) && has_any(map, LONGITUDE_KEYS)
}

fn has_any(map: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().any(|key| map.contains_key(*key))
}

/// First alias holding a non-null value.
fn first_present<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

/// Blank coordinate strings and null coordinates read as NaN rather than
/// zero, so they never produce a lookup at (0, 0).
fn to_record(map: &Map<String, Value>) -> PositionRecord {
    PositionRecord {
        id: first_present(map, ID_KEYS).and_then(coerce_id),
        lat: coerce_number(first_present(map, LATITUDE_KEYS)),
        lon: coerce_number(first_present(map, LONGITUDE_KEYS)),
        alt: first_present(map, ALTITUDE_KEYS).and_then(coerce_optional_number),
    }
}

fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(other) => coerce_optional_number(other).unwrap_or(f64::NAN),
        None => f64::NAN,
    }
}

fn coerce_optional_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn coerce_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
