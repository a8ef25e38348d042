//! Errors at the interchange boundary.
//!
//! Everything past decoding is infallible: malformed rings and stale
//! indexes are skipped and logged instead of raised.

use crate::model::{Geometry, LngLat};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    #[error("position needs at least 2 components, got {0}")]
    ShortPosition(usize),
    #[error("invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a GeoJSON object or array of objects, got {0}")]
    UnexpectedValue(&'static str),
}

fn value_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decode host input into top-level geometries.
///
/// Accepts a single GeoJSON object or an array of them. A malformed entry
/// in an array is logged and skipped so one bad geometry never blocks the
/// rest of the collection.
///
/// # Errors
/// Returns an error when the text is not JSON, or is neither an object nor
/// an array, or when a single top-level object fails to decode.
pub fn parse_geometries(text: &str) -> Result<Vec<Geometry<LngLat>>, GeometryError> {
    let value: Value = serde_json::from_str(text)?;
    match value {
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .filter_map(|(i, item)| match serde_json::from_value(item) {
                Ok(g) => Some(g),
                Err(e) => {
                    log::warn!("skipping geometry #{i}: {e}");
                    None
                }
            })
            .collect()),
        Value::Object(_) => Ok(vec![serde_json::from_value(value)?]),
        other => Err(GeometryError::UnexpectedValue(value_kind(&other))),
    }
}
