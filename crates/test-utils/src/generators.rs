//! Feature generators for building synthetic service responses.
//!
//! These produce `serde_json::Value`s in the feature service wire shape so
//! tests exercise the same decode path as live responses.

use serde_json::{json, Value};

/// Closed axis-aligned square ring starting at `(x, y)`.
///
/// ```
/// use test_utils::square_ring;
///
/// let ring = square_ring(0.0, 0.0, 1.0);
/// assert_eq!(ring.as_array().unwrap().len(), 5);
/// ```
pub fn square_ring(x: f64, y: f64, size: f64) -> Value {
    json!([
        [x, y],
        [x + size, y],
        [x + size, y + size],
        [x, y + size],
        [x, y]
    ])
}

/// A feature with the given attributes and rings.
pub fn feature_json(attributes: Value, rings: Vec<Value>) -> Value {
    json!({
        "attributes": attributes,
        "geometry": {"rings": rings}
    })
}

/// A single-ring feature identified by mission and OBJECTID.
pub fn mission_feature(mission: &str, object_id: i64) -> Value {
    feature_json(
        json!({
            "OBJECTID": object_id,
            "mission": mission,
            "incident_name": format!("{} fire", mission)
        }),
        vec![square_ring(-120.0, 38.0, 0.5)],
    )
}

/// Wrap features in a response body.
pub fn feature_collection(features: Vec<Value>) -> Value {
    json!({ "features": features })
}
