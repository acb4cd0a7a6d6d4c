//! Feature service data model.
//!
//! Mirrors the JSON a feature-query endpoint returns with `f=json`:
//! a `features` array of `{attributes, geometry, centroid?}` objects plus
//! an optional top-level `spatialReference`. Ring vertices may carry Z/M
//! ordinates; only x/y are kept.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::crs::CrsCode;
use crate::error::PerimeterResult;

/// Attribute table of a single feature.
pub type Attributes = Map<String, Value>;

/// A 2D position in the source CRS.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Closed ordered sequence of vertices.
pub type Ring = Vec<Coord>;

/// Ring-based polygon. `rings[0]` is the outer boundary, the rest are holes.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "RawPolygon")]
pub struct Polygon {
    pub rings: Vec<Ring>,
}

#[derive(Deserialize)]
struct RawPolygon {
    #[serde(default)]
    rings: Vec<Vec<Vec<Option<f64>>>>,
}

impl From<RawPolygon> for Polygon {
    fn from(raw: RawPolygon) -> Self {
        let rings = raw
            .rings
            .into_iter()
            .map(|ring| {
                ring.into_iter()
                    .filter_map(|vertex| match vertex.as_slice() {
                        [Some(x), Some(y), ..] => Some(Coord::new(*x, *y)),
                        _ => None,
                    })
                    .collect()
            })
            .collect();
        Self { rings }
    }
}

impl Polygon {
    pub fn new(rings: Vec<Ring>) -> Self {
        Self { rings }
    }

    /// Outer boundary, if the polygon has any rings.
    pub fn outer(&self) -> Option<&Ring> {
        self.rings.first()
    }

    /// Interior rings (holes).
    pub fn holes(&self) -> &[Ring] {
        self.rings.get(1..).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }
}

/// A single feature returned by the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feature {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub attributes: Attributes,
    #[serde(default)]
    pub geometry: Option<Polygon>,
    #[serde(default)]
    pub centroid: Option<Coord>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Attributes, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Attributes>::deserialize(deserializer)?.unwrap_or_default())
}

impl Feature {
    /// Attribute value, treating JSON `null` the same as a missing key.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).filter(|v| !v.is_null())
    }

    /// Attribute rendered for display. Missing and null values render as "".
    pub fn attribute_text(&self, name: &str) -> String {
        self.attribute(name).map(render_scalar).unwrap_or_default()
    }

    /// Attribute as a number, if it is numeric.
    pub fn attribute_f64(&self, name: &str) -> Option<f64> {
        self.attribute(name).and_then(Value::as_f64)
    }

    /// Attribute as a number, also accepting numeric strings such as `"12"`.
    pub fn attribute_number(&self, name: &str) -> Option<f64> {
        match self.attribute(name)? {
            Value::String(s) => s.trim().parse().ok(),
            other => other.as_f64(),
        }
    }

    /// Attribute as a grouping key. Strings are used verbatim, other
    /// scalars by their display form.
    pub fn attribute_key(&self, name: &str) -> Option<String> {
        self.attribute(name).map(render_scalar)
    }

    /// Polygon geometry with at least one ring.
    pub fn polygon(&self) -> Option<&Polygon> {
        self.geometry.as_ref().filter(|p| !p.is_empty())
    }
}

/// Render a JSON scalar the way it should appear in a description table.
pub fn render_scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Spatial reference block of a feature service response.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialReference {
    #[serde(default)]
    pub wkid: Option<u32>,
    #[serde(default)]
    pub latest_wkid: Option<u32>,
}

impl SpatialReference {
    /// Resolve to a known CRS, preferring `latestWkid`.
    pub fn crs(&self) -> Option<CrsCode> {
        self.latest_wkid
            .and_then(CrsCode::from_wkid)
            .or_else(|| self.wkid.and_then(CrsCode::from_wkid))
    }
}

/// Decoded feature collection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSet {
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub spatial_reference: Option<SpatialReference>,
    /// Set by the service when the result was truncated at its record limit.
    #[serde(default)]
    pub exceeded_transfer_limit: bool,
}

impl FeatureSet {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            features,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// CRS the geometries are expressed in, if declared and known.
    pub fn source_crs(&self) -> Option<CrsCode> {
        self.spatial_reference.as_ref().and_then(SpatialReference::crs)
    }
}

/// Error object a feature service embeds in an otherwise successful response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceError {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub details: Vec<String>,
}

/// Full response body: either an error object or a feature set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceResponse {
    #[serde(default)]
    pub error: Option<ServiceError>,
    #[serde(flatten)]
    pub feature_set: FeatureSet,
}

impl ServiceResponse {
    pub fn from_json(body: &str) -> PerimeterResult<Self> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn into_result(self) -> Result<FeatureSet, ServiceError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.feature_set),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_feature_with_holes_and_z_values() {
        let feature: Feature = serde_json::from_value(json!({
            "attributes": {"mission": "CA-TEST-01", "OBJECTID": 7},
            "geometry": {"rings": [
                [[0.0, 0.0, 12.0], [10.0, 0.0, 12.0], [10.0, 10.0], [0.0, 0.0]],
                [[2.0, 2.0], [3.0, 2.0], [2.0, 2.0]]
            ]}
        }))
        .unwrap();

        let polygon = feature.polygon().unwrap();
        assert_eq!(polygon.rings.len(), 2);
        assert_eq!(polygon.outer().unwrap()[2], Coord::new(10.0, 10.0));
        assert_eq!(polygon.holes().len(), 1);
        assert!(feature.centroid.is_none());
    }

    #[test]
    fn test_null_z_and_m_values_are_ignored() {
        let response = ServiceResponse::from_json(
            r#"{"features": [{"attributes": {"OBJECTID": 1},
                "geometry": {"hasZ": true, "rings": [[[0.0, 0.0, null], [1.0, 0.0, null, null], [0.0, 0.0, null]]]}}]}"#,
        )
        .unwrap();
        let set = response.into_result().unwrap();
        let polygon = set.features[0].polygon().unwrap();
        assert_eq!(
            polygon.rings[0],
            vec![Coord::new(0.0, 0.0), Coord::new(1.0, 0.0), Coord::new(0.0, 0.0)]
        );
    }

    #[test]
    fn test_vertices_with_null_x_or_y_are_dropped() {
        let polygon: Polygon = serde_json::from_value(json!({
            "rings": [[[null, 1.0], [1.0, 2.0], [3.0, null, 5.0]]]
        }))
        .unwrap();
        assert_eq!(polygon.rings[0], vec![Coord::new(1.0, 2.0)]);
    }

    #[test]
    fn test_short_vertices_are_dropped() {
        let polygon: Polygon =
            serde_json::from_value(json!({"rings": [[[1.0], [1.0, 2.0]]]})).unwrap();
        assert_eq!(polygon.rings[0], vec![Coord::new(1.0, 2.0)]);
    }

    #[test]
    fn test_null_geometry_and_attributes() {
        let feature: Feature =
            serde_json::from_value(json!({"attributes": null, "geometry": null})).unwrap();
        assert!(feature.attributes.is_empty());
        assert!(feature.polygon().is_none());

        let empty: Feature = serde_json::from_value(json!({"geometry": {"rings": []}})).unwrap();
        assert!(empty.polygon().is_none());
    }

    #[test]
    fn test_attribute_rendering() {
        let feature: Feature = serde_json::from_value(json!({
            "attributes": {
                "name": "Park Fire",
                "acres": 1250.5,
                "count": 3,
                "active": true,
                "notes": null
            }
        }))
        .unwrap();

        assert_eq!(feature.attribute_text("name"), "Park Fire");
        assert_eq!(feature.attribute_text("acres"), "1250.5");
        assert_eq!(feature.attribute_text("count"), "3");
        assert_eq!(feature.attribute_text("active"), "true");
        assert_eq!(feature.attribute_text("notes"), "");
        assert_eq!(feature.attribute_text("missing"), "");
        assert_eq!(feature.attribute_f64("count"), Some(3.0));
        assert_eq!(feature.attribute_f64("name"), None);
        assert_eq!(feature.attribute_key("notes"), None);
        assert_eq!(feature.attribute_key("count"), Some("3".to_string()));
    }

    #[test]
    fn test_attribute_number_accepts_numeric_strings() {
        let feature: Feature = serde_json::from_value(json!({
            "attributes": {"a": 12, "b": " 13 ", "c": "12.5", "d": "n/a", "e": null, "f": true}
        }))
        .unwrap();
        assert_eq!(feature.attribute_number("a"), Some(12.0));
        assert_eq!(feature.attribute_number("b"), Some(13.0));
        assert_eq!(feature.attribute_number("c"), Some(12.5));
        assert_eq!(feature.attribute_number("d"), None);
        assert_eq!(feature.attribute_number("e"), None);
        assert_eq!(feature.attribute_number("f"), None);
        assert_eq!(feature.attribute_number("missing"), None);
    }

    #[test]
    fn test_service_response_with_error() {
        let response = ServiceResponse::from_json(
            r#"{"error": {"code": 400, "message": "Invalid query parameters", "details": []}}"#,
        )
        .unwrap();

        let error = response.into_result().unwrap_err();
        assert_eq!(error.code, 400);
        assert_eq!(error.message, "Invalid query parameters");
    }

    #[test]
    fn test_service_response_with_features() {
        let response = ServiceResponse::from_json(
            r#"{
                "spatialReference": {"wkid": 102100, "latestWkid": 3857},
                "exceededTransferLimit": true,
                "features": [{"attributes": {"OBJECTID": 1}, "geometry": {"rings": []}}]
            }"#,
        )
        .unwrap();

        let set = response.into_result().unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.exceeded_transfer_limit);
        assert_eq!(set.source_crs(), Some(CrsCode::Epsg3857));
    }

    #[test]
    fn test_unknown_latest_wkid_falls_back_to_wkid() {
        let sr = SpatialReference {
            wkid: Some(4269),
            latest_wkid: Some(999_999),
        };
        assert_eq!(sr.crs(), Some(CrsCode::Epsg4269));
    }
}
