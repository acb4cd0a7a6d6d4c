//! Canned feature service responses.
//!
//! Payloads follow the shape a feature-query endpoint returns with `f=json`.
//! Coordinates are plain lon/lat so expected KML coordinate text can be
//! read straight off the fixture.

/// Two features with distinct missions: one single-ring perimeter and one
/// perimeter with a single hole. Three rings in total.
pub const TWO_FEATURES: &str = r#"{
  "objectIdFieldName": "OBJECTID",
  "geometryType": "esriGeometryPolygon",
  "spatialReference": {"wkid": 4269, "latestWkid": 4269},
  "features": [
    {
      "attributes": {
        "OBJECTID": 101,
        "mission": "CA-BTU-001-20240725",
        "incident_name": "Park",
        "incident_number": "CA-BTU-009145",
        "source": "CAL FIRE INTEL FLIGHT DATA",
        "area_acres": 1250.5,
        "poly_DateCurrent": 1720000000000,
        "description": "IR flight"
      },
      "geometry": {
        "rings": [[[-121.5, 39.5], [-121.25, 39.5], [-121.25, 39.75], [-121.5, 39.5]]]
      },
      "centroid": {"x": -121.3, "y": 39.6}
    },
    {
      "attributes": {
        "OBJECTID": 102,
        "mission": "CA-LNU-002-20240725",
        "incident_name": "Creek",
        "source": "CAL FIRE INTEL FLIGHT DATA",
        "area_acres": 80,
        "poly_DateCurrent": 1704067200000,
        "description": null
      },
      "geometry": {
        "rings": [
          [[-122.5, 38.5], [-122.0, 38.5], [-122.0, 39.0], [-122.5, 39.0], [-122.5, 38.5]],
          [[-122.375, 38.625], [-122.25, 38.625], [-122.25, 38.75], [-122.375, 38.625]]
        ]
      },
      "centroid": {"x": -122.25, "y": 38.75}
    }
  ]
}"#;

/// Three observations of one mission plus one feature missing its key.
/// The highest OBJECTID for `CA-SHU-003` is 12.
pub const DUPLICATE_MISSIONS: &str = r#"{
  "features": [
    {"attributes": {"OBJECTID": 10, "mission": "CA-SHU-003", "incident_name": "Ridge"},
     "geometry": {"rings": [[[0.0, 0.0], [1.0, 0.0], [0.0, 0.0]]]}},
    {"attributes": {"OBJECTID": 12, "mission": "CA-SHU-003", "incident_name": "Ridge"},
     "geometry": {"rings": [[[0.0, 0.0], [2.0, 0.0], [0.0, 0.0]]]}},
    {"attributes": {"OBJECTID": 11, "mission": "CA-SHU-003", "incident_name": "Ridge"},
     "geometry": {"rings": [[[0.0, 0.0], [3.0, 0.0], [0.0, 0.0]]]}},
    {"attributes": {"OBJECTID": 13, "mission": null, "incident_name": "Orphan"},
     "geometry": {"rings": [[[0.0, 0.0], [4.0, 0.0], [0.0, 0.0]]]}}
  ]
}"#;

/// A service-level error delivered with HTTP 200.
pub const SERVICE_ERROR: &str = r#"{
  "error": {
    "code": 400,
    "message": "Unable to complete operation.",
    "details": ["'where' parameter is invalid"]
  }
}"#;

/// A successful response with no features.
pub const EMPTY: &str = r#"{"features": []}"#;

/// One feature in Web Mercator (ESRI wkid 102100).
pub const WEB_MERCATOR: &str = r#"{
  "spatialReference": {"wkid": 102100, "latestWkid": 3857},
  "features": [
    {
      "attributes": {"OBJECTID": 1, "mission": "M-1", "incident_name": "Origin"},
      "geometry": {"rings": [[[0.0, 0.0], [10018754.171394622, 0.0], [0.0, 0.0]]]}
    }
  ]
}"#;
