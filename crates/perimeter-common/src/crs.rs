//! Coordinate Reference System codes understood by the perimeter pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{PerimeterError, PerimeterResult};

/// Well-known CRS codes the feature service is expected to answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lon/lat in degrees)
    Epsg4326,
    /// NAD83 Geographic
    Epsg4269,
    /// Web Mercator (meters)
    Epsg3857,
}

impl CrsCode {
    /// Parse a CRS string from configuration.
    ///
    /// Accepts formats like:
    /// - "EPSG:4326"
    /// - "epsg:4269"
    /// - "CRS:84" (equivalent to EPSG:4326)
    pub fn from_epsg_string(s: &str) -> PerimeterResult<Self> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "EPSG:4326" | "CRS:84" => Ok(CrsCode::Epsg4326),
            "EPSG:4269" => Ok(CrsCode::Epsg4269),
            "EPSG:3857" | "EPSG:900913" | "EPSG:102100" => Ok(CrsCode::Epsg3857),
            _ => Err(PerimeterError::InvalidCrs(s.to_string())),
        }
    }

    /// Map a well-known ID as reported in a feature service `spatialReference`.
    ///
    /// ESRI reports Web Mercator under several legacy IDs.
    pub fn from_wkid(wkid: u32) -> Option<Self> {
        match wkid {
            4326 => Some(CrsCode::Epsg4326),
            4269 => Some(CrsCode::Epsg4269),
            3857 | 102100 | 102113 | 900913 => Some(CrsCode::Epsg3857),
            _ => None,
        }
    }

    /// Check if this is a geographic (lon/lat) CRS.
    pub fn is_geographic(&self) -> bool {
        matches!(self, CrsCode::Epsg4326 | CrsCode::Epsg4269)
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            CrsCode::Epsg4326 => "EPSG:4326",
            CrsCode::Epsg4269 => "EPSG:4269",
            CrsCode::Epsg3857 => "EPSG:3857",
        };
        write!(f, "{}", code)
    }
}
