//! Common types and utilities shared across the fire perimeter crates.

pub mod crs;
pub mod error;
pub mod feature;
pub mod time;

pub use crs::CrsCode;
pub use error::{PerimeterError, PerimeterResult};
pub use feature::{
    Attributes, Coord, Feature, FeatureSet, Polygon, Ring, ServiceError, ServiceResponse,
    SpatialReference,
};
pub use time::{format_date, format_epoch_millis, FormattedDate};
