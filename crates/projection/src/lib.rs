//! Coordinate reference system transformations.
//!
//! Implements the handful of projections the feature services answer in,
//! from scratch without external dependencies.

pub mod mercator;
pub mod transform;

pub use transform::{CrsTransform, Identity, ProjectionError, Projector};
