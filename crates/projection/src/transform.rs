//! Point transforms between the supported CRS codes.

use perimeter_common::CrsCode;

use crate::mercator;

/// Maps a source-CRS position to an output-CRS position.
///
/// Implementations must be pure: the same input always yields the same
/// output and nothing else is touched.
pub trait Projector {
    fn project(&self, x: f64, y: f64) -> (f64, f64);
}

impl<F> Projector for F
where
    F: Fn(f64, f64) -> (f64, f64),
{
    fn project(&self, x: f64, y: f64) -> (f64, f64) {
        self(x, y)
    }
}

/// Passes coordinates through untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

impl Projector for Identity {
    fn project(&self, x: f64, y: f64) -> (f64, f64) {
        (x, y)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("Unsupported transform from {from} to {to}")]
    Unsupported { from: CrsCode, to: CrsCode },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    None,
    MercatorToGeographic,
    GeographicToMercator,
}

/// Transform between two supported CRS codes.
///
/// NAD83 and WGS84 are treated as coincident; the datum shift across the
/// continental US is on the order of a meter, well under the precision of
/// the perimeter data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrsTransform {
    pub from: CrsCode,
    pub to: CrsCode,
    step: Step,
}

impl CrsTransform {
    pub fn new(from: CrsCode, to: CrsCode) -> Result<Self, ProjectionError> {
        let step = match (from.is_geographic(), to.is_geographic()) {
            (true, true) => Step::None,
            (false, true) => Step::MercatorToGeographic,
            (true, false) => Step::GeographicToMercator,
            (false, false) if from == to => Step::None,
            (false, false) => return Err(ProjectionError::Unsupported { from, to }),
        };
        Ok(Self { from, to, step })
    }

    /// True when no arithmetic is applied to coordinates.
    pub fn is_identity(&self) -> bool {
        self.step == Step::None
    }
}

impl Projector for CrsTransform {
    fn project(&self, x: f64, y: f64) -> (f64, f64) {
        match self.step {
            Step::None => (x, y),
            Step::MercatorToGeographic => mercator::to_geographic(x, y),
            Step::GeographicToMercator => mercator::from_geographic(x, y),
        }
    }
}
