//! Shared test utilities for the fire perimeter workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Canned feature service responses
//! - Feature and ring generators
//! - Approximate float assertions for projected coordinates
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, square_ring};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

/// Assert two numbers differ by at most `epsilon`.
///
/// Both sides are widened to `f64`, so integer and `f32` literals work too.
///
/// ```
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(-121.49440001, -121.4944, 1e-6);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr, $epsilon:expr) => {{
        let actual = $actual as f64;
        let expected = $expected as f64;
        let epsilon = $epsilon as f64;
        let diff = (actual - expected).abs();
        assert!(
            diff <= epsilon,
            "{} = {} is not within {} of {} (off by {})",
            stringify!($actual),
            actual,
            epsilon,
            expected,
            diff
        );
    }};
}

/// Assert a projected `(lon, lat)` or `(x, y)` pair is within `epsilon` of
/// the expected pair on both axes.
///
/// ```
/// use test_utils::assert_coords_approx_eq;
///
/// let projected = (-120.0000001, 38.5);
/// assert_coords_approx_eq!(projected, (-120.0, 38.5), 1e-6);
/// ```
#[macro_export]
macro_rules! assert_coords_approx_eq {
    ($actual:expr, $expected:expr, $epsilon:expr) => {{
        let (ax, ay): (f64, f64) = $actual;
        let (ex, ey): (f64, f64) = $expected;
        $crate::assert_approx_eq!(ax, ex, $epsilon);
        $crate::assert_approx_eq!(ay, ey, $epsilon);
    }};
}
