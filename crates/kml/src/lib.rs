//! KML output for fire perimeter features.
//!
//! - [`document`]: the `kml > Document > Style | Placemark` tree
//! - [`description`]: HTML attribute tables used as placemark popups
//! - [`builder`]: feature-to-placemark conversion
//! - [`writer`]: XML serialization and the post-serialization unescape pass

pub mod builder;
pub mod description;
pub mod document;
pub mod error;
pub mod writer;

pub use builder::{BuilderOptions, DocumentBuilder, HoleMode, StyleSpec};
pub use description::{DescriptionSpec, FieldFormat, LinkSpec, RowSpec};
pub use document::{Document, Geometry, Kml, LinearRing, Placemark, Point, PolygonGeometry, Style};
pub use error::KmlError;
pub use writer::{render, to_xml, unescape};
