//! KML document tree.
//!
//! Only the subset of KML 2.2 the perimeter output needs: one `Document`
//! holding shared `Style`s and `Placemark`s, each placemark carrying
//! exactly one `Point` or `Polygon`.

/// KML 2.2 namespace URI.
pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

/// Altitude mode written on every geometry.
pub const ALTITUDE_MODE: &str = "clampToGround";

/// Root `kml` element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kml {
    /// `xmlns` declaration on the root, if any.
    pub namespace: Option<String>,
    pub document: Document,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub name: Option<String>,
    pub description: Option<String>,
    pub styles: Vec<Style>,
    pub placemarks: Vec<Placemark>,
}

/// Shared line/polygon style referenced by placemarks through `#id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub id: String,
    /// `aabbggrr` hex color.
    pub line_color: String,
    pub line_width: f64,
    pub fill: bool,
    pub outline: bool,
}

impl Style {
    /// Value for a placemark `styleUrl` pointing at this style.
    pub fn url(&self) -> String {
        format!("#{}", self.id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placemark {
    /// XML `id` attribute.
    pub id: Option<String>,
    pub name: String,
    pub visibility: bool,
    pub style_url: Option<String>,
    /// HTML fragment, already wrapped in a CDATA literal when requested.
    pub description: Option<String>,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Point),
    Polygon(PolygonGeometry),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PolygonGeometry {
    pub extrude: bool,
    pub outer: LinearRing,
    pub inner: Vec<LinearRing>,
}

impl PolygonGeometry {
    pub fn new(outer: LinearRing) -> Self {
        Self {
            extrude: false,
            outer,
            inner: Vec::new(),
        }
    }
}

/// Ring of lon/lat positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearRing {
    pub coordinates: Vec<(f64, f64)>,
}

impl LinearRing {
    /// `lon,lat,0` tuples joined by single spaces, in vertex order.
    pub fn coordinates_text(&self) -> String {
        self.coordinates
            .iter()
            .map(|&(lon, lat)| coordinate_tuple(lon, lat))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A single `lon,lat,0` tuple. Altitude is always zero.
pub fn coordinate_tuple(lon: f64, lat: f64) -> String {
    format!("{},{},0", lon, lat)
}

impl Kml {
    pub fn placemark_count(&self) -> usize {
        self.document.placemarks.len()
    }
}
