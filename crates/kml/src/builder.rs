//! Feature to placemark conversion.
//!
//! Produces one shared [`Style`] per document and, per feature, either one
//! placemark per ring ([`HoleMode::Split`]) or a single placemark whose
//! polygon nests the holes as inner boundaries ([`HoleMode::Nested`]).
//! Every vertex and centroid is passed through the supplied [`Projector`].

use perimeter_common::{Feature, Ring};
use projection::Projector;
use serde::Deserialize;
use tracing::debug;

use crate::description::DescriptionSpec;
use crate::document::{
    Document, Geometry, Kml, LinearRing, Placemark, Point, PolygonGeometry, Style, KML_NAMESPACE,
};

/// How interior rings are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoleMode {
    /// Ring 0 and every hole become sibling placemarks.
    #[default]
    Split,
    /// Holes become `innerBoundaryIs` of the one polygon.
    Nested,
}

/// Style written once per document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StyleSpec {
    #[serde(default = "default_style_id")]
    pub id: String,
    #[serde(default = "default_line_color")]
    pub line_color: String,
    #[serde(default = "default_line_width")]
    pub line_width: f64,
}

fn default_style_id() -> String {
    "-1073741762".to_string()
}

fn default_line_color() -> String {
    "ffa9e600".to_string()
}

fn default_line_width() -> f64 {
    2.0
}

impl Default for StyleSpec {
    fn default() -> Self {
        Self {
            id: default_style_id(),
            line_color: default_line_color(),
            line_width: default_line_width(),
        }
    }
}

impl StyleSpec {
    fn to_style(&self) -> Style {
        Style {
            id: self.id.clone(),
            line_color: self.line_color.clone(),
            line_width: self.line_width,
            fill: false,
            outline: true,
        }
    }
}

/// Everything that varies between deployments of the document layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BuilderOptions {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Declare the KML 2.2 namespace on the root element.
    #[serde(default = "default_true")]
    pub namespace: bool,
    /// Attribute used as the placemark name.
    #[serde(default = "default_name_field")]
    pub name_field: String,
    /// Attribute used as the base of ring placemark ids.
    #[serde(default = "default_id_field")]
    pub id_field: Option<String>,
    #[serde(default)]
    pub holes: HoleMode,
    /// Emit a point placemark at each feature centroid.
    #[serde(default)]
    pub centroid_points: bool,
    #[serde(default)]
    pub style: StyleSpec,
    #[serde(default)]
    pub table: DescriptionSpec,
}

fn default_true() -> bool {
    true
}

fn default_name_field() -> String {
    "incident_name".to_string()
}

fn default_id_field() -> Option<String> {
    Some("OBJECTID".to_string())
}

impl Default for BuilderOptions {
    fn default() -> Self {
        Self {
            name: None,
            description: None,
            namespace: true,
            name_field: default_name_field(),
            id_field: default_id_field(),
            holes: HoleMode::default(),
            centroid_points: false,
            style: StyleSpec::default(),
            table: DescriptionSpec::default(),
        }
    }
}

/// Builds a [`Kml`] tree from decoded features.
pub struct DocumentBuilder<'a, P: Projector + ?Sized> {
    options: &'a BuilderOptions,
    projector: &'a P,
}

impl<'a, P: Projector + ?Sized> DocumentBuilder<'a, P> {
    pub fn new(options: &'a BuilderOptions, projector: &'a P) -> Self {
        Self { options, projector }
    }

    pub fn build(&self, features: &[Feature]) -> Kml {
        let style = self.options.style.to_style();
        let style_url = style.url();

        let mut placemarks = Vec::new();
        for feature in features {
            placemarks.extend(self.placemarks(feature, &style_url));
        }

        Kml {
            namespace: self.options.namespace.then(|| KML_NAMESPACE.to_string()),
            document: Document {
                name: self.options.name.clone(),
                description: self.options.description.clone(),
                styles: vec![style],
                placemarks,
            },
        }
    }

    /// Placemarks for one feature. Features without polygon geometry yield none.
    pub fn placemarks(&self, feature: &Feature, style_url: &str) -> Vec<Placemark> {
        let Some(polygon) = feature.polygon() else {
            debug!(
                name = %feature.attribute_text(&self.options.name_field),
                "Skipping feature without polygon geometry"
            );
            return Vec::new();
        };

        let name = feature.attribute_text(&self.options.name_field);
        let description = self.options.table.render(feature);
        let base_id = self
            .options
            .id_field
            .as_deref()
            .map(|field| feature.attribute_text(field))
            .filter(|id| !id.is_empty());

        let placemark = |id: Option<String>, name: String, geometry: Geometry| Placemark {
            id,
            name,
            visibility: true,
            style_url: Some(style_url.to_string()),
            description: Some(description.clone()),
            geometry,
        };

        let mut out = Vec::with_capacity(polygon.rings.len() + 1);
        let outer = self.linear_ring(&polygon.rings[0]);

        match self.options.holes {
            HoleMode::Split => {
                out.push(placemark(
                    None,
                    name.clone(),
                    Geometry::Polygon(PolygonGeometry::new(outer)),
                ));
                for (i, ring) in polygon.rings.iter().enumerate().skip(1) {
                    out.push(placemark(
                        base_id.as_ref().map(|id| format!("{}_{}", id, i)),
                        format!("{}_ring_{}", name, i),
                        Geometry::Polygon(PolygonGeometry::new(self.linear_ring(ring))),
                    ));
                }
            }
            HoleMode::Nested => {
                let mut geometry = PolygonGeometry::new(outer);
                geometry.inner = polygon
                    .holes()
                    .iter()
                    .map(|ring| self.linear_ring(ring))
                    .collect();
                out.push(placemark(None, name.clone(), Geometry::Polygon(geometry)));
            }
        }

        if self.options.centroid_points {
            if let Some(centroid) = feature.centroid {
                let (lon, lat) = self.projector.project(centroid.x, centroid.y);
                out.push(placemark(None, name, Geometry::Point(Point { lon, lat })));
            }
        }

        out
    }

    fn linear_ring(&self, ring: &Ring) -> LinearRing {
        LinearRing {
            coordinates: ring
                .iter()
                .map(|c| self.projector.project(c.x, c.y))
                .collect(),
        }
    }
}
