//! KML serialization.
//!
//! Text nodes are escaped for `<`, `>` and `&` only. Descriptions hold raw
//! HTML (optionally inside a CDATA literal), so after serialization the whole
//! document goes through [`unescape`], which turns `&lt;`, `&gt;` and `&amp;`
//! back into literal characters everywhere. The pass is deliberately blunt:
//! any other text containing those characters (a placemark name such as
//! `A & B`) comes out unescaped as well.

use std::borrow::Cow;

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::document::{Geometry, Kml, LinearRing, Placemark, Style, ALTITUDE_MODE};
use crate::error::KmlError;

type XmlWriter = Writer<Vec<u8>>;

/// Serialize and unescape: the text that gets written to disk.
pub fn render(kml: &Kml) -> Result<String, KmlError> {
    Ok(unescape(&to_xml(kml)?))
}

/// Reverse `&lt;`, `&gt;` and `&amp;` across the whole text, in that order.
pub fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Serialize the tree with an XML declaration, before unescaping.
pub fn to_xml(kml: &Kml) -> Result<String, KmlError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("kml");
    if let Some(ns) = &kml.namespace {
        root.push_attribute(("xmlns", ns.as_str()));
    }
    writer.write_event(Event::Start(root))?;

    start(&mut writer, "Document")?;
    if let Some(name) = &kml.document.name {
        text_element(&mut writer, "name", name)?;
    }
    if let Some(description) = &kml.document.description {
        text_element(&mut writer, "description", description)?;
    }
    for style in &kml.document.styles {
        write_style(&mut writer, style)?;
    }
    for placemark in &kml.document.placemarks {
        write_placemark(&mut writer, placemark)?;
    }
    end(&mut writer, "Document")?;
    end(&mut writer, "kml")?;

    Ok(String::from_utf8(writer.into_inner())?)
}

fn write_style(w: &mut XmlWriter, style: &Style) -> Result<(), KmlError> {
    let mut el = BytesStart::new("Style");
    el.push_attribute(("id", style.id.as_str()));
    w.write_event(Event::Start(el))?;

    start(w, "LineStyle")?;
    text_element(w, "color", &style.line_color)?;
    text_element(w, "width", &style.line_width.to_string())?;
    end(w, "LineStyle")?;

    start(w, "PolyStyle")?;
    text_element(w, "fill", bool_text(style.fill))?;
    text_element(w, "outline", bool_text(style.outline))?;
    end(w, "PolyStyle")?;

    end(w, "Style")
}

fn write_placemark(w: &mut XmlWriter, placemark: &Placemark) -> Result<(), KmlError> {
    let mut el = BytesStart::new("Placemark");
    if let Some(id) = &placemark.id {
        el.push_attribute(("id", id.as_str()));
    }
    w.write_event(Event::Start(el))?;

    text_element(w, "name", &placemark.name)?;
    text_element(w, "visibility", bool_text(placemark.visibility))?;
    if let Some(url) = &placemark.style_url {
        text_element(w, "styleUrl", url)?;
    }
    if let Some(description) = &placemark.description {
        text_element(w, "description", description)?;
    }

    match &placemark.geometry {
        Geometry::Point(point) => {
            start(w, "Point")?;
            text_element(w, "altitudeMode", ALTITUDE_MODE)?;
            text_element(
                w,
                "coordinates",
                &crate::document::coordinate_tuple(point.lon, point.lat),
            )?;
            end(w, "Point")?;
        }
        Geometry::Polygon(polygon) => {
            start(w, "Polygon")?;
            text_element(w, "extrude", if polygon.extrude { "1" } else { "0" })?;
            text_element(w, "altitudeMode", ALTITUDE_MODE)?;
            write_boundary(w, "outerBoundaryIs", &polygon.outer)?;
            for ring in &polygon.inner {
                write_boundary(w, "innerBoundaryIs", ring)?;
            }
            end(w, "Polygon")?;
        }
    }

    end(w, "Placemark")
}

fn write_boundary(w: &mut XmlWriter, tag: &str, ring: &LinearRing) -> Result<(), KmlError> {
    start(w, tag)?;
    start(w, "LinearRing")?;
    text_element(w, "coordinates", &ring.coordinates_text())?;
    end(w, "LinearRing")?;
    end(w, tag)
}

fn start(w: &mut XmlWriter, tag: &str) -> Result<(), KmlError> {
    w.write_event(Event::Start(BytesStart::new(tag)))?;
    Ok(())
}

fn end(w: &mut XmlWriter, tag: &str) -> Result<(), KmlError> {
    w.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn text_element(w: &mut XmlWriter, tag: &str, text: &str) -> Result<(), KmlError> {
    start(w, tag)?;
    let escaped: Cow<str> = partial_escape(text);
    w.write_event(Event::Text(BytesText::from_escaped(escaped)))?;
    end(w, tag)
}

fn bool_text(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
