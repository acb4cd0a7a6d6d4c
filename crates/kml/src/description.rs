//! HTML attribute tables for placemark descriptions.
//!
//! A description is a small table over an ordered list of `(label, value)`
//! pairs pulled from the feature attributes. Labels and values are HTML
//! escaped; the markup itself is emitted raw and relies on the document
//! unescape pass (see [`crate::writer::unescape`]) to survive serialization.

use perimeter_common::{format_date, Feature};
use quick_xml::escape::escape;
use serde::Deserialize;

const ALTERNATE_ROW_COLOR: &str = "#D4E4F3";

/// How an attribute value is turned into table text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldFormat {
    #[default]
    Text,
    /// Epoch milliseconds rendered as Pacific civil time.
    Date,
}

/// One table row: a fixed label and the attribute that fills it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RowSpec {
    pub label: String,
    pub field: String,
    #[serde(default)]
    pub format: FieldFormat,
}

impl RowSpec {
    pub fn new(label: &str, field: &str, format: FieldFormat) -> Self {
        Self {
            label: label.to_string(),
            field: field.to_string(),
            format,
        }
    }

    /// Cell text for this row. Missing attributes yield "" (or the date
    /// formatter's marker for date rows), never an omitted row.
    pub fn value(&self, feature: &Feature) -> String {
        match self.format {
            FieldFormat::Text => feature.attribute_text(&self.field),
            FieldFormat::Date => format_date(feature.attribute(&self.field)).to_string(),
        }
    }
}

/// Link appended below the table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinkSpec {
    pub label: String,
    pub url: String,
}

/// Layout of the description popup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DescriptionSpec {
    /// Optional first row rendered with `<th>` cells.
    #[serde(default)]
    pub header: Option<RowSpec>,
    pub rows: Vec<RowSpec>,
    #[serde(default)]
    pub link: Option<LinkSpec>,
    /// Wrap the HTML in a `<![CDATA[ ... ]]>` literal.
    #[serde(default = "default_wrap_cdata")]
    pub wrap_cdata: bool,
}

fn default_wrap_cdata() -> bool {
    true
}

impl Default for DescriptionSpec {
    fn default() -> Self {
        Self {
            header: None,
            rows: vec![
                RowSpec::new("Fire Name", "incident_name", FieldFormat::Text),
                RowSpec::new("Date", "poly_DateCurrent", FieldFormat::Date),
                RowSpec::new("Mission", "mission", FieldFormat::Text),
                RowSpec::new("Source", "source", FieldFormat::Text),
                RowSpec::new("Area in Acres", "area_acres", FieldFormat::Text),
                RowSpec::new("Notes", "description", FieldFormat::Text),
            ],
            link: None,
            wrap_cdata: default_wrap_cdata(),
        }
    }
}

impl DescriptionSpec {
    /// Label/value pairs for a feature, in configured order.
    pub fn pairs(&self, feature: &Feature) -> Vec<(String, String)> {
        self.rows
            .iter()
            .map(|row| (row.label.clone(), row.value(feature)))
            .collect()
    }

    /// Full description text for a feature.
    pub fn render(&self, feature: &Feature) -> String {
        let header = self
            .header
            .as_ref()
            .map(|row| (row.label.clone(), row.value(feature)));
        let html = render_table(header.as_ref(), &self.pairs(feature), self.link.as_ref());

        if self.wrap_cdata {
            wrap_cdata(&html)
        } else {
            html
        }
    }
}

/// Render the HTML table. Odd body rows get a shaded background.
pub fn render_table(
    header: Option<&(String, String)>,
    rows: &[(String, String)],
    link: Option<&LinkSpec>,
) -> String {
    let mut html = String::from("<html><body>\n<table border=\"1\">\n");

    if let Some((label, value)) = header {
        html.push_str(&format!(
            "<tr><th>{}</th><th>{}</th></tr>\n",
            escape(label.as_str()),
            escape(value.as_str())
        ));
    }

    for (i, (label, value)) in rows.iter().enumerate() {
        let row_open = if i % 2 == 0 {
            format!("<tr bgcolor=\"{}\">", ALTERNATE_ROW_COLOR)
        } else {
            "<tr>".to_string()
        };
        html.push_str(&format!(
            "{}<td>{}</td><td>{}</td></tr>\n",
            row_open,
            escape(label.as_str()),
            escape(value.as_str())
        ));
    }

    html.push_str("</table>\n");

    if let Some(link) = link {
        html.push_str(&format!(
            "<a href=\"{}\" style=\"font-size: large; font-weight: bold;\">{}</a>\n",
            escape(link.url.as_str()),
            escape(link.label.as_str())
        ));
    }

    html.push_str("</body></html>");
    html
}

/// Wrap text in a CDATA literal.
pub fn wrap_cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text)
}
