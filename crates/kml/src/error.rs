//! Error types for KML serialization.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KmlError {
    #[error("XML write failed: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Serialized document is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
