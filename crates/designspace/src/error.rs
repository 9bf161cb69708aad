//! Error types for designspace reading and writing.

use std::{num::ParseIntError, path::PathBuf};

/// Result type for designspace operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading or writing a designspace document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// I/O error without an associated path (e.g. an in-memory writer).
    #[error("I/O error: {0}")]
    Stream(#[from] std::io::Error),

    /// The XML itself is malformed.
    #[error("Error parsing XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An attribute could not be decoded.
    #[error("Error parsing XML attribute: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// The document ended before all elements were closed.
    #[error("Unexpected end of document inside <{0}>")]
    UnexpectedEof(String),

    /// The root element is not `<designspace>`.
    #[error("Expected <designspace> root element, found <{0}>")]
    WrongRootElement(String),

    /// A required attribute is missing.
    #[error("Missing required attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    /// A numeric attribute could not be parsed.
    #[error("Invalid number '{value}' for attribute '{attribute}' on <{element}>")]
    InvalidNumber {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },

    /// A glyph `unicode` attribute is not a list of hex values.
    #[error("Unicode values '{raw}' are not hexadecimal integers: {inner}")]
    InvalidUnicode { raw: String, inner: ParseIntError },

    /// A location was found but the document declares no axes.
    #[error("Location found in a document without axes")]
    NoAxes,

    /// An instance `<glyph>` element has no name.
    #[error("Glyph element without name attribute")]
    UnnamedGlyph,

    /// Library data is not a valid property list.
    #[error("Invalid property list: {0}")]
    Plist(#[from] plist::Error),

    /// A `<lib>` element holds something other than a `<dict>`.
    #[error("lib must hold a dict, found <{0}>")]
    LibNotDictionary(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
