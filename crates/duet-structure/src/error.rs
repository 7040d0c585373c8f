//! Error types for the structural diff crate.
//!
//! Every variant describes input that cannot be compared. A failure only
//! affects the comparison call that produced it.

/// Errors that can occur while parsing or comparing documents.
#[derive(Debug, thiserror::Error)]
pub enum StructureError {
    /// The input was empty or whitespace only.
    #[error("{side} {format} input is empty")]
    EmptyInput {
        format: &'static str,
        side: &'static str,
    },

    /// The JSON text could not be parsed.
    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The XML reader rejected the text.
    #[error("failed to parse XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The XML text is well-formed at the token level but not a document.
    #[error("malformed XML document: {0}")]
    MalformedXml(String),

    /// The XML document has no root element.
    #[error("XML document must have a root element")]
    MissingRoot,

    /// Nesting went past the configured maximum depth.
    #[error("document nesting exceeds the maximum depth of {max}")]
    DepthExceeded { max: usize },
}

impl From<quick_xml::events::attributes::AttrError> for StructureError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(e.into())
    }
}

/// Convenience alias for structural diff results.
pub type StructureResult<T> = Result<T, StructureError>;
