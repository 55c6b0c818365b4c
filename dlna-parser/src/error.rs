//! Error types for DIDL-Lite parsing

use thiserror::Error;

/// Errors that can occur while parsing ContentDirectory metadata
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// XML deserialization failed
    #[error("XML deserialization failed: {0}")]
    XmlDeserializationFailed(String),

    /// Document is well-formed but not DIDL-Lite
    #[error("Invalid XML structure: {0}")]
    InvalidXmlStructure(String),
}

/// Result type alias for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;
