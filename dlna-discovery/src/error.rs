//! Error types for the discovery system.

use thiserror::Error;

/// Error type for discovery operations.
///
/// Represents the failure modes of SSDP searches, notification listening
/// and device description retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// Network-related errors (socket creation, HTTP requests, etc.)
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Parsing errors (XML, SSDP response, etc.)
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Operation timed out waiting for responses
    #[error("Operation timed out")]
    Timeout,
    /// Description fetched but it declares no media server or renderer
    #[error("Invalid device: {0}")]
    InvalidDevice(String),
}

/// Convenience Result type alias for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
