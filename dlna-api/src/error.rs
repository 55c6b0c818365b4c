use soap_client::SoapError;
use thiserror::Error;

use crate::operation::ValidationError;

/// High-level API errors for UPnP media operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The device could not be reached or the HTTP exchange failed
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The device answered, but the response could not be understood.
    /// Includes malformed DIDL-Lite in a Browse result.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The device rejected the action with a UPnP error code
    #[error("SOAP fault: error code {0} ({})", soap_client::upnp_error_name(*.0))]
    SoapFault(u16),

    /// A request parameter failed validation before anything was sent
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The device does not advertise the service an operation needs
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    /// A paged listing kept going past the client's entry limit
    #[error("Listing of {object_id} exceeded {limit} entries")]
    ListingTooLarge { object_id: String, limit: u32 },
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<SoapError> for ApiError {
    fn from(error: SoapError) -> Self {
        match error {
            SoapError::Network(msg) => ApiError::NetworkError(msg),
            SoapError::Parse(msg) => ApiError::ParseError(msg),
            SoapError::Fault(code) => ApiError::SoapFault(code),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        ApiError::InvalidParameter(error.to_string())
    }
}

impl From<dlna_parser::ParseError> for ApiError {
    fn from(error: dlna_parser::ParseError) -> Self {
        ApiError::ParseError(error.to_string())
    }
}
