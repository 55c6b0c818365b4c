//! Error types for the SOAP client

use thiserror::Error;

/// Errors that can occur while invoking a UPnP action
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SoapError {
    /// Connection, timeout or non-SOAP HTTP failure
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// Response body was not a well-formed SOAP envelope
    #[error("XML parsing error: {0}")]
    Parse(String),

    /// UPnP error carried in a SOAP fault
    #[error("SOAP fault: error code {0} ({})", upnp_error_name(*.0))]
    Fault(u16),
}

/// Human-readable name for the UPnP error codes media servers commonly return
pub fn upnp_error_name(code: u16) -> &'static str {
    match code {
        401 => "Invalid Action",
        402 => "Invalid Args",
        501 => "Action Failed",
        701 => "No such object",
        709 => "Unsupported or invalid sort criteria",
        710 => "No such container",
        714 => "No such source resource",
        716 => "Resource not found",
        718 => "Invalid InstanceID",
        720 => "Cannot process the request",
        _ => "Unknown error",
    }
}
