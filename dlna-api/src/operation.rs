//! Operation framework
//!
//! Each UPnP action is a zero-sized type implementing [`UPnPOperation`],
//! tying together its request type, response type, owning service and
//! action name.

use serde::{Deserialize, Serialize};
use xmltree::Element;

use crate::error::ApiError;
use crate::service::Service;

/// Validation error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Parameter '{parameter}' value '{value}' is out of range ({min}..={max})")]
    RangeError {
        parameter: String,
        value: String,
        min: String,
        max: String,
    },

    #[error("Parameter '{parameter}' value '{value}' is invalid: {reason}")]
    InvalidValue {
        parameter: String,
        value: String,
        reason: String,
    },

    #[error("Required parameter '{parameter}' is missing")]
    MissingParameter { parameter: String },
}

impl ValidationError {
    pub fn range_error(
        parameter: &str,
        min: impl std::fmt::Display,
        max: impl std::fmt::Display,
        value: impl std::fmt::Display,
    ) -> Self {
        Self::RangeError {
            parameter: parameter.to_string(),
            value: value.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        }
    }

    pub fn invalid_value(parameter: &str, value: impl std::fmt::Display, reason: &str) -> Self {
        Self::InvalidValue {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn missing(parameter: &str) -> Self {
        Self::MissingParameter {
            parameter: parameter.to_string(),
        }
    }
}

/// Trait for request types that can be checked before sending
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// A typed UPnP action
pub trait UPnPOperation {
    /// The request type for this operation
    type Request: Serialize + Validate;

    /// The response type for this operation
    type Response: for<'de> Deserialize<'de>;

    /// The UPnP service this operation belongs to
    const SERVICE: Service;

    /// The SOAP action name for this operation
    const ACTION: &'static str;

    /// Validate the request and build the action arguments (without the
    /// SOAP envelope)
    fn build_payload(request: &Self::Request) -> Result<String, ValidationError>;

    /// Parse the `{ACTION}Response` element into the typed response
    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError>;
}

/// Text of a required response argument
pub(crate) fn required_text(xml: &Element, name: &str) -> Result<String, ApiError> {
    xml.get_child(name)
        .map(|child| child.get_text().map(|t| t.into_owned()).unwrap_or_default())
        .ok_or_else(|| ApiError::ParseError(format!("Missing {} element", name)))
}

/// Required response argument parsed as a number
pub(crate) fn required_number<T: std::str::FromStr>(xml: &Element, name: &str) -> Result<T, ApiError> {
    let text = required_text(xml, name)?;
    text.trim()
        .parse()
        .map_err(|_| ApiError::ParseError(format!("Invalid {} value '{}'", name, text)))
}
