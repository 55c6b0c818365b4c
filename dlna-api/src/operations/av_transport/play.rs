//! Play operation for AVTransport service

use serde::{Deserialize, Serialize};
use xmltree::Element;

use crate::operation::{UPnPOperation, Validate, ValidationError};
use crate::{ApiError, Service};

/// Play operation
pub struct PlayOperation;

/// Request for play operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayRequest {
    pub instance_id: u32,
    pub speed: String,
}

impl Default for PlayRequest {
    fn default() -> Self {
        Self {
            instance_id: 0,
            speed: "1".to_string(),
        }
    }
}

impl Validate for PlayRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.speed.is_empty() {
            return Err(ValidationError::missing("Speed"));
        }
        Ok(())
    }
}

/// Response for play operation
#[derive(Debug, Deserialize)]
pub struct PlayResponse;

impl UPnPOperation for PlayOperation {
    type Request = PlayRequest;
    type Response = PlayResponse;

    const SERVICE: Service = Service::AVTransport;
    const ACTION: &'static str = "Play";

    fn build_payload(request: &Self::Request) -> Result<String, ValidationError> {
        request.validate()?;
        Ok(format!(
            "<InstanceID>{}</InstanceID><Speed>{}</Speed>",
            request.instance_id, request.speed
        ))
    }

    fn parse_response(_xml: &Element) -> Result<Self::Response, ApiError> {
        Ok(PlayResponse)
    }
}
