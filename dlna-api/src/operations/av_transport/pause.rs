//! Pause operation for AVTransport service

use serde::{Deserialize, Serialize};
use xmltree::Element;

use crate::operation::{UPnPOperation, Validate, ValidationError};
use crate::{ApiError, Service};

/// Pause operation
pub struct PauseOperation;

/// Request for pause operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PauseRequest {
    pub instance_id: u32,
}

impl Validate for PauseRequest {}

/// Response for pause operation
#[derive(Debug, Deserialize)]
pub struct PauseResponse;

impl UPnPOperation for PauseOperation {
    type Request = PauseRequest;
    type Response = PauseResponse;

    const SERVICE: Service = Service::AVTransport;
    const ACTION: &'static str = "Pause";

    fn build_payload(request: &Self::Request) -> Result<String, ValidationError> {
        Ok(format!("<InstanceID>{}</InstanceID>", request.instance_id))
    }

    fn parse_response(_xml: &Element) -> Result<Self::Response, ApiError> {
        Ok(PauseResponse)
    }
}
