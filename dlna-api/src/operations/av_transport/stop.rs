//! Stop operation for AVTransport service

use serde::{Deserialize, Serialize};
use xmltree::Element;

use crate::operation::{UPnPOperation, Validate, ValidationError};
use crate::{ApiError, Service};

/// Stop operation
pub struct StopOperation;

/// Request for stop operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StopRequest {
    pub instance_id: u32,
}

impl Validate for StopRequest {}

/// Response for stop operation
#[derive(Debug, Deserialize)]
pub struct StopResponse;

impl UPnPOperation for StopOperation {
    type Request = StopRequest;
    type Response = StopResponse;

    const SERVICE: Service = Service::AVTransport;
    const ACTION: &'static str = "Stop";

    fn build_payload(request: &Self::Request) -> Result<String, ValidationError> {
        Ok(format!("<InstanceID>{}</InstanceID>", request.instance_id))
    }

    fn parse_response(_xml: &Element) -> Result<Self::Response, ApiError> {
        Ok(StopResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_payload_construction() {
        let payload = StopOperation::build_payload(&StopRequest { instance_id: 2 }).unwrap();
        assert_eq!(payload, "<InstanceID>2</InstanceID>");
        assert_eq!(StopOperation::ACTION, "Stop");
    }
}
