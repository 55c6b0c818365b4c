//! GetVolume operation for RenderingControl service

use serde::{Deserialize, Serialize};
use xmltree::Element;

use crate::operation::{required_number, UPnPOperation, Validate, ValidationError};
use crate::{ApiError, Service};

/// GetVolume operation
pub struct GetVolumeOperation;

/// Request for GetVolume operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetVolumeRequest {
    pub instance_id: u32,
    pub channel: String,
}

impl Default for GetVolumeRequest {
    fn default() -> Self {
        Self {
            instance_id: 0,
            channel: "Master".to_string(),
        }
    }
}

impl Validate for GetVolumeRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.channel.is_empty() {
            return Err(ValidationError::missing("Channel"));
        }
        Ok(())
    }
}

/// Response for GetVolume operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GetVolumeResponse {
    #[serde(rename = "CurrentVolume")]
    pub current_volume: u16,
}

impl UPnPOperation for GetVolumeOperation {
    type Request = GetVolumeRequest;
    type Response = GetVolumeResponse;

    const SERVICE: Service = Service::RenderingControl;
    const ACTION: &'static str = "GetVolume";

    fn build_payload(request: &Self::Request) -> Result<String, ValidationError> {
        request.validate()?;
        Ok(format!(
            "<InstanceID>{}</InstanceID><Channel>{}</Channel>",
            request.instance_id, request.channel
        ))
    }

    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError> {
        Ok(GetVolumeResponse {
            current_volume: required_number(xml, "CurrentVolume")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_volume_payload_construction() {
        let payload = GetVolumeOperation::build_payload(&GetVolumeRequest::default()).unwrap();
        assert_eq!(payload, "<InstanceID>0</InstanceID><Channel>Master</Channel>");
    }

    #[test]
    fn test_get_volume_response_parsing() {
        let xml = Element::parse(
            "<GetVolumeResponse><CurrentVolume>35</CurrentVolume></GetVolumeResponse>".as_bytes(),
        )
        .unwrap();
        let response = GetVolumeOperation::parse_response(&xml).unwrap();
        assert_eq!(response.current_volume, 35);
    }
}
