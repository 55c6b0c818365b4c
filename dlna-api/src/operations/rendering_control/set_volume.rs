//! SetVolume operation for RenderingControl service

use serde::{Deserialize, Serialize};
use xmltree::Element;

use crate::operation::{UPnPOperation, Validate, ValidationError};
use crate::{ApiError, Service};

/// Highest volume accepted by SetVolume
pub const MAX_VOLUME: u16 = 100;

/// SetVolume operation
pub struct SetVolumeOperation;

/// Request for SetVolume operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetVolumeRequest {
    pub instance_id: u32,
    pub channel: String,
    pub desired_volume: u16,
}

impl SetVolumeRequest {
    /// Master channel on instance 0
    pub fn master(desired_volume: u16) -> Self {
        Self {
            instance_id: 0,
            channel: "Master".to_string(),
            desired_volume,
        }
    }
}

impl Validate for SetVolumeRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.channel.is_empty() {
            return Err(ValidationError::missing("Channel"));
        }
        if self.desired_volume > MAX_VOLUME {
            return Err(ValidationError::range_error(
                "DesiredVolume",
                0,
                MAX_VOLUME,
                self.desired_volume,
            ));
        }
        Ok(())
    }
}

/// Response for SetVolume operation
#[derive(Debug, Deserialize)]
pub struct SetVolumeResponse;

impl UPnPOperation for SetVolumeOperation {
    type Request = SetVolumeRequest;
    type Response = SetVolumeResponse;

    const SERVICE: Service = Service::RenderingControl;
    const ACTION: &'static str = "SetVolume";

    fn build_payload(request: &Self::Request) -> Result<String, ValidationError> {
        request.validate()?;
        Ok(format!(
            "<InstanceID>{}</InstanceID><Channel>{}</Channel><DesiredVolume>{}</DesiredVolume>",
            request.instance_id, request.channel, request.desired_volume
        ))
    }

    fn parse_response(_xml: &Element) -> Result<Self::Response, ApiError> {
        Ok(SetVolumeResponse)
    }
}
