//! SetAVTransportURI operation for AVTransport service

use serde::{Deserialize, Serialize};
use soap_client::escape_xml;
use xmltree::Element;

use crate::operation::{UPnPOperation, Validate, ValidationError};
use crate::{ApiError, Service};

/// SetAVTransportURI operation
pub struct SetAvTransportUriOperation;

/// Request for SetAVTransportURI operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetAvTransportUriRequest {
    pub instance_id: u32,
    pub current_uri: String,
    /// DIDL-Lite document describing the media, may be empty
    pub current_uri_metadata: String,
}

impl SetAvTransportUriRequest {
    pub fn new(current_uri: impl Into<String>, current_uri_metadata: impl Into<String>) -> Self {
        Self {
            instance_id: 0,
            current_uri: current_uri.into(),
            current_uri_metadata: current_uri_metadata.into(),
        }
    }
}

impl Validate for SetAvTransportUriRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.current_uri.trim().is_empty() {
            return Err(ValidationError::missing("CurrentURI"));
        }
        Ok(())
    }
}

/// Response for SetAVTransportURI operation
#[derive(Debug, Deserialize)]
pub struct SetAvTransportUriResponse;

impl UPnPOperation for SetAvTransportUriOperation {
    type Request = SetAvTransportUriRequest;
    type Response = SetAvTransportUriResponse;

    const SERVICE: Service = Service::AVTransport;
    const ACTION: &'static str = "SetAVTransportURI";

    fn build_payload(request: &Self::Request) -> Result<String, ValidationError> {
        request.validate()?;
        Ok(format!(
            "<InstanceID>{}</InstanceID><CurrentURI>{}</CurrentURI><CurrentURIMetaData>{}</CurrentURIMetaData>",
            request.instance_id,
            escape_xml(request.current_uri.trim()),
            escape_xml(&request.current_uri_metadata),
        ))
    }

    fn parse_response(_xml: &Element) -> Result<Self::Response, ApiError> {
        Ok(SetAvTransportUriResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_is_escaped_once() {
        let request = SetAvTransportUriRequest::new(
            "http://10.0.0.2:8200/MediaItems/7.mp3?a=1&b=2",
            r#"<DIDL-Lite><item id="7"/></DIDL-Lite>"#,
        );
        let payload = SetAvTransportUriOperation::build_payload(&request).unwrap();

        assert_eq!(
            payload,
            "<InstanceID>0</InstanceID>\
             <CurrentURI>http://10.0.0.2:8200/MediaItems/7.mp3?a=1&amp;b=2</CurrentURI>\
             <CurrentURIMetaData>&lt;DIDL-Lite&gt;&lt;item id=&quot;7&quot;/&gt;&lt;/DIDL-Lite&gt;</CurrentURIMetaData>"
        );
    }

    #[test]
    fn test_empty_uri_is_rejected() {
        let request = SetAvTransportUriRequest::new("  ", "");
        assert!(matches!(
            SetAvTransportUriOperation::build_payload(&request),
            Err(ValidationError::MissingParameter { .. })
        ));
    }

    #[test]
    fn test_response_parsing() {
        let xml = Element::parse("<SetAVTransportURIResponse/>".as_bytes()).unwrap();
        assert!(SetAvTransportUriOperation::parse_response(&xml).is_ok());
    }
}
