//! Browse operation for ContentDirectory service

use dlna_parser::DidlLite;
use serde::{Deserialize, Serialize};
use soap_client::escape_xml;
use xmltree::Element;

use crate::operation::{required_number, required_text, UPnPOperation, Validate, ValidationError};
use crate::{ApiError, Service};

/// Object id of the root container of every ContentDirectory
pub const ROOT_OBJECT_ID: &str = "0";

/// Browse operation
pub struct BrowseOperation;

/// What to return for the target object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BrowseFlag {
    /// The object's direct children
    BrowseDirectChildren,
    /// The object's own metadata
    BrowseMetadata,
}

impl BrowseFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowseFlag::BrowseDirectChildren => "BrowseDirectChildren",
            BrowseFlag::BrowseMetadata => "BrowseMetadata",
        }
    }
}

/// Request for Browse operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowseRequest {
    pub object_id: String,
    pub browse_flag: BrowseFlag,
    /// Comma-separated property filter, `*` for everything
    pub filter: String,
    pub starting_index: u32,
    /// Zero asks for all remaining children
    pub requested_count: u32,
    pub sort_criteria: String,
}

impl BrowseRequest {
    /// All children of `object_id`, unsorted and unfiltered
    pub fn direct_children(object_id: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            browse_flag: BrowseFlag::BrowseDirectChildren,
            filter: "*".to_string(),
            starting_index: 0,
            requested_count: 0,
            sort_criteria: String::new(),
        }
    }

    /// Metadata of `object_id` itself
    pub fn metadata(object_id: impl Into<String>) -> Self {
        Self {
            browse_flag: BrowseFlag::BrowseMetadata,
            ..Self::direct_children(object_id)
        }
    }

    /// Restrict the request to one page
    pub fn with_range(mut self, starting_index: u32, requested_count: u32) -> Self {
        self.starting_index = starting_index;
        self.requested_count = requested_count;
        self
    }
}

impl Validate for BrowseRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.object_id.is_empty() {
            return Err(ValidationError::missing("ObjectID"));
        }
        if self.browse_flag == BrowseFlag::BrowseMetadata && self.starting_index != 0 {
            return Err(ValidationError::invalid_value(
                "StartingIndex",
                self.starting_index,
                "must be 0 for BrowseMetadata",
            ));
        }
        Ok(())
    }
}

/// Response for Browse operation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BrowseResponse {
    /// DIDL-Lite document, already unescaped
    #[serde(rename = "Result")]
    pub result: String,
    #[serde(rename = "NumberReturned")]
    pub number_returned: u32,
    #[serde(rename = "TotalMatches")]
    pub total_matches: u32,
    #[serde(rename = "UpdateID")]
    pub update_id: u32,
}

impl BrowseResponse {
    /// Parse the embedded DIDL-Lite listing
    pub fn didl(&self) -> Result<DidlLite, ApiError> {
        Ok(DidlLite::from_xml(&self.result)?)
    }
}

impl UPnPOperation for BrowseOperation {
    type Request = BrowseRequest;
    type Response = BrowseResponse;

    const SERVICE: Service = Service::ContentDirectory;
    const ACTION: &'static str = "Browse";

    fn build_payload(request: &Self::Request) -> Result<String, ValidationError> {
        request.validate()?;
        Ok(format!(
            "<ObjectID>{}</ObjectID><BrowseFlag>{}</BrowseFlag><Filter>{}</Filter>\
             <StartingIndex>{}</StartingIndex><RequestedCount>{}</RequestedCount>\
             <SortCriteria>{}</SortCriteria>",
            escape_xml(&request.object_id),
            request.browse_flag.as_str(),
            escape_xml(&request.filter),
            request.starting_index,
            request.requested_count,
            escape_xml(&request.sort_criteria),
        ))
    }

    fn parse_response(xml: &Element) -> Result<Self::Response, ApiError> {
        Ok(BrowseResponse {
            result: required_text(xml, "Result")?,
            number_returned: required_number(xml, "NumberReturned")?,
            total_matches: required_number(xml, "TotalMatches")?,
            // Some servers omit UpdateID
            update_id: required_number(xml, "UpdateID").unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browse_payload_construction() {
        let request = BrowseRequest::direct_children("64$1").with_range(200, 100);
        let payload = BrowseOperation::build_payload(&request).unwrap();

        assert_eq!(
            payload,
            "<ObjectID>64$1</ObjectID><BrowseFlag>BrowseDirectChildren</BrowseFlag><Filter>*</Filter>\
             <StartingIndex>200</StartingIndex><RequestedCount>100</RequestedCount>\
             <SortCriteria></SortCriteria>"
        );
    }

    #[test]
    fn test_object_id_is_escaped() {
        let request = BrowseRequest::direct_children("a&b<c>");
        let payload = BrowseOperation::build_payload(&request).unwrap();
        assert!(payload.starts_with("<ObjectID>a&amp;b&lt;c&gt;</ObjectID>"));
    }

    #[test]
    fn test_empty_object_id_is_rejected() {
        let request = BrowseRequest::direct_children("");
        assert!(matches!(
            BrowseOperation::build_payload(&request),
            Err(ValidationError::MissingParameter { .. })
        ));
    }

    #[test]
    fn test_metadata_requires_zero_start() {
        let request = BrowseRequest::metadata("0").with_range(5, 1);
        assert!(BrowseOperation::build_payload(&request).is_err());
        assert!(BrowseOperation::build_payload(&BrowseRequest::metadata("0")).is_ok());
    }

    #[test]
    fn test_browse_response_parsing() {
        let xml_str = r#"<BrowseResponse>
            <Result>&lt;DIDL-Lite&gt;&lt;container id="1" parentID="0" childCount="3"&gt;&lt;dc:title&gt;Music&lt;/dc:title&gt;&lt;/container&gt;&lt;/DIDL-Lite&gt;</Result>
            <NumberReturned>1</NumberReturned>
            <TotalMatches>4</TotalMatches>
            <UpdateID>17</UpdateID>
        </BrowseResponse>"#;
        let xml = Element::parse(xml_str.as_bytes()).unwrap();

        let response = BrowseOperation::parse_response(&xml).unwrap();
        assert_eq!(response.number_returned, 1);
        assert_eq!(response.total_matches, 4);
        assert_eq!(response.update_id, 17);

        let didl = response.didl().unwrap();
        assert_eq!(didl.containers().next().unwrap().display_title(), "Music");
    }

    #[test]
    fn test_missing_update_id_defaults_to_zero() {
        let xml_str = "<BrowseResponse><Result></Result><NumberReturned>0</NumberReturned><TotalMatches>0</TotalMatches></BrowseResponse>";
        let xml = Element::parse(xml_str.as_bytes()).unwrap();

        let response = BrowseOperation::parse_response(&xml).unwrap();
        assert_eq!(response.update_id, 0);
        assert!(response.didl().unwrap().is_empty());
    }

    #[test]
    fn test_missing_counts_fail() {
        let xml = Element::parse("<BrowseResponse><Result></Result></BrowseResponse>".as_bytes()).unwrap();
        assert!(matches!(
            BrowseOperation::parse_response(&xml),
            Err(ApiError::ParseError(_))
        ));
    }
}
