use std::time::Duration;

use dlna_discovery::{Device, ServiceEndpoint};
use dlna_parser::DidlLite;
use soap_client::SoapClient;

use crate::operation::UPnPOperation;
use crate::operations::content_directory::{BrowseOperation, BrowseRequest};
use crate::{ApiError, Result};

/// Executes typed operations against the services of discovered devices
///
/// Unlike fixed-endpoint devices, every DLNA device advertises its own
/// control URLs, so operations are addressed to a [`ServiceEndpoint`] taken
/// from the device description.
///
/// ```rust,no_run
/// use dlna_api::DlnaClient;
/// use dlna_api::operations::content_directory::{BrowseOperation, BrowseRequest};
///
/// # fn demo(device: &dlna_discovery::Device) -> dlna_api::Result<()> {
/// let client = DlnaClient::new();
/// let response = client.execute_on::<BrowseOperation>(device, &BrowseRequest::direct_children("0"))?;
/// println!("{} of {} children", response.number_returned, response.total_matches);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DlnaClient {
    soap_client: SoapClient,
    max_browse_entries: u32,
}

/// Upper bound on the entries `browse_all` collects for one directory
pub const DEFAULT_MAX_BROWSE_ENTRIES: u32 = 50_000;

impl Default for DlnaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DlnaClient {
    /// Create a client with default timeouts
    pub fn new() -> Self {
        Self::with_soap_client(SoapClient::new())
    }

    /// Create a client with explicit connect and read timeouts
    pub fn with_timeouts(connect: Duration, read: Duration) -> Self {
        Self::with_soap_client(SoapClient::with_timeouts(connect, read))
    }

    pub fn with_soap_client(soap_client: SoapClient) -> Self {
        Self {
            soap_client,
            max_browse_entries: DEFAULT_MAX_BROWSE_ENTRIES,
        }
    }

    /// Limit how many entries `browse_all` accepts before giving up
    pub fn with_max_browse_entries(mut self, max_browse_entries: u32) -> Self {
        self.max_browse_entries = max_browse_entries;
        self
    }

    /// Execute an operation against a service endpoint
    ///
    /// The request is validated before anything is sent. The SOAP action
    /// namespace is the service type the device advertised, so version 2+
    /// services are addressed correctly.
    pub fn execute<Op: UPnPOperation>(
        &self,
        endpoint: &ServiceEndpoint,
        request: &Op::Request,
    ) -> Result<Op::Response> {
        if !Op::SERVICE.matches(&endpoint.service_type) {
            return Err(ApiError::ServiceNotFound(format!(
                "{} is not a {} endpoint",
                endpoint.service_type,
                Op::SERVICE.name()
            )));
        }

        let payload = Op::build_payload(request)?;
        tracing::debug!("{} -> {}", Op::ACTION, endpoint.control_url);

        let xml = self.soap_client.call(
            &endpoint.control_url,
            &endpoint.service_type,
            Op::ACTION,
            &payload,
        )?;

        Op::parse_response(&xml)
    }

    /// Execute an operation against whichever service of `device` it targets
    pub fn execute_on<Op: UPnPOperation>(
        &self,
        device: &Device,
        request: &Op::Request,
    ) -> Result<Op::Response> {
        let endpoint = Self::endpoint_for(device, Op::SERVICE)?;
        self.execute::<Op>(endpoint, request)
    }

    /// Locate the endpoint of `service` on `device`
    pub fn endpoint_for(device: &Device, service: crate::Service) -> Result<&ServiceEndpoint> {
        device
            .services
            .iter()
            .find(|endpoint| service.matches(&endpoint.service_type))
            .ok_or_else(|| {
                ApiError::ServiceNotFound(format!("{} has no {} service", device.name, service.name()))
            })
    }

    /// Browse every direct child of `object_id`, one page at a time.
    ///
    /// Stops once `TotalMatches` children have been received, or when the
    /// server returns an empty page. A server reporting `TotalMatches` of 0
    /// is paged until it returns a short page. Containers and items keep the
    /// server's order across pages.
    ///
    /// # Errors
    ///
    /// `ApiError::ListingTooLarge` once more than the client's entry limit
    /// has been received, which also ends servers that ignore
    /// `StartingIndex`.
    pub fn browse_all(
        &self,
        endpoint: &ServiceEndpoint,
        object_id: &str,
        page_size: u32,
    ) -> Result<DidlLite> {
        let mut listing = DidlLite::default();
        let mut starting_index: u32 = 0;

        loop {
            let request = BrowseRequest::direct_children(object_id).with_range(starting_index, page_size);
            let response = self.execute::<BrowseOperation>(endpoint, &request)?;
            let page = response.didl()?;

            tracing::trace!(
                "Browse {} [{}+{}] of {}",
                object_id,
                starting_index,
                response.number_returned,
                response.total_matches
            );

            let returned = response.number_returned.max(page.len() as u32);
            if returned == 0 {
                break;
            }

            listing.objects.extend(page.objects);
            starting_index = starting_index.saturating_add(returned);

            if starting_index > self.max_browse_entries {
                tracing::warn!(
                    "Browse of {} passed {} entries, giving up",
                    object_id,
                    self.max_browse_entries
                );
                return Err(ApiError::ListingTooLarge {
                    object_id: object_id.to_string(),
                    limit: self.max_browse_entries,
                });
            }

            let complete = if response.total_matches == 0 {
                returned < page_size
            } else {
                starting_index >= response.total_matches
            };
            if complete {
                break;
            }
        }

        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::rendering_control::{SetVolumeOperation, SetVolumeRequest};
    use dlna_discovery::DeviceKind;

    fn device_with(services: Vec<ServiceEndpoint>) -> Device {
        Device {
            id: "uuid:renderer".to_string(),
            name: "Living Room TV".to_string(),
            device_type: "urn:schemas-upnp-org:device:MediaRenderer:1".to_string(),
            kind: DeviceKind::MediaRenderer,
            location: "http://127.0.0.1:1/desc.xml".to_string(),
            base_url: "http://127.0.0.1:1/desc.xml".to_string(),
            manufacturer: String::new(),
            model_name: String::new(),
            icons: Vec::new(),
            services,
        }
    }

    fn endpoint(service_type: &str) -> ServiceEndpoint {
        ServiceEndpoint {
            service_type: service_type.to_string(),
            service_id: String::new(),
            control_url: "http://127.0.0.1:1/ctl".to_string(),
            event_sub_url: String::new(),
        }
    }

    #[test]
    fn test_missing_service_is_reported() {
        let client = DlnaClient::new();
        let device = device_with(vec![endpoint("urn:schemas-upnp-org:service:AVTransport:1")]);

        let result = client.execute_on::<SetVolumeOperation>(&device, &SetVolumeRequest::master(10));
        assert!(matches!(result, Err(ApiError::ServiceNotFound(msg)) if msg.contains("Living Room TV")));
    }

    #[test]
    fn test_wrong_endpoint_is_rejected_before_sending() {
        let client = DlnaClient::new();
        let result = client.execute::<SetVolumeOperation>(
            &endpoint("urn:schemas-upnp-org:service:AVTransport:1"),
            &SetVolumeRequest::master(10),
        );
        assert!(matches!(result, Err(ApiError::ServiceNotFound(_))));
    }

    #[test]
    fn test_invalid_request_is_rejected_before_sending() {
        let client = DlnaClient::new();
        let result = client.execute::<SetVolumeOperation>(
            &endpoint("urn:schemas-upnp-org:service:RenderingControl:1"),
            &SetVolumeRequest::master(150),
        );
        assert!(matches!(result, Err(ApiError::InvalidParameter(_))));
    }
}
