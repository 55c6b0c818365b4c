//! Core discovery logic and iterator implementation.
//!
//! This module implements the discovery algorithm that:
//! 1. Sends SSDP M-SEARCH requests for every configured search target
//! 2. Receives responses and drops those for unrelated device types
//! 3. Fetches each distinct device description once via HTTP
//! 4. Yields every media server/renderer the description declares

use std::collections::{HashSet, VecDeque};
use crate::device::Description;
use crate::error::{DiscoveryError, Result};
use crate::ssdp::{SsdpClient, SsdpResponse};
use crate::{Device, DeviceEvent, DiscoveryConfig};
use std::time::Duration;

/// Iterator that discovers media servers and renderers on the local network.
///
/// Yields `DeviceEvent::Found` for each discovered device and
/// `DeviceEvent::Failed` for devices whose description could not be
/// retrieved or parsed. Responses are de-duplicated by location.
pub struct DiscoveryIterator {
    ssdp_client: Option<SsdpClient>,
    search_targets: Vec<String>,
    ssdp_buffer: Vec<SsdpResponse>,
    buffer_index: usize,
    seen_locations: HashSet<String>,
    pending: VecDeque<DeviceEvent>,
    http_client: reqwest::blocking::Client,
}

impl DiscoveryIterator {
    /// Create a new discovery iterator
    pub fn new(config: DiscoveryConfig) -> Result<Self> {
        let ssdp_client = SsdpClient::new(config.timeout)?;
        let http_client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            ssdp_client: Some(ssdp_client),
            search_targets: config.search_targets,
            ssdp_buffer: Vec::new(),
            buffer_index: 0,
            seen_locations: HashSet::new(),
            pending: VecDeque::new(),
            http_client,
        })
    }

    /// Create an empty iterator that yields no results
    pub(crate) fn empty() -> Self {
        Self {
            ssdp_client: None,
            search_targets: Vec::new(),
            ssdp_buffer: Vec::new(),
            buffer_index: 0,
            seen_locations: HashSet::new(),
            pending: VecDeque::new(),
            http_client: reqwest::blocking::Client::new(),
        }
    }

    /// Check whether a response answers one of our searches
    fn is_relevant(&self, response: &SsdpResponse) -> bool {
        self.search_targets
            .iter()
            .any(|target| target == "ssdp:all" || response.urn.eq_ignore_ascii_case(target))
    }

    /// Fetch and parse a device description from a location URL
    fn fetch_description(&self, location: &str) -> Result<Description> {
        fetch_description(&self.http_client, location)
    }

    /// Fill the buffer with SSDP responses
    fn fill_buffer(&mut self) {
        if let Some(client) = self.ssdp_client.take() {
            match client.search(&self.search_targets) {
                Ok(iter) => {
                    for result in iter {
                        match result {
                            Ok(response) => self.ssdp_buffer.push(response),
                            Err(e) => tracing::debug!("SSDP receive failed: {}", e),
                        }
                    }
                }
                Err(e) => tracing::warn!("SSDP search failed: {}", e),
            }
            tracing::debug!("Collected {} SSDP responses", self.ssdp_buffer.len());
        }
    }
}

/// Fetch and parse the description document at `location`.
///
/// Shared by the search iterator and by callers reacting to `ssdp:alive`
/// notifications.
pub fn fetch_description(
    http_client: &reqwest::blocking::Client,
    location: &str,
) -> Result<Description> {
    let response = http_client
        .get(location)
        .send()
        .and_then(|response| response.error_for_status())
        .map_err(|e| DiscoveryError::NetworkError(format!("Failed to fetch device description: {}", e)))?;

    let xml = response
        .text()
        .map_err(|e| DiscoveryError::NetworkError(format!("Failed to read response body: {}", e)))?;

    Description::from_xml(&xml)
}

/// Fetches device descriptions for locations learned outside a search,
/// such as `ssdp:alive` announcements.
#[derive(Debug, Clone)]
pub struct DescriptionClient {
    http_client: reqwest::blocking::Client,
}

impl DescriptionClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http_client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { http_client })
    }

    /// Every media server and renderer declared at `location`
    ///
    /// # Errors
    ///
    /// `DiscoveryError::InvalidDevice` if the description declares none.
    pub fn fetch_devices(&self, location: &str) -> Result<Vec<Device>> {
        let devices = fetch_description(&self.http_client, location)?.into_devices(location);
        if devices.is_empty() {
            return Err(DiscoveryError::InvalidDevice(format!(
                "{} declares no media server or renderer",
                location
            )));
        }
        Ok(devices)
    }
}

impl Iterator for DiscoveryIterator {
    type Item = DeviceEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ssdp_client.is_some() {
            self.fill_buffer();
        }

        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }

            if self.buffer_index >= self.ssdp_buffer.len() {
                return None;
            }

            let ssdp_response = self.ssdp_buffer[self.buffer_index].clone();
            self.buffer_index += 1;

            if !self.seen_locations.insert(ssdp_response.location.clone()) {
                continue;
            }

            if !self.is_relevant(&ssdp_response) {
                continue;
            }

            let location = ssdp_response.location;
            match self.fetch_description(&location) {
                Ok(description) => {
                    let devices = description.into_devices(&location);
                    if devices.is_empty() {
                        return Some(DeviceEvent::Failed {
                            error: DiscoveryError::InvalidDevice(format!(
                                "{} declares no media server or renderer",
                                location
                            )),
                            location,
                        });
                    }
                    self.pending.extend(devices.into_iter().map(DeviceEvent::Found));
                }
                Err(error) => return Some(DeviceEvent::Failed { location, error }),
            }
        }
    }
}

impl Drop for DiscoveryIterator {
    fn drop(&mut self) {
        // Release the UDP socket even if iteration stopped early
        if let Some(client) = self.ssdp_client.take() {
            drop(client);
        }
    }
}
