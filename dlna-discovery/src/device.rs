//! Device description parsing.
//!
//! This module handles parsing UPnP device description XML, flattening
//! embedded devices, and resolving the relative URLs a description carries
//! (icons, control endpoints) against the device base URL.

use crate::error::{DiscoveryError, Result};
use crate::{Device, DeviceKind, Icon, ServiceEndpoint};
use serde::Deserialize;

/// UPnP device description root element.
#[derive(Debug, Deserialize)]
pub struct Description {
    /// Optional base for relative URLs (deprecated in UPnP 1.1 but still common)
    #[serde(rename = "URLBase", default)]
    pub url_base: Option<String>,
    pub device: DeviceDescription,
}

/// A single device element, possibly with embedded devices.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescription {
    pub device_type: String,
    pub friendly_name: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(rename = "UDN")]
    pub udn: String,
    #[serde(default)]
    pub icon_list: Option<IconList>,
    #[serde(default)]
    pub service_list: Option<ServiceList>,
    #[serde(default)]
    pub device_list: Option<DeviceList>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IconList {
    #[serde(rename = "icon", default)]
    pub icons: Vec<IconDescription>,
}

#[derive(Debug, Deserialize)]
pub struct IconDescription {
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceList {
    #[serde(rename = "service", default)]
    pub services: Vec<ServiceDescription>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceDescription {
    #[serde(rename = "serviceType")]
    pub service_type: String,
    #[serde(rename = "serviceId", default)]
    pub service_id: String,
    #[serde(rename = "controlURL")]
    pub control_url: String,
    #[serde(rename = "eventSubURL", default)]
    pub event_sub_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeviceList {
    #[serde(rename = "device", default)]
    pub devices: Vec<DeviceDescription>,
}

impl Description {
    /// Parse a device description document.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::ParseError` if the XML is malformed or missing required fields.
    pub fn from_xml(xml: &str) -> Result<Self> {
        quick_xml::de::from_str(xml)
            .map_err(|e| DiscoveryError::ParseError(format!("Failed to parse device XML: {}", e)))
    }

    /// Convert every media server and renderer in this description into a `Device`.
    ///
    /// The root device and all embedded devices are visited depth-first.
    /// Devices of other types (gateways, bridges) are skipped.
    ///
    /// # Arguments
    ///
    /// * `location` - The LOCATION URL the description was fetched from
    pub fn into_devices(self, location: &str) -> Vec<Device> {
        let base_url = self
            .url_base
            .as_deref()
            .map(str::trim)
            .filter(|base| !base.is_empty())
            .unwrap_or(location)
            .to_string();

        let mut devices = Vec::new();
        collect_media_devices(&self.device, location, &base_url, &mut devices);
        devices
    }
}

fn collect_media_devices(
    description: &DeviceDescription,
    location: &str,
    base_url: &str,
    out: &mut Vec<Device>,
) {
    if description.is_media_device() {
        out.push(description.to_device(location, base_url));
    }
    if let Some(list) = &description.device_list {
        for embedded in &list.devices {
            collect_media_devices(embedded, location, base_url, out);
        }
    }
}

impl DeviceDescription {
    /// Check if this device is a media server or media renderer.
    pub fn is_media_device(&self) -> bool {
        DeviceKind::from_device_type(&self.device_type) != DeviceKind::Other
    }

    /// Convert this description into the public `Device` type.
    ///
    /// Control and event URLs are resolved against `base_url`; icon URLs are
    /// kept as advertised and resolved lazily by `Device::icon_uri`.
    pub fn to_device(&self, location: &str, base_url: &str) -> Device {
        let icons = self
            .icon_list
            .as_ref()
            .map(|list| {
                list.icons
                    .iter()
                    .map(|icon| Icon {
                        mime_type: icon.mimetype.clone(),
                        width: icon.width,
                        height: icon.height,
                        url: icon.url.trim().to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let services = self
            .service_list
            .as_ref()
            .map(|list| {
                list.services
                    .iter()
                    .map(|service| ServiceEndpoint {
                        service_type: service.service_type.trim().to_string(),
                        service_id: service.service_id.trim().to_string(),
                        control_url: resolve_url(base_url, service.control_url.trim())
                            .unwrap_or_else(|| service.control_url.trim().to_string()),
                        event_sub_url: resolve_url(base_url, service.event_sub_url.trim())
                            .unwrap_or_else(|| service.event_sub_url.trim().to_string()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Device {
            id: self.udn.trim().to_string(),
            name: self.friendly_name.trim().to_string(),
            device_type: self.device_type.trim().to_string(),
            kind: DeviceKind::from_device_type(&self.device_type),
            location: location.to_string(),
            base_url: base_url.to_string(),
            manufacturer: self.manufacturer.trim().to_string(),
            model_name: self.model_name.trim().to_string(),
            icons,
            services,
        }
    }
}

/// Resolve a possibly relative URL against a base URL.
///
/// Absolute URLs are returned unchanged. Returns `None` if either URL is malformed.
pub fn resolve_url(base: &str, relative: &str) -> Option<String> {
    let base = reqwest::Url::parse(base).ok()?;
    base.join(relative).ok().map(|url| url.to_string())
}

/// Extract the host portion of a URL.
///
/// # Returns
///
/// The host of the URL, or `None` if the URL is malformed.
pub fn extract_host_from_url(url: &str) -> Option<String> {
    reqwest::Url::parse(url)
        .ok()?
        .host_str()
        .map(|host| host.to_string())
}
