//! DLNA device discovery library
//!
//! This crate discovers UPnP/DLNA media servers and media renderers on a
//! local network using SSDP (Simple Service Discovery Protocol) and UPnP
//! device descriptions.
//!
//! # Quick Start
//!
//! ```no_run
//! use dlna_discovery::get;
//!
//! for device in get() {
//!     println!("Found {} ({:?}) at {}", device.name, device.kind, device.location);
//! }
//! ```
//!
//! # Iterator-based Discovery
//!
//! ```no_run
//! use dlna_discovery::{get_iter, DeviceEvent};
//!
//! for event in get_iter() {
//!     match event {
//!         DeviceEvent::Found(device) => println!("Found: {}", device.name),
//!         DeviceEvent::Failed { location, error } => eprintln!("{}: {}", location, error),
//!     }
//! }
//! ```
//!
//! # Passive notifications
//!
//! Devices announce themselves (`ssdp:alive`) and leave (`ssdp:byebye`) on
//! the SSDP multicast group. [`NotifyListener`] surfaces these announcements.

mod error;
mod ssdp;
pub mod device;
mod discovery;
mod notify;

pub use error::{DiscoveryError, Result};
pub use discovery::{fetch_description, DescriptionClient, DiscoveryIterator};
pub use notify::{udn_from_usn, Notification, NotifyListener};

use serde::Serialize;
use std::time::Duration;

/// Search target for ContentDirectory-bearing media servers
pub const MEDIA_SERVER_TARGET: &str = "urn:schemas-upnp-org:device:MediaServer:1";

/// Search target for AVTransport-bearing media renderers
pub const MEDIA_RENDERER_TARGET: &str = "urn:schemas-upnp-org:device:MediaRenderer:1";

/// Role of a discovered device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DeviceKind {
    MediaServer,
    MediaRenderer,
    Other,
}

impl DeviceKind {
    /// Classify a UPnP device type URN
    ///
    /// ```
    /// use dlna_discovery::DeviceKind;
    ///
    /// assert_eq!(
    ///     DeviceKind::from_device_type("urn:schemas-upnp-org:device:MediaServer:1"),
    ///     DeviceKind::MediaServer
    /// );
    /// ```
    pub fn from_device_type(device_type: &str) -> Self {
        // urn:schemas-upnp-org:device:<type>:<version>
        match device_type.trim().split(':').nth(3) {
            Some("MediaServer") => DeviceKind::MediaServer,
            Some("MediaRenderer") => DeviceKind::MediaRenderer,
            _ => DeviceKind::Other,
        }
    }

    /// The bare type tag as it appears in device type URNs
    pub fn type_tag(&self) -> &'static str {
        match self {
            DeviceKind::MediaServer => "MediaServer",
            DeviceKind::MediaRenderer => "MediaRenderer",
            DeviceKind::Other => "Other",
        }
    }
}

/// An icon advertised in a device description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Icon {
    pub mime_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// URL as advertised, possibly relative to the device base URL
    pub url: String,
}

/// A service exposed by a device, with absolute control URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceEndpoint {
    /// Service type URN, e.g. "urn:schemas-upnp-org:service:ContentDirectory:1"
    pub service_type: String,
    pub service_id: String,
    pub control_url: String,
    pub event_sub_url: String,
}

/// Information about a discovered media server or renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    /// Unique device name (UDN), e.g. "uuid:4d696e69-444c-164e-9d41-b827eb0ec63b"
    pub id: String,
    /// Friendly name of the device
    pub name: String,
    /// Full device type URN
    pub device_type: String,
    pub kind: DeviceKind,
    /// URL of the device description
    pub location: String,
    /// Base for relative URLs in the description
    pub base_url: String,
    pub manufacturer: String,
    pub model_name: String,
    pub icons: Vec<Icon>,
    pub services: Vec<ServiceEndpoint>,
}

impl Device {
    /// URI of the first advertised icon, resolved against the base URL
    pub fn icon_uri(&self) -> Option<String> {
        let icon = self.icons.first()?;
        let resolved = device::resolve_url(&self.base_url, &icon.url);
        if resolved.is_none() {
            tracing::warn!("Failed to resolve icon URI {} for {}", icon.url, self.name);
        }
        resolved
    }

    /// Find the first service whose type URN contains `fragment`
    pub fn find_service(&self, fragment: &str) -> Option<&ServiceEndpoint> {
        self.services
            .iter()
            .find(|service| service.service_type.contains(fragment))
    }

    /// Host the device was discovered at
    pub fn host(&self) -> Option<String> {
        device::extract_host_from_url(&self.location)
    }
}

/// Events emitted during device discovery.
#[derive(Debug, Clone)]
pub enum DeviceEvent {
    /// A media server or renderer was found on the network
    Found(Device),
    /// A device answered the search but its description could not be used
    Failed {
        location: String,
        error: DiscoveryError,
    },
}

/// Discovery parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// How long to wait for SSDP responses and description fetches
    pub timeout: Duration,
    /// SSDP search targets; one M-SEARCH is sent per target
    pub search_targets: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            search_targets: vec![
                MEDIA_SERVER_TARGET.to_string(),
                MEDIA_RENDERER_TARGET.to_string(),
            ],
        }
    }
}

/// Discover all media servers and renderers with a default 3-second timeout.
///
/// Collects every found device; description failures are dropped.
pub fn get() -> Vec<Device> {
    get_with_timeout(Duration::from_secs(3))
}

/// Discover all media servers and renderers with a custom timeout.
pub fn get_with_timeout(timeout: Duration) -> Vec<Device> {
    let config = DiscoveryConfig {
        timeout,
        ..DiscoveryConfig::default()
    };
    get_iter_with_config(config)
        .filter_map(|event| match event {
            DeviceEvent::Found(device) => Some(device),
            DeviceEvent::Failed { .. } => None,
        })
        .collect()
}

/// Get a discovery iterator with the default configuration.
pub fn get_iter() -> DiscoveryIterator {
    get_iter_with_config(DiscoveryConfig::default())
}

/// Get a discovery iterator with a custom configuration.
///
/// If the UDP socket cannot be created, an empty iterator is returned and
/// the failure is logged.
pub fn get_iter_with_config(config: DiscoveryConfig) -> DiscoveryIterator {
    DiscoveryIterator::new(config).unwrap_or_else(|e| {
        tracing::warn!("Failed to start discovery: {}", e);
        DiscoveryIterator::empty()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_kind_from_device_type() {
        assert_eq!(
            DeviceKind::from_device_type("urn:schemas-upnp-org:device:MediaRenderer:1"),
            DeviceKind::MediaRenderer
        );
        assert_eq!(
            DeviceKind::from_device_type("urn:schemas-upnp-org:device:MediaServer:4"),
            DeviceKind::MediaServer
        );
        assert_eq!(
            DeviceKind::from_device_type("urn:schemas-upnp-org:device:ZonePlayer:1"),
            DeviceKind::Other
        );
        assert_eq!(DeviceKind::from_device_type(""), DeviceKind::Other);
    }

    #[test]
    fn test_default_config_searches_both_roles() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(config.search_targets.iter().any(|t| t == MEDIA_SERVER_TARGET));
        assert!(config.search_targets.iter().any(|t| t == MEDIA_RENDERER_TARGET));
    }

    #[test]
    fn test_find_service_by_fragment() {
        let device = Device {
            id: "uuid:1".to_string(),
            name: "Server".to_string(),
            device_type: MEDIA_SERVER_TARGET.to_string(),
            kind: DeviceKind::MediaServer,
            location: "http://10.0.0.2:8200/desc.xml".to_string(),
            base_url: "http://10.0.0.2:8200/desc.xml".to_string(),
            manufacturer: String::new(),
            model_name: String::new(),
            icons: Vec::new(),
            services: vec![ServiceEndpoint {
                service_type: "urn:schemas-upnp-org:service:ContentDirectory:1".to_string(),
                service_id: "urn:upnp-org:serviceId:ContentDirectory".to_string(),
                control_url: "http://10.0.0.2:8200/ctl/ContentDir".to_string(),
                event_sub_url: "http://10.0.0.2:8200/evt/ContentDir".to_string(),
            }],
        };

        assert!(device.find_service("ContentDirectory").is_some());
        assert!(device.find_service("AVTransport").is_none());
        assert_eq!(device.host(), Some("10.0.0.2".to_string()));
    }
}
