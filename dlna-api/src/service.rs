/// UPnP services used to browse media servers and drive renderers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// ContentDirectory - browsing a media server's library
    ContentDirectory,

    /// AVTransport - loading and controlling playback on a renderer
    AVTransport,

    /// RenderingControl - volume and mute on a renderer
    RenderingControl,
}

impl Service {
    /// Get the name of this service as it appears in service type URNs
    pub fn name(&self) -> &'static str {
        match self {
            Service::ContentDirectory => "ContentDirectory",
            Service::AVTransport => "AVTransport",
            Service::RenderingControl => "RenderingControl",
        }
    }

    /// Version 1 service type URN.
    ///
    /// Devices may advertise a later version; calls use the advertised type.
    pub fn service_uri(&self) -> &'static str {
        match self {
            Service::ContentDirectory => "urn:schemas-upnp-org:service:ContentDirectory:1",
            Service::AVTransport => "urn:schemas-upnp-org:service:AVTransport:1",
            Service::RenderingControl => "urn:schemas-upnp-org:service:RenderingControl:1",
        }
    }

    /// Whether an advertised service type URN is any version of this service
    ///
    /// ```
    /// use dlna_api::Service;
    ///
    /// assert!(Service::ContentDirectory.matches("urn:schemas-upnp-org:service:ContentDirectory:3"));
    /// assert!(!Service::AVTransport.matches("urn:schemas-upnp-org:service:ContentDirectory:1"));
    /// ```
    pub fn matches(&self, service_type: &str) -> bool {
        service_type.contains(&format!(":service:{}:", self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_names_and_uris() {
        for service in [Service::ContentDirectory, Service::AVTransport, Service::RenderingControl] {
            assert!(service.service_uri().contains(service.name()));
            assert!(service.matches(service.service_uri()));
        }
    }

    #[test]
    fn test_matches_rejects_prefix_collisions() {
        assert!(!Service::AVTransport.matches("urn:schemas-upnp-org:service:AVTransportExtra:1"));
        assert!(!Service::RenderingControl.matches("urn:schemas-upnp-org:service:GroupRenderingControl:1"));
    }
}
