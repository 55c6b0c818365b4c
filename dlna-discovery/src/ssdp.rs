//! SSDP M-SEARCH client
//!
//! Internal SSDP client used to actively search for devices. Responses are
//! unicast back to the ephemeral port the search was sent from.

use std::net::UdpSocket;
use std::time::Duration;
use crate::error::{DiscoveryError, Result};

pub(crate) const SSDP_MULTICAST_ADDR: &str = "239.255.255.250:1900";

/// SSDP search response
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SsdpResponse {
    pub location: String,
    pub urn: String,
    pub usn: String,
    pub server: Option<String>,
}

/// SSDP client for device discovery
pub(crate) struct SsdpClient {
    socket: UdpSocket,
}

impl SsdpClient {
    /// Create a new SSDP client with the specified timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to bind UDP socket: {}", e)))?;

        socket.set_read_timeout(Some(timeout))
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to set read timeout: {}", e)))?;

        socket.set_multicast_loop_v4(true)
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to set multicast loop: {}", e)))?;

        Ok(Self { socket })
    }

    /// Send one M-SEARCH per target and return an iterator of responses
    pub fn search(&self, search_targets: &[String]) -> Result<SsdpResponseIterator<'_>> {
        for target in search_targets {
            let request = build_search_request(target);
            self.socket
                .send_to(request.as_bytes(), SSDP_MULTICAST_ADDR)
                .map_err(|e| DiscoveryError::NetworkError(format!("Failed to send M-SEARCH: {}", e)))?;
            tracing::debug!("Sent M-SEARCH for {}", target);
        }

        Ok(SsdpResponseIterator::new(&self.socket))
    }
}

fn build_search_request(search_target: &str) -> String {
    format!(
        "M-SEARCH * HTTP/1.1\r\n\
         HOST: {}\r\n\
         MAN: \"ssdp:discover\"\r\n\
         MX: 2\r\n\
         ST: {}\r\n\
         USER-AGENT: dlna-browser/0.2 UPnP/1.0\r\n\
         \r\n",
        SSDP_MULTICAST_ADDR, search_target
    )
}

/// Iterator over SSDP responses until the socket read times out
pub(crate) struct SsdpResponseIterator<'a> {
    socket: &'a UdpSocket,
    buffer: [u8; 2048],
    finished: bool,
}

impl<'a> SsdpResponseIterator<'a> {
    fn new(socket: &'a UdpSocket) -> Self {
        Self {
            socket,
            buffer: [0; 2048],
            finished: false,
        }
    }
}

impl<'a> Iterator for SsdpResponseIterator<'a> {
    type Item = Result<SsdpResponse>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.socket.recv_from(&mut self.buffer) {
                Ok((size, _)) => {
                    // Skip undecodable or incomplete datagrams
                    let Ok(text) = std::str::from_utf8(&self.buffer[..size]) else {
                        continue;
                    };
                    if let Some(response) = parse_ssdp_response(text) {
                        return Some(Ok(response));
                    }
                }
                Err(e) => {
                    self.finished = true;
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut
                    {
                        return None;
                    }
                    return Some(Err(DiscoveryError::NetworkError(format!("Socket error: {}", e))));
                }
            }
        }
        None
    }
}

/// Parse an SSDP search response from HTTP text
pub(crate) fn parse_ssdp_response(response: &str) -> Option<SsdpResponse> {
    let mut location = None;
    let mut urn = None;
    let mut usn = None;
    let mut server = None;

    for line in response.lines() {
        let line = line.trim();

        if let Some(value) = extract_header_value(line, "LOCATION:") {
            location = Some(value);
        } else if let Some(value) = extract_header_value(line, "ST:") {
            urn = Some(value);
        } else if let Some(value) = extract_header_value(line, "USN:") {
            usn = Some(value);
        } else if let Some(value) = extract_header_value(line, "SERVER:") {
            server = Some(value);
        }
    }

    match (location, urn, usn) {
        (Some(location), Some(urn), Some(usn)) => Some(SsdpResponse {
            location,
            urn,
            usn,
            server,
        }),
        _ => None,
    }
}

/// Extract header value from a line like "HEADER: value"
pub(crate) fn extract_header_value(line: &str, header: &str) -> Option<String> {
    if line.len() > header.len() && line.is_char_boundary(header.len()) && line[..header.len()].eq_ignore_ascii_case(header) {
        Some(line[header.len()..].trim().to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_media_server_response() {
        let response = "HTTP/1.1 200 OK\r\n\
            CACHE-CONTROL: max-age=1810\r\n\
            EXT:\r\n\
            LOCATION: http://192.168.1.10:8200/rootDesc.xml\r\n\
            SERVER: 4.9.0 DLNADOC/1.50 UPnP/1.0 MiniDLNA/1.3.0\r\n\
            ST: urn:schemas-upnp-org:device:MediaServer:1\r\n\
            USN: uuid:4d696e69-444c-164e-9d41-b827eb0ec63b::urn:schemas-upnp-org:device:MediaServer:1\r\n\
            \r\n";

        let parsed = parse_ssdp_response(response).unwrap();

        assert_eq!(parsed.location, "http://192.168.1.10:8200/rootDesc.xml");
        assert_eq!(parsed.urn, "urn:schemas-upnp-org:device:MediaServer:1");
        assert_eq!(
            parsed.usn,
            "uuid:4d696e69-444c-164e-9d41-b827eb0ec63b::urn:schemas-upnp-org:device:MediaServer:1"
        );
        assert_eq!(
            parsed.server,
            Some("4.9.0 DLNADOC/1.50 UPnP/1.0 MiniDLNA/1.3.0".to_string())
        );
    }

    #[test]
    fn test_parse_response_case_insensitive_without_server() {
        let response = "HTTP/1.1 200 OK\r\n\
            location: http://192.168.1.20:49152/description.xml\r\n\
            st: urn:schemas-upnp-org:device:MediaRenderer:1\r\n\
            usn: uuid:tv-1::urn:schemas-upnp-org:device:MediaRenderer:1\r\n\
            \r\n";

        let parsed = parse_ssdp_response(response).unwrap();
        assert_eq!(parsed.location, "http://192.168.1.20:49152/description.xml");
        assert_eq!(parsed.server, None);
    }

    #[rstest]
    #[case::missing_location("HTTP/1.1 200 OK\r\nST: urn:x\r\nUSN: uuid:1\r\n\r\n")]
    #[case::missing_st("HTTP/1.1 200 OK\r\nLOCATION: http://h/\r\nUSN: uuid:1\r\n\r\n")]
    #[case::missing_usn("HTTP/1.1 200 OK\r\nLOCATION: http://h/\r\nST: urn:x\r\n\r\n")]
    #[case::empty("")]
    #[case::garbage("This is not a valid SSDP response\r\nSome random text\r\n")]
    fn test_parse_incomplete_response(#[case] response: &str) {
        assert!(parse_ssdp_response(response).is_none());
    }

    #[rstest]
    #[case("LOCATION: http://example.com", "LOCATION:", Some("http://example.com"))]
    #[case("location: http://example.com", "LOCATION:", Some("http://example.com"))]
    #[case("LOCATION:\thttp://example.com  ", "LOCATION:", Some("http://example.com"))]
    #[case("LOCATION: ", "LOCATION:", Some(""))]
    #[case("LOCATION:", "LOCATION:", None)]
    #[case("LOCATIONS: value", "LOCATION:", None)]
    #[case("LOC: value", "LOCATION:", None)]
    fn test_extract_header_value(
        #[case] line: &str,
        #[case] header: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(extract_header_value(line, header), expected.map(str::to_string));
    }

    #[test]
    fn test_search_request_format() {
        let request = build_search_request("urn:schemas-upnp-org:device:MediaServer:1");
        assert!(request.starts_with("M-SEARCH * HTTP/1.1\r\n"));
        assert!(request.contains("MAN: \"ssdp:discover\"\r\n"));
        assert!(request.contains("ST: urn:schemas-upnp-org:device:MediaServer:1\r\n"));
        assert!(request.ends_with("\r\n\r\n"));
    }
}
