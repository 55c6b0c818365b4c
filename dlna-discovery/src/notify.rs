//! Passive SSDP notification listener
//!
//! Devices multicast `NOTIFY` messages when they join (`ssdp:alive`) or leave
//! (`ssdp:byebye`) the network. Listening for them keeps a device registry
//! current between explicit searches.

use std::net::{Ipv4Addr, UdpSocket};
use std::time::Duration;

use crate::error::{DiscoveryError, Result};
use crate::ssdp::extract_header_value;

const SSDP_GROUP: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);
const SSDP_PORT: u16 = 1900;

/// A parsed SSDP NOTIFY message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A device (or one of its services) announced itself
    Alive {
        location: String,
        nt: String,
        usn: String,
    },
    /// A device (or one of its services) is leaving the network
    ByeBye { nt: String, usn: String },
}

impl Notification {
    /// Notification type of this message
    pub fn nt(&self) -> &str {
        match self {
            Notification::Alive { nt, .. } | Notification::ByeBye { nt, .. } => nt,
        }
    }

    /// Device UDN this notification is about
    pub fn udn(&self) -> &str {
        match self {
            Notification::Alive { usn, .. } | Notification::ByeBye { usn, .. } => udn_from_usn(usn),
        }
    }
}

/// Listener bound to the SSDP multicast group
pub struct NotifyListener {
    socket: UdpSocket,
    buffer: [u8; 2048],
}

impl NotifyListener {
    /// Join the SSDP multicast group.
    ///
    /// `poll_interval` bounds how long `recv` blocks, so callers can check a
    /// shutdown flag between reads.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::NetworkError` if port 1900 cannot be bound
    /// (commonly because another SSDP stack owns it) or the group cannot be joined.
    pub fn bind(poll_interval: Duration) -> Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, SSDP_PORT))
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to bind SSDP port: {}", e)))?;

        socket
            .join_multicast_v4(&SSDP_GROUP, &Ipv4Addr::UNSPECIFIED)
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to join SSDP group: {}", e)))?;

        socket
            .set_read_timeout(Some(poll_interval))
            .map_err(|e| DiscoveryError::NetworkError(format!("Failed to set read timeout: {}", e)))?;

        Ok(Self {
            socket,
            buffer: [0; 2048],
        })
    }

    /// Wait up to the poll interval for the next NOTIFY message.
    ///
    /// Returns `Ok(None)` on timeout and for datagrams that are not NOTIFY
    /// messages (other hosts' M-SEARCH requests arrive on the same port).
    pub fn recv(&mut self) -> Result<Option<Notification>> {
        match self.socket.recv_from(&mut self.buffer) {
            Ok((size, _)) => Ok(std::str::from_utf8(&self.buffer[..size])
                .ok()
                .and_then(parse_notify)),
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                Ok(None)
            }
            Err(e) => Err(DiscoveryError::NetworkError(format!("Socket error: {}", e))),
        }
    }
}

impl Drop for NotifyListener {
    fn drop(&mut self) {
        let _ = self
            .socket
            .leave_multicast_v4(&SSDP_GROUP, &Ipv4Addr::UNSPECIFIED);
    }
}

/// Parse a NOTIFY message
pub(crate) fn parse_notify(message: &str) -> Option<Notification> {
    let mut lines = message.lines();
    let request_line = lines.next()?.trim();
    if !request_line.to_ascii_uppercase().starts_with("NOTIFY") {
        return None;
    }

    let mut location = None;
    let mut nt = None;
    let mut nts = None;
    let mut usn = None;

    for line in lines {
        let line = line.trim();
        if let Some(value) = extract_header_value(line, "LOCATION:") {
            location = Some(value);
        } else if let Some(value) = extract_header_value(line, "NTS:") {
            nts = Some(value);
        } else if let Some(value) = extract_header_value(line, "NT:") {
            nt = Some(value);
        } else if let Some(value) = extract_header_value(line, "USN:") {
            usn = Some(value);
        }
    }

    match (nts?.as_str(), nt, usn) {
        ("ssdp:alive", Some(nt), Some(usn)) => Some(Notification::Alive {
            location: location?,
            nt,
            usn,
        }),
        ("ssdp:byebye", Some(nt), Some(usn)) => Some(Notification::ByeBye { nt, usn }),
        _ => None,
    }
}

/// Extract the device UDN from a USN header value.
///
/// ```
/// use dlna_discovery::udn_from_usn;
///
/// assert_eq!(
///     udn_from_usn("uuid:abc::urn:schemas-upnp-org:device:MediaServer:1"),
///     "uuid:abc"
/// );
/// assert_eq!(udn_from_usn("uuid:abc"), "uuid:abc");
/// ```
pub fn udn_from_usn(usn: &str) -> &str {
    usn.split("::").next().unwrap_or(usn).trim()
}
