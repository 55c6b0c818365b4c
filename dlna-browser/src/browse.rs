//! Seam between navigation and the network

use std::sync::Arc;

use dlna_discovery::Device;

use crate::control_point::ControlPoint;
use crate::dispatch::{UiMessage, UiSender};
use crate::navigation::BrowseTicket;

/// Fire-and-forget directory listing.
///
/// Implementations must return immediately; completion is delivered as a
/// [`UiMessage::BrowseFinished`] carrying the same ticket.
pub trait ContentBrowser: Send + Sync {
    fn browse(&self, device: Arc<Device>, ticket: BrowseTicket);
}

/// Browses through a control point and posts completions to the UI queue
pub struct ControlPointBrowser {
    control_point: Arc<dyn ControlPoint>,
    sender: UiSender,
}

impl ControlPointBrowser {
    pub fn new(control_point: Arc<dyn ControlPoint>, sender: UiSender) -> Self {
        Self {
            control_point,
            sender,
        }
    }
}

impl ContentBrowser for ControlPointBrowser {
    fn browse(&self, device: Arc<Device>, ticket: BrowseTicket) {
        let sender = self.sender.clone();
        let directory = ticket.directory.clone();
        self.control_point.execute_browse(
            &device,
            &directory,
            Box::new(move |result| {
                sender.send(UiMessage::BrowseFinished { ticket, result });
            }),
        );
    }
}
