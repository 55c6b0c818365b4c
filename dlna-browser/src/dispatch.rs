//! Hand-off from background threads to the thread that owns the screen
//!
//! Discovery, notification and browse threads never touch rosters or
//! navigation state. They post [`UiMessage`]s through a [`UiSender`]; the
//! single owner of the [`UiQueue`] applies them in arrival order.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use dlna_discovery::{Device, DiscoveryError};
use dlna_parser::DidlLite;

use crate::error::BrowseError;
use crate::navigation::BrowseTicket;
use crate::registry::RegistryListener;

/// Work for the UI thread
#[derive(Debug)]
pub enum UiMessage {
    DeviceAdded(Arc<Device>),
    DeviceRemoved(Arc<Device>),
    DeviceUpdated(Arc<Device>),
    DiscoveryFailed { location: String, reason: String },
    BrowseFinished {
        ticket: BrowseTicket,
        result: Result<DidlLite, BrowseError>,
    },
    PlaybackFailed { reason: String },
}

/// Create a connected sender/queue pair
pub fn ui_channel() -> (UiSender, UiQueue) {
    let (tx, rx) = mpsc::channel();
    (UiSender { tx }, UiQueue { rx })
}

/// Posting side; cheap to clone into background threads
#[derive(Debug, Clone)]
pub struct UiSender {
    tx: mpsc::Sender<UiMessage>,
}

impl UiSender {
    /// Post a message. Returns `false` once the queue has been dropped.
    pub fn send(&self, message: UiMessage) -> bool {
        match self.tx.send(message) {
            Ok(()) => true,
            Err(mpsc::SendError(message)) => {
                tracing::debug!("UI queue closed, dropping {:?}", message);
                false
            }
        }
    }
}

/// Receiving side, owned by the UI thread
#[derive(Debug)]
pub struct UiQueue {
    rx: mpsc::Receiver<UiMessage>,
}

impl UiQueue {
    /// Block until the next message. `None` once every sender is gone.
    pub fn recv(&self) -> Option<UiMessage> {
        self.rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<UiMessage> {
        self.rx.recv_timeout(timeout).ok()
    }

    pub fn try_recv(&self) -> Option<UiMessage> {
        self.rx.try_recv().ok()
    }

    /// Messages already queued, without blocking
    pub fn try_iter(&self) -> TryIter<'_> {
        TryIter { inner: self }
    }
}

/// Non-blocking iterator over queued messages
pub struct TryIter<'a> {
    inner: &'a UiQueue,
}

impl<'a> Iterator for TryIter<'a> {
    type Item = UiMessage;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.try_recv()
    }
}

/// Registry listener that forwards every change to the UI queue
pub struct UiForwarder {
    sender: UiSender,
}

impl UiForwarder {
    pub fn new(sender: UiSender) -> Self {
        Self { sender }
    }
}

impl RegistryListener for UiForwarder {
    fn device_added(&self, device: &Arc<Device>) {
        self.sender.send(UiMessage::DeviceAdded(Arc::clone(device)));
    }

    fn device_removed(&self, device: &Arc<Device>) {
        self.sender.send(UiMessage::DeviceRemoved(Arc::clone(device)));
    }

    fn device_updated(&self, device: &Arc<Device>) {
        self.sender.send(UiMessage::DeviceUpdated(Arc::clone(device)));
    }

    fn discovery_failed(&self, location: &str, error: &DiscoveryError) {
        self.sender.send(UiMessage::DiscoveryFailed {
            location: location.to_string(),
            reason: error.to_string(),
        });
    }
}
