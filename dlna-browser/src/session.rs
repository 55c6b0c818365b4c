use std::sync::Arc;

use dlna_discovery::Device;

use crate::control_point::ControlPoint;
use crate::dispatch::{UiForwarder, UiSender};
use crate::registry::ListenerId;

/// Registry subscription tied to the lifetime of a screen.
///
/// Opening registers a [`UiForwarder`], snapshots the devices already
/// known and starts a search. Dropping the session deregisters the
/// forwarder, so no further device messages are posted.
pub struct DiscoverySession {
    control_point: Arc<dyn ControlPoint>,
    listener: ListenerId,
}

impl DiscoverySession {
    /// Returns the session and the devices known when it opened, for
    /// seeding rosters.
    ///
    /// The listener is registered before the snapshot is taken, so a device
    /// announced in between shows up twice at most; rosters ignore the
    /// duplicate.
    pub fn open(control_point: Arc<dyn ControlPoint>, sender: UiSender) -> (Self, Vec<Arc<Device>>) {
        let registry = control_point.registry();
        let listener = registry.add_listener(Arc::new(UiForwarder::new(sender)));
        let known = registry.devices();
        control_point.search();

        tracing::debug!("Discovery session opened with {} known devices", known.len());
        (
            Self {
                control_point,
                listener,
            },
            known,
        )
    }

    /// Search again, e.g. on user request
    pub fn refresh(&self) {
        self.control_point.search();
    }

    pub fn control_point(&self) -> &Arc<dyn ControlPoint> {
        &self.control_point
    }
}

impl Drop for DiscoverySession {
    fn drop(&mut self) {
        self.control_point.registry().remove_listener(self.listener);
        tracing::debug!("Discovery session closed");
    }
}
