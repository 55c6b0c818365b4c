//! Device lists, one per device role

use std::sync::Arc;

use dlna_discovery::{Device, DeviceKind};

use crate::entry::DisplayEntry;

/// Ordered list of devices of a single kind, as shown on screen.
///
/// Mutated only on the UI thread.
#[derive(Debug, Clone)]
pub struct DeviceRoster {
    kind: DeviceKind,
    devices: Vec<Arc<Device>>,
}

impl DeviceRoster {
    pub fn new(kind: DeviceKind) -> Self {
        Self {
            kind,
            devices: Vec::new(),
        }
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    /// Append a device of this roster's kind. Idempotent by UDN.
    ///
    /// Returns whether the roster changed.
    pub fn add(&mut self, device: &Arc<Device>) -> bool {
        if device.kind != self.kind || self.position(&device.id).is_some() {
            return false;
        }
        self.devices.push(Arc::clone(device));
        true
    }

    /// Returns whether the device was listed
    pub fn remove(&mut self, device: &Device) -> bool {
        match self.position(&device.id) {
            Some(index) => {
                self.devices.remove(index);
                true
            }
            None => false,
        }
    }

    /// Reconsider a device whose description changed.
    ///
    /// A device that no longer matches this roster's kind is dropped; a
    /// matching one is refreshed in place, or appended if it was unknown.
    pub fn update(&mut self, device: &Arc<Device>) {
        match (device.kind == self.kind, self.position(&device.id)) {
            (true, Some(index)) => self.devices[index] = Arc::clone(device),
            (true, None) => self.devices.push(Arc::clone(device)),
            (false, Some(index)) => {
                self.devices.remove(index);
            }
            (false, None) => {}
        }
    }

    /// Add devices that were known before this roster started listening
    pub fn seed<'a>(&mut self, devices: impl IntoIterator<Item = &'a Arc<Device>>) {
        for device in devices {
            self.add(device);
        }
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Device>> {
        self.devices.get(index)
    }

    pub fn contains(&self, udn: &str) -> bool {
        self.position(udn).is_some()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Device>> {
        self.devices.iter()
    }

    /// `(name, icon)` rows for display
    pub fn rows(&self) -> Vec<(String, Option<String>)> {
        self.devices
            .iter()
            .map(|device| (device.display_name(), device.icon_uri()))
            .collect()
    }

    fn position(&self, udn: &str) -> Option<usize> {
        self.devices.iter().position(|device| device.id == udn)
    }
}
