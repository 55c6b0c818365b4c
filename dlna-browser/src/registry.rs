//! Thread-safe table of known devices with change listeners

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dlna_discovery::{Device, DiscoveryError};
use parking_lot::{Mutex, RwLock};

/// Receives registry changes on the thread that made them, typically a
/// discovery thread. Implementations must not block.
pub trait RegistryListener: Send + Sync {
    fn device_added(&self, device: &Arc<Device>);

    fn device_removed(&self, device: &Arc<Device>);

    /// A known device re-announced itself with a different description
    fn device_updated(&self, device: &Arc<Device>);

    fn discovery_failed(&self, _location: &str, _error: &DiscoveryError) {}
}

/// Handle returned by [`Registry::add_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Devices keyed by UDN.
///
/// Changes and their notifications are serialized, so listeners see them in
/// the order they were applied. A listener may read the registry but must
/// not add or remove devices from inside a callback.
#[derive(Default)]
pub struct Registry {
    devices: RwLock<HashMap<String, Arc<Device>>>,
    changes: Mutex<()>,
    listeners: RwLock<Vec<(ListenerId, Arc<dyn RegistryListener>)>>,
    next_listener: AtomicU64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, listener: Arc<dyn RegistryListener>) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, listener));
        id
    }

    /// Returns whether the listener was registered
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Insert or refresh a device.
    ///
    /// New devices notify `device_added`; known devices whose description
    /// changed notify `device_updated`; identical re-announcements are
    /// silent. Returns the stored device.
    pub fn add_device(&self, device: Device) -> Arc<Device> {
        let device = Arc::new(device);
        let _change = self.changes.lock();
        let previous = self
            .devices
            .write()
            .insert(device.id.clone(), Arc::clone(&device));

        match previous {
            None => {
                tracing::info!("Device added: {} ({:?})", device.name, device.kind);
                self.notify(|listener| listener.device_added(&device));
            }
            Some(previous) if *previous != *device => {
                tracing::debug!("Device updated: {}", device.name);
                self.notify(|listener| listener.device_updated(&device));
            }
            Some(_) => {}
        }
        device
    }

    pub fn remove_device(&self, udn: &str) -> Option<Arc<Device>> {
        let _change = self.changes.lock();
        let removed = self.devices.write().remove(udn)?;
        tracing::info!("Device removed: {}", removed.name);
        self.notify(|listener| listener.device_removed(&removed));
        Some(removed)
    }

    /// Tell listeners a device answered but could not be used
    pub fn report_discovery_failure(&self, location: &str, error: &DiscoveryError) {
        tracing::warn!("Discovery failed for {}: {}", location, error);
        self.notify(|listener| listener.discovery_failed(location, error));
    }

    pub fn get(&self, udn: &str) -> Option<Arc<Device>> {
        self.devices.read().get(udn).cloned()
    }

    pub fn contains(&self, udn: &str) -> bool {
        self.devices.read().contains_key(udn)
    }

    /// Snapshot of all devices, ordered by name then UDN
    pub fn devices(&self) -> Vec<Arc<Device>> {
        let mut devices: Vec<_> = self.devices.read().values().cloned().collect();
        devices.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        devices
    }

    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.read().is_empty()
    }

    /// Run `f` for every listener, outside the device and listener locks
    fn notify(&self, f: impl Fn(&dyn RegistryListener)) {
        let listeners: Vec<_> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            f(listener.as_ref());
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use dlna_discovery::{DeviceKind, MEDIA_RENDERER_TARGET, MEDIA_SERVER_TARGET};
    use parking_lot::Mutex;

    pub(crate) fn device(udn: &str, name: &str, kind: DeviceKind) -> Device {
        let device_type = match kind {
            DeviceKind::MediaRenderer => MEDIA_RENDERER_TARGET,
            _ => MEDIA_SERVER_TARGET,
        };
        Device {
            id: udn.to_string(),
            name: name.to_string(),
            device_type: device_type.to_string(),
            kind,
            location: format!("http://10.0.0.9:8200/{}.xml", udn),
            base_url: format!("http://10.0.0.9:8200/{}.xml", udn),
            manufacturer: String::new(),
            model_name: String::new(),
            icons: Vec::new(),
            services: Vec::new(),
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl RegistryListener for Recorder {
        fn device_added(&self, device: &Arc<Device>) {
            self.events.lock().push(format!("added {}", device.id));
        }
        fn device_removed(&self, device: &Arc<Device>) {
            self.events.lock().push(format!("removed {}", device.id));
        }
        fn device_updated(&self, device: &Arc<Device>) {
            self.events.lock().push(format!("updated {}", device.id));
        }
        fn discovery_failed(&self, location: &str, _error: &DiscoveryError) {
            self.events.lock().push(format!("failed {}", location));
        }
    }

    #[test]
    fn test_add_update_remove_notifications() {
        let registry = Registry::new();
        let recorder = Arc::new(Recorder::default());
        registry.add_listener(recorder.clone());

        registry.add_device(device("uuid:a", "NAS", DeviceKind::MediaServer));
        registry.add_device(device("uuid:a", "NAS", DeviceKind::MediaServer));
        registry.add_device(device("uuid:a", "NAS renamed", DeviceKind::MediaServer));
        assert!(registry.remove_device("uuid:a").is_some());
        assert!(registry.remove_device("uuid:a").is_none());
        registry.report_discovery_failure("http://x/desc.xml", &DiscoveryError::Timeout);

        assert_eq!(
            *recorder.events.lock(),
            vec![
                "added uuid:a",
                "updated uuid:a",
                "removed uuid:a",
                "failed http://x/desc.xml"
            ]
        );
    }

    #[test]
    fn test_removed_listener_is_not_called() {
        let registry = Registry::new();
        let recorder = Arc::new(Recorder::default());
        let id = registry.add_listener(recorder.clone());

        assert!(registry.remove_listener(id));
        assert!(!registry.remove_listener(id));
        assert_eq!(registry.listener_count(), 0);

        registry.add_device(device("uuid:a", "NAS", DeviceKind::MediaServer));
        assert!(recorder.events.lock().is_empty());
        assert!(registry.contains("uuid:a"));
    }

    #[test]
    fn test_listener_may_read_registry_during_notification() {
        struct Reader(Arc<Registry>, Mutex<usize>);
        impl RegistryListener for Reader {
            fn device_added(&self, _device: &Arc<Device>) {
                *self.1.lock() = self.0.len();
            }
            fn device_removed(&self, _device: &Arc<Device>) {}
            fn device_updated(&self, _device: &Arc<Device>) {}
        }

        let registry = Arc::new(Registry::new());
        let reader = Arc::new(Reader(Arc::clone(&registry), Mutex::new(0)));
        registry.add_listener(reader.clone());
        registry.add_device(device("uuid:a", "NAS", DeviceKind::MediaServer));

        assert_eq!(*reader.1.lock(), 1);
    }

    #[test]
    fn test_concurrent_add_and_remove_notify_in_order() {
        let registry = Arc::new(Registry::new());
        let recorder = Arc::new(Recorder::default());
        registry.add_listener(recorder.clone());

        let adder = {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for _ in 0..500 {
                    registry.add_device(device("uuid:a", "NAS", DeviceKind::MediaServer));
                }
            })
        };
        let remover = {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                for _ in 0..500 {
                    registry.remove_device("uuid:a");
                }
            })
        };
        adder.join().unwrap();
        remover.join().unwrap();

        let events = recorder.events.lock();
        let mut present = false;
        for event in events.iter() {
            match event.as_str() {
                "added uuid:a" => assert!(!present, "added twice in a row"),
                "removed uuid:a" => assert!(present, "removed while absent"),
                other => panic!("unexpected event {}", other),
            }
            present = !present;
        }
        assert_eq!(present, registry.contains("uuid:a"));
    }

    #[test]
    fn test_devices_snapshot_is_sorted() {
        let registry = Registry::new();
        registry.add_device(device("uuid:2", "Zebra", DeviceKind::MediaServer));
        registry.add_device(device("uuid:1", "Alpha", DeviceKind::MediaRenderer));

        let names: Vec<_> = registry.devices().iter().map(|d| d.name.clone()).collect();
        assert_eq!(names, vec!["Alpha", "Zebra"]);
    }
}
