//! Network side: discovery, device announcements and browse requests
//!
//! Everything here runs on background threads. Results reach the UI
//! thread through registry listeners and browse callbacks, never by
//! touching UI state directly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use dlna_api::{DlnaClient, Service};
use dlna_discovery::{
    DescriptionClient, Device, DeviceEvent, DiscoveryConfig, Notification, NotifyListener,
};
use dlna_parser::DidlLite;
use parking_lot::Mutex;

use crate::config::BrowserConfig;
use crate::entry::DirectoryId;
use crate::error::{BrowseError, BrowserError};
use crate::registry::Registry;

const NOTIFY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Invoked exactly once, on a background thread, with the full listing
pub type BrowseCallback = Box<dyn FnOnce(Result<DidlLite, BrowseError>) + Send + 'static>;

/// A UPnP control point as the browser needs it
pub trait ControlPoint: Send + Sync {
    /// Start an asynchronous search; found devices land in the registry
    fn search(&self);

    fn registry(&self) -> Arc<Registry>;

    /// List the direct children of `directory` on `device` in the
    /// background and hand the outcome to `callback`
    fn execute_browse(&self, device: &Device, directory: &DirectoryId, callback: BrowseCallback);
}

/// Control point backed by SSDP discovery and SOAP
pub struct UpnpControlPoint {
    registry: Arc<Registry>,
    client: DlnaClient,
    discovery: DiscoveryConfig,
    page_size: u32,
    shutdown: Arc<AtomicBool>,
    notify_worker: Mutex<Option<JoinHandle<()>>>,
}

impl UpnpControlPoint {
    /// Create a control point and, if configured, start listening for
    /// device announcements.
    ///
    /// Failing to bind the SSDP port is not fatal: explicit searches still
    /// work.
    pub fn new(config: &BrowserConfig) -> Result<Self, BrowserError> {
        config.validate()?;

        let control_point = Self {
            registry: Arc::new(Registry::new()),
            client: DlnaClient::with_timeouts(config.connect_timeout(), config.read_timeout()),
            discovery: config.discovery_config(),
            page_size: config.browse_page_size,
            shutdown: Arc::new(AtomicBool::new(false)),
            notify_worker: Mutex::new(None),
        };

        if config.listen_for_notifications {
            control_point.start_notify_listener(config.discovery_timeout())?;
        }
        Ok(control_point)
    }

    fn start_notify_listener(&self, fetch_timeout: Duration) -> Result<(), BrowserError> {
        let listener = match NotifyListener::bind(NOTIFY_POLL_INTERVAL) {
            Ok(listener) => listener,
            Err(error) => {
                tracing::warn!("Not listening for announcements: {}", error);
                return Ok(());
            }
        };
        let descriptions = DescriptionClient::new(fetch_timeout)?;
        let registry = Arc::clone(&self.registry);
        let shutdown = Arc::clone(&self.shutdown);

        let handle = std::thread::Builder::new()
            .name("dlna-notify".to_string())
            .spawn(move || notify_loop(listener, descriptions, registry, shutdown))
            .map_err(|e| BrowserError::ControlPoint(format!("Failed to spawn notify thread: {}", e)))?;

        *self.notify_worker.lock() = Some(handle);
        Ok(())
    }

    /// Stop background listeners. Searches and browses in flight finish on
    /// their own; browse callbacks issued afterwards receive
    /// [`BrowseError::ShutDown`].
    pub fn shutdown(&self) {
        if self.shutdown.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(handle) = self.notify_worker.lock().take() {
            if handle.join().is_err() {
                tracing::error!("Notify thread panicked");
            }
        }
        tracing::debug!("Control point shut down");
    }

    fn is_shut_down(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }
}

impl ControlPoint for UpnpControlPoint {
    fn search(&self) {
        if self.is_shut_down() {
            return;
        }
        let registry = Arc::clone(&self.registry);
        let config = self.discovery.clone();

        let spawned = std::thread::Builder::new()
            .name("dlna-search".to_string())
            .spawn(move || {
                tracing::debug!("Searching for {:?}", config.search_targets);
                for event in dlna_discovery::get_iter_with_config(config) {
                    match event {
                        DeviceEvent::Found(device) => {
                            registry.add_device(device);
                        }
                        DeviceEvent::Failed { location, error } => {
                            registry.report_discovery_failure(&location, &error);
                        }
                    }
                }
            });
        if let Err(e) = spawned {
            tracing::error!("Failed to spawn search thread: {}", e);
        }
    }

    fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    fn execute_browse(&self, device: &Device, directory: &DirectoryId, callback: BrowseCallback) {
        if self.is_shut_down() {
            callback(Err(BrowseError::ShutDown));
            return;
        }

        let endpoint = match DlnaClient::endpoint_for(device, Service::ContentDirectory) {
            Ok(endpoint) => endpoint.clone(),
            Err(_) => {
                callback(Err(BrowseError::NoContentDirectory(device.name.clone())));
                return;
            }
        };
        let client = self.client.clone();
        let page_size = self.page_size;
        let object_id = directory.as_str().to_string();

        let fetch = move || {
            tracing::debug!("Browsing {} at {}", object_id, endpoint.control_url);
            client
                .browse_all(&endpoint, &object_id, page_size)
                .map_err(BrowseError::from)
        };
        let spawn = |job: BackgroundJob| {
            std::thread::Builder::new()
                .name("dlna-browse".to_string())
                .spawn(job)
                .map(drop)
        };
        deliver_in_background(spawn, fetch, callback);
    }
}

type BackgroundJob = Box<dyn FnOnce() + Send + 'static>;

/// Run `fetch` on a thread made by `spawn` and hand the result to
/// `callback`. When no thread can be made the callback gets
/// [`BrowseError::Spawn`] instead, so it still runs exactly once.
fn deliver_in_background<S, F>(spawn: S, fetch: F, callback: BrowseCallback)
where
    S: FnOnce(BackgroundJob) -> std::io::Result<()>,
    F: FnOnce() -> Result<DidlLite, BrowseError> + Send + 'static,
{
    let slot = Arc::new(Mutex::new(Some(callback)));
    let worker_slot = Arc::clone(&slot);
    let job: BackgroundJob = Box::new(move || {
        let result = fetch();
        let callback = worker_slot.lock().take();
        if let Some(callback) = callback {
            callback(result);
        }
    });

    if let Err(error) = spawn(job) {
        tracing::error!("Failed to spawn browse thread: {}", error);
        let callback = slot.lock().take();
        if let Some(callback) = callback {
            callback(Err(BrowseError::Spawn(error.to_string())));
        }
    }
}

impl Drop for UpnpControlPoint {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Keep the registry in step with `ssdp:alive` and `ssdp:byebye`
fn notify_loop(
    mut listener: NotifyListener,
    descriptions: DescriptionClient,
    registry: Arc<Registry>,
    shutdown: Arc<AtomicBool>,
) {
    tracing::debug!("Listening for SSDP announcements");

    while !shutdown.load(Ordering::SeqCst) {
        let notification = match listener.recv() {
            Ok(Some(notification)) => notification,
            Ok(None) => continue,
            Err(error) => {
                tracing::warn!("Announcement listener stopped: {}", error);
                return;
            }
        };

        match notification {
            Notification::Alive { ref location, .. } => {
                if !is_media_device_type(notification.nt()) || registry.contains(notification.udn()) {
                    continue;
                }
                match descriptions.fetch_devices(location) {
                    Ok(devices) => {
                        for device in devices {
                            registry.add_device(device);
                        }
                    }
                    Err(error) => registry.report_discovery_failure(location, &error),
                }
            }
            Notification::ByeBye { .. } => {
                registry.remove_device(notification.udn());
            }
        }
    }
}

fn is_media_device_type(nt: &str) -> bool {
    nt.contains(":device:MediaServer:") || nt.contains(":device:MediaRenderer:")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::device;
    use dlna_discovery::{DeviceKind, ServiceEndpoint};
    use std::sync::mpsc;

    fn quiet_config() -> BrowserConfig {
        BrowserConfig {
            listen_for_notifications: false,
            ..BrowserConfig::default()
        }
    }

    #[test]
    fn test_media_device_types() {
        assert!(is_media_device_type("urn:schemas-upnp-org:device:MediaServer:1"));
        assert!(is_media_device_type("urn:schemas-upnp-org:device:MediaRenderer:2"));
        assert!(!is_media_device_type("upnp:rootdevice"));
        assert!(!is_media_device_type("urn:schemas-upnp-org:service:ContentDirectory:1"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = BrowserConfig {
            browse_page_size: 0,
            ..quiet_config()
        };
        assert!(matches!(UpnpControlPoint::new(&config), Err(BrowserError::Config(_))));
    }

    #[test]
    fn test_browse_without_content_directory() {
        let control_point = UpnpControlPoint::new(&quiet_config()).unwrap();
        let (tx, rx) = mpsc::channel();

        control_point.execute_browse(
            &device("uuid:r", "TV", DeviceKind::MediaRenderer),
            &DirectoryId::root(),
            Box::new(move |result| tx.send(result).unwrap()),
        );

        assert_eq!(
            rx.recv_timeout(Duration::from_secs(1)).unwrap(),
            Err(BrowseError::NoContentDirectory("TV".to_string()))
        );
    }

    #[test]
    fn test_browse_after_shutdown() {
        let control_point = UpnpControlPoint::new(&quiet_config()).unwrap();
        control_point.shutdown();
        let (tx, rx) = mpsc::channel();

        control_point.execute_browse(
            &device("uuid:s", "NAS", DeviceKind::MediaServer),
            &DirectoryId::root(),
            Box::new(move |result| tx.send(result).unwrap()),
        );

        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), Err(BrowseError::ShutDown));
    }

    #[test]
    fn test_spawn_failure_still_completes_browse() {
        let (tx, rx) = mpsc::channel();
        let refuse = |_job: BackgroundJob| Err(std::io::Error::new(std::io::ErrorKind::WouldBlock, "no threads left"));

        deliver_in_background(
            refuse,
            || panic!("fetch must not run without a thread"),
            Box::new(move |result| tx.send(result).unwrap()),
        );

        assert_eq!(rx.try_recv().unwrap(), Err(BrowseError::Spawn("no threads left".to_string())));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_background_delivery_runs_callback_once() {
        let (tx, rx) = mpsc::channel();
        let inline = |job: BackgroundJob| {
            job();
            Ok(())
        };

        deliver_in_background(
            inline,
            || Err(BrowseError::ShutDown),
            Box::new(move |result| tx.send(result).unwrap()),
        );

        assert_eq!(rx.try_recv().unwrap(), Err(BrowseError::ShutDown));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_browse_runs_in_background() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/ctl/ContentDir")
            .with_body(
                r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><u:BrowseResponse xmlns:u="urn:schemas-upnp-org:service:ContentDirectory:1"><Result>&lt;DIDL-Lite&gt;&lt;container id="64" parentID="0"&gt;&lt;dc:title&gt;Browse Folders&lt;/dc:title&gt;&lt;/container&gt;&lt;/DIDL-Lite&gt;</Result><NumberReturned>1</NumberReturned><TotalMatches>1</TotalMatches><UpdateID>1</UpdateID></u:BrowseResponse></s:Body></s:Envelope>"#,
            )
            .create();

        let mut nas = device("uuid:s", "NAS", DeviceKind::MediaServer);
        nas.services.push(ServiceEndpoint {
            service_type: "urn:schemas-upnp-org:service:ContentDirectory:1".to_string(),
            service_id: "urn:upnp-org:serviceId:ContentDirectory".to_string(),
            control_url: format!("{}/ctl/ContentDir", server.url()),
            event_sub_url: String::new(),
        });

        let control_point = UpnpControlPoint::new(&quiet_config()).unwrap();
        let (tx, rx) = mpsc::channel();
        control_point.execute_browse(
            &nas,
            &DirectoryId::root(),
            Box::new(move |result| tx.send((std::thread::current().name().map(str::to_string), result)).unwrap()),
        );

        let (thread, result) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(thread.as_deref(), Some("dlna-browse"));
        let listing = result.unwrap();
        assert_eq!(listing.containers().next().unwrap().display_title(), "Browse Folders");
    }
}
