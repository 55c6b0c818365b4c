//! The browser screen: a server tab and a renderer tab
//!
//! `MediaBrowser` is owned by one thread. It drains the UI queue, keeps
//! both device rosters current and routes user input to navigation or to
//! renderer selection.

use std::sync::Arc;
use std::time::Duration;

use dlna_api::DlnaClient;
use dlna_discovery::{Device, DeviceKind};

use crate::browse::ControlPointBrowser;
use crate::config::BrowserConfig;
use crate::control_point::{ControlPoint, UpnpControlPoint};
use crate::dispatch::{ui_channel, UiMessage, UiQueue};
use crate::entry::DisplayEntry;
use crate::error::{BrowserError, NavigationError, Notice};
use crate::navigation::{BackOutcome, Mode, NavigationController, Selection};
use crate::playback::RendererPlayback;
use crate::roster::DeviceRoster;
use crate::session::DiscoverySession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Servers,
    Renderers,
}

/// What a selection did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Started browsing a server
    Browsing(Arc<Device>),
    /// Navigated into a container or handed items to playback
    Navigated(Selection),
    RendererSelected(Arc<Device>),
}

pub struct MediaBrowser {
    session: DiscoverySession,
    queue: UiQueue,
    servers: DeviceRoster,
    renderers: DeviceRoster,
    navigation: NavigationController,
    playback: Arc<RendererPlayback>,
    active_tab: Tab,
}

impl MediaBrowser {
    /// Start a UPnP control point with `config` and open a browser on it
    pub fn start(config: BrowserConfig) -> Result<Self, BrowserError> {
        let control_point: Arc<dyn ControlPoint> = Arc::new(UpnpControlPoint::new(&config)?);
        Ok(Self::new(control_point, &config))
    }

    /// Open a browser over an existing control point
    pub fn new(control_point: Arc<dyn ControlPoint>, config: &BrowserConfig) -> Self {
        let (sender, queue) = ui_channel();

        let playback = Arc::new(RendererPlayback::new(
            DlnaClient::with_timeouts(config.connect_timeout(), config.read_timeout()),
            sender.clone(),
            config.volume_step,
        ));
        let content = Arc::new(ControlPointBrowser::new(Arc::clone(&control_point), sender.clone()));
        let navigation = NavigationController::new(content, playback.clone())
            .with_stale_policy(config.stale_policy);

        let (session, known) = DiscoverySession::open(control_point, sender);
        let mut servers = DeviceRoster::new(DeviceKind::MediaServer);
        let mut renderers = DeviceRoster::new(DeviceKind::MediaRenderer);
        servers.seed(&known);
        renderers.seed(&known);

        Self {
            session,
            queue,
            servers,
            renderers,
            navigation,
            playback,
            active_tab: Tab::Servers,
        }
    }

    /// Apply everything queued so far and return the notices it produced
    pub fn process_pending(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Some(message) = self.queue.try_recv() {
            notices.extend(self.handle(message));
        }
        notices
    }

    /// Wait up to `timeout` for the first message, then drain the rest
    pub fn wait_pending(&mut self, timeout: Duration) -> Vec<Notice> {
        let mut notices = Vec::new();
        if let Some(message) = self.queue.recv_timeout(timeout) {
            notices.extend(self.handle(message));
            notices.extend(self.process_pending());
        }
        notices
    }

    fn handle(&mut self, message: UiMessage) -> Option<Notice> {
        match message {
            UiMessage::DeviceAdded(device) => {
                self.servers.add(&device);
                self.renderers.add(&device);
                None
            }
            UiMessage::DeviceRemoved(device) => {
                self.servers.remove(&device);
                self.renderers.remove(&device);
                if self.playback.forget_renderer(&device.id) {
                    tracing::info!("Selected renderer {} left the network", device.name);
                }
                None
            }
            UiMessage::DeviceUpdated(device) => {
                self.servers.update(&device);
                self.renderers.update(&device);
                None
            }
            UiMessage::DiscoveryFailed { location, reason } => {
                Some(Notice::DiscoveryFailed { location, reason })
            }
            UiMessage::BrowseFinished { ticket, result } => {
                self.navigation.apply_browse_result(ticket, result)
            }
            UiMessage::PlaybackFailed { reason } => Some(Notice::PlaybackFailed { reason }),
        }
    }

    /// Activate row `index` of `tab`.
    ///
    /// On the server tab this opens a server from the device list, or an
    /// entry while browsing. Playing an item switches to the renderer tab.
    pub fn select(&mut self, tab: Tab, index: usize) -> Result<Activation, BrowserError> {
        self.active_tab = tab;
        match tab {
            Tab::Servers if self.navigation.mode() == Mode::DeviceList => {
                let device = Arc::clone(self.servers.get(index).ok_or(
                    NavigationError::IndexOutOfRange {
                        index,
                        len: self.servers.len(),
                    },
                )?);
                self.navigation.select_device(Arc::clone(&device))?;
                Ok(Activation::Browsing(device))
            }
            Tab::Servers => {
                let selection = self.navigation.select_entry(index)?;
                if matches!(selection, Selection::Played { .. }) {
                    self.active_tab = Tab::Renderers;
                }
                Ok(Activation::Navigated(selection))
            }
            Tab::Renderers => {
                let device = Arc::clone(self.renderers.get(index).ok_or(
                    NavigationError::IndexOutOfRange {
                        index,
                        len: self.renderers.len(),
                    },
                )?);
                self.playback.select_renderer(Arc::clone(&device));
                Ok(Activation::RendererSelected(device))
            }
        }
    }

    /// Back on the server tab walks up the directory stack; anywhere else
    /// it is left to the caller
    pub fn back(&mut self) -> BackOutcome {
        match self.active_tab {
            Tab::Servers => self.navigation.go_back(),
            Tab::Renderers => BackOutcome::NotHandled,
        }
    }

    /// Search the network again
    pub fn search(&self) {
        self.session.refresh();
    }

    pub fn change_volume(&self, up: bool) -> Result<(), BrowserError> {
        Ok(self.playback.change_volume(up)?)
    }

    /// Pause the selected renderer
    pub fn pause(&self) -> Result<(), BrowserError> {
        Ok(self.playback.halt(false)?)
    }

    pub fn stop(&self) -> Result<(), BrowserError> {
        Ok(self.playback.halt(true)?)
    }

    /// Rows of `tab` as currently shown: devices, or entries while browsing
    pub fn rows(&self, tab: Tab) -> Vec<(String, Option<String>)> {
        match tab {
            Tab::Servers if self.navigation.mode() == Mode::Browsing => self
                .navigation
                .entries()
                .iter()
                .map(|entry| (entry.display_name(), entry.icon_uri()))
                .collect(),
            Tab::Servers => self.servers.rows(),
            Tab::Renderers => self.renderers.rows(),
        }
    }

    pub fn active_tab(&self) -> Tab {
        self.active_tab
    }

    pub fn set_active_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
    }

    pub fn servers(&self) -> &DeviceRoster {
        &self.servers
    }

    pub fn renderers(&self) -> &DeviceRoster {
        &self.renderers
    }

    pub fn navigation(&self) -> &NavigationController {
        &self.navigation
    }

    pub fn selected_renderer(&self) -> Option<Arc<Device>> {
        self.playback.renderer()
    }

    /// Whether a picked item is waiting for a renderer to be selected
    pub fn has_pending_playback(&self) -> bool {
        self.playback.has_pending()
    }
}
