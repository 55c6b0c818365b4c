//! # DLNA Browser
//!
//! Browse UPnP/DLNA media servers on the local network and hand playable
//! items to a media renderer.
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use dlna_browser::{BrowserConfig, MediaBrowser, Tab};
//!
//! fn main() -> Result<(), dlna_browser::BrowserError> {
//!     let mut browser = MediaBrowser::start(BrowserConfig::load()?)?;
//!
//!     // Devices and listings arrive on background threads
//!     for notice in browser.wait_pending(Duration::from_secs(3)) {
//!         eprintln!("{}", notice);
//!     }
//!     for (name, _icon) in browser.rows(Tab::Servers) {
//!         println!("{}", name);
//!     }
//!
//!     browser.select(Tab::Servers, 0)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Threading
//!
//! Discovery, browsing and playback requests run on background threads.
//! Everything they produce is posted to a single UI queue; only the thread
//! owning [`MediaBrowser`] (or a [`UiQueue`]) applies it to rosters and
//! navigation state.
//!
//! ```text
//! dlna-browser (MediaBrowser, navigation, rosters)
//!     ↓
//! ControlPoint (registry, search, NOTIFY)
//!     ↓
//! dlna-api (Browse, AVTransport, RenderingControl)  dlna-discovery (SSDP)
//!     ↓
//! soap-client
//! ```

pub use browse::{ContentBrowser, ControlPointBrowser};
pub use browser::{Activation, MediaBrowser, Tab};
pub use config::{BrowserConfig, StalePolicy};
pub use control_point::{BrowseCallback, ControlPoint, UpnpControlPoint};
pub use dispatch::{ui_channel, UiForwarder, UiMessage, UiQueue, UiSender};
pub use entry::{DirectoryId, DisplayEntry, Entry};
pub use error::{BrowseError, BrowserError, ConfigError, NavigationError, Notice, PlaybackError};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
pub use navigation::{BackOutcome, BrowseTicket, Mode, NavigationController, Selection};
pub use playback::{Playback, RendererPlayback};
pub use registry::{ListenerId, Registry, RegistryListener};
pub use roster::DeviceRoster;
pub use session::DiscoverySession;

// Re-export the device and listing types callers handle directly
pub use dlna_discovery::{Device, DeviceKind};
pub use dlna_parser::{DidlContainer, DidlItem, DidlLite};

mod browse;
mod browser;
mod config;
mod control_point;
mod dispatch;
mod entry;
mod error;
pub mod logging;
mod navigation;
mod playback;
mod registry;
mod roster;
mod session;
