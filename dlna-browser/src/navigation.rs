//! Directory navigation within one media server
//!
//! The controller is a small state machine. In `DeviceList` mode the user
//! picks a server; in `Browsing` mode a stack of directory ids records the
//! path from the server root to the directory on screen. Listings are
//! fetched asynchronously and applied when their completion message is
//! drained from the UI queue.

use std::sync::Arc;

use dlna_discovery::Device;
use dlna_parser::{DidlItem, DidlLite};

use crate::browse::ContentBrowser;
use crate::config::StalePolicy;
use crate::entry::{DirectoryId, Entry};
use crate::error::{BrowseError, NavigationError, Notice};
use crate::playback::Playback;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    DeviceList,
    Browsing,
}

/// Whether `go_back` consumed the back action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    Handled,
    /// Already at the device list; the caller decides what back means
    NotHandled,
}

/// Result of selecting an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A container was opened and its listing requested
    Opened(DirectoryId),
    /// Items were handed to playback
    Played { start_index: usize, playlist_len: usize },
}

/// Identifies a browse request so its completion can be matched up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseTicket {
    /// Increases with every request
    pub generation: u64,
    /// Stack depth when the request was issued
    pub depth: usize,
    pub directory: DirectoryId,
}

pub struct NavigationController {
    mode: Mode,
    stack: Vec<DirectoryId>,
    current_device: Option<Arc<Device>>,
    entries: Vec<Entry>,
    generation: u64,
    stale_policy: StalePolicy,
    browser: Arc<dyn ContentBrowser>,
    playback: Arc<dyn Playback>,
}

impl NavigationController {
    pub fn new(browser: Arc<dyn ContentBrowser>, playback: Arc<dyn Playback>) -> Self {
        Self {
            mode: Mode::DeviceList,
            stack: Vec::new(),
            current_device: None,
            entries: Vec::new(),
            generation: 0,
            stale_policy: StalePolicy::default(),
            browser,
            playback,
        }
    }

    pub fn with_stale_policy(mut self, stale_policy: StalePolicy) -> Self {
        self.stale_policy = stale_policy;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Directory path from the root; empty in `DeviceList` mode
    pub fn stack(&self) -> &[DirectoryId] {
        &self.stack
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn current_directory(&self) -> Option<&DirectoryId> {
        self.stack.last()
    }

    pub fn current_device(&self) -> Option<&Arc<Device>> {
        self.current_device.as_ref()
    }

    /// Rows of the directory on screen
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Start browsing `device` at its root container
    pub fn select_device(&mut self, device: Arc<Device>) -> Result<(), NavigationError> {
        if self.mode != Mode::DeviceList {
            return Err(NavigationError::AlreadyBrowsing);
        }

        tracing::debug!("Browsing {}", device.name);
        self.mode = Mode::Browsing;
        self.current_device = Some(device);
        self.stack.push(DirectoryId::root());
        self.fetch();
        Ok(())
    }

    /// Open a container, or play an item.
    ///
    /// Playing hands every item on screen to playback, in display order,
    /// with the position of the selected item among them.
    pub fn select_entry(&mut self, index: usize) -> Result<Selection, NavigationError> {
        if self.mode != Mode::Browsing {
            return Err(NavigationError::NotBrowsing);
        }
        let entry = self.entries.get(index).ok_or(NavigationError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })?;

        match entry {
            Entry::Container(container) => {
                let directory = DirectoryId::new(container.id.clone());
                self.stack.push(directory.clone());
                self.fetch();
                Ok(Selection::Opened(directory))
            }
            Entry::Item(_) => {
                let (playlist, start_index) = self.playlist_from(index);
                let playlist_len = playlist.len();
                self.playback.play(playlist, start_index);
                Ok(Selection::Played {
                    start_index,
                    playlist_len,
                })
            }
        }
    }

    /// Pop one directory; leaving the root returns to the device list
    pub fn go_back(&mut self) -> BackOutcome {
        if self.mode == Mode::DeviceList {
            return BackOutcome::NotHandled;
        }

        self.stack.pop();
        if self.stack.is_empty() {
            self.mode = Mode::DeviceList;
            self.current_device = None;
            self.entries.clear();
        } else {
            self.fetch();
        }
        BackOutcome::Handled
    }

    /// Apply a completed browse.
    ///
    /// Success replaces the listing; failure keeps the previous listing and
    /// yields a notice. Results arriving in `DeviceList` mode are dropped.
    pub fn apply_browse_result(
        &mut self,
        ticket: BrowseTicket,
        result: Result<DidlLite, BrowseError>,
    ) -> Option<Notice> {
        if self.mode == Mode::DeviceList {
            tracing::debug!("Dropping listing of {} after leaving the device", ticket.directory);
            return None;
        }
        if self.stale_policy == StalePolicy::DiscardMismatched && ticket.generation != self.generation {
            tracing::debug!(
                "Discarding stale listing of {} (request {}, latest {})",
                ticket.directory,
                ticket.generation,
                self.generation
            );
            return None;
        }

        match result {
            Ok(didl) => {
                self.entries = Entry::listing(didl);
                None
            }
            Err(error) => {
                tracing::warn!("Browse of {} failed: {}", ticket.directory, error);
                Some(Notice::BrowseFailed {
                    directory: ticket.directory,
                    reason: error.to_string(),
                })
            }
        }
    }

    /// Request the listing of the directory on top of the stack
    fn fetch(&mut self) {
        let (Some(device), Some(directory)) = (&self.current_device, self.stack.last()) else {
            return;
        };
        self.generation += 1;
        let ticket = BrowseTicket {
            generation: self.generation,
            depth: self.stack.len(),
            directory: directory.clone(),
        };
        self.browser.browse(Arc::clone(device), ticket);
    }

    fn playlist_from(&self, selected: usize) -> (Vec<DidlItem>, usize) {
        let start_index = self.entries[..selected]
            .iter()
            .filter(|entry| entry.as_item().is_some())
            .count();
        let playlist = self
            .entries
            .iter()
            .filter_map(Entry::as_item)
            .cloned()
            .collect();
        (playlist, start_index)
    }
}
