//! Hand-off of items to a media renderer

use std::sync::Arc;

use dlna_api::operations::av_transport::{
    PauseOperation, PauseRequest, PlayOperation, PlayRequest, SetAvTransportUriOperation,
    SetAvTransportUriRequest, StopOperation, StopRequest,
};
use dlna_api::operations::rendering_control::{
    GetVolumeOperation, GetVolumeRequest, SetVolumeOperation, SetVolumeRequest, MAX_VOLUME,
};
use dlna_api::{DlnaClient, Service};
use dlna_discovery::Device;
use dlna_parser::DidlItem;
use parking_lot::Mutex;

use crate::dispatch::{UiMessage, UiSender};
use crate::error::PlaybackError;

/// Receives the playlist when the user picks an item.
///
/// `start_index` is the position of the picked item within `playlist`.
/// The hand-off always succeeds; whatever goes wrong afterwards is reported
/// to the UI queue.
pub trait Playback: Send + Sync {
    fn play(&self, playlist: Vec<DidlItem>, start_index: usize);
}

/// Plays on the renderer the user selected.
///
/// A playlist handed over before any renderer is selected is held and
/// started by [`RendererPlayback::select_renderer`]. SOAP calls run on a
/// short-lived thread; failures come back to the UI queue as
/// [`UiMessage::PlaybackFailed`].
pub struct RendererPlayback {
    client: DlnaClient,
    sender: UiSender,
    renderer: Mutex<Option<Arc<Device>>>,
    pending: Mutex<Option<(Vec<DidlItem>, usize)>>,
    volume_step: u16,
}

impl RendererPlayback {
    pub fn new(client: DlnaClient, sender: UiSender, volume_step: u16) -> Self {
        Self {
            client,
            sender,
            renderer: Mutex::new(None),
            pending: Mutex::new(None),
            volume_step,
        }
    }

    /// Select the renderer and start any playlist waiting for one
    pub fn select_renderer(&self, renderer: Arc<Device>) {
        tracing::info!("Renderer selected: {}", renderer.name);
        let mut selected = self.renderer.lock();
        *selected = Some(Arc::clone(&renderer));
        let pending = self.pending.lock().take();
        drop(selected);

        if let Some((playlist, start_index)) = pending {
            tracing::info!("Starting held playlist on {}", renderer.name);
            let result = self.start(&renderer, &playlist, start_index);
            self.report(result);
        }
    }

    /// Whether a playlist is waiting for a renderer
    pub fn has_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    pub fn renderer(&self) -> Option<Arc<Device>> {
        self.renderer.lock().clone()
    }

    /// Forget the renderer if it is `udn`, e.g. after it left the network
    pub fn forget_renderer(&self, udn: &str) -> bool {
        let mut renderer = self.renderer.lock();
        if renderer.as_ref().is_some_and(|device| device.id == udn) {
            *renderer = None;
            return true;
        }
        false
    }

    /// Step the renderer volume up or down by the configured amount
    pub fn change_volume(&self, up: bool) -> Result<(), PlaybackError> {
        let renderer = self.require(Service::RenderingControl)?;
        let client = self.client.clone();
        let step = self.volume_step;

        self.spawn("volume", move || {
            let current = client
                .execute_on::<GetVolumeOperation>(&renderer, &GetVolumeRequest::default())?
                .current_volume;
            let target = if up {
                current.saturating_add(step).min(MAX_VOLUME)
            } else {
                current.saturating_sub(step)
            };
            tracing::debug!("Volume {} -> {} on {}", current, target, renderer.name);
            client.execute_on::<SetVolumeOperation>(&renderer, &SetVolumeRequest::master(target))?;
            Ok(())
        });
        Ok(())
    }

    /// Pause, or stop when `stop` is set, whatever the renderer is playing
    pub fn halt(&self, stop: bool) -> Result<(), PlaybackError> {
        let renderer = self.require(Service::AVTransport)?;
        let client = self.client.clone();

        self.spawn(if stop { "stop" } else { "pause" }, move || {
            if stop {
                client.execute_on::<StopOperation>(&renderer, &StopRequest::default())?;
            } else {
                client.execute_on::<PauseOperation>(&renderer, &PauseRequest::default())?;
            }
            Ok(())
        });
        Ok(())
    }

    fn require(&self, service: Service) -> Result<Arc<Device>, PlaybackError> {
        let renderer = self.renderer().ok_or(PlaybackError::NoRenderer)?;
        DlnaClient::endpoint_for(&renderer, service)
            .map_err(|_| PlaybackError::MissingService(renderer.name.clone(), service.name()))?;
        Ok(renderer)
    }

    /// SetAVTransportURI for the start item, then Play
    fn start(&self, renderer: &Arc<Device>, playlist: &[DidlItem], start_index: usize) -> Result<(), PlaybackError> {
        let item = &playlist[start_index];
        let uri = item
            .primary_uri()
            .ok_or_else(|| PlaybackError::NoResource(item.display_title().to_string()))?
            .to_string();
        DlnaClient::endpoint_for(renderer, Service::AVTransport)
            .map_err(|_| PlaybackError::MissingService(renderer.name.clone(), Service::AVTransport.name()))?;
        let metadata = item.to_didl_xml();
        let renderer = Arc::clone(renderer);
        let client = self.client.clone();

        tracing::info!("Playing '{}' on {}", item.display_title(), renderer.name);
        self.spawn("play", move || {
            client.execute_on::<SetAvTransportUriOperation>(
                &renderer,
                &SetAvTransportUriRequest::new(uri, metadata),
            )?;
            client.execute_on::<PlayOperation>(&renderer, &PlayRequest::default())?;
            Ok(())
        });
        Ok(())
    }

    fn report(&self, result: Result<(), PlaybackError>) {
        if let Err(error) = result {
            tracing::warn!("Playback refused: {}", error);
            self.sender.send(UiMessage::PlaybackFailed {
                reason: error.to_string(),
            });
        }
    }

    fn spawn<F>(&self, what: &'static str, task: F)
    where
        F: FnOnce() -> dlna_api::Result<()> + Send + 'static,
    {
        let sender = self.sender.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("dlna-{}", what))
            .spawn(move || {
                if let Err(error) = task() {
                    tracing::warn!("Renderer {} failed: {}", what, error);
                    sender.send(UiMessage::PlaybackFailed {
                        reason: error.to_string(),
                    });
                }
            });
        if let Err(error) = spawned {
            tracing::error!("Failed to spawn {} thread: {}", what, error);
            self.sender.send(UiMessage::PlaybackFailed {
                reason: error.to_string(),
            });
        }
    }
}

impl Playback for RendererPlayback {
    fn play(&self, playlist: Vec<DidlItem>, start_index: usize) {
        if playlist.is_empty() {
            return self.report(Err(PlaybackError::EmptyPlaylist));
        }
        if start_index >= playlist.len() {
            return self.report(Err(PlaybackError::StartOutOfRange {
                index: start_index,
                len: playlist.len(),
            }));
        }

        let selected = self.renderer.lock();
        let renderer = selected.as_ref().map(Arc::clone);
        match renderer {
            Some(renderer) => {
                drop(selected);
                let result = self.start(&renderer, &playlist, start_index);
                self.report(result);
            }
            None => {
                tracing::info!("No renderer selected, holding {} items", playlist.len());
                *self.pending.lock() = Some((playlist, start_index));
            }
        }
    }
}
