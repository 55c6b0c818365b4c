//! UPnP operations organized by service

pub mod content_directory;
pub mod av_transport;
pub mod rendering_control;

pub use content_directory::BrowseOperation;
pub use av_transport::{PauseOperation, PlayOperation, SetAvTransportUriOperation, StopOperation};
pub use rendering_control::{GetVolumeOperation, SetVolumeOperation};
