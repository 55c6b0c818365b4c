//! RenderingControl service operations
//!
//! Volume control on media renderers.

mod get_volume;
mod set_volume;

pub use get_volume::{GetVolumeOperation, GetVolumeRequest, GetVolumeResponse};
pub use set_volume::{SetVolumeOperation, SetVolumeRequest, SetVolumeResponse, MAX_VOLUME};
