//! AVTransport service operations
//!
//! Loading media onto a renderer and controlling playback.

mod set_av_transport_uri;
mod play;
mod pause;
mod stop;

pub use set_av_transport_uri::{
    SetAvTransportUriOperation, SetAvTransportUriRequest, SetAvTransportUriResponse,
};
pub use play::{PlayOperation, PlayRequest, PlayResponse};
pub use pause::{PauseOperation, PauseRequest, PauseResponse};
pub use stop::{StopOperation, StopRequest, StopResponse};
