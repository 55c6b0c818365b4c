use std::fmt;

use dlna_api::ApiError;
use thiserror::Error;

use crate::entry::DirectoryId;
use crate::logging::LoggingError;

/// Failure of a single ContentDirectory browse
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrowseError {
    #[error("{0} does not offer a ContentDirectory service")]
    NoContentDirectory(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The control point shut down before the request ran
    #[error("Control point is shut down")]
    ShutDown,

    /// No worker thread could be started for the request
    #[error("Could not start browse: {0}")]
    Spawn(String),
}

/// Rejected navigation input. State is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("A device is already being browsed")]
    AlreadyBrowsing,

    #[error("No device is being browsed")]
    NotBrowsing,

    #[error("Index {index} is out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Playback precondition failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("No renderer selected")]
    NoRenderer,

    #[error("Playlist is empty")]
    EmptyPlaylist,

    #[error("Start index {index} is out of range for a playlist of {len}")]
    StartOutOfRange { index: usize, len: usize },

    #[error("'{0}' has no playable resource")]
    NoResource(String),

    #[error("{0} does not offer the {1} service")]
    MissingService(String, &'static str),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Malformed config {path}: {message}")]
    Malformed { path: String, message: String },

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("No configuration directory on this platform")]
    NoConfigDir,
}

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    #[error("Discovery error: {0}")]
    Discovery(#[from] dlna_discovery::DiscoveryError),

    #[error("Control point error: {0}")]
    ControlPoint(String),
}

/// Recoverable failures surfaced to the user. Nothing here is fatal and
/// nothing is retried automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    DiscoveryFailed { location: String, reason: String },
    BrowseFailed { directory: DirectoryId, reason: String },
    PlaybackFailed { reason: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::DiscoveryFailed { location, reason } => {
                write!(f, "Discovery failed for {}: {}", location, reason)
            }
            Notice::BrowseFailed { directory, reason } => {
                write!(f, "Could not list {}: {}", directory, reason)
            }
            Notice::PlaybackFailed { reason } => write!(f, "Playback failed: {}", reason),
        }
    }
}
