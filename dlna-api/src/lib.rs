//! Typed UPnP media operations
//!
//! This crate provides a type-safe, trait-based API for browsing DLNA
//! media servers and controlling renderers. It uses the private
//! `soap-client` crate for low-level SOAP communication and
//! `dlna-parser` for DIDL-Lite results.
//!
//! ```rust,no_run
//! use dlna_api::DlnaClient;
//!
//! # fn demo(server: &dlna_discovery::Device) -> dlna_api::Result<()> {
//! let client = DlnaClient::new();
//! let endpoint = DlnaClient::endpoint_for(server, dlna_api::Service::ContentDirectory)?;
//! let root = client.browse_all(endpoint, "0", 200)?;
//! for container in root.containers() {
//!     println!("[{}] {}", container.id, container.display_title());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod operation;
pub mod operations;
pub mod service;

pub use client::{DlnaClient, DEFAULT_MAX_BROWSE_ENTRIES};
pub use error::{ApiError, Result};
pub use operation::{UPnPOperation, Validate, ValidationError};
pub use service::Service;
