//! ContentDirectory service operations
//!
//! Browsing the object hierarchy of a media server.

mod browse;

pub use browse::{BrowseFlag, BrowseOperation, BrowseRequest, BrowseResponse, ROOT_OBJECT_ID};
