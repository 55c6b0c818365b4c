//! Displayable rows: devices in the device lists, containers and items
//! while browsing.

use std::fmt;

use dlna_discovery::Device;
use dlna_parser::{DidlContainer, DidlItem, DidlLite};

/// ContentDirectory object id of a browsable container
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DirectoryId(String);

impl DirectoryId {
    /// The root container, `"0"` on every ContentDirectory
    pub fn root() -> Self {
        Self(dlna_api::operations::content_directory::ROOT_OBJECT_ID.to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == dlna_api::operations::content_directory::ROOT_OBJECT_ID
    }
}

impl fmt::Display for DirectoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DirectoryId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One row of a directory listing
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Container(DidlContainer),
    Item(DidlItem),
}

impl Entry {
    /// Build the rows for a listing: containers first, then items, each in
    /// document order
    pub fn listing(didl: DidlLite) -> Vec<Entry> {
        let (containers, items): (Vec<_>, Vec<_>) = didl
            .objects
            .into_iter()
            .filter_map(|object| match object {
                dlna_parser::DidlObject::Container(c) => Some(Entry::Container(c)),
                dlna_parser::DidlObject::Item(i) => Some(Entry::Item(i)),
                dlna_parser::DidlObject::Unknown => None,
            })
            .partition(Entry::is_container);
        containers.into_iter().chain(items).collect()
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Entry::Container(_))
    }

    pub fn as_item(&self) -> Option<&DidlItem> {
        match self {
            Entry::Item(item) => Some(item),
            Entry::Container(_) => None,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Entry::Container(c) => &c.id,
            Entry::Item(i) => &i.id,
        }
    }
}

/// How a row is rendered
pub trait DisplayEntry {
    fn display_name(&self) -> String;

    /// Icon to show next to the name, if any
    fn icon_uri(&self) -> Option<String> {
        None
    }
}

impl DisplayEntry for Entry {
    fn display_name(&self) -> String {
        match self {
            Entry::Container(c) => c.display_title().to_string(),
            Entry::Item(i) => i.display_title().to_string(),
        }
    }
}

impl DisplayEntry for Device {
    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn icon_uri(&self) -> Option<String> {
        Device::icon_uri(self)
    }
}
