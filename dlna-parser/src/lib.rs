//! # dlna-parser
//!
//! Parsing of DIDL-Lite documents, the metadata format UPnP media servers
//! return from ContentDirectory `Browse` and renderers accept as
//! `CurrentURIMetaData`.
//!
//! ```rust
//! use dlna_parser::{DidlLite, DidlObject};
//!
//! let xml = r#"<DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/">
//!   <container id="1" parentID="0" childCount="2"><dc:title>Music</dc:title></container>
//! </DIDL-Lite>"#;
//!
//! let didl = DidlLite::from_xml(xml)?;
//! assert!(matches!(&didl.objects[0], DidlObject::Container(c) if c.id == "1"));
//! # Ok::<(), dlna_parser::ParseError>(())
//! ```

pub mod error;
pub mod didl;
pub mod xml_decode;

pub use error::{ParseError, ParseResult};
pub use didl::{AlbumArt, DidlContainer, DidlItem, DidlLite, DidlObject, DidlResource};
