//! DIDL-Lite structures for ContentDirectory browse results

use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use crate::error::ParseResult;
use crate::xml_decode;

const DIDL_OPEN: &str = concat!(
    r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/""#,
    r#" xmlns:dc="http://purl.org/dc/elements/1.1/""#,
    r#" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/">"#,
);
const DIDL_CLOSE: &str = "</DIDL-Lite>";

/// DIDL-Lite document: an ordered list of containers and items.
///
/// ```xml
/// <DIDL-Lite xmlns:dc="http://purl.org/dc/elements/1.1/" ...>
///   <container id="64" parentID="0" childCount="4">
///     <dc:title>Browse Folders</dc:title>
///     <upnp:class>object.container.storageFolder</upnp:class>
///   </container>
///   <item id="64$0" parentID="64">
///     <dc:title>Song Title</dc:title>
///     <res protocolInfo="http-get:*:audio/mpeg:*" duration="0:03:58">uri</res>
///   </item>
/// </DIDL-Lite>
/// ```
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename = "DIDL-Lite")]
pub struct DidlLite {
    /// Children in document order
    #[serde(rename = "$value", default)]
    pub objects: Vec<DidlObject>,
}

impl DidlLite {
    /// Parse DIDL-Lite XML, as found (unescaped) in a Browse `Result`.
    ///
    /// Elements other than `container` and `item` are skipped.
    pub fn from_xml(xml: &str) -> ParseResult<Self> {
        if xml.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut didl: DidlLite = xml_decode::parse(xml)?;
        didl.objects.retain(|object| !matches!(object, DidlObject::Unknown));
        Ok(didl)
    }

    /// Containers in document order
    pub fn containers(&self) -> impl Iterator<Item = &DidlContainer> {
        self.objects.iter().filter_map(|object| match object {
            DidlObject::Container(container) => Some(container),
            _ => None,
        })
    }

    /// Items in document order
    pub fn items(&self) -> impl Iterator<Item = &DidlItem> {
        self.objects.iter().filter_map(|object| match object {
            DidlObject::Item(item) => Some(item),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// A direct child of the DIDL-Lite root
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum DidlObject {
    #[serde(rename = "container")]
    Container(DidlContainer),
    #[serde(rename = "item")]
    Item(DidlItem),
    /// `desc` and vendor extensions; removed by [`DidlLite::from_xml`]
    #[serde(other)]
    Unknown,
}

/// A browsable directory on a media server
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DidlContainer {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@parentID", default)]
    pub parent_id: String,

    /// Number of children, when the server reports it
    #[serde(rename = "@childCount", default, deserialize_with = "lenient_number")]
    pub child_count: Option<u32>,

    #[serde(rename = "@restricted", default)]
    pub restricted: Option<String>,

    #[serde(rename = "title", default, deserialize_with = "first_text")]
    pub title: Option<String>,

    /// UPnP class, e.g. `object.container.storageFolder`
    #[serde(rename = "class", default, deserialize_with = "first_text")]
    pub class: Option<String>,
}

impl DidlContainer {
    /// Title for display, falling back to the object id
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

/// A playable media object
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DidlItem {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@parentID", default)]
    pub parent_id: String,

    #[serde(rename = "@restricted", default)]
    pub restricted: Option<String>,

    #[serde(rename = "title", default, deserialize_with = "first_text")]
    pub title: Option<String>,

    /// Track creator/artist
    #[serde(rename = "creator", default, deserialize_with = "first_text")]
    pub creator: Option<String>,

    #[serde(rename = "album", default, deserialize_with = "first_text")]
    pub album: Option<String>,

    /// UPnP class, e.g. `object.item.audioItem.musicTrack`
    #[serde(rename = "class", default, deserialize_with = "first_text")]
    pub class: Option<String>,

    /// Cover art; servers may list several sizes
    #[serde(rename = "albumArtURI", default)]
    pub album_art: Vec<AlbumArt>,

    /// Alternative encodings of the media, best first
    #[serde(rename = "res", default)]
    pub resources: Vec<DidlResource>,
}

impl DidlItem {
    /// Title for display, falling back to the object id
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }

    /// URI of the first resource
    pub fn primary_uri(&self) -> Option<&str> {
        self.resources
            .iter()
            .map(|res| res.uri.trim())
            .find(|uri| !uri.is_empty())
    }

    /// First album art URI
    pub fn album_art_uri(&self) -> Option<&str> {
        self.album_art
            .iter()
            .map(|art| art.uri.trim())
            .find(|uri| !uri.is_empty())
    }

    /// Serialize this item as a standalone DIDL-Lite document, suitable as
    /// `CurrentURIMetaData` for a renderer.
    ///
    /// Only the fields a renderer needs for display are written, along with
    /// the primary resource.
    pub fn to_didl_xml(&self) -> String {
        let mut xml = String::from(DIDL_OPEN);
        xml.push_str(&format!(
            r#"<item id="{}" parentID="{}" restricted="{}">"#,
            escape(&self.id),
            escape(&self.parent_id),
            escape(self.restricted.as_deref().unwrap_or("1")),
        ));
        push_element(&mut xml, "dc:title", Some(self.display_title()));
        push_element(&mut xml, "dc:creator", self.creator.as_deref());
        push_element(&mut xml, "upnp:album", self.album.as_deref());
        push_element(&mut xml, "upnp:albumArtURI", self.album_art_uri());
        push_element(&mut xml, "upnp:class", self.class.as_deref());

        if let Some(res) = self.resources.iter().find(|res| !res.uri.trim().is_empty()) {
            xml.push_str("<res");
            if let Some(protocol_info) = &res.protocol_info {
                xml.push_str(&format!(r#" protocolInfo="{}""#, escape(protocol_info)));
            }
            if let Some(duration) = &res.duration {
                xml.push_str(&format!(r#" duration="{}""#, escape(duration)));
            }
            if let Some(size) = res.size {
                xml.push_str(&format!(r#" size="{}""#, size));
            }
            xml.push('>');
            xml.push_str(&escape(res.uri.trim()));
            xml.push_str("</res>");
        }

        xml.push_str("</item>");
        xml.push_str(DIDL_CLOSE);
        xml
    }
}

/// A `upnp:albumArtURI` element
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlbumArt {
    /// DLNA profile, e.g. `JPEG_TN`
    #[serde(rename = "@profileID", default)]
    pub profile_id: Option<String>,

    #[serde(rename = "$value", default)]
    pub uri: String,
}

/// A `res` element: one way of fetching an item's media
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DidlResource {
    #[serde(rename = "$value", default)]
    pub uri: String,

    /// e.g. `http-get:*:audio/mpeg:DLNA.ORG_PN=MP3`
    #[serde(rename = "@protocolInfo", default)]
    pub protocol_info: Option<String>,

    /// `H:MM:SS[.F]`
    #[serde(rename = "@duration", default)]
    pub duration: Option<String>,

    /// Size in bytes
    #[serde(rename = "@size", default, deserialize_with = "lenient_number")]
    pub size: Option<u64>,
}

impl DidlResource {
    /// MIME type from the third field of `protocolInfo`
    pub fn mime_type(&self) -> Option<&str> {
        self.protocol_info
            .as_deref()?
            .split(':')
            .nth(2)
            .filter(|mime| !mime.is_empty() && *mime != "*")
    }
}

/// First non-blank value of an element servers sometimes repeat
fn first_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Vec::<String>::deserialize(deserializer)?;
    Ok(values.into_iter().find(|value| !value.trim().is_empty()))
}

/// Numeric attribute; empty or malformed values count as absent
fn lenient_number<'de, D, N>(deserializer: D) -> Result<Option<N>, D::Error>
where
    D: Deserializer<'de>,
    N: FromStr,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|value| value.trim().parse().ok()))
}

fn push_element(xml: &mut String, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        xml.push_str(&format!("<{name}>{}</{name}>", escape(value)));
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
