//! End-to-end browsing against a mock media server and renderer

use std::sync::Arc;
use std::time::{Duration, Instant};

use dlna_api::DlnaClient;
use dlna_browser::{
    Activation, BackOutcome, BrowseCallback, BrowseError, BrowserConfig, ControlPoint, Device,
    DeviceKind, DirectoryId, Mode, Notice, Registry, Selection, MediaBrowser, Tab,
};
use dlna_discovery::ServiceEndpoint;
use mockito::Matcher;

/// Browses synchronously on the calling thread
struct InlineControlPoint {
    registry: Arc<Registry>,
    client: DlnaClient,
}

impl ControlPoint for InlineControlPoint {
    fn search(&self) {}

    fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    fn execute_browse(&self, device: &Device, directory: &DirectoryId, callback: BrowseCallback) {
        let result = match device.find_service("ContentDirectory") {
            Some(endpoint) => self
                .client
                .browse_all(endpoint, directory.as_str(), 50)
                .map_err(BrowseError::from),
            None => Err(BrowseError::NoContentDirectory(device.name.clone())),
        };
        callback(result);
    }
}

fn media_device(udn: &str, name: &str, kind: DeviceKind, base: &str, services: &[&str]) -> Device {
    Device {
        id: udn.to_string(),
        name: name.to_string(),
        device_type: format!("urn:schemas-upnp-org:device:{}:1", kind.type_tag()),
        kind,
        location: format!("{}/desc.xml", base),
        base_url: format!("{}/desc.xml", base),
        manufacturer: "Test".to_string(),
        model_name: "Test".to_string(),
        icons: Vec::new(),
        services: services
            .iter()
            .map(|service| ServiceEndpoint {
                service_type: format!("urn:schemas-upnp-org:service:{}:1", service),
                service_id: format!("urn:upnp-org:serviceId:{}", service),
                control_url: format!("{}/{}/ctrl", base, service),
                event_sub_url: String::new(),
            })
            .collect(),
    }
}

fn escape(xml: &str) -> String {
    xml.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

fn browse_envelope(children: &str, count: u32) -> String {
    let didl = format!(
        r#"<DIDL-Lite xmlns="urn:schemas-upnp-org:metadata-1-0/DIDL-Lite/" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:upnp="urn:schemas-upnp-org:metadata-1-0/upnp/">{}</DIDL-Lite>"#,
        children
    );
    format!(
        r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><u:BrowseResponse xmlns:u="urn:schemas-upnp-org:service:ContentDirectory:1"><Result>{}</Result><NumberReturned>{}</NumberReturned><TotalMatches>{}</TotalMatches><UpdateID>1</UpdateID></u:BrowseResponse></s:Body></s:Envelope>"#,
        escape(&didl),
        count,
        count
    )
}

fn mock_listing(server: &mut mockito::Server, object_id: &str, children: &str, count: u32) -> mockito::Mock {
    server
        .mock("POST", "/ContentDirectory/ctrl")
        .match_body(Matcher::Regex(format!("<ObjectID>{}</ObjectID>", object_id)))
        .with_body(browse_envelope(children, count))
        .create()
}

fn names(browser: &MediaBrowser, tab: Tab) -> Vec<String> {
    browser.rows(tab).into_iter().map(|(name, _)| name).collect()
}

fn open_browser(server: &mockito::Server) -> (MediaBrowser, Arc<Registry>) {
    let registry = Arc::new(Registry::new());
    registry.add_device(media_device(
        "uuid:nas",
        "NAS",
        DeviceKind::MediaServer,
        &server.url(),
        &["ContentDirectory"],
    ));
    let control_point = Arc::new(InlineControlPoint {
        registry: Arc::clone(&registry),
        client: DlnaClient::new(),
    });
    (MediaBrowser::new(control_point, &BrowserConfig::default()), registry)
}

const FOLDER_A: &str =
    r#"<container id="A" parentID="0" childCount="3"><dc:title>Folder A</dc:title><upnp:class>object.container.storageFolder</upnp:class></container>"#;

fn track(id: &str, title: &str) -> String {
    format!(
        r#"<item id="{id}" parentID="A"><dc:title>{title}</dc:title><upnp:class>object.item.audioItem.musicTrack</upnp:class><res protocolInfo="http-get:*:audio/mpeg:*">http://media/{id}.mp3</res></item>"#
    )
}

#[test]
fn test_open_folder_and_back_out() {
    let mut server = mockito::Server::new();
    let _root = mock_listing(&mut server, "0", FOLDER_A, 1);
    let _folder = mock_listing(&mut server, "A", "", 0);

    let (mut browser, _registry) = open_browser(&server);
    assert_eq!(names(&browser, Tab::Servers), vec!["NAS"]);

    browser.select(Tab::Servers, 0).unwrap();
    assert!(browser.process_pending().is_empty());
    assert_eq!(browser.navigation().mode(), Mode::Browsing);
    assert_eq!(browser.navigation().depth(), 1);
    assert_eq!(names(&browser, Tab::Servers), vec!["Folder A"]);

    let opened = browser.select(Tab::Servers, 0).unwrap();
    assert_eq!(opened, Activation::Navigated(Selection::Opened(DirectoryId::new("A"))));
    browser.process_pending();
    assert_eq!(browser.navigation().depth(), 2);
    assert!(browser.rows(Tab::Servers).is_empty());

    assert_eq!(browser.back(), BackOutcome::Handled);
    browser.process_pending();
    assert_eq!(browser.navigation().depth(), 1);
    assert_eq!(names(&browser, Tab::Servers), vec!["Folder A"]);

    assert_eq!(browser.back(), BackOutcome::Handled);
    assert_eq!(browser.navigation().mode(), Mode::DeviceList);
    assert!(browser.navigation().current_device().is_none());
    assert_eq!(names(&browser, Tab::Servers), vec!["NAS"]);
}

#[test]
fn test_playing_an_item_hands_the_playlist_to_the_renderer() {
    let mut server = mockito::Server::new();
    let children = format!("{}{}{}", FOLDER_A, track("t1", "One"), track("t2", "Two"));
    let _root = mock_listing(&mut server, "0", &children, 3);
    let set_uri = server
        .mock("POST", "/AVTransport/ctrl")
        .match_header("soapaction", "\"urn:schemas-upnp-org:service:AVTransport:1#SetAVTransportURI\"")
        .match_body(Matcher::Regex("<CurrentURI>http://media/t2.mp3</CurrentURI>".to_string()))
        .with_body(r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><u:SetAVTransportURIResponse xmlns:u="urn:schemas-upnp-org:service:AVTransport:1"/></s:Body></s:Envelope>"#)
        .create();
    let play = server
        .mock("POST", "/AVTransport/ctrl")
        .match_header("soapaction", "\"urn:schemas-upnp-org:service:AVTransport:1#Play\"")
        .with_body(r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><u:PlayResponse xmlns:u="urn:schemas-upnp-org:service:AVTransport:1"/></s:Body></s:Envelope>"#)
        .create();

    let (mut browser, registry) = open_browser(&server);
    registry.add_device(media_device(
        "uuid:tv",
        "TV",
        DeviceKind::MediaRenderer,
        &server.url(),
        &["AVTransport", "RenderingControl"],
    ));
    browser.process_pending();
    assert_eq!(names(&browser, Tab::Renderers), vec!["TV"]);
    browser.select(Tab::Renderers, 0).unwrap();

    browser.select(Tab::Servers, 0).unwrap();
    browser.process_pending();
    assert_eq!(names(&browser, Tab::Servers), vec!["Folder A", "One", "Two"]);

    let played = browser.select(Tab::Servers, 2).unwrap();
    assert_eq!(
        played,
        Activation::Navigated(Selection::Played {
            start_index: 1,
            playlist_len: 2
        })
    );
    assert_eq!(browser.active_tab(), Tab::Renderers);
    // Playing leaves navigation where it was
    assert_eq!(browser.navigation().depth(), 1);

    let deadline = Instant::now() + Duration::from_secs(5);
    while !play.matched() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    set_uri.assert();
    play.assert();
}

#[test]
fn test_failed_browse_keeps_previous_listing() {
    let mut server = mockito::Server::new();
    let _root = mock_listing(&mut server, "0", FOLDER_A, 1);
    let _missing = server
        .mock("POST", "/ContentDirectory/ctrl")
        .match_body(Matcher::Regex("<ObjectID>A</ObjectID>".to_string()))
        .with_status(500)
        .with_body(r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><s:Fault><faultcode>s:Client</faultcode><faultstring>UPnPError</faultstring><detail><UPnPError xmlns="urn:schemas-upnp-org:control-1-0"><errorCode>701</errorCode></UPnPError></detail></s:Fault></s:Body></s:Envelope>"#)
        .create();

    let (mut browser, _registry) = open_browser(&server);
    browser.select(Tab::Servers, 0).unwrap();
    browser.process_pending();

    browser.select(Tab::Servers, 0).unwrap();
    let notices = browser.process_pending();

    assert_eq!(notices.len(), 1);
    match &notices[0] {
        Notice::BrowseFailed { directory, reason } => {
            assert_eq!(directory.as_str(), "A");
            assert!(reason.contains("701"));
        }
        other => panic!("unexpected notice: {:?}", other),
    }
    // Stack moved, listing did not
    assert_eq!(browser.navigation().depth(), 2);
    assert_eq!(names(&browser, Tab::Servers), vec!["Folder A"]);
}

#[test]
fn test_server_without_content_directory() {
    let registry = Arc::new(Registry::new());
    registry.add_device(media_device("uuid:odd", "Odd", DeviceKind::MediaServer, "http://127.0.0.1:9", &[]));
    let control_point = Arc::new(InlineControlPoint {
        registry,
        client: DlnaClient::new(),
    });
    let mut browser = MediaBrowser::new(control_point, &BrowserConfig::default());

    browser.select(Tab::Servers, 0).unwrap();
    let notices = browser.process_pending();
    assert!(matches!(&notices[..], [Notice::BrowseFailed { directory, .. }] if directory.is_root()));
}
