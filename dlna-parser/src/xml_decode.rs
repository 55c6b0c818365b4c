//! XML decoding helpers shared by the DIDL-Lite types.
//!
//! DIDL-Lite mixes the default DIDL namespace with `dc:`, `upnp:` and
//! `dlna:` prefixes. Stripping prefixes before deserializing keeps the serde
//! structs free of namespace handling.

use crate::error::{ParseError, ParseResult};
use serde::de::DeserializeOwned;

/// Parse XML into `T` after stripping namespace prefixes.
pub fn parse<T: DeserializeOwned>(xml: &str) -> ParseResult<T> {
    let stripped = strip_namespaces(xml);
    quick_xml::de::from_str(&stripped)
        .map_err(|e| ParseError::XmlDeserializationFailed(e.to_string()))
}

/// Remove namespace prefixes from element and attribute names, and drop
/// `xmlns` declarations.
///
/// Text content, declarations (`<?...?>`) and `<!...>` markup pass through
/// untouched.
///
/// ```
/// use dlna_parser::xml_decode::strip_namespaces;
///
/// assert_eq!(
///     strip_namespaces(r#"<DIDL-Lite xmlns:dc="x"><dc:title>A:B</dc:title></DIDL-Lite>"#),
///     "<DIDL-Lite><title>A:B</title></DIDL-Lite>"
/// );
/// ```
pub fn strip_namespaces(xml: &str) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut rest = xml;

    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let Some(end) = tag_end(tail) else {
            // Unterminated markup, leave it for the deserializer to reject
            out.push_str(tail);
            return out;
        };
        rewrite_tag(&tail[..=end], &mut out);
        rest = &tail[end + 1..];
    }

    out.push_str(rest);
    out
}

/// Byte offset of the `>` closing the tag at the start of `markup`,
/// ignoring any `>` inside quoted attribute values.
///
/// Comments and CDATA sections end at their own terminator; quotes inside
/// them are plain text.
fn tag_end(markup: &str) -> Option<usize> {
    for (open, close) in [("<!--", "-->"), ("<![CDATA[", "]]>")] {
        if markup.starts_with(open) {
            return markup[open.len()..]
                .find(close)
                .map(|at| open.len() + at + close.len() - 1);
        }
    }

    let mut quote = None;
    for (i, c) in markup.char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(open), c) if c == open => quote = None,
            (None, '>') => return Some(i),
            _ => {}
        }
    }
    None
}

fn rewrite_tag(tag: &str, out: &mut String) {
    if tag.starts_with("<?") || tag.starts_with("<!") {
        out.push_str(tag);
        return;
    }

    let inner = &tag[1..tag.len() - 1];
    let (closing, inner) = match inner.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };
    let (self_closing, inner) = match inner.trim_end().strip_suffix('/') {
        Some(rest) => (true, rest),
        None => (false, inner),
    };

    let name_end = inner.find(char::is_whitespace).unwrap_or(inner.len());
    out.push('<');
    if closing {
        out.push('/');
    }
    out.push_str(local_name(&inner[..name_end]));

    for (name, value) in attributes(&inner[name_end..]) {
        if name == "xmlns" || name.starts_with("xmlns:") {
            continue;
        }
        out.push(' ');
        out.push_str(local_name(name));
        out.push('=');
        out.push_str(value);
    }

    if self_closing {
        out.push('/');
    }
    out.push('>');
}

fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Split an attribute list into `(name, quoted value)` pairs.
///
/// Stops at the first malformed attribute.
fn attributes(mut input: &str) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();

    loop {
        input = input.trim_start();
        let Some(eq) = input.find('=') else { break };
        let name = input[..eq].trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            break;
        }

        let after = input[eq + 1..].trim_start();
        let Some(quote) = after.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            break;
        };
        let Some(close) = after[1..].find(quote) else { break };
        let value_end = close + 2;
        pairs.push((name, &after[..value_end]));
        input = &after[value_end..];
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("<dc:title>Song</dc:title>", "<title>Song</title>")]
    #[case("<upnp:class/>", "<class/>")]
    #[case("<upnp:class />", "<class/>")]
    #[case("<plain>x</plain>", "<plain>x</plain>")]
    #[case(r#"<?xml version="1.0" encoding="utf-8"?><a/>"#, r#"<?xml version="1.0" encoding="utf-8"?><a/>"#)]
    #[case("<!-- a:b --><a/>", "<!-- a:b --><a/>")]
    #[case("<!-- don't --><dc:title>A</dc:title>", "<!-- don't --><title>A</title>")]
    #[case(r#"<!-- say "hi" > there --><dc:title>A</dc:title>"#, r#"<!-- say "hi" > there --><title>A</title>"#)]
    #[case("<dc:title><![CDATA[Rock 'n' Roll]]></dc:title>", "<title><![CDATA[Rock 'n' Roll]]></title>")]
    #[case(r#"<dc:title><![CDATA[a > "b" <c:d>]]></dc:title>"#, r#"<title><![CDATA[a > "b" <c:d>]]></title>"#)]
    #[case("<a/><!-- open", "<a/><!-- open")]
    fn test_strip_element_prefixes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_namespaces(input), expected);
    }

    #[test]
    fn test_strip_attribute_prefixes_and_declarations() {
        let input = r#"<upnp:albumArtURI dlna:profileID="JPEG_TN" xmlns:dlna="urn:schemas-dlna-org:metadata-1-0/">http://h/a.jpg</upnp:albumArtURI>"#;
        assert_eq!(
            strip_namespaces(input),
            r#"<albumArtURI profileID="JPEG_TN">http://h/a.jpg</albumArtURI>"#
        );
    }

    #[test]
    fn test_quoted_values_keep_colons_and_brackets() {
        let input = r#"<res protocolInfo="http-get:*:audio/mpeg:DLNA.ORG_PN=MP3" note='a>b'>http://h:80/x.mp3</res>"#;
        assert_eq!(
            strip_namespaces(input),
            r#"<res protocolInfo="http-get:*:audio/mpeg:DLNA.ORG_PN=MP3" note='a>b'>http://h:80/x.mp3</res>"#
        );
    }

    #[test]
    fn test_quote_in_comment_keeps_following_title() {
        let xml = r#"<DIDL-Lite><item id="1" parentID="0"><!-- it's live --><dc:title>Song</dc:title></item></DIDL-Lite>"#;
        let didl = crate::DidlLite::from_xml(xml).unwrap();
        assert_eq!(didl.items().next().unwrap().display_title(), "Song");
    }

    #[test]
    fn test_unterminated_markup_is_preserved() {
        assert_eq!(strip_namespaces("<a>text</a><dc:ti"), "<a>text</a><dc:ti");
    }
}
