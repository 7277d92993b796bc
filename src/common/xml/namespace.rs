//! Root namespace declarations for serialized parts.
//!
//! Word parts declare every prefix they may use on the root element and list
//! some of them in `mc:Ignorable`. A tree serializer that only declares the
//! prefixes it actually emits loses those declarations, and the Ignorable
//! list then names undeclared prefixes. [`declare_on_root`] puts them back.

use crate::common::Result;
use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesStart, Event};

/// Rewrite `xml` so that its root start tag declares every `(prefix, uri)`
/// in `namespaces`. Declarations already on the root are kept as they are;
/// everything after the root start tag is copied through unchanged.
pub fn declare_on_root(xml: &[u8], namespaces: &[(&str, &str)]) -> Result<Vec<u8>> {
    let mut reader = Reader::from_reader(xml);
    let mut writer = Writer::new(Vec::with_capacity(xml.len() + 64 * namespaces.len()));
    let mut seen_root = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if !seen_root => {
                seen_root = true;
                writer.write_event(Event::Start(with_declarations(e, namespaces)?))?;
            },
            Event::Empty(e) if !seen_root => {
                seen_root = true;
                writer.write_event(Event::Empty(with_declarations(e, namespaces)?))?;
            },
            Event::Eof => break,
            event => writer.write_event(event)?,
        }
    }

    Ok(writer.into_inner())
}

fn with_declarations<'a>(
    mut start: BytesStart<'a>,
    namespaces: &[(&str, &str)],
) -> Result<BytesStart<'a>> {
    let mut declared = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        if let Some(prefix) = attr.key.as_ref().strip_prefix(b"xmlns:") {
            declared.push(prefix.to_vec());
        }
    }

    for (prefix, uri) in namespaces {
        if declared.iter().any(|d| d == prefix.as_bytes()) {
            continue;
        }
        start.push_attribute((format!("xmlns:{}", prefix).as_str(), *uri));
    }
    Ok(start)
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
    const W14: &str = "http://schemas.microsoft.com/office/word/2010/wordml";

    #[test]
    fn test_missing_prefixes_added_to_root_only() {
        let xml = format!(
            "<?xml version='1.0'?><w:document xmlns:w='{W}'><w:body><w:p w14:paraId='1A' xmlns:w14='{W14}'>a &amp; b</w:p></w:body></w:document>"
        );
        let out = declare_on_root(xml.as_bytes(), &[("w", W), ("w14", W14)]).unwrap();
        let out = String::from_utf8(out).unwrap();

        let root_end = out.find("<w:body>").unwrap();
        let root = &out[..root_end];
        assert_eq!(root.matches("xmlns:w=").count(), 1);
        assert!(root.contains(&format!("xmlns:w14=\"{W14}\"")));
        assert!(out.contains("a &amp; b"));
        assert!(out.starts_with("<?xml version='1.0'?>"));
    }

    #[test]
    fn test_empty_root() {
        let out = declare_on_root(b"<w:ftr xmlns:w='x'/>", &[("w", "x"), ("w15", "y")]).unwrap();
        assert_eq!(out, b"<w:ftr xmlns:w='x' xmlns:w15=\"y\"/>");
    }
}
