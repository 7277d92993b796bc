//! The package's content-type registry (`[Content_Types].xml`).
//!
//! Maps part names to media types through extension defaults and per-part
//! overrides. Lookups check overrides first, then the extension default.

use crate::common::xml::escape_xml;
use crate::common::{Error, Result};
use crate::ooxml::opc::constants::{content_type as ct, namespace, part_path};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashMap;
use std::path::Path;

/// Content types declared by a package.
#[derive(Debug, Clone)]
pub struct ContentTypeRegistry {
    /// Extension (lowercase, no dot) to media type
    defaults: HashMap<String, String>,
    /// Part name (leading slash) to media type
    overrides: HashMap<String, String>,
}

impl Default for ContentTypeRegistry {
    fn default() -> Self {
        let mut defaults = HashMap::new();
        defaults.insert("rels".to_string(), ct::OPC_RELATIONSHIPS.to_string());
        defaults.insert("xml".to_string(), ct::XML.to_string());
        Self {
            defaults,
            overrides: HashMap::new(),
        }
    }
}

impl ContentTypeRegistry {
    /// Load `[Content_Types].xml` from an unpacked package directory.
    pub fn load(package_dir: &Path) -> Result<Self> {
        let path = package_dir.join(part_path::CONTENT_TYPES);
        if !path.exists() {
            return Err(Error::PartNotFound(path));
        }
        Self::from_xml(&std::fs::read(path)?)
    }

    /// Parse the XML of `[Content_Types].xml`.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut registry = Self {
            defaults: HashMap::new(),
            overrides: HashMap::new(),
        };
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let kind = match e.local_name().as_ref() {
                        b"Default" => Some(true),
                        b"Override" => Some(false),
                        _ => None,
                    };
                    if let Some(is_default) = kind {
                        let mut key = None;
                        let mut media_type = None;
                        for attr in e.attributes() {
                            let attr = attr?;
                            let value = attr
                                .decode_and_unescape_value(reader.decoder())
                                .map_err(|e| Error::Xml(e.to_string()))?
                                .into_owned();
                            match attr.key.as_ref() {
                                b"Extension" | b"PartName" => key = Some(value),
                                b"ContentType" => media_type = Some(value),
                                _ => {},
                            }
                        }

                        if let (Some(key), Some(media_type)) = (key, media_type) {
                            if is_default {
                                registry.defaults.insert(key.to_ascii_lowercase(), media_type);
                            } else {
                                registry.overrides.insert(normalize_partname(&key), media_type);
                            }
                        }
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(format!("content types: {}", e))),
                _ => {},
            }
            buf.clear();
        }

        Ok(registry)
    }

    /// Register (or replace) an override for one part.
    pub fn add_override(&mut self, partname: &str, media_type: &str) {
        tracing::debug!(partname, media_type, "registering content-type override");
        self.overrides
            .insert(normalize_partname(partname), media_type.to_string());
    }

    /// The override declared for `partname`, if any.
    pub fn override_for(&self, partname: &str) -> Option<&str> {
        let partname = normalize_partname(partname);
        self.overrides.get(&partname).map(String::as_str).or_else(|| {
            // Part names compare case-insensitively in OPC.
            self.overrides
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(&partname))
                .map(|(_, media_type)| media_type.as_str())
        })
    }

    /// Resolve the media type of a part: override first, then extension default.
    pub fn content_type_for(&self, partname: &str) -> Option<&str> {
        self.override_for(partname).or_else(|| {
            let ext = partname.rsplit_once('.').map(|(_, ext)| ext)?;
            self.defaults
                .get(&ext.to_ascii_lowercase())
                .map(String::as_str)
        })
    }

    /// Number of override entries.
    #[inline]
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// Serialize to XML, defaults and overrides each sorted by key.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(4096);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Types xmlns="{}">"#, namespace::OPC_CONTENT_TYPES));

        let mut exts: Vec<_> = self.defaults.keys().collect();
        exts.sort();
        for ext in exts {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_xml(ext),
                escape_xml(&self.defaults[ext])
            ));
        }

        let mut partnames: Vec<_> = self.overrides.keys().collect();
        partnames.sort();
        for partname in partnames {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_xml(partname),
                escape_xml(&self.overrides[partname])
            ));
        }

        xml.push_str("</Types>");
        xml
    }

    /// Persist into an unpacked package directory.
    pub fn save(&self, package_dir: &Path) -> Result<()> {
        std::fs::write(package_dir.join(part_path::CONTENT_TYPES), self.to_xml())?;
        Ok(())
    }
}

/// Part names are absolute within the package.
fn normalize_partname(partname: &str) -> String {
    if partname.starts_with('/') {
        partname.to_string()
    } else {
        format!("/{}", partname)
    }
}
