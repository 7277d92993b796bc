/// Core properties (`docProps/core.xml`) as a flat name/value table.
///
/// Records are keyed by the local name of each child of `cp:coreProperties`
/// ("title", "creator", "modified", ...) and kept in file order. Writing maps
/// each recognized name back to its namespace prefix.
use crate::common::xml::{decode_char_ref, escape_xml, unescape_xml};
use crate::common::{Error, Result};
use crate::ooxml::opc::constants::{namespace, part_path};
use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::Event;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const TITLE: &str = "title";
pub const SUBJECT: &str = "subject";
pub const CREATOR: &str = "creator";
pub const DESCRIPTION: &str = "description";
pub const CREATED: &str = "created";
pub const MODIFIED: &str = "modified";
pub const LAST_MODIFIED_BY: &str = "lastModifiedBy";

/// Names written by the save pipeline only.
const RESERVED: &[&str] = &[MODIFIED, LAST_MODIFIED_BY];

/// One metadata entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub name: String,
    pub value: String,
}

/// Caller-side changes to the core properties.
///
/// `extra` carries any other `(name, value)` pairs, e.g. `("keywords", "a, b")`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocPropertiesUpdate {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub description: Option<String>,
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub extra: Vec<(String, String)>,
}

/// The core-properties table of a package.
#[derive(Debug, Clone, Default)]
pub struct CoreProperties {
    records: Vec<PropertyRecord>,
    /// Whether the package carried a core-properties part when opened
    present: bool,
}

impl CoreProperties {
    /// Read `docProps/core.xml` from an unpacked package. A package without
    /// the part yields an empty table that will be created on save.
    pub fn load(package_dir: &Path) -> Result<Self> {
        let path = package_dir.join(part_path::CORE_PROPERTIES);
        if !path.exists() {
            tracing::warn!("package has no core properties part; starting empty");
            return Ok(Self::default());
        }
        let mut props = Self::from_xml(&std::fs::read(path)?)?;
        props.present = true;
        Ok(props)
    }

    /// Parse core-properties XML.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        let mut buf = Vec::new();
        let mut records = Vec::new();
        let mut depth = 0usize;
        // (local name, raw text) of the property being read
        let mut current: Option<(String, String)> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    depth += 1;
                    if depth == 2 {
                        let name = std::str::from_utf8(e.local_name().as_ref())?.to_string();
                        current = Some((name, String::new()));
                    }
                },
                Ok(Event::Empty(ref e)) if depth == 1 => {
                    records.push(PropertyRecord {
                        name: std::str::from_utf8(e.local_name().as_ref())?.to_string(),
                        value: String::new(),
                    });
                },
                Ok(Event::Text(ref e)) => {
                    if let Some((_, raw)) = current.as_mut() {
                        raw.push_str(std::str::from_utf8(e.as_ref())?);
                    }
                },
                Ok(Event::CData(ref e)) => {
                    if let Some((_, raw)) = current.as_mut() {
                        raw.push_str(&escape_xml(std::str::from_utf8(e.as_ref())?));
                    }
                },
                Ok(Event::GeneralRef(ref e)) => {
                    if let Some((_, raw)) = current.as_mut() {
                        let entity = std::str::from_utf8(e)?;
                        match decode_char_ref(entity) {
                            Some(ch) => raw.push_str(&escape_xml(&ch.to_string())),
                            None => {
                                raw.push('&');
                                raw.push_str(entity);
                                raw.push(';');
                            },
                        }
                    }
                },
                Ok(Event::End(_)) => {
                    if depth == 2
                        && let Some((name, raw)) = current.take()
                    {
                        records.push(PropertyRecord {
                            name,
                            value: unescape_xml(raw.trim()).into_owned(),
                        });
                    }
                    depth = depth.saturating_sub(1);
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(format!("core properties: {}", e))),
                _ => {},
            }
            buf.clear();
        }

        Ok(Self {
            records,
            present: false,
        })
    }

    /// Whether the source package had a core-properties part.
    #[inline]
    pub fn was_present(&self) -> bool {
        self.present
    }

    #[inline]
    pub fn records(&self) -> &[PropertyRecord] {
        &self.records
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.value.as_str())
    }

    /// Parsed value of the "created" property, if present and well formed.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.get(CREATED).and_then(|s| parse_datetime(s).ok())
    }

    /// Set a property without the reserved-name check. Used by the save
    /// pipeline for "modified" and "lastModifiedBy".
    pub(crate) fn set_unchecked(&mut self, name: &str, value: &str) {
        match self.records.iter_mut().find(|r| r.name == name) {
            Some(record) => record.value = value.to_string(),
            None => self.records.push(PropertyRecord {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Set one caller-owned property.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        check_not_reserved(name)?;
        self.set_unchecked(name, value);
        Ok(())
    }

    /// Apply an update. Reserved names are rejected before anything changes.
    pub fn apply(&mut self, update: &DocPropertiesUpdate) -> Result<()> {
        for (name, _) in &update.extra {
            check_not_reserved(name)?;
        }

        let named = [
            (TITLE, &update.title),
            (SUBJECT, &update.subject),
            (CREATOR, &update.creator),
            (DESCRIPTION, &update.description),
        ];
        for (name, value) in named {
            if let Some(value) = value {
                self.set_unchecked(name, value);
            }
        }
        if let Some(created) = update.created {
            self.set_unchecked(CREATED, &format_timestamp(created));
        }
        for (name, value) in &update.extra {
            self.set_unchecked(name, value);
        }
        Ok(())
    }

    /// Serialize to core-properties XML.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(1024);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(
            r#"<cp:coreProperties xmlns:cp="{}" xmlns:dc="{}" xmlns:dcterms="{}" xmlns:dcmitype="{}" xmlns:xsi="{}">"#,
            namespace::OPC_CORE_PROPERTIES,
            namespace::DUBLIN_CORE,
            namespace::DUBLIN_CORE_TERMS,
            namespace::DUBLIN_CORE_TYPE,
            namespace::XSI,
        ));

        for record in &self.records {
            let prefix = prefix_for(&record.name);
            let type_attr = if prefix == "dcterms" {
                r#" xsi:type="dcterms:W3CDTF""#
            } else {
                ""
            };
            xml.push_str(&format!(
                "<{p}:{n}{t}>{v}</{p}:{n}>",
                p = prefix,
                n = record.name,
                t = type_attr,
                v = escape_xml(&record.value)
            ));
        }

        xml.push_str("</cp:coreProperties>");
        xml
    }

    /// Persist to `docProps/core.xml` inside an unpacked package.
    pub fn save(&self, package_dir: &Path) -> Result<()> {
        let path = package_dir.join(part_path::CORE_PROPERTIES);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_xml())?;
        Ok(())
    }
}

fn check_not_reserved(name: &str) -> Result<()> {
    if RESERVED.contains(&name) {
        Err(Error::ReservedProperty(name.to_string()))
    } else {
        Ok(())
    }
}

fn prefix_for(name: &str) -> &'static str {
    match name {
        "title" | "subject" | "creator" | "description" | "language" | "identifier" => "dc",
        "created" | "modified" => "dcterms",
        _ => "cp",
    }
}

/// Format a timestamp the way core properties store them (`YYYY-MM-DDTHH:MM:SSZ`).
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Parse an ISO 8601 datetime string into a DateTime<Utc>.
///
/// Supports formats like:
/// - 2023-10-10T14:30:00Z
/// - 2023-10-10T14:30:00.1234567Z
/// - 2023-10-10T14:30:00
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.fZ", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, format) {
            return Ok(DateTime::from_naive_utc_and_offset(dt, Utc));
        }
    }

    Err(Error::InvalidFormat(format!("Invalid datetime format: {}", s)))
}
