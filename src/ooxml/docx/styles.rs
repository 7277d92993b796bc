/// Style catalog - the style definitions of `word/styles.xml`, parsed once at open.
use crate::common::{Error, Result};
use crate::ooxml::docx::enums::StyleType;
use crate::ooxml::opc::constants::part_path;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// One `<w:style>` definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleRecord {
    /// Style identifier, the value paragraphs and runs refer to
    pub style_id: String,
    /// UI-visible name (`w:name`), the identifier when absent
    pub style_name: String,
    pub style_type: StyleType,
    /// Whether this is the default style for its type
    pub is_default: bool,
    /// Whether this is a user-defined style
    pub is_custom: bool,
    /// ID of the style this one inherits from
    pub based_on: Option<String>,
}

/// The flat table of style records of a document.
///
/// # Examples
///
/// ```
/// use wordml::docx::{StyleCatalog, StyleType};
///
/// let xml = br#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
///   <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
///   <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
/// </w:styles>"#;
/// let catalog = StyleCatalog::from_xml(xml)?;
/// assert_eq!(catalog.default_style_for(StyleType::Paragraph).unwrap().style_id, "Normal");
/// assert_eq!(catalog.lookup("heading 1", StyleType::Paragraph).unwrap().style_id, "Heading1");
/// # Ok::<(), wordml::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct StyleCatalog {
    records: Vec<StyleRecord>,
}

impl StyleCatalog {
    /// Parse `word/styles.xml` of an unpacked package. A package without a
    /// styles part gets an empty catalog.
    pub fn load(package_dir: &Path) -> Result<Self> {
        let path = package_dir.join(part_path::STYLES);
        if !path.exists() {
            tracing::warn!("package has no styles part");
            return Ok(Self::default());
        }
        Self::from_xml(&std::fs::read(path)?)
    }

    /// Parse the XML of a styles part.
    pub fn from_xml(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut records: Vec<StyleRecord> = Vec::new();
        let mut current: Option<StyleBuilder> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) if e.local_name().as_ref() == b"style" => {
                    current = Some(StyleBuilder::from_element(&e, &reader)?);
                },
                Ok(Event::Empty(e)) if e.local_name().as_ref() == b"style" => {
                    if let Some(record) = StyleBuilder::from_element(&e, &reader)?.build() {
                        records.push(record);
                    }
                },
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if current.is_some() => {
                    let field = match e.local_name().as_ref() {
                        b"name" => Some(true),
                        b"basedOn" => Some(false),
                        _ => None,
                    };
                    if let (Some(is_name), Some(builder)) = (field, current.as_mut()) {
                        let value = val_attribute(&e, &reader)?;
                        if is_name {
                            builder.name = value;
                        } else {
                            builder.based_on = value;
                        }
                    }
                },
                Ok(Event::End(e)) if e.local_name().as_ref() == b"style" => {
                    if let Some(record) = current.take().and_then(StyleBuilder::build) {
                        records.push(record);
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(format!("styles: {}", e))),
                _ => {},
            }
        }

        // At most one default per type: the first one wins.
        let mut seen = BTreeSet::new();
        for record in records.iter_mut().filter(|r| r.is_default) {
            if !seen.insert(record.style_type) {
                tracing::warn!(style_id = %record.style_id, "ignoring extra default style");
                record.is_default = false;
            }
        }

        Ok(Self { records })
    }

    #[inline]
    pub fn records(&self) -> &[StyleRecord] {
        &self.records
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The default style of a type.
    pub fn default_style_for(&self, style_type: StyleType) -> Option<&StyleRecord> {
        self.records
            .iter()
            .find(|r| r.is_default && r.style_type == style_type)
    }

    /// Find a style by display name and type.
    pub fn lookup(&self, name: &str, style_type: StyleType) -> Option<&StyleRecord> {
        self.records
            .iter()
            .find(|r| r.style_name == name && r.style_type == style_type)
    }

    pub fn get_by_id(&self, style_id: &str) -> Option<&StyleRecord> {
        self.records.iter().find(|r| r.style_id == style_id)
    }

    /// Resolve a destination -> sources mapping of paragraph style names into
    /// `(source id, destination id)` pairs.
    ///
    /// Every name is checked before anything is returned. Source names are
    /// checked first: when some are not paragraph styles of this catalog the
    /// error lists all of them. Destination names are reported the same way
    /// once every source resolves.
    pub fn resolve_paragraph_remap(
        &self,
        mapping: &BTreeMap<String, Vec<String>>,
    ) -> Result<Vec<(String, String)>> {
        let id_of = |name: &str| {
            self.lookup(name, StyleType::Paragraph)
                .map(|r| r.style_id.clone())
        };

        let missing_sources: BTreeSet<&String> = mapping
            .values()
            .flatten()
            .filter(|name| id_of(name).is_none())
            .collect();
        if !missing_sources.is_empty() {
            return Err(Error::UnknownStyleName(
                missing_sources.into_iter().cloned().collect(),
            ));
        }
        let missing_dests: BTreeSet<&String> = mapping
            .keys()
            .filter(|name| id_of(name).is_none())
            .collect();
        if !missing_dests.is_empty() {
            return Err(Error::UnknownStyleName(
                missing_dests.into_iter().cloned().collect(),
            ));
        }

        let mut pairs = Vec::new();
        for (dest, sources) in mapping {
            if let Some(dest_id) = id_of(dest) {
                pairs.extend(
                    sources
                        .iter()
                        .filter_map(|source| id_of(source))
                        .map(|source_id| (source_id, dest_id.clone())),
                );
            }
        }
        Ok(pairs)
    }
}

/// Accumulates one `<w:style>` while its children are read.
#[derive(Debug, Default)]
struct StyleBuilder {
    style_id: Option<String>,
    name: Option<String>,
    style_type: StyleType,
    is_default: bool,
    is_custom: bool,
    based_on: Option<String>,
}

impl StyleBuilder {
    fn from_element(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Self> {
        let mut builder = Self::default();
        for attr in e.attributes() {
            let attr = attr?;
            let value = attr
                .decode_and_unescape_value(reader.decoder())
                .map_err(|e| Error::Xml(e.to_string()))?;
            match attr.key.local_name().as_ref() {
                b"type" => builder.style_type = StyleType::from_xml(&value).unwrap_or_default(),
                b"styleId" => builder.style_id = Some(value.into_owned()),
                b"default" => builder.is_default = is_on(&value),
                b"customStyle" => builder.is_custom = is_on(&value),
                _ => {},
            }
        }
        Ok(builder)
    }

    fn build(self) -> Option<StyleRecord> {
        let style_id = self.style_id?;
        Some(StyleRecord {
            style_name: self.name.unwrap_or_else(|| style_id.clone()),
            style_id,
            style_type: self.style_type,
            is_default: self.is_default,
            is_custom: self.is_custom,
            based_on: self.based_on,
        })
    }
}

fn val_attribute(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == b"val" {
            let value = attr
                .decode_and_unescape_value(reader.decoder())
                .map_err(|e| Error::Xml(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

#[inline]
fn is_on(value: &str) -> bool {
    matches!(value, "1" | "true" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:default="1" w:styleId="Other"><w:name w:val="Other"/></w:style>
  <w:style w:type="character" w:default="1" w:styleId="DefaultParagraphFont"><w:name w:val="Default Paragraph Font"/></w:style>
  <w:style w:type="character" w:styleId="Strong"><w:name w:val="Strong"/></w:style>
  <w:style w:type="table" w:default="1" w:styleId="TableNormal"><w:name w:val="Normal Table"/></w:style>
  <w:style w:type="numbering" w:default="1" w:styleId="NoList"><w:name w:val="No List"/></w:style>
  <w:style w:type="paragraph" w:customStyle="1" w:styleId="Memo"/>
</w:styles>"#;

    fn catalog() -> StyleCatalog {
        StyleCatalog::from_xml(STYLES.as_bytes()).unwrap()
    }

    #[test]
    fn test_records() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 9);

        let h1 = catalog.get_by_id("Heading1").unwrap();
        assert_eq!(h1.style_name, "heading 1");
        assert_eq!(h1.based_on.as_deref(), Some("Normal"));
        assert!(!h1.is_default);

        let memo = catalog.get_by_id("Memo").unwrap();
        assert!(memo.is_custom);
        assert_eq!(memo.style_name, "Memo");
    }

    #[test]
    fn test_single_default_per_type() {
        let catalog = catalog();
        for style_type in StyleType::ALL {
            let defaults = catalog
                .records()
                .iter()
                .filter(|r| r.is_default && r.style_type == style_type)
                .count();
            assert_eq!(defaults, 1, "{}", style_type);
        }
        assert_eq!(
            catalog.default_style_for(StyleType::Paragraph).unwrap().style_id,
            "Normal"
        );
        assert_eq!(
            catalog.default_style_for(StyleType::Numbering).unwrap().style_id,
            "NoList"
        );
    }

    #[test]
    fn test_lookup_respects_type() {
        let catalog = catalog();
        assert!(catalog.lookup("Strong", StyleType::Character).is_some());
        assert!(catalog.lookup("Strong", StyleType::Paragraph).is_none());
    }

    #[test]
    fn test_resolve_remap() {
        let catalog = catalog();
        let mapping = BTreeMap::from([(
            "heading 2".to_string(),
            vec!["heading 1".to_string(), "Normal".to_string()],
        )]);
        let pairs = catalog.resolve_paragraph_remap(&mapping).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("Heading1".to_string(), "Heading2".to_string()),
                ("Normal".to_string(), "Heading2".to_string()),
            ]
        );
    }

    #[test]
    fn test_resolve_remap_reports_every_missing_source() {
        let catalog = catalog();
        let mapping = BTreeMap::from([
            ("Nope".to_string(), vec!["heading 1".to_string()]),
            (
                "heading 1".to_string(),
                vec!["Strong".to_string(), "Missing".to_string()],
            ),
        ]);
        let err = catalog.resolve_paragraph_remap(&mapping).unwrap_err();
        match err {
            Error::UnknownStyleName(names) => assert_eq!(names, ["Missing", "Strong"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_remap_reports_missing_destinations() {
        let catalog = catalog();
        let mapping = BTreeMap::from([
            ("Nope".to_string(), vec!["heading 1".to_string()]),
            ("Other missing".to_string(), vec!["Normal".to_string()]),
            ("heading 2".to_string(), vec!["Normal".to_string()]),
        ]);
        let err = catalog.resolve_paragraph_remap(&mapping).unwrap_err();
        match err {
            Error::UnknownStyleName(names) => assert_eq!(names, ["Nope", "Other missing"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
