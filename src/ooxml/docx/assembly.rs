/// Assembly - the save sequence that turns the in-memory parts back into a
/// container.
///
/// Order matters and is fixed:
///
/// 1. renumber identifier attributes across the package,
/// 2. give the final section an explicit section type,
/// 3. write headers, footers, the body and the footnotes,
/// 4. stamp "modified" / "lastModifiedBy" and write the core properties,
///    content types and relationships,
/// 5. pack the working directory.
use crate::common::Result;
use crate::ooxml::docx::parts::DocumentPart;
use crate::ooxml::docx::section::{ensure_section_type, last_section};
use crate::ooxml::metadata::{self, CoreProperties, format_timestamp};
use crate::ooxml::opc::constants::{content_type as ct, part_path, relationship_type as rt};
use crate::ooxml::opc::{ContentTypeRegistry, PackageStore, Relationships};
use chrono::{DateTime, Utc};
use std::path::Path;

/// Elements carrying a plain (non-namespaced) `id` attribute.
const IDENTIFIED: &str = "//*[@id]";

/// Source of package-wide identifiers for one save.
///
/// Starts at 1 and only moves forward. A counter lives for exactly one
/// save and is passed by `&mut` to every part scan.
#[derive(Debug)]
pub struct IdCounter {
    next: u64,
}

impl Default for IdCounter {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdCounter {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Number of identifiers handed out so far.
    #[inline]
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

/// Overwrite every `id` attribute of `part` with the next counter values, in
/// document order. Returns how many were rewritten.
pub fn uniquify_ids(part: &DocumentPart, counter: &mut IdCounter) -> Result<usize> {
    let elements = part.select(IDENTIFIED)?;
    for element in &elements {
        element.set_attribute_value("id", &counter.next_id().to_string());
    }
    Ok(elements.len())
}

/// Renumber identifiers across the package.
///
/// Scan order: body, footnotes, headers, footers, then the footnotes once
/// more. The second footnotes pass is part of the observable numbering and
/// is kept.
pub fn uniquify_package(
    body: &DocumentPart,
    footnotes: &DocumentPart,
    headers: &[DocumentPart],
    footers: &[DocumentPart],
    counter: &mut IdCounter,
) -> Result<()> {
    uniquify_ids(body, counter)?;
    uniquify_ids(footnotes, counter)?;
    for header in headers {
        uniquify_ids(header, counter)?;
    }
    for footer in footers {
        uniquify_ids(footer, counter)?;
    }
    uniquify_ids(footnotes, counter)?;
    tracing::debug!(issued = counter.issued(), "identifiers renumbered");
    Ok(())
}

/// Make sure the last `w:sectPr` of the body states its section type.
/// Returns whether the body changed; a second call is a no-op.
pub fn normalize_last_section(body: &DocumentPart) -> Result<bool> {
    let Some(sect_pr) = last_section(body.body_root()?)? else {
        tracing::warn!("body has no section properties");
        return Ok(false);
    };
    ensure_section_type(body.tree(), sect_pr)
}

/// Everything one save touches.
pub struct AssemblyPipeline<'a> {
    pub store: &'a PackageStore,
    pub body: &'a DocumentPart,
    pub headers: &'a [DocumentPart],
    pub footers: &'a [DocumentPart],
    pub footnotes: &'a DocumentPart,
    pub properties: &'a mut CoreProperties,
    pub content_types: &'a mut ContentTypeRegistry,
    /// Relationships of the body part
    pub relationships: &'a Relationships,
    /// Value written to "lastModifiedBy"
    pub user: &'a str,
    /// Container suffix the target must carry
    pub target_extension: &'a str,
}

impl AssemblyPipeline<'_> {
    /// Run the save sequence, stamping the current time.
    pub fn run(self, target: &Path) -> Result<()> {
        self.run_at(target, Utc::now())
    }

    /// Run the save sequence with an explicit "modified" timestamp.
    pub fn run_at(self, target: &Path, now: DateTime<Utc>) -> Result<()> {
        PackageStore::check_target_extension(target, self.target_extension)?;

        let mut counter = IdCounter::new();
        uniquify_package(
            self.body,
            self.footnotes,
            self.headers,
            self.footers,
            &mut counter,
        )?;

        if normalize_last_section(self.body)? {
            tracing::debug!("final section marked continuous");
        }

        for part in self.headers.iter().chain(self.footers) {
            part.save()?;
        }
        self.body.save()?;
        self.footnotes.save()?;

        let dir = self.store.path();
        self.properties
            .set_unchecked(metadata::MODIFIED, &format_timestamp(now));
        self.properties
            .set_unchecked(metadata::LAST_MODIFIED_BY, self.user);
        self.properties.save(dir)?;
        if !self.properties.was_present() {
            self.content_types.add_override(
                &format!("/{}", part_path::CORE_PROPERTIES),
                ct::OPC_CORE_PROPERTIES,
            );
            let rels_path = self.store.member_path(part_path::PACKAGE_RELS);
            let mut package_rels = Relationships::load(&rels_path)?;
            package_rels.get_or_add(rt::CORE_PROPERTIES, part_path::CORE_PROPERTIES);
            package_rels.save(&rels_path)?;
        }
        self.content_types.save(dir)?;
        self.relationships
            .save(&self.store.member_path(part_path::DOCUMENT_RELS))?;

        self.store.pack(target)?;
        tracing::info!(path = %target.display(), ids = counter.issued(), "document saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use crate::ooxml::docx::parts::PartKind;
    use crate::ooxml::docx::query::{element_children, wml_attribute, wml_child};
    use tempfile::TempDir;

    const BODY: &str = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing"><w:body><w:p><w:r><w:drawing><wp:inline><wp:docPr id="7" name="a"/></wp:inline></w:drawing></w:r></w:p><w:p><w:bookmarkStart w:id="0" w:name="x"/><w:bookmarkEnd w:id="0"/><w:r><w:drawing><wp:inline><wp:docPr id="7" name="b"/></wp:inline></w:drawing></w:r></w:p><w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr></w:body></w:document>"#;

    const FOOTNOTES: &str = r#"<w:footnotes xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing"><w:footnote w:id="1"><w:p><w:r><wp:docPr id="1"/></w:r></w:p></w:footnote></w:footnotes>"#;

    const HEADER: &str = r#"<w:hdr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing"><w:p><w:r><wp:docPr id="1"/></w:r></w:p></w:hdr>"#;

    fn load(dir: &TempDir, kind: PartKind, name: &str, xml: &str) -> DocumentPart {
        std::fs::write(dir.path().join(name), xml).unwrap();
        DocumentPart::load_default(kind, dir.path(), name).unwrap()
    }

    fn ids(part: &DocumentPart) -> Vec<String> {
        part.select(IDENTIFIED)
            .unwrap()
            .iter()
            .filter_map(|e| e.attribute_value("id").map(str::to_string))
            .collect()
    }

    #[test]
    fn test_counter() {
        let mut counter = IdCounter::new();
        assert_eq!(counter.issued(), 0);
        assert_eq!(counter.next_id(), 1);
        assert_eq!(counter.next_id(), 2);
        assert_eq!(counter.issued(), 2);
    }

    #[test]
    fn test_scan_order_with_second_footnotes_pass() {
        let dir = TempDir::new().unwrap();
        let body = load(&dir, PartKind::Body, "document.xml", BODY);
        let footnotes = load(&dir, PartKind::Footnotes, "footnotes.xml", FOOTNOTES);
        let headers = vec![load(&dir, PartKind::Header, "header1.xml", HEADER)];
        let footers = vec![];

        let mut counter = IdCounter::new();
        uniquify_package(&body, &footnotes, &headers, &footers, &mut counter).unwrap();

        assert_eq!(ids(&body), ["1", "2"]);
        assert_eq!(ids(&headers[0]), ["4"]);
        // Rewritten once at position 3, then again after the header.
        assert_eq!(ids(&footnotes), ["5"]);
        assert_eq!(counter.issued(), 5);
    }

    #[test]
    fn test_namespaced_ids_untouched() {
        let dir = TempDir::new().unwrap();
        let body = load(&dir, PartKind::Body, "document.xml", BODY);
        let mut counter = IdCounter::new();
        uniquify_ids(&body, &mut counter).unwrap();

        let start = body.select("//w:bookmarkStart").unwrap()[0];
        assert_eq!(wml_attribute(start, "id"), Some("0"));
        let footnotes = load(&dir, PartKind::Footnotes, "footnotes.xml", FOOTNOTES);
        let note = footnotes.select("//w:footnote").unwrap()[0];
        assert_eq!(wml_attribute(note, "id"), Some("1"));
    }

    #[test]
    fn test_normalize_last_section_once() {
        let dir = TempDir::new().unwrap();
        let body = load(&dir, PartKind::Body, "document.xml", BODY);

        assert!(normalize_last_section(&body).unwrap());
        assert!(!normalize_last_section(&body).unwrap());

        let sect_pr = body.node_at_cursor().unwrap();
        let types = element_children(sect_pr)
            .into_iter()
            .filter(|e| e.name().local_part() == "type")
            .count();
        assert_eq!(types, 1);
        let type_node = wml_child(sect_pr, "type").unwrap();
        assert_eq!(wml_attribute(type_node, "val"), Some("continuous"));
    }

    #[test]
    fn test_rejects_target_before_touching_parts() {
        let store = PackageStore::from_members([
            ("word/document.xml", BODY),
            ("word/footnotes.xml", FOOTNOTES),
        ])
        .unwrap();
        let word = store.member_path("word");
        let body = DocumentPart::load_default(PartKind::Body, &word, "document.xml").unwrap();
        let footnotes =
            DocumentPart::load_default(PartKind::Footnotes, &word, "footnotes.xml").unwrap();
        let mut properties = CoreProperties::default();
        let mut content_types = ContentTypeRegistry::default();
        let relationships = Relationships::new();

        let out = TempDir::new().unwrap();
        let err = AssemblyPipeline {
            store: &store,
            body: &body,
            headers: &[],
            footers: &[],
            footnotes: &footnotes,
            properties: &mut properties,
            content_types: &mut content_types,
            relationships: &relationships,
            user: "tester",
            target_extension: "docx",
        }
        .run(&out.path().join("out.pdf"))
        .unwrap_err();

        assert!(matches!(err, Error::InvalidTargetExtension { .. }));
        assert_eq!(ids(&body), ["7", "7"]);
        assert!(properties.get(metadata::MODIFIED).is_none());
    }
}
