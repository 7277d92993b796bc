/// Document - the main API for opening, editing and saving a Word package.
use crate::common::{Error, Result};
use crate::ooxml::docx::assembly::AssemblyPipeline;
use crate::ooxml::docx::bookmark::{bookmark_anchor, bookmark_names};
use crate::ooxml::docx::config::DocumentConfig;
use crate::ooxml::docx::enums::StyleType;
use crate::ooxml::docx::paragraph::{new_page_break, new_paragraph};
use crate::ooxml::docx::parts::{DocumentPart, PartKind};
use crate::ooxml::docx::query::{position_in_parent, text_content, wml_attribute};
use crate::ooxml::docx::section::{SectionGeometry, following_section, last_section};
use crate::ooxml::docx::styles::{StyleCatalog, StyleRecord};
use crate::ooxml::docx::template;
use crate::ooxml::metadata::{CoreProperties, DocPropertiesUpdate, PropertyRecord};
use crate::ooxml::opc::constants::{namespace, part_path};
use crate::ooxml::opc::{ContentTypeRegistry, PackageStore, Relationships};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

static HEADER_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^header(\d+)\.xml$").expect("Failed to build header pattern"));
static FOOTER_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^footer(\d+)\.xml$").expect("Failed to build footer pattern"));

/// Paragraph style references of the body.
const BODY_STYLE_REFS: &str = "/w:document/w:body//w:pStyle";

/// An open Word document.
///
/// A `Document` owns the working directory its package was unpacked into and
/// every part loaded from it. Edits happen in memory; [`save`](Self::save)
/// writes all parts back and packs a new container. The working directory
/// is removed when the document is dropped.
///
/// Saving renumbers identifiers through a counter that lives for one call;
/// `save` takes `&mut self`, so one document is never saved concurrently.
///
/// # Examples
///
/// ```rust,no_run
/// use std::collections::BTreeMap;
/// use wordml::Document;
///
/// let mut doc = Document::new()?;
/// doc.add_paragraph("Introduction", Some("heading 1"))?;
/// doc.add_paragraph("Body text", None)?;
///
/// let mapping = BTreeMap::from([("heading 2".to_string(), vec!["heading 1".to_string()])]);
/// doc.remap_styles(&mapping)?;
///
/// let inches = doc.page_geometry_at_cursor()?.to_inches();
/// println!("{} x {} in", inches.width, inches.height);
///
/// doc.save("report.docx")?;
/// # Ok::<(), wordml::Error>(())
/// ```
#[derive(Debug)]
pub struct Document {
    config: DocumentConfig,
    store: PackageStore,
    properties: CoreProperties,
    content_types: ContentTypeRegistry,
    /// Relationships of the body part
    relationships: Relationships,
    styles: StyleCatalog,
    default_styles: BTreeMap<StyleType, String>,
    body: DocumentPart,
    /// In discovery order (`header1.xml`, `header2.xml`, ...)
    headers: Vec<DocumentPart>,
    footers: Vec<DocumentPart>,
    footnotes: DocumentPart,
    /// Geometry of the final section when the document was opened
    default_section: SectionGeometry,
}

impl Document {
    /// Open the built-in template.
    pub fn new() -> Result<Self> {
        Self::open(None)
    }

    /// Open a package, or the template when `path` is `None`.
    ///
    /// Fails with [`Error::FileNotFound`] when `path` does not exist.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        Self::open_with(path, DocumentConfig::default())
    }

    /// Open with explicit configuration.
    pub fn open_with(path: Option<&Path>, config: DocumentConfig) -> Result<Self> {
        let store = match path.or(config.template.as_deref()) {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::FileNotFound(path.to_path_buf()));
                }
                PackageStore::unpack(path)?
            },
            None => PackageStore::from_members(template::members())?,
        };
        let word_dir = store.member_path(part_path::WORD_DIR);

        let mut content_types = ContentTypeRegistry::load(store.path())?;
        let mut relationships = Relationships::load(&store.member_path(part_path::DOCUMENT_RELS))?;

        let footnotes_file = word_dir.join(part_path::FOOTNOTES);
        if !footnotes_file.exists() {
            std::fs::write(&footnotes_file, template::FOOTNOTES)?;
            content_types.add_override(
                &format!("/{}/{}", part_path::WORD_DIR, part_path::FOOTNOTES),
                PartKind::Footnotes.content_type(),
            );
            relationships.get_or_add(PartKind::Footnotes.relationship_type(), part_path::FOOTNOTES);
            tracing::debug!("installed default footnotes part");
        }

        let properties = CoreProperties::load(store.path())?;
        let styles = StyleCatalog::load(store.path())?;
        let default_styles = StyleType::ALL
            .into_iter()
            .filter_map(|t| {
                styles
                    .default_style_for(t)
                    .map(|r| (t, r.style_id.clone()))
            })
            .collect();

        let mut body = DocumentPart::load_default(PartKind::Body, &word_dir, part_path::DOCUMENT)?;
        let headers = load_discovered(PartKind::Header, &word_dir, &HEADER_FILE)?;
        let footers = load_discovered(PartKind::Footer, &word_dir, &FOOTER_FILE)?;
        let footnotes =
            DocumentPart::load_default(PartKind::Footnotes, &word_dir, part_path::FOOTNOTES)?;

        let default_section = SectionGeometry::from_node(last_section(body.body_root()?)?);
        body.cursor_end()?;

        tracing::info!(
            source = ?path,
            headers = headers.len(),
            footers = footers.len(),
            styles = styles.len(),
            "document opened"
        );

        Ok(Self {
            config,
            store,
            properties,
            content_types,
            relationships,
            styles,
            default_styles,
            body,
            headers,
            footers,
            footnotes,
            default_section,
        })
    }

    /// Write every part back and pack the result into `target`.
    ///
    /// `target` must end in the configured extension (`.docx` by default,
    /// compared case-insensitively), otherwise nothing is written and
    /// [`Error::InvalidTargetExtension`] is returned.
    pub fn save(&mut self, target: impl AsRef<Path>) -> Result<()> {
        let user = self.config.resolved_user();
        AssemblyPipeline {
            store: &self.store,
            body: &self.body,
            headers: &self.headers,
            footers: &self.footers,
            footnotes: &self.footnotes,
            properties: &mut self.properties,
            content_types: &mut self.content_types,
            relationships: &self.relationships,
            user: &user,
            target_extension: &self.config.target_extension,
        }
        .run(target.as_ref())
    }

    #[inline]
    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Number of direct children of the body.
    pub fn element_count(&self) -> Result<usize> {
        self.body.element_count()
    }

    #[inline]
    pub fn styles_info(&self) -> &[StyleRecord] {
        self.styles.records()
    }

    #[inline]
    pub fn style_catalog(&self) -> &StyleCatalog {
        &self.styles
    }

    /// Default style id per style type, as found at open.
    #[inline]
    pub fn default_styles(&self) -> &BTreeMap<StyleType, String> {
        &self.default_styles
    }

    #[inline]
    pub fn doc_properties(&self) -> &[PropertyRecord] {
        self.properties.records()
    }

    /// Update caller-owned core properties. "modified" and "lastModifiedBy"
    /// are stamped on save and rejected here.
    pub fn set_doc_properties(&mut self, update: &DocPropertiesUpdate) -> Result<()> {
        self.properties.apply(update)
    }

    /// Geometry of the section the body cursor belongs to.
    ///
    /// That is the first section break after the cursor block, whether a
    /// body-level `w:sectPr` or one inside a paragraph's properties. When none
    /// follows, the last section of the body applies.
    pub fn page_geometry_at_cursor(&self) -> Result<SectionGeometry> {
        let block = self.body.block_at_cursor()?;
        let node = match following_section(block)? {
            Some(node) => Some(node),
            None => last_section(self.body.body_root()?)?,
        };
        Ok(SectionGeometry::from_node(node))
    }

    /// Geometry of the final section when the document was opened.
    #[inline]
    pub fn default_section(&self) -> SectionGeometry {
        self.default_section
    }

    /// Distinct bookmark names of the body, without Word's `_GoBack` marker.
    pub fn bookmark_names(&self) -> Result<Vec<String>> {
        bookmark_names(self.body.body_root()?)
    }

    /// Rewrite paragraph style references of the body.
    ///
    /// `mapping` goes from a destination style name to the source style names
    /// it replaces; all are paragraph style names. Every name is validated
    /// before the body is touched. Returns the number of references rewritten.
    pub fn remap_styles(&mut self, mapping: &BTreeMap<String, Vec<String>>) -> Result<usize> {
        if mapping.is_empty() {
            return Ok(0);
        }
        let pairs: HashMap<String, String> =
            self.styles.resolve_paragraph_remap(mapping)?.into_iter().collect();

        let mut rewritten = 0;
        for style_ref in self.body.select(BODY_STYLE_REFS)? {
            let Some(dest) = wml_attribute(style_ref, "val").and_then(|v| pairs.get(v)) else {
                continue;
            };
            style_ref.set_attribute_value((namespace::WML_MAIN, "val"), dest);
            rewritten += 1;
        }
        tracing::debug!(rewritten, "paragraph styles remapped");
        Ok(rewritten)
    }

    /// The body tree, for edits this API does not cover.
    #[inline]
    pub fn raw_body_tree(&self) -> sxd_document::dom::Document<'_> {
        self.body.tree()
    }

    #[inline]
    pub fn raw_relationships(&self) -> &Relationships {
        &self.relationships
    }

    #[inline]
    pub fn body(&self) -> &DocumentPart {
        &self.body
    }

    #[inline]
    pub fn body_mut(&mut self) -> &mut DocumentPart {
        &mut self.body
    }

    /// Header parts in discovery order.
    #[inline]
    pub fn headers(&self) -> &[DocumentPart] {
        &self.headers
    }

    /// Footer parts in discovery order.
    #[inline]
    pub fn footers(&self) -> &[DocumentPart] {
        &self.footers
    }

    /// Header by file name, e.g. `header1.xml`.
    pub fn header(&self, name: &str) -> Option<&DocumentPart> {
        self.headers.iter().find(|p| p.name() == name)
    }

    pub fn header_mut(&mut self, name: &str) -> Option<&mut DocumentPart> {
        self.headers.iter_mut().find(|p| p.name() == name)
    }

    /// Footer by file name, e.g. `footer1.xml`.
    pub fn footer(&self, name: &str) -> Option<&DocumentPart> {
        self.footers.iter().find(|p| p.name() == name)
    }

    pub fn footer_mut(&mut self, name: &str) -> Option<&mut DocumentPart> {
        self.footers.iter_mut().find(|p| p.name() == name)
    }

    #[inline]
    pub fn footnotes(&self) -> &DocumentPart {
        &self.footnotes
    }

    #[inline]
    pub fn footnotes_mut(&mut self) -> &mut DocumentPart {
        &mut self.footnotes
    }

    pub fn cursor_begin(&mut self) -> Result<()> {
        self.body.cursor_begin()
    }

    pub fn cursor_end(&mut self) -> Result<()> {
        self.body.cursor_end()
    }

    pub fn cursor_forward(&mut self) -> Result<()> {
        self.body.cursor_forward()
    }

    pub fn cursor_backward(&mut self) -> Result<()> {
        self.body.cursor_backward()
    }

    /// Move the cursor to the first body block whose text matches `pattern`.
    pub fn cursor_reach(&mut self, pattern: &str) -> Result<()> {
        let regex = Regex::new(pattern)?;
        let index = self
            .body
            .children()?
            .into_iter()
            .position(|block| regex.is_match(&text_content(block)))
            .ok_or_else(|| Error::KeywordNotFound(pattern.to_string()))?;
        self.body.cursor_to_child(index + 1);
        Ok(())
    }

    /// Move the cursor to the body block holding bookmark `name`.
    pub fn cursor_bookmark(&mut self, name: &str) -> Result<()> {
        let index = bookmark_anchor(self.body.body_root()?, name)?
            .and_then(position_in_parent)
            .ok_or_else(|| Error::BookmarkNotFound(name.to_string()))?;
        self.body.cursor_to_child(index);
        Ok(())
    }

    /// Insert a paragraph after the cursor and move the cursor onto it.
    ///
    /// `style_name` is a paragraph style display name; `None` uses the
    /// default paragraph style.
    pub fn add_paragraph(&mut self, text: &str, style_name: Option<&str>) -> Result<()> {
        let style_id = match style_name {
            Some(name) => Some(
                self.styles
                    .lookup(name, StyleType::Paragraph)
                    .map(|r| r.style_id.clone())
                    .ok_or_else(|| Error::UnknownStyleName(vec![name.to_string()]))?,
            ),
            None => self.default_styles.get(&StyleType::Paragraph).cloned(),
        };
        self.body
            .insert_at_cursor(|doc| new_paragraph(doc, text, style_id.as_deref()))
    }

    /// Insert a page break paragraph after the cursor and move the cursor onto it.
    pub fn add_page_break(&mut self) -> Result<()> {
        self.body.insert_at_cursor(new_page_break)
    }

    /// Remove the body block at the cursor.
    pub fn remove_at_cursor(&mut self) -> Result<()> {
        self.body.remove_at_cursor()
    }
}

/// Load every `word/<kind>N.xml` part, ordered by `N`.
fn load_discovered(kind: PartKind, word_dir: &Path, pattern: &Regex) -> Result<Vec<DocumentPart>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(word_dir)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };
        if let Some(caps) = pattern.captures(name)
            && let Ok(number) = caps[1].parse::<u32>()
        {
            found.push((number, name.to_string()));
        }
    }
    found.sort();

    found
        .into_iter()
        .map(|(_, name)| DocumentPart::load_default(kind, word_dir, &name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Twips;
    use crate::ooxml::docx::query::{element_children, is_wml, wml_child};
    use crate::ooxml::metadata;
    use crate::ooxml::opc::constants::relationship_type as rt;
    use std::io::Read;
    use tempfile::TempDir;

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

    fn body_xml(inner: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {W}><w:body>{inner}</w:body></w:document>"#
        )
    }

    /// Write a container made of the template with `replaced` members swapped in.
    fn write_docx(dir: &TempDir, name: &str, replaced: &[(&str, String)]) -> std::path::PathBuf {
        let mut members: Vec<(&str, &str)> = template::members().to_vec();
        for (member, content) in replaced {
            match members.iter_mut().find(|(m, _)| m == member) {
                Some(slot) => slot.1 = content.as_str(),
                None => members.push((*member, content.as_str())),
            }
        }
        let store = PackageStore::from_members(members).unwrap();
        let target = dir.path().join(name);
        store.pack(&target).unwrap();
        target
    }

    fn read_member(container: &Path, member: &str) -> Option<String> {
        let file = std::fs::File::open(container).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut entry = archive.by_name(member).ok()?;
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        Some(content)
    }

    fn member_names(container: &Path) -> Vec<String> {
        let file = std::fs::File::open(container).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect()
    }

    fn style_refs(doc: &Document) -> Vec<String> {
        doc.body()
            .select(BODY_STYLE_REFS)
            .unwrap()
            .into_iter()
            .filter_map(|e| wml_attribute(e, "val").map(str::to_string))
            .collect()
    }

    #[test]
    fn test_open_missing_file() {
        let err = Document::open(Some(Path::new("/definitely/not/here.docx"))).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_open_template_and_save() {
        let out = TempDir::new().unwrap();
        let target = out.path().join("fresh.docx");

        let mut doc = Document::new().unwrap();
        assert_eq!(doc.element_count().unwrap(), 2);
        assert!(doc.footnotes().element_count().unwrap() >= 2);
        assert!(doc.headers().is_empty());
        doc.save(&target).unwrap();

        let names = member_names(&target);
        assert_eq!(names[0], "[Content_Types].xml");
        for member in ["word/document.xml", "word/footnotes.xml", "word/styles.xml"] {
            assert!(names.iter().any(|n| n == member), "{member}");
        }
        assert_eq!(read_member(&target, "word/styles.xml").unwrap(), template::STYLES);

        let content_types = read_member(&target, "[Content_Types].xml").unwrap();
        assert!(content_types.contains("/word/footnotes.xml"));
        assert!(content_types.contains(PartKind::Footnotes.content_type()));
        let rels = read_member(&target, "word/_rels/document.xml.rels").unwrap();
        assert!(rels.contains("footnotes.xml"));
        assert!(rels.contains(PartKind::Footnotes.relationship_type()));

        let reopened = Document::open(Some(target.as_path())).unwrap();
        assert_eq!(reopened.element_count().unwrap(), 2);
        assert_eq!(
            reopened.style_catalog().len(),
            StyleCatalog::from_xml(template::STYLES.as_bytes()).unwrap().len()
        );
    }

    #[test]
    fn test_save_rejects_extension() {
        let out = TempDir::new().unwrap();
        let mut doc = Document::new().unwrap();
        let err = doc.save(out.path().join("fresh.pdf")).unwrap_err();
        assert!(matches!(err, Error::InvalidTargetExtension { .. }));
        assert!(!out.path().join("fresh.pdf").exists());

        doc.save(out.path().join("FRESH.DOCX")).unwrap();
    }

    #[test]
    fn test_save_stamps_properties() {
        let out = TempDir::new().unwrap();
        let target = out.path().join("stamped.docx");
        let config = DocumentConfig::new().with_user("editor");
        let mut doc = Document::open_with(None, config).unwrap();

        doc.set_doc_properties(&DocPropertiesUpdate {
            title: Some("Quarterly".to_string()),
            ..Default::default()
        })
        .unwrap();
        let reserved = DocPropertiesUpdate {
            extra: vec![(metadata::MODIFIED.to_string(), "x".to_string())],
            ..Default::default()
        };
        assert!(matches!(
            doc.set_doc_properties(&reserved).unwrap_err(),
            Error::ReservedProperty(_)
        ));
        doc.save(&target).unwrap();

        let reopened = Document::open(Some(target.as_path())).unwrap();
        let props = reopened.doc_properties();
        let get = |name: &str| props.iter().find(|r| r.name == name).map(|r| r.value.clone());
        assert_eq!(get(metadata::TITLE).as_deref(), Some("Quarterly"));
        assert_eq!(get(metadata::LAST_MODIFIED_BY).as_deref(), Some("editor"));
        let modified = get(metadata::MODIFIED).unwrap();
        assert!(metadata::parse_datetime(&modified).is_ok());
        assert!(modified.ends_with('Z'));
    }

    #[test]
    fn test_missing_core_properties_created_on_save() {
        let dir = TempDir::new().unwrap();
        let package_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;
        let store = PackageStore::from_members(
            template::members()
                .into_iter()
                .filter(|(name, _)| *name != part_path::CORE_PROPERTIES)
                .map(|(name, xml)| {
                    if name == part_path::PACKAGE_RELS {
                        (name, package_rels)
                    } else {
                        (name, xml)
                    }
                }),
        )
        .unwrap();
        let source = dir.path().join("bare.docx");
        store.pack(&source).unwrap();

        let mut doc = Document::open(Some(source.as_path())).unwrap();
        assert!(doc.doc_properties().is_empty());
        let target = dir.path().join("out.docx");
        doc.save(&target).unwrap();

        assert!(read_member(&target, part_path::CORE_PROPERTIES).is_some());
        let rels = read_member(&target, part_path::PACKAGE_RELS).unwrap();
        assert_eq!(rels.matches("docProps/core.xml").count(), 1);
    }

    #[test]
    fn test_identifiers_follow_scan_order() {
        let dir = TempDir::new().unwrap();
        let drawing = |id: u32| {
            format!(
                r#"<w:p><w:r><w:drawing><wp:inline><wp:docPr id="{id}" name="pic"/></wp:inline></w:drawing></w:r></w:p>"#
            )
        };
        let body = body_xml(&format!(
            r#"{}{}<w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr>"#,
            drawing(5),
            drawing(5)
        ));
        let header = format!(r#"<w:hdr {W}>{}</w:hdr>"#, drawing(1));
        let footer = format!(r#"<w:ftr {W}>{}</w:ftr>"#, drawing(1));
        let footnotes = format!(
            r#"<w:footnotes {W}><w:footnote w:id="1">{}</w:footnote></w:footnotes>"#,
            drawing(1)
        );
        let source = write_docx(
            &dir,
            "ids.docx",
            &[
                ("word/document.xml", body),
                ("word/header1.xml", header),
                ("word/footer1.xml", footer),
                ("word/footnotes.xml", footnotes),
            ],
        );

        let mut doc = Document::open(Some(source.as_path())).unwrap();
        assert_eq!(doc.headers().len(), 1);
        let target = dir.path().join("ids-out.docx");
        doc.save(&target).unwrap();

        let ids_of = |part: &DocumentPart| -> Vec<String> {
            part.select("//*[@id]")
                .unwrap()
                .into_iter()
                .filter_map(|e| e.attribute_value("id").map(str::to_string))
                .collect()
        };
        assert_eq!(ids_of(doc.body()), ["1", "2"]);
        assert_eq!(ids_of(doc.header("header1.xml").unwrap()), ["4"]);
        assert_eq!(ids_of(doc.footer("footer1.xml").unwrap()), ["5"]);
        assert_eq!(ids_of(doc.footnotes()), ["6"]);

        let reopened = Document::open(Some(target.as_path())).unwrap();
        assert_eq!(ids_of(reopened.body()), ["1", "2"]);
    }

    #[test]
    fn test_headers_in_numeric_order() {
        let dir = TempDir::new().unwrap();
        let header =
            |text: &str| format!(r#"<w:hdr {W}><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:hdr>"#);
        let source = write_docx(
            &dir,
            "headers.docx",
            &[
                ("word/header10.xml", header("ten")),
                ("word/header2.xml", header("two")),
                ("word/header1.xml", header("one")),
            ],
        );
        let doc = Document::open(Some(source.as_path())).unwrap();
        let names: Vec<_> = doc.headers().iter().map(|h| h.name().to_string()).collect();
        assert_eq!(names, ["header1.xml", "header2.xml", "header10.xml"]);

        let two = doc.header("header2.xml").unwrap();
        assert_eq!(two.kind(), PartKind::Header);
        assert_eq!(two.cursor(), Some("/w:hdr/*[1]"));
        assert_eq!(text_content(two.node_at_cursor().unwrap()), "two");
        assert!(doc.footer("footer1.xml").is_none());
    }

    #[test]
    fn test_geometry_at_cursor() {
        let dir = TempDir::new().unwrap();
        let body = body_xml(
            r#"<w:p><w:r><w:t>landscape page</w:t></w:r></w:p>
<w:p><w:pPr><w:sectPr><w:pgSz w:w="15840" w:h="12240" w:orient="landscape"/><w:pgMar w:top="720" w:right="720" w:bottom="720" w:left="720" w:header="360" w:footer="360" w:gutter="0"/></w:sectPr></w:pPr></w:p>
<w:p><w:r><w:t>portrait page</w:t></w:r></w:p>
<w:sectPr><w:pgSz w:w="11906" w:h="16838"/><w:pgMar w:top="1440" w:right="1800" w:bottom="1440" w:left="1800" w:header="708" w:footer="708" w:gutter="0"/></w:sectPr>"#,
        );
        let source = write_docx(&dir, "geometry.docx", &[("word/document.xml", body)]);
        let mut doc = Document::open(Some(source.as_path())).unwrap();

        let last = doc.page_geometry_at_cursor().unwrap();
        assert_eq!(last, doc.default_section());
        let inches = last.to_inches();
        assert_eq!(inches.width, 11906.0 / 1440.0);
        assert_eq!(inches.height, 16838.0 / 1440.0);
        assert_eq!(inches.margin_left, 1.25);
        assert_eq!(inches.margin_top, 1.0);

        doc.cursor_begin().unwrap();
        let first = doc.page_geometry_at_cursor().unwrap();
        assert_eq!(first.width, Twips(15840));
        assert_eq!(first.to_inches().width, 11.0);
        assert_eq!(first.to_inches().margin_right, 0.5);

        doc.cursor_reach("portrait").unwrap();
        assert_eq!(doc.page_geometry_at_cursor().unwrap().width, Twips(11906));
    }

    #[test]
    fn test_template_geometry() {
        let doc = Document::new().unwrap();
        let inches = doc.default_section().to_inches();
        assert_eq!((inches.width, inches.height), (8.5, 11.0));
        assert_eq!(inches.margin_bottom, 1.0);
        assert_eq!(inches.margin_footer, 0.5);
    }

    #[test]
    fn test_remap_styles() {
        let mut doc = Document::new().unwrap();
        doc.add_paragraph("one", Some("heading 1")).unwrap();
        doc.add_paragraph("two", Some("heading 2")).unwrap();
        doc.add_paragraph("title", Some("Title")).unwrap();
        doc.add_paragraph("plain", None).unwrap();
        assert_eq!(style_refs(&doc), ["Heading1", "Heading2", "Title", "Normal"]);

        let mapping = BTreeMap::from([(
            "heading 3".to_string(),
            vec!["heading 1".to_string(), "heading 2".to_string()],
        )]);
        assert_eq!(doc.remap_styles(&mapping).unwrap(), 2);
        assert_eq!(style_refs(&doc), ["Heading3", "Heading3", "Title", "Normal"]);

        assert_eq!(doc.remap_styles(&BTreeMap::new()).unwrap(), 0);
    }

    #[test]
    fn test_remap_unknown_style_is_all_or_nothing() {
        let mut doc = Document::new().unwrap();
        doc.add_paragraph("one", Some("heading 1")).unwrap();
        let before = style_refs(&doc);

        let mapping = BTreeMap::from([("X".to_string(), vec!["NoSuchStyle".to_string()])]);
        match doc.remap_styles(&mapping).unwrap_err() {
            Error::UnknownStyleName(names) => assert_eq!(names, ["NoSuchStyle"]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(style_refs(&doc), before);
    }

    #[test]
    fn test_bookmark_names_and_cursor() {
        let dir = TempDir::new().unwrap();
        let body = body_xml(
            r#"<w:p><w:bookmarkStart w:id="0" w:name="a"/><w:r><w:t>alpha</w:t></w:r><w:bookmarkEnd w:id="0"/></w:p>
<w:p><w:bookmarkStart w:id="1" w:name="_GoBack"/><w:bookmarkEnd w:id="1"/></w:p>
<w:p><w:bookmarkStart w:id="2" w:name="b"/><w:r><w:t>beta</w:t></w:r><w:bookmarkEnd w:id="2"/></w:p>
<w:sectPr/>"#,
        );
        let source = write_docx(&dir, "bookmarks.docx", &[("word/document.xml", body)]);
        let mut doc = Document::open(Some(source.as_path())).unwrap();

        let mut names = doc.bookmark_names().unwrap();
        names.sort();
        assert_eq!(names, ["a", "b"]);

        doc.cursor_bookmark("b").unwrap();
        assert_eq!(text_content(doc.body().node_at_cursor().unwrap()), "beta");
        assert!(matches!(
            doc.cursor_bookmark("zzz").unwrap_err(),
            Error::BookmarkNotFound(_)
        ));
    }

    #[test]
    fn test_cursor_reach_and_editing() {
        let mut doc = Document::new().unwrap();
        doc.add_paragraph("first", None).unwrap();
        doc.add_paragraph("second", None).unwrap();
        doc.add_page_break().unwrap();
        assert_eq!(doc.element_count().unwrap(), 5);

        doc.cursor_reach("^fir").unwrap();
        doc.add_paragraph("after first", None).unwrap();
        assert!(matches!(
            doc.cursor_reach("missing").unwrap_err(),
            Error::KeywordNotFound(_)
        ));
        assert!(matches!(doc.cursor_reach("(").unwrap_err(), Error::Regex(_)));

        let texts: Vec<_> = doc.body().children().unwrap().into_iter().map(text_content).collect();
        assert_eq!(texts, ["", "first", "after first", "second", "", ""]);

        doc.cursor_reach("second").unwrap();
        doc.remove_at_cursor().unwrap();
        assert_eq!(doc.element_count().unwrap(), 5);
        let page_break = doc.body().node_at_cursor().unwrap();
        assert!(wml_child(wml_child(page_break, "r").unwrap(), "br").is_some());

        doc.cursor_end().unwrap();
        assert!(is_wml(doc.body().node_at_cursor().unwrap(), "sectPr"));
        assert!(matches!(doc.remove_at_cursor().unwrap_err(), Error::InvalidFormat(_)));

        assert!(matches!(
            doc.add_paragraph("x", Some("No Such Style")).unwrap_err(),
            Error::UnknownStyleName(names) if names == ["No Such Style"]
        ));
    }

    #[test]
    fn test_save_twice_keeps_one_section_type() {
        let out = TempDir::new().unwrap();
        let mut doc = Document::new().unwrap();
        doc.save(out.path().join("a.docx")).unwrap();
        doc.save(out.path().join("b.docx")).unwrap();

        let body = doc.body().body_root().unwrap();
        let sect_pr = last_section(body).unwrap().unwrap();
        let types = element_children(sect_pr)
            .into_iter()
            .filter(|e| is_wml(*e, "type"))
            .count();
        assert_eq!(types, 1);

        let saved = read_member(&out.path().join("b.docx"), "word/document.xml").unwrap();
        assert_eq!(saved.matches("continuous").count(), 1);
    }

    #[test]
    fn test_explicit_section_type_untouched() {
        let dir = TempDir::new().unwrap();
        let body = body_xml(
            r#"<w:p/><w:sectPr><w:type w:val="nextPage"/><w:pgSz w:w="12240" w:h="15840"/></w:sectPr>"#,
        );
        let source = write_docx(&dir, "typed.docx", &[("word/document.xml", body)]);
        let mut doc = Document::open(Some(source.as_path())).unwrap();
        let target = dir.path().join("typed-out.docx");
        doc.save(&target).unwrap();

        let saved = read_member(&target, "word/document.xml").unwrap();
        assert!(saved.contains("nextPage"));
        assert!(!saved.contains("continuous"));
    }

    #[test]
    fn test_default_styles_seeded() {
        let doc = Document::new().unwrap();
        let defaults = doc.default_styles();
        assert_eq!(defaults.get(&StyleType::Paragraph).map(String::as_str), Some("Normal"));
        assert_eq!(defaults.get(&StyleType::Table).map(String::as_str), Some("TableNormal"));
        assert!(doc.styles_info().iter().any(|s| s.style_name == "heading 3"));
    }

    #[test]
    fn test_raw_accessors() {
        let doc = Document::new().unwrap();
        assert!(doc.raw_relationships().first_of_type(rt::FOOTNOTES).is_some());
        assert!(doc.raw_relationships().first_of_type(rt::STYLES).is_some());
        let root = doc.raw_body_tree().root();
        assert_eq!(root.children().len(), 1);
    }
}
