/// DocumentPart - one editable XML part (body, header, footer or footnotes)
/// with its cursor.
use crate::common::xml::declare_on_root;
use crate::common::{Error, Result};
use crate::ooxml::docx::query::{
    element_children, insert_after, insert_before, is_wml, parent_element, position_in_parent,
    positional_path, select_elements, select_first,
};
use crate::ooxml::opc::constants::{content_type as ct, relationship_type as rt};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use sxd_document::dom::{Document, Element};
use sxd_document::{Package, parser, writer};

/// The closed set of part variants a document is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    /// `word/document.xml`
    Body,
    /// `word/headerN.xml`
    Header,
    /// `word/footerN.xml`
    Footer,
    /// `word/footnotes.xml`
    Footnotes,
}

impl PartKind {
    /// Path of the element whose children the cursor walks.
    pub const fn root_path(self) -> &'static str {
        match self {
            Self::Body => "/w:document/w:body",
            Self::Header => "/w:hdr",
            Self::Footer => "/w:ftr",
            Self::Footnotes => "/w:footnotes",
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Body => ct::WML_DOCUMENT_MAIN,
            Self::Header => ct::WML_HEADER,
            Self::Footer => ct::WML_FOOTER,
            Self::Footnotes => ct::WML_FOOTNOTES,
        }
    }

    pub const fn relationship_type(self) -> &'static str {
        match self {
            Self::Body => rt::OFFICE_DOCUMENT,
            Self::Header => rt::HEADER,
            Self::Footer => rt::FOOTER,
            Self::Footnotes => rt::FOOTNOTES,
        }
    }

    /// Cursor expression used when a part is loaded: the last child of the root.
    pub fn default_cursor(self) -> String {
        format!("{}/*[last()]", self.root_path())
    }
}

/// Prefixes bound on the root element, `xml` excepted, sorted by prefix.
fn root_namespaces(tree: Document<'_>) -> Vec<(&str, &str)> {
    let Some(root) = tree.root().children().into_iter().find_map(|c| c.element()) else {
        return Vec::new();
    };
    let mut namespaces: Vec<_> = root
        .namespaces_in_scope()
        .into_iter()
        .filter(|ns| ns.prefix() != "xml")
        .map(|ns| (ns.prefix(), ns.uri()))
        .collect();
    namespaces.sort_unstable();
    namespaces
}

/// An XML part held as a mutable tree, plus a cursor.
///
/// The cursor is an XPath expression that should resolve to one element of
/// the tree. [`set_cursor`](Self::set_cursor) stores any expression without
/// checking it; [`node_at_cursor`](Self::node_at_cursor) is where an
/// expression that resolves to nothing is reported. Structural edits take
/// `&mut self`, so element handles borrowed from the tree cannot outlive them.
pub struct DocumentPart {
    kind: PartKind,
    /// File on disk inside the working directory
    path: PathBuf,
    package: Package,
    /// `None` when the cursor expression resolved to nothing at load
    cursor: Option<String>,
    body_path: String,
}

impl std::fmt::Debug for DocumentPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentPart")
            .field("kind", &self.kind)
            .field("path", &self.path)
            .field("cursor", &self.cursor)
            .finish_non_exhaustive()
    }
}

impl DocumentPart {
    /// Parse `dir/main_file` and evaluate `cursor_path` against it.
    ///
    /// Fails with [`Error::PartNotFound`] when the file does not exist; parts
    /// such as headers are discovered first, never assumed.
    pub fn load(
        kind: PartKind,
        dir: &Path,
        main_file: &str,
        cursor_path: &str,
        body_path: &str,
    ) -> Result<Self> {
        let path = dir.join(main_file);
        if !path.is_file() {
            return Err(Error::PartNotFound(path));
        }
        let xml = std::fs::read_to_string(&path)?;
        let package = parser::parse(&xml)
            .map_err(|e| Error::Xml(format!("{}: {:?}", path.display(), e)))?;

        let mut part = Self {
            kind,
            path,
            package,
            cursor: None,
            body_path: body_path.to_string(),
        };
        let anchored = {
            let doc = part.package.as_document();
            select_first(doc.root(), cursor_path)?.map(|node| part.path_of(node))
        };
        part.cursor = anchored;
        tracing::debug!(part = %main_file, cursor = ?part.cursor, "loaded part");
        Ok(part)
    }

    /// Load with the variant's root path and a cursor on the root's last child.
    pub fn load_default(kind: PartKind, dir: &Path, main_file: &str) -> Result<Self> {
        Self::load(
            kind,
            dir,
            main_file,
            &kind.default_cursor(),
            kind.root_path(),
        )
    }

    #[inline]
    pub fn kind(&self) -> PartKind {
        self.kind
    }

    /// File name of the part, e.g. `header1.xml`.
    pub fn name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The live tree. Mutations through it change what [`save`](Self::save) writes.
    #[inline]
    pub fn tree(&self) -> Document<'_> {
        self.package.as_document()
    }

    #[inline]
    pub fn body_path(&self) -> &str {
        &self.body_path
    }

    /// The element the cursor walks the children of.
    pub fn body_root(&self) -> Result<Element<'_>> {
        select_first(self.tree().root(), &self.body_path)?.ok_or_else(|| {
            Error::InvalidFormat(format!("{}: nothing at {}", self.name(), self.body_path))
        })
    }

    /// Direct children of the body root.
    pub fn children(&self) -> Result<Vec<Element<'_>>> {
        Ok(element_children(self.body_root()?))
    }

    pub fn element_count(&self) -> Result<usize> {
        Ok(self.children()?.len())
    }

    /// Evaluate an absolute expression against the tree.
    pub fn select(&self, expr: &str) -> Result<Vec<Element<'_>>> {
        select_elements(self.tree().root(), expr)
    }

    /// The cursor expression, `None` while undefined.
    #[inline]
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Replace the cursor. The expression is not evaluated here.
    #[inline]
    pub fn set_cursor(&mut self, path: impl Into<String>) {
        self.cursor = Some(path.into());
    }

    /// The element the cursor resolves to.
    pub fn node_at_cursor(&self) -> Result<Element<'_>> {
        let Some(cursor) = self.cursor.as_deref() else {
            return Err(Error::CursorUnresolved("<undefined>".to_string()));
        };
        select_first(self.tree().root(), cursor)?
            .ok_or_else(|| Error::CursorUnresolved(cursor.to_string()))
    }

    /// Move the cursor to the `index`-th (1-based) child of the body root.
    pub fn cursor_to_child(&mut self, index: usize) {
        self.cursor = Some(format!("{}/*[{}]", self.body_path, index));
    }

    /// Cursor on the first child of the body root.
    pub fn cursor_begin(&mut self) -> Result<()> {
        let count = self.element_count()?;
        self.cursor_to_index_or_clear(count.min(1));
        Ok(())
    }

    /// Cursor on the last child of the body root.
    pub fn cursor_end(&mut self) -> Result<()> {
        let count = self.element_count()?;
        self.cursor_to_index_or_clear(count);
        Ok(())
    }

    /// Cursor on the next child of the body root; stays on the last one.
    pub fn cursor_forward(&mut self) -> Result<()> {
        let index = self.cursor_index()?;
        let count = self.element_count()?;
        self.cursor_to_child((index + 1).min(count));
        Ok(())
    }

    /// Cursor on the previous child of the body root; stays on the first one.
    pub fn cursor_backward(&mut self) -> Result<()> {
        let index = self.cursor_index()?;
        self.cursor_to_child(index.saturating_sub(1).max(1));
        Ok(())
    }

    /// 1-based index of the body child that holds the cursor node.
    pub fn cursor_index(&self) -> Result<usize> {
        let anchor = self.block_at_cursor()?;
        position_in_parent(anchor).ok_or_else(|| self.unresolved())
    }

    /// The body child holding the cursor node (the node itself when the
    /// cursor already sits on a body child).
    pub fn block_at_cursor(&self) -> Result<Element<'_>> {
        let body = self.body_root()?;
        let mut current = self.node_at_cursor()?;
        loop {
            match parent_element(current) {
                Some(parent) if parent == body => return Ok(current),
                Some(parent) => current = parent,
                None => return Err(self.unresolved()),
            }
        }
    }

    /// Insert the element produced by `build` next to the cursor and move the
    /// cursor onto it.
    ///
    /// The new element goes after the cursor block, or before it when the
    /// cursor sits on the trailing `w:sectPr` of the body. With an undefined
    /// cursor the element is appended to the body root.
    pub fn insert_at_cursor<F>(&mut self, build: F) -> Result<()>
    where
        F: for<'d> FnOnce(Document<'d>) -> Element<'d>,
    {
        let index = {
            let node = build(self.tree());
            match self.cursor {
                None => self.body_root()?.append_child(node),
                Some(_) => {
                    let anchor = self.block_at_cursor()?;
                    if self.is_trailing_section(anchor)? {
                        insert_before(anchor, node)?;
                    } else {
                        insert_after(anchor, node)?;
                    }
                },
            }
            position_in_parent(node).ok_or_else(|| self.unresolved())?
        };
        self.cursor_to_child(index);
        Ok(())
    }

    /// Remove the body child at the cursor. The cursor moves to the child
    /// that took its place, or to the last child.
    ///
    /// The trailing `w:sectPr` of the body carries the document's final
    /// section and cannot be removed.
    pub fn remove_at_cursor(&mut self) -> Result<()> {
        let (index, remaining) = {
            let anchor = self.block_at_cursor()?;
            if self.is_trailing_section(anchor)? {
                return Err(Error::InvalidFormat(
                    "the final section properties cannot be removed".to_string(),
                ));
            }
            let index = position_in_parent(anchor).ok_or_else(|| self.unresolved())?;
            anchor.remove_from_parent();
            (index, self.element_count()?)
        };
        self.cursor_to_index_or_clear(index.min(remaining));
        Ok(())
    }

    /// Serialize the tree back to its file.
    ///
    /// Every namespace in scope on the root element is declared on the
    /// written root tag, including prefixes only `mc:Ignorable` refers to.
    pub fn save(&self) -> Result<()> {
        let tree = self.tree();
        let mut xml = Vec::new();
        writer::format_document(&tree, &mut xml)?;
        let xml = declare_on_root(&xml, &root_namespaces(tree))?;

        let mut out = BufWriter::new(File::create(&self.path)?);
        out.write_all(&xml)?;
        out.flush()?;
        tracing::debug!(part = %self.name(), "saved part");
        Ok(())
    }

    fn is_trailing_section(&self, element: Element<'_>) -> Result<bool> {
        Ok(is_wml(element, "sectPr") && self.children()?.last() == Some(&element))
    }

    fn cursor_to_index_or_clear(&mut self, index: usize) {
        if index == 0 {
            self.cursor = None;
        } else {
            self.cursor_to_child(index);
        }
    }

    /// Cursor expression for `element`: `body_path/*[N]` for body children,
    /// a positional path otherwise.
    pub fn path_of(&self, element: Element<'_>) -> String {
        let on_body = parent_element(element).is_some_and(|parent| {
            self.body_root().is_ok_and(|body| body == parent)
        });
        match position_in_parent(element) {
            Some(index) if on_body => format!("{}/*[{}]", self.body_path, index),
            _ => positional_path(element),
        }
    }

    fn unresolved(&self) -> Error {
        Error::CursorUnresolved(self.cursor.clone().unwrap_or_else(|| "<undefined>".to_string()))
    }
}
