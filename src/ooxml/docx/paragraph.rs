/// Paragraph construction for body edits.
use crate::ooxml::opc::constants::namespace::WML_MAIN;
use sxd_document::dom::{Document, Element};

/// Create a `w:`-prefixed element.
#[inline]
fn wml_element<'d>(doc: Document<'d>, local_name: &str) -> Element<'d> {
    let element = doc.create_element((WML_MAIN, local_name));
    element.set_preferred_prefix(Some("w"));
    element
}

/// `<w:p><w:pPr><w:pStyle w:val=".."/></w:pPr><w:r><w:t>..</w:t></w:r></w:p>`
///
/// The properties block is left out without a style id, the run without text.
pub fn new_paragraph<'d>(doc: Document<'d>, text: &str, style_id: Option<&str>) -> Element<'d> {
    let p = wml_element(doc, "p");
    if let Some(style_id) = style_id {
        let p_pr = wml_element(doc, "pPr");
        let p_style = wml_element(doc, "pStyle");
        p_style.set_attribute_value((WML_MAIN, "val"), style_id);
        p_pr.append_child(p_style);
        p.append_child(p_pr);
    }
    if !text.is_empty() {
        let r = wml_element(doc, "r");
        let t = wml_element(doc, "t");
        t.append_child(doc.create_text(text));
        r.append_child(t);
        p.append_child(r);
    }
    p
}

/// A paragraph holding a single page-break run.
pub fn new_page_break<'d>(doc: Document<'d>) -> Element<'d> {
    let p = wml_element(doc, "p");
    let r = wml_element(doc, "r");
    let br = wml_element(doc, "br");
    br.set_attribute_value((WML_MAIN, "type"), "page");
    r.append_child(br);
    p.append_child(r);
    p
}
