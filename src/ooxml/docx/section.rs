/// Section - page geometry of a `w:sectPr` node and section-break lookups.
use crate::common::{Result, Twips};
use crate::ooxml::docx::enums::Orientation;
use crate::ooxml::docx::query::{
    element_children, insert_before, is_wml, select_elements, select_first, wml_attribute,
    wml_child,
};
use crate::ooxml::opc::constants::namespace;
use serde::Serialize;
use sxd_document::dom::{Document, Element};

/// Section breaks live either directly in the body or inside the properties
/// of the paragraph that ends the section.
const FOLLOWING_SECTION: &str =
    "following-sibling::w:sectPr | following-sibling::w:p/w:pPr/w:sectPr";

/// Children of `w:sectPr` that come after `w:type` in schema order.
const AFTER_TYPE: &[&str] = &[
    "pgSz",
    "pgMar",
    "paperSrc",
    "pgBorders",
    "lnNumType",
    "pgNumType",
    "cols",
    "formProt",
    "vAlign",
    "noEndnote",
    "titlePg",
    "textDirection",
    "bidi",
    "rtlGutter",
    "docGrid",
    "printerSettings",
    "sectPrChange",
];

/// Page margins of a section, in twips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Margins {
    pub top: Twips,
    pub bottom: Twips,
    pub left: Twips,
    pub right: Twips,
    /// Distance from the page edge to the header
    pub header: Twips,
    /// Distance from the page edge to the footer
    pub footer: Twips,
    pub gutter: Twips,
}

/// Page size and margins read from a section-properties node.
///
/// Absent attributes read as zero; a missing node gives the all-zero geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SectionGeometry {
    pub width: Twips,
    pub height: Twips,
    pub orientation: Orientation,
    pub margins: Margins,
}

/// [`SectionGeometry`] converted to inches.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PageDimensions {
    pub width: f64,
    pub height: f64,
    pub orientation: Orientation,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_header: f64,
    pub margin_footer: f64,
    pub gutter: f64,
}

impl SectionGeometry {
    /// Read the geometry of a `w:sectPr` element.
    pub fn from_node(node: Option<Element<'_>>) -> Self {
        let Some(sect_pr) = node else {
            return Self::default();
        };

        let mut geometry = Self::default();
        if let Some(pg_sz) = wml_child(sect_pr, "pgSz") {
            geometry.width = twips_attr(pg_sz, "w");
            geometry.height = twips_attr(pg_sz, "h");
            geometry.orientation = wml_attribute(pg_sz, "orient")
                .and_then(Orientation::from_xml)
                .unwrap_or_default();
        }
        if let Some(pg_mar) = wml_child(sect_pr, "pgMar") {
            geometry.margins = Margins {
                top: twips_attr(pg_mar, "top"),
                bottom: twips_attr(pg_mar, "bottom"),
                left: twips_attr(pg_mar, "left"),
                right: twips_attr(pg_mar, "right"),
                header: twips_attr(pg_mar, "header"),
                footer: twips_attr(pg_mar, "footer"),
                gutter: twips_attr(pg_mar, "gutter"),
            };
        }
        geometry
    }

    pub fn to_inches(&self) -> PageDimensions {
        let m = &self.margins;
        PageDimensions {
            width: self.width.to_inches(),
            height: self.height.to_inches(),
            orientation: self.orientation,
            margin_top: m.top.to_inches(),
            margin_bottom: m.bottom.to_inches(),
            margin_left: m.left.to_inches(),
            margin_right: m.right.to_inches(),
            margin_header: m.header.to_inches(),
            margin_footer: m.footer.to_inches(),
            gutter: m.gutter.to_inches(),
        }
    }
}

#[inline]
fn twips_attr(element: Element<'_>, name: &str) -> Twips {
    wml_attribute(element, name)
        .and_then(Twips::parse)
        .unwrap_or_default()
}

/// The nearest section-properties node after `node`, in document order.
pub fn following_section<'d>(node: Element<'d>) -> Result<Option<Element<'d>>> {
    select_first(node, FOLLOWING_SECTION)
}

/// The last section-properties node below `body`, in document order.
pub fn last_section<'d>(body: Element<'d>) -> Result<Option<Element<'d>>> {
    Ok(select_elements(body, ".//w:sectPr")?.pop())
}

/// Give `sect_pr` an explicit `<w:type w:val="continuous"/>` unless it
/// already carries a section type. Returns whether a node was added.
pub fn ensure_section_type<'d>(doc: Document<'d>, sect_pr: Element<'d>) -> Result<bool> {
    if wml_child(sect_pr, "type").is_some() {
        return Ok(false);
    }

    let type_node = doc.create_element((namespace::WML_MAIN, "type"));
    type_node.set_preferred_prefix(Some("w"));
    type_node.set_attribute_value((namespace::WML_MAIN, "val"), "continuous");

    let successor = element_children(sect_pr)
        .into_iter()
        .find(|child| AFTER_TYPE.iter().any(|name| is_wml(*child, name)));
    match successor {
        Some(next) => insert_before(next, type_node)?,
        None => sect_pr.append_child(type_node),
    }
    Ok(true)
}
