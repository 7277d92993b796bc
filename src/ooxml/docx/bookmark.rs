/// Bookmarks - named `<w:bookmarkStart>` markers in a part tree.
use crate::common::Result;
use crate::ooxml::docx::query::{parent_element, select_elements, wml_attribute};
use std::collections::HashSet;
use sxd_document::dom::Element;
use sxd_xpath::nodeset::Node;

/// Hidden bookmark Word uses to remember the last edit position.
pub const GO_BACK: &str = "_GoBack";

/// Distinct bookmark names below `node`, in first-appearance order, without
/// [`GO_BACK`].
pub fn bookmark_names<'d, N>(node: N) -> Result<Vec<String>>
where
    N: Into<Node<'d>>,
{
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    for start in select_elements(node, ".//w:bookmarkStart[@w:name]")? {
        if let Some(name) = wml_attribute(start, "name")
            && name != GO_BACK
            && seen.insert(name)
        {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

/// The direct child of `container` holding the start of bookmark `name`.
pub fn bookmark_anchor<'d>(container: Element<'d>, name: &str) -> Result<Option<Element<'d>>> {
    let starts = select_elements(container, ".//w:bookmarkStart[@w:name]")?;
    let Some(start) = starts
        .into_iter()
        .find(|e| wml_attribute(*e, "name") == Some(name))
    else {
        return Ok(None);
    };

    let mut current = start;
    while let Some(parent) = parent_element(current) {
        if parent == container {
            return Ok(Some(current));
        }
        current = parent;
    }
    Ok(None)
}
