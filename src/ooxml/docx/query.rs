//! XPath queries and tree edits over `sxd-document` part trees.
//!
//! All queries run with the WordprocessingML prefixes of
//! [`namespace::QUERY_PREFIXES`] bound, so expressions such as
//! `/w:document/w:body/*[last()]` work against any part.
use crate::common::{Error, Result};
use crate::ooxml::opc::constants::namespace;
use sxd_document::dom::{ChildOfElement, Element, ParentOfChild};
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value};

/// Evaluation context with the query prefixes registered.
fn context<'d>() -> Context<'d> {
    let mut ctx = Context::new();
    for (prefix, uri) in namespace::QUERY_PREFIXES {
        ctx.set_namespace(prefix, uri);
    }
    ctx
}

/// Evaluate `expr` from `node` and return the matching nodes in document order.
pub fn select<'d, N>(node: N, expr: &str) -> Result<Vec<Node<'d>>>
where
    N: Into<Node<'d>>,
{
    let xpath = match Factory::new().build(expr) {
        Ok(Some(xpath)) => xpath,
        Ok(None) => return Err(Error::XPath(format!("empty expression: {expr:?}"))),
        Err(e) => return Err(Error::XPath(format!("{expr}: {e:?}"))),
    };
    let value = xpath
        .evaluate(&context(), node)
        .map_err(|e| Error::XPath(format!("{expr}: {e:?}")))?;
    match value {
        Value::Nodeset(ns) => Ok(ns.document_order()),
        _ => Err(Error::XPath(format!("{expr}: expression does not select nodes"))),
    }
}

/// Elements selected by `expr`, in document order.
pub fn select_elements<'d, N>(node: N, expr: &str) -> Result<Vec<Element<'d>>>
where
    N: Into<Node<'d>>,
{
    Ok(select(node, expr)?
        .into_iter()
        .filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
        .collect())
}

/// First element selected by `expr` in document order.
pub fn select_first<'d, N>(node: N, expr: &str) -> Result<Option<Element<'d>>>
where
    N: Into<Node<'d>>,
{
    Ok(select_elements(node, expr)?.into_iter().next())
}

/// Direct element children, skipping text, comments and processing instructions.
pub fn element_children<'d>(element: Element<'d>) -> Vec<Element<'d>> {
    element
        .children()
        .into_iter()
        .filter_map(|child| match child {
            ChildOfElement::Element(e) => Some(e),
            _ => None,
        })
        .collect()
}

/// First direct child with the given WordprocessingML local name.
pub fn wml_child<'d>(element: Element<'d>, local_name: &str) -> Option<Element<'d>> {
    element_children(element).into_iter().find(|e| {
        let name = e.name();
        name.local_part() == local_name && name.namespace_uri() == Some(namespace::WML_MAIN)
    })
}

/// Value of a `w:`-qualified attribute.
#[inline]
pub fn wml_attribute<'d>(element: Element<'d>, local_name: &str) -> Option<&'d str> {
    element.attribute_value((namespace::WML_MAIN, local_name))
}

/// Concatenated text of every descendant text node.
#[inline]
pub fn text_content(element: Element<'_>) -> String {
    Node::Element(element).string_value()
}

/// Parent element, `None` for the document element.
pub fn parent_element<'d>(element: Element<'d>) -> Option<Element<'d>> {
    match element.parent()? {
        ParentOfChild::Element(parent) => Some(parent),
        ParentOfChild::Root(_) => None,
    }
}

/// 1-based position of `element` among its parent's element children.
pub fn position_in_parent(element: Element<'_>) -> Option<usize> {
    match element.parent()? {
        ParentOfChild::Element(parent) => element_children(parent)
            .iter()
            .position(|e| *e == element)
            .map(|i| i + 1),
        ParentOfChild::Root(_) => Some(1),
    }
}

/// Absolute positional path of an element, e.g. `/*[1]/*[1]/*[3]`.
pub fn positional_path(element: Element<'_>) -> String {
    let mut steps = Vec::new();
    let mut current = Some(element);
    while let Some(e) = current {
        steps.push(position_in_parent(e).unwrap_or(1));
        current = parent_element(e);
    }
    steps
        .iter()
        .rev()
        .map(|i| format!("/*[{i}]"))
        .collect()
}

/// Whether two elements share a name in the WordprocessingML namespace.
#[inline]
pub fn is_wml(element: Element<'_>, local_name: &str) -> bool {
    let name = element.name();
    name.local_part() == local_name && name.namespace_uri() == Some(namespace::WML_MAIN)
}

/// Insert `new` right after `anchor` under the same parent.
pub fn insert_after<'d>(anchor: Element<'d>, new: Element<'d>) -> Result<()> {
    let parent = parent_element(anchor)
        .ok_or_else(|| Error::InvalidFormat("cannot insert next to the document element".into()))?;
    let children = parent.children();
    let index = children
        .iter()
        .position(|c| *c == ChildOfElement::Element(anchor))
        .map_or(children.len(), |i| i + 1);
    reorder_into(parent, &children[index..], new);
    Ok(())
}

/// Insert `new` right before `anchor` under the same parent.
pub fn insert_before<'d>(anchor: Element<'d>, new: Element<'d>) -> Result<()> {
    let parent = parent_element(anchor)
        .ok_or_else(|| Error::InvalidFormat("cannot insert next to the document element".into()))?;
    let children = parent.children();
    let index = children
        .iter()
        .position(|c| *c == ChildOfElement::Element(anchor))
        .unwrap_or(children.len());
    reorder_into(parent, &children[index..], new);
    Ok(())
}

/// Append `new`, then move the `tail` siblings behind it.
fn reorder_into<'d>(parent: Element<'d>, tail: &[ChildOfElement<'d>], new: Element<'d>) {
    parent.append_child(new);
    for child in tail {
        parent.append_child(*child);
    }
}
