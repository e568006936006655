// src/dom/document.rs
use crate::core::types::{NodeId, ReadyState};
use crate::error::{NumeralError, Result};
use std::collections::BTreeMap;

/// An element node. Field elements additionally carry a live value and a
/// caret; offsets are counted in characters.
#[derive(Debug, Clone)]
pub struct Element {
    tag_name: String,
    attrs: BTreeMap<String, String>,
    value: String,
    selection_start: usize,
    selection_end: usize,
}

impl Element {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            value: String::new(),
            selection_start: 0,
            selection_end: 0,
        }
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Sets an attribute. Setting `value` also resets the field's value,
    /// as it does for a field the user has not edited yet.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if name == "value" {
            self.set_value(value);
        }
        self.attrs.insert(name, value.to_string());
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attrs.remove(&name.to_ascii_lowercase())
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the value and moves the caret to the end.
    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        let len = self.value_len();
        self.selection_start = len;
        self.selection_end = len;
    }

    pub fn value_len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn selection_start(&self) -> usize {
        self.selection_start
    }

    pub fn selection_end(&self) -> usize {
        self.selection_end
    }

    pub fn set_selection_range(&mut self, start: usize, end: usize) {
        let len = self.value_len();
        let end = end.min(len);
        self.selection_start = start.min(end);
        self.selection_end = end;
    }

    /// Replaces the selection with `text` and leaves the caret after it.
    pub fn insert_at_caret(&mut self, text: &str) {
        let start = byte_offset(&self.value, self.selection_start);
        let end = byte_offset(&self.value, self.selection_end);
        self.value.replace_range(start..end, text);
        let caret = self.selection_start + text.chars().count();
        self.selection_start = caret;
        self.selection_end = caret;
    }
}

fn byte_offset(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }
}

/// Arena of nodes rooted at an `<html>` element.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    body: Option<NodeId>,
    ready_state: ReadyState,
}

impl Document {
    /// `<html><body></body></html>`, already loaded.
    pub fn new() -> Self {
        let mut doc = Self::without_body();
        let body = doc.create_element("body");
        doc.nodes[body.0].parent = Some(doc.root);
        doc.nodes[doc.root.0].children.push(body);
        doc.body = Some(body);
        doc
    }

    pub fn without_body() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Element(Element::new("html")),
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            body: None,
            ready_state: ReadyState::Complete,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> Option<NodeId> {
        self.body
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.push(NodeKind::Element(Element::new(tag_name)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Capability check: `Some` only for element nodes, which can hold
    /// attributes, values and descendants.
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    /// `id` followed by its ancestors up to the root.
    pub fn ancestors_inclusive(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut current = self.node(id).map(|_| id);
        while let Some(node) = current {
            path.push(node);
            current = self.parent(node);
        }
        path
    }

    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, of: NodeId) -> bool {
        self.ancestors_inclusive(of).contains(&ancestor)
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.is_inclusive_ancestor(self.root, id)
    }

    /// Descendants of `id` in document order, excluding `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Moves `child` to the end of `parent`'s children, detaching it from any
    /// previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.node(child).is_none() {
            return Err(NumeralError::UnknownNode(child));
        }
        if self.element(parent).is_none() || self.is_inclusive_ancestor(child, parent) {
            if self.node(parent).is_none() {
                return Err(NumeralError::UnknownNode(parent));
            }
            return Err(NumeralError::InvalidHierarchy { parent, child });
        }
        if child == self.root {
            return Err(NumeralError::InvalidHierarchy { parent, child });
        }

        if let Some(old_parent) = self.nodes[child.0].parent.take() {
            self.nodes[old_parent.0].children.retain(|&c| c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.parent(child) != Some(parent) {
            return Err(NumeralError::InvalidHierarchy { parent, child });
        }
        self.nodes[parent.0].children.retain(|&c| c != child);
        self.nodes[child.0].parent = None;
        Ok(())
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<()> {
        self.element_mut(id)
            .ok_or(NumeralError::UnknownNode(id))?
            .set_attr(name, value);
        Ok(())
    }

    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::value)
    }

    pub fn set_value(&mut self, id: NodeId, value: &str) -> Result<()> {
        self.element_mut(id)
            .ok_or(NumeralError::UnknownNode(id))?
            .set_value(value);
        Ok(())
    }

    pub fn selection_start(&self, id: NodeId) -> Option<usize> {
        self.element(id).map(Element::selection_start)
    }

    pub fn set_selection_range(&mut self, id: NodeId, start: usize, end: usize) -> Result<()> {
        self.element_mut(id)
            .ok_or(NumeralError::UnknownNode(id))?
            .set_selection_range(start, end);
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_has_body_under_root() {
        let doc = Document::new();
        let body = doc.body().unwrap();
        assert_eq!(doc.parent(body), Some(doc.root()));
        assert_eq!(doc.element(body).unwrap().tag_name(), "body");
        assert!(Document::without_body().body().is_none());
    }

    #[test]
    fn text_nodes_have_no_element_capability() {
        let mut doc = Document::new();
        let text = doc.create_text("hello");
        assert!(doc.element(text).is_none());
        let body = doc.body().unwrap();
        assert!(matches!(
            doc.append_child(text, body),
            Err(NumeralError::InvalidHierarchy { .. })
        ));
    }

    #[test]
    fn append_moves_between_parents() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        let input = doc.create_element("input");
        doc.append_child(body, a).unwrap();
        doc.append_child(body, b).unwrap();
        doc.append_child(a, input).unwrap();
        doc.append_child(b, input).unwrap();
        assert!(doc.children(a).is_empty());
        assert_eq!(doc.children(b), &[input]);
        assert!(doc.is_connected(input));
    }

    #[test]
    fn cycles_are_rejected() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let div = doc.create_element("div");
        doc.append_child(body, div).unwrap();
        assert!(doc.append_child(div, body).is_err());
        assert!(doc.append_child(div, div).is_err());
    }

    #[test]
    fn descendants_are_in_document_order() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let form = doc.create_element("form");
        let a = doc.create_element("input");
        let span = doc.create_element("span");
        let b = doc.create_element("input");
        doc.append_child(body, form).unwrap();
        doc.append_child(form, a).unwrap();
        doc.append_child(form, span).unwrap();
        doc.append_child(span, b).unwrap();
        assert_eq!(doc.descendants(body), vec![form, a, span, b]);
    }

    #[test]
    fn insert_at_caret_replaces_selection() {
        let mut el = Element::new("INPUT");
        assert_eq!(el.tag_name(), "input");
        el.set_value("١٢٣");
        el.set_selection_range(1, 2);
        el.insert_at_caret("x");
        assert_eq!(el.value(), "١x٣");
        assert_eq!(el.selection_start(), 2);
    }

    #[test]
    fn selection_is_clamped_to_value() {
        let mut el = Element::new("input");
        el.set_value("12");
        el.set_selection_range(5, 9);
        assert_eq!((el.selection_start(), el.selection_end()), (2, 2));
        el.set_selection_range(2, 1);
        assert_eq!((el.selection_start(), el.selection_end()), (1, 1));
    }

    #[test]
    fn value_attribute_sets_value() {
        let mut el = Element::new("input");
        el.set_attr("VALUE", "٥");
        assert_eq!(el.value(), "٥");
        assert_eq!(el.attr("value"), Some("٥"));
        assert_eq!(el.selection_start(), 1);
    }
}
