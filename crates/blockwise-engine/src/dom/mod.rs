/*!
# In-memory DOM

The editing surface the engine works against. Blocks, inputs, toolbars and the
rectangle overlay all live in one arena of nodes owned by [`Dom`].

## Architecture

- **Arena storage**: nodes are addressed by [`NodeId`]; detaching a node keeps it
  in the arena so stale ids held by deferred tasks can be checked with
  [`Dom::is_attached`] instead of dangling.
- **Three node kinds**: elements (tag, classes, attributes, optional native input
  state), text nodes and fragments. Appending a fragment moves its children.
- **Char offsets**: every offset (text, native input selection) counts Unicode
  scalar values, never bytes.
- **Content revision**: structural and text mutations bump [`Dom::revision`].
  Class and attribute changes are presentation and do not.

Query helpers used by the caret engine (deepest node, emptiness, inputs) live in
the `query` submodule; HTML parsing and serialisation in `html`.
*/

use std::cmp::Ordering;
use std::collections::BTreeMap;

mod html;
mod query;

pub use html::parse_fragment;
pub use query::*;

/// Handle to a node in the [`Dom`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Value and selection of an `input`/`textarea` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeInput {
    pub value: String,
    pub selection_start: usize,
    pub selection_end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    pub attrs: BTreeMap<String, String>,
    pub input: Option<NativeInput>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
    Fragment,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Position argument of [`Dom::insert_adjacent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjacent {
    BeforeBegin,
    AfterBegin,
    BeforeEnd,
    AfterEnd,
}

#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
    body: NodeId,
    active_element: Option<NodeId>,
    revision: u64,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            body: NodeId(0),
            active_element: None,
            revision: 0,
        };
        dom.body = dom.create_element("body");
        dom
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Content revision, bumped by every structural or text mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    // ============ construction ============

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let tag = tag.to_ascii_lowercase();
        let input = matches!(tag.as_str(), "input" | "textarea").then(NativeInput::default);
        self.push(NodeKind::Element(Element {
            tag,
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            input,
        }))
    }

    /// Element with classes and attributes in one call.
    pub fn make(&mut self, tag: &str, classes: &[&str], attrs: &[(&str, &str)]) -> NodeId {
        let id = self.create_element(tag);
        for class in classes {
            self.add_class(id, class);
        }
        for (name, value) in attrs {
            self.set_attr(id, name, value);
        }
        id
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.push(NodeKind::Fragment)
    }

    /// Copies a node without its children.
    pub fn clone_shallow(&mut self, id: NodeId) -> NodeId {
        let kind = self.nodes[id.0].kind.clone();
        self.push(kind)
    }

    pub fn clone_deep(&mut self, id: NodeId) -> NodeId {
        let copy = self.clone_shallow(id);
        for child in self.children(id).to_vec() {
            let child_copy = self.clone_deep(child);
            self.attach(copy, child_copy, None);
        }
        copy
    }

    // ============ node access ============

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Text(_))
    }

    pub fn is_fragment(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Fragment)
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, value: &str) {
        if let NodeKind::Text(text) = &mut self.nodes[id.0].kind {
            *text = value.to_string();
            self.touch();
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id).last().copied()
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    // ============ tree mutation ============

    fn attach(&mut self, parent: NodeId, child: NodeId, at: Option<usize>) {
        if self.is_fragment(child) {
            let moved = std::mem::take(&mut self.nodes[child.0].children);
            let mut at = at;
            for node in moved {
                self.nodes[node.0].parent = None;
                self.attach(parent, node, at);
                at = at.map(|i| i + 1);
            }
            return;
        }
        self.detach(child);
        let children = &mut self.nodes[parent.0].children;
        match at {
            Some(index) if index < children.len() => children.insert(index, child),
            _ => children.push(child),
        }
        self.nodes[child.0].parent = Some(parent);
        self.touch();
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.attach(parent, child, None);
    }

    /// Inserts `child` before `reference`, or appends when `reference` is `None`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        if reference == Some(child) {
            return;
        }
        self.detach(child);
        let at = reference.and_then(|r| self.children(parent).iter().position(|c| *c == r));
        self.attach(parent, child, at);
    }

    /// Returns false when the target has no parent for a sibling position.
    pub fn insert_adjacent(&mut self, target: NodeId, position: Adjacent, node: NodeId) -> bool {
        match position {
            Adjacent::AfterBegin => {
                let first = self.first_child(target);
                self.insert_before(target, node, first);
            }
            Adjacent::BeforeEnd => self.append_child(target, node),
            Adjacent::BeforeBegin => {
                let Some(parent) = self.parent(target) else {
                    return false;
                };
                self.insert_before(parent, node, Some(target));
            }
            Adjacent::AfterEnd => {
                let Some(parent) = self.parent(target) else {
                    return false;
                };
                let next = self.next_sibling(target);
                self.insert_before(parent, node, next);
            }
        }
        true
    }

    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != id);
            if self
                .active_element
                .is_some_and(|active| active == id || self.contains(id, active))
            {
                self.active_element = None;
            }
            self.touch();
        }
    }

    pub fn remove_children(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.detach(child);
        }
    }

    /// Exchanges the tree positions of two nodes.
    pub fn swap(&mut self, a: NodeId, b: NodeId) {
        let (Some(pa), Some(pb)) = (self.parent(a), self.parent(b)) else {
            return;
        };
        let (Some(ia), Some(ib)) = (self.index_in_parent(a), self.index_in_parent(b)) else {
            return;
        };
        if pa == pb {
            self.nodes[pa.0].children.swap(ia, ib);
        } else {
            self.nodes[pa.0].children[ia] = b;
            self.nodes[pb.0].children[ib] = a;
            self.nodes[a.0].parent = Some(pb);
            self.nodes[b.0].parent = Some(pa);
        }
        self.touch();
    }

    /// Splits a text node at a char offset, returning the new right-hand node.
    pub fn split_text(&mut self, id: NodeId, offset: usize) -> Option<NodeId> {
        let text = self.text(id)?.to_string();
        let (left, right) = split_at_char(&text, offset);
        let right = self.create_text(right);
        self.set_text(id, left);
        if let Some(parent) = self.parent(id) {
            let next = self.next_sibling(id);
            self.insert_before(parent, right, next);
        }
        Some(right)
    }

    /// Merges adjacent text nodes and drops empty ones.
    pub fn normalize(&mut self, id: NodeId) {
        let mut previous_text: Option<NodeId> = None;
        for child in self.children(id).to_vec() {
            if let Some(text) = self.text(child).map(str::to_string) {
                if text.is_empty() {
                    self.detach(child);
                    continue;
                }
                if let Some(prev) = previous_text {
                    let merged = format!("{}{}", self.text(prev).unwrap_or_default(), text);
                    self.set_text(prev, &merged);
                    self.detach(child);
                    continue;
                }
                previous_text = Some(child);
            } else {
                previous_text = None;
                self.normalize(child);
            }
        }
    }

    // ============ classes & attributes ============

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id)
            .is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if let Some(element) = self.element_mut(id)
            && !element.classes.iter().any(|c| c == class)
        {
            element.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        if let Some(element) = self.element_mut(id) {
            element.classes.retain(|c| c != class);
        }
    }

    pub fn toggle_class(&mut self, id: NodeId, class: &str, state: bool) {
        if state {
            self.add_class(id, class);
        } else {
            self.remove_class(id, class);
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)
            .and_then(|e| e.attrs.get(name))
            .map(String::as_str)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if name == "class" {
            if let Some(element) = self.element_mut(id) {
                element.classes = value.split_whitespace().map(str::to_string).collect();
            }
            return;
        }
        if let Some(element) = self.element_mut(id) {
            element.attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(element) = self.element_mut(id) {
            element.attrs.remove(name);
        }
    }

    pub fn is_content_editable(&self, id: NodeId) -> bool {
        self.attr(id, "contenteditable") == Some("true")
    }

    // ============ native inputs ============

    pub fn input(&self, id: NodeId) -> Option<&NativeInput> {
        self.element(id).and_then(|e| e.input.as_ref())
    }

    pub fn set_input_value(&mut self, id: NodeId, value: &str) {
        if let Some(input) = self.element_mut(id).and_then(|e| e.input.as_mut()) {
            input.value = value.to_string();
            let len = char_len(value);
            input.selection_start = input.selection_start.min(len);
            input.selection_end = input.selection_end.min(len);
            self.touch();
        }
    }

    pub fn set_input_selection(&mut self, id: NodeId, start: usize, end: usize) {
        if let Some(input) = self.element_mut(id).and_then(|e| e.input.as_mut()) {
            let len = char_len(&input.value);
            input.selection_start = start.min(len);
            input.selection_end = end.min(len).max(input.selection_start);
        }
    }

    // ============ focus ============

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    pub fn focus(&mut self, id: NodeId) {
        self.active_element = Some(id);
    }

    pub fn blur(&mut self) {
        self.active_element = None;
    }

    // ============ traversal ============

    /// Nearest inclusive ancestor matching `pred`. Text nodes start at their parent.
    pub fn closest(&self, id: NodeId, pred: impl Fn(&Dom, NodeId) -> bool) -> Option<NodeId> {
        let mut current = if self.is_element(id) {
            Some(id)
        } else {
            self.parent(id)
        };
        while let Some(node) = current {
            if self.is_element(node) && pred(self, node) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    pub fn closest_class(&self, id: NodeId, class: &str) -> Option<NodeId> {
        self.closest(id, |dom, node| dom.has_class(node, class))
    }

    /// Inclusive containment check.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.contains(self.body, id)
    }

    /// Pre-order descendants, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    pub fn text_content(&self, id: NodeId) -> String {
        match &self.nodes[id.0].kind {
            NodeKind::Text(text) => text.clone(),
            _ => self
                .descendants(id)
                .into_iter()
                .filter_map(|n| self.text(n))
                .collect(),
        }
    }

    pub fn set_text_content(&mut self, id: NodeId, value: &str) {
        if self.is_text(id) {
            self.set_text(id, value);
            return;
        }
        self.remove_children(id);
        if !value.is_empty() {
            let text = self.create_text(value);
            self.append_child(id, text);
        }
        self.touch();
    }

    fn path(&self, id: NodeId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        while let Some(index) = self.index_in_parent(current) {
            path.push(index);
            current = match self.parent(current) {
                Some(parent) => parent,
                None => break,
            };
        }
        path.reverse();
        path
    }

    /// Document order of two boundary points `(node, offset)`.
    pub fn compare_points(&self, a: (NodeId, usize), b: (NodeId, usize)) -> Ordering {
        if a.0 == b.0 {
            return a.1.cmp(&b.1);
        }
        let mut pa = self.path(a.0);
        pa.push(a.1);
        let mut pb = self.path(b.0);
        pb.push(b.1);
        pa.cmp(&pb)
    }

    /// Char offset of a boundary point counted from the start of `container`.
    pub fn text_offset_within(&self, container: NodeId, node: NodeId, offset: usize) -> Option<usize> {
        if !self.contains(container, node) {
            return None;
        }
        if node == container && self.input(node).is_some() {
            return Some(offset);
        }
        let mut total = 0;
        for text in self
            .descendants(container)
            .into_iter()
            .filter(|n| self.is_text(*n))
        {
            if self.compare_points((text, 0), (node, offset)) != Ordering::Less {
                break;
            }
            let len = char_len(self.text(text).unwrap_or_default());
            if text == node {
                return Some(total + offset.min(len));
            }
            if self.compare_points((text, len), (node, offset)) == Ordering::Greater {
                break;
            }
            total += len;
        }
        Some(total)
    }

    /// Boundary point at a char offset from the start of `container`.
    pub fn point_at_text_offset(&self, container: NodeId, offset: usize) -> (NodeId, usize) {
        if self.input(container).is_some() {
            return (container, offset);
        }
        let mut remaining = offset;
        let mut last_text = None;
        for text in self
            .descendants(container)
            .into_iter()
            .filter(|n| self.is_text(*n))
        {
            let len = char_len(self.text(text).unwrap_or_default());
            if remaining <= len {
                return (text, remaining);
            }
            remaining -= len;
            last_text = Some((text, len));
        }
        last_text.unwrap_or((container, 0))
    }
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Splits at a char offset, clamping past-the-end offsets.
pub fn split_at_char(s: &str, offset: usize) -> (&str, &str) {
    let byte = s
        .char_indices()
        .nth(offset)
        .map_or(s.len(), |(index, _)| index);
    s.split_at(byte)
}
