//! The document selection: one anchor/focus pair shared by the whole editor.
//!
//! Range operations (`delete_contents`, `extract_to_end`, `insert_node`) work on
//! boundary points and split text nodes where needed. Points inside native
//! inputs address the input's value, not its (empty) child list.

use std::cmp::Ordering;

use crate::dom::{Dom, NodeId, char_len, get_content_length, split_at_char};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub node: NodeId,
    pub offset: usize,
}

impl Point {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// An ordered pair of points, `start` never after `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Point,
    pub end: Point,
}

impl Range {
    pub fn collapsed(point: Point) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Snapshot taken by [`NativeSelection::save`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SavedSelection(Option<(Point, Point)>);

#[derive(Debug, Clone, Default)]
pub struct NativeSelection {
    anchor: Option<Point>,
    focus: Option<Point>,
}

impl NativeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }

    pub fn focus(&self) -> Option<Point> {
        self.focus
    }

    pub fn exists(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn is_collapsed(&self) -> bool {
        match (self.anchor, self.focus) {
            (Some(anchor), Some(focus)) => anchor == focus,
            _ => true,
        }
    }

    pub fn collapse(&mut self, point: Point) {
        self.anchor = Some(point);
        self.focus = Some(point);
    }

    pub fn set_base_and_extent(&mut self, anchor: Point, focus: Point) {
        self.anchor = Some(anchor);
        self.focus = Some(focus);
    }

    pub fn remove_all_ranges(&mut self) {
        self.anchor = None;
        self.focus = None;
    }

    /// The selection as an ordered range, if both ends are still in the document.
    pub fn range(&self, dom: &Dom) -> Option<Range> {
        let (anchor, focus) = (self.anchor?, self.focus?);
        if !dom.is_attached(anchor.node) || !dom.is_attached(focus.node) {
            return None;
        }
        let ordered = dom.compare_points((anchor.node, anchor.offset), (focus.node, focus.offset));
        Some(match ordered {
            Ordering::Greater => Range {
                start: focus,
                end: anchor,
            },
            _ => Range {
                start: anchor,
                end: focus,
            },
        })
    }

    pub fn set_range(&mut self, range: Range) {
        self.set_base_and_extent(range.start, range.end);
    }

    pub fn save(&self) -> SavedSelection {
        SavedSelection(self.anchor.zip(self.focus))
    }

    /// Restores a saved selection unless its nodes left the document meanwhile.
    pub fn restore(&mut self, dom: &Dom, saved: SavedSelection) {
        match saved.0 {
            Some((anchor, focus)) if dom.is_attached(anchor.node) && dom.is_attached(focus.node) => {
                self.set_base_and_extent(anchor, focus)
            }
            _ => self.remove_all_ranges(),
        }
    }

    /// Collapses the selection at `node`/`offset` and focuses the editable host.
    pub fn set_cursor(&mut self, dom: &mut Dom, node: NodeId, offset: usize) -> Point {
        let max = if dom.is_text(node) || dom.input(node).is_some() {
            get_content_length(dom, node)
        } else {
            dom.children(node).len()
        };
        let point = Point::new(node, offset.min(max));

        if dom.input(node).is_some() {
            dom.set_input_selection(node, point.offset, point.offset);
            dom.focus(node);
        } else if let Some(host) = dom.closest(node, |dom, n| dom.is_content_editable(n)) {
            dom.focus(host);
        }
        self.collapse(point);
        point
    }

    /// Selects everything inside `node`.
    pub fn select_node_contents(&mut self, dom: &Dom, node: NodeId) {
        let end = if dom.is_text(node) || dom.input(node).is_some() {
            get_content_length(dom, node)
        } else {
            dom.children(node).len()
        };
        self.set_base_and_extent(Point::new(node, 0), Point::new(node, end));
    }

    /// Whether the anchor lies inside `container`.
    pub fn is_inside(&self, dom: &Dom, container: NodeId) -> bool {
        self.anchor
            .is_some_and(|anchor| dom.contains(container, anchor.node))
    }
}

// ============ range operations ============

/// Converts a point to a `(container, child index)` boundary, splitting text.
fn split_boundary(dom: &mut Dom, point: Point) -> (NodeId, usize) {
    if !dom.is_text(point.node) || dom.input(point.node).is_some() {
        let max = dom.children(point.node).len();
        return (point.node, point.offset.min(max));
    }
    let (Some(parent), Some(index)) = (dom.parent(point.node), dom.index_in_parent(point.node))
    else {
        return (point.node, point.offset);
    };
    let len = get_content_length(dom, point.node);
    if point.offset == 0 {
        (parent, index)
    } else if point.offset >= len {
        (parent, index + 1)
    } else {
        dom.split_text(point.node, point.offset);
        (parent, index + 1)
    }
}

/// Prefers a text point adjacent to a boundary.
fn resolve_boundary(dom: &Dom, container: NodeId, index: usize) -> Point {
    let children = dom.children(container);
    if let Some(prev) = index.checked_sub(1).and_then(|i| children.get(i))
        && let Some(text) = dom.text(*prev)
    {
        return Point::new(*prev, char_len(text));
    }
    if let Some(next) = children.get(index)
        && dom.is_text(*next)
    {
        return Point::new(*next, 0);
    }
    Point::new(container, index)
}

/// Removes the selected content and returns the collapsed start point.
pub fn delete_contents(dom: &mut Dom, range: Range) -> Point {
    let Range { start, end } = range;
    if range.is_collapsed() {
        return start;
    }

    if start.node == end.node {
        if let Some(input) = dom.input(start.node) {
            let value = input.value.clone();
            let (left, rest) = split_at_char(&value, start.offset);
            let (_, right) = split_at_char(rest, end.offset.saturating_sub(start.offset));
            let joined = format!("{left}{right}");
            dom.set_input_value(start.node, &joined);
            dom.set_input_selection(start.node, start.offset, start.offset);
            return start;
        }
        if let Some(text) = dom.text(start.node) {
            let text = text.to_string();
            let (left, rest) = split_at_char(&text, start.offset);
            let (_, right) = split_at_char(rest, end.offset.saturating_sub(start.offset));
            let joined = format!("{left}{right}");
            dom.set_text(start.node, &joined);
            return start;
        }
    }

    let start_was_text = dom.is_text(start.node) && start.offset > 0;
    let (sc, si) = split_boundary(dom, start);
    let (ec, ei) = split_boundary(dom, end);
    delete_between(dom, (sc, si), (ec, ei));

    if start_was_text {
        start
    } else {
        resolve_boundary(dom, sc, si)
    }
}

fn delete_between(dom: &mut Dom, (sc, si): (NodeId, usize), (ec, mut ei): (NodeId, usize)) {
    let (mut container, mut index) = (sc, si);
    loop {
        if container == ec && index >= ei {
            break;
        }
        match dom.children(container).get(index).copied() {
            None => {
                let (Some(parent), Some(position)) =
                    (dom.parent(container), dom.index_in_parent(container))
                else {
                    break;
                };
                container = parent;
                index = position + 1;
            }
            Some(node) if dom.contains(node, ec) => {
                container = node;
                index = 0;
            }
            Some(node) => {
                dom.detach(node);
                if container == ec {
                    ei -= 1;
                }
            }
        }
    }
}

/// Moves everything from `from` to the end of `container` into a new fragment.
///
/// Partially covered ancestors are shallow-cloned into the fragment so inline
/// formatting survives the cut.
pub fn extract_to_end(dom: &mut Dom, from: Point, container: NodeId) -> NodeId {
    let fragment = dom.create_fragment();
    if !dom.contains(container, from.node) {
        return fragment;
    }

    let (mut current, index) = split_boundary(dom, from);
    let mut carried: Vec<NodeId> = dom.children(current).get(index..).unwrap_or_default().to_vec();
    for node in &carried {
        dom.detach(*node);
    }

    while current != container {
        let clone = dom.clone_shallow(current);
        for node in carried.drain(..) {
            dom.append_child(clone, node);
        }
        let (Some(parent), Some(position)) = (dom.parent(current), dom.index_in_parent(current))
        else {
            break;
        };
        carried.push(clone);
        let following = dom.children(parent)[position + 1..].to_vec();
        for node in following {
            dom.detach(node);
            carried.push(node);
        }
        current = parent;
    }

    for node in carried {
        dom.append_child(fragment, node);
    }
    fragment
}

/// Inserts `node` at a point, splitting a text node if the point is inside one.
pub fn insert_node(dom: &mut Dom, at: Point, node: NodeId) {
    let (container, index) = split_boundary(dom, at);
    let reference = dom.children(container).get(index).copied();
    dom.insert_before(container, node, reference);
}
