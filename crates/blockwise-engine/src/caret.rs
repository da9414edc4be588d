/*!
# Caret

Reads and places the caret relative to blocks and their inputs.

## Boundaries

"At start" and "at end" are judged against the deepest node of the current
input, not against raw offsets: leading whitespace, empty inline wrappers and a
trailing `<br>` do not count as content.

## Deferred placement

[`set_to_block`] queues the actual cursor move as a
[`Deferred::SetCaret`](crate::tasks::Deferred) task so it lands after the
structural change that triggered it has finished. [`set_to_input`] and [`set`]
move the cursor immediately.
*/

use crate::Editor;
use crate::dom::{
    Dom, NodeId, char_len, get_content_length, get_deepest_node, is_empty, is_line_break_tag,
    is_native_input, parse_fragment, split_at_char,
};
use crate::layout::{BLOCK_PADDING, LINE_HEIGHT, Rect};
use crate::selection::{Point, delete_contents, extract_to_end, insert_node};
use crate::tasks::Deferred;

pub const SHADOW_CARET: &str = "bw-shadow-caret";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaretPosition {
    Start,
    End,
    #[default]
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

// ============ boundaries ============

/// Index of the first non-whitespace char, 0 for blank text.
fn first_letter_position(text: &str) -> usize {
    text.chars().position(|c| !c.is_whitespace()).unwrap_or(0)
}

/// Siblings of `node`'s highest ancestor that is still inside the editable host.
fn higher_level_siblings(dom: &Dom, node: NodeId, side: Side) -> Vec<NodeId> {
    let mut current = node;
    while let Some(parent) = dom.parent(current) {
        if dom.is_content_editable(parent) || dom.is_content_editable(current) {
            break;
        }
        current = parent;
    }

    let mut siblings = Vec::new();
    let step = |n| match side {
        Side::Left => dom.previous_sibling(n),
        Side::Right => dom.next_sibling(n),
    };
    let mut sibling = step(current);
    while let Some(next) = sibling {
        siblings.push(next);
        sibling = step(next);
    }
    siblings
}

fn is_line_break_like(dom: &Dom, node: NodeId) -> bool {
    let only_child_break = dom.children(node).len() == 1 && is_line_break_tag(dom, dom.children(node)[0]);
    is_line_break_tag(dom, node) || only_child_break
}

pub fn is_at_start(ed: &Editor) -> bool {
    let dom = &ed.dom;
    let Some(input) = ed.block_manager.current_block().and_then(|b| b.current_input(dom)) else {
        return false;
    };
    let first_node = get_deepest_node(dom, input, false);

    if is_native_input(dom, first_node) {
        return dom.input(first_node).is_some_and(|i| i.selection_end == 0);
    }

    let Some(focus) = ed.selection.focus() else {
        return false;
    };
    let first_letter = first_letter_position(&dom.text_content(focus.node));
    let (mut focus_node, mut focus_offset) = (focus.node, focus.offset);

    if !dom.is_text(focus_node) && !dom.children(focus_node).is_empty() {
        let children = dom.children(focus_node);
        match children.get(focus_offset) {
            Some(child) => {
                focus_node = *child;
                focus_offset = 0;
            }
            None => {
                focus_node = children[children.len() - 1];
                focus_offset = char_len(&dom.text_content(focus_node));
            }
        }
    }

    if is_line_break_tag(dom, first_node) || is_empty(dom, first_node) {
        let nothing_at_left = higher_level_siblings(dom, focus_node, Side::Left)
            .into_iter()
            .all(|node| is_empty(dom, node) && !is_line_break_like(dom, node));
        if nothing_at_left && focus_offset == first_letter {
            return true;
        }
    }

    focus_node == first_node && focus_offset <= first_letter
}

pub fn is_at_end(ed: &Editor) -> bool {
    let dom = &ed.dom;
    let Some(input) = ed.block_manager.current_block().and_then(|b| b.current_input(dom)) else {
        return false;
    };
    let last_node = get_deepest_node(dom, input, true);

    if let Some(native) = dom.input(last_node) {
        return native.selection_end == char_len(&native.value);
    }

    let Some(focus) = ed.selection.focus() else {
        return false;
    };
    let (mut focus_node, mut focus_offset) = (focus.node, focus.offset);

    if !dom.is_text(focus_node) && !dom.children(focus_node).is_empty() {
        let children = dom.children(focus_node);
        match focus_offset.checked_sub(1).and_then(|i| children.get(i)) {
            Some(child) => {
                focus_node = *child;
                focus_offset = char_len(&dom.text_content(focus_node));
            }
            None => {
                focus_node = children[0];
                focus_offset = 0;
            }
        }
    }

    if is_line_break_tag(dom, last_node) || is_empty(dom, last_node) {
        let right = higher_level_siblings(dom, focus_node, Side::Right);
        let last = right.len().saturating_sub(1);
        let nothing_at_right = right.iter().enumerate().all(|(i, node)| {
            let is_last_break = i == last && is_line_break_tag(dom, *node);
            is_last_break || (is_empty(dom, *node) && !is_line_break_tag(dom, *node))
        });
        if nothing_at_right && focus_offset == char_len(&dom.text_content(focus_node)) {
            return true;
        }
    }

    let trimmed = char_len(dom.text_content(last_node).trim_end());
    focus_node == last_node && focus_offset >= trimmed
}

// ============ placement ============

/// Puts the caret into a block. The cursor move itself is deferred.
pub fn set_to_block(ed: &mut Editor, index: usize, position: CaretPosition, offset: usize) {
    let Some(block) = ed.block_manager.get_block(index) else {
        return;
    };
    let element = match position {
        CaretPosition::Start => block.first_input(&ed.dom),
        CaretPosition::End => block.last_input(&ed.dom),
        CaretPosition::Default => block.current_input(&ed.dom),
    };
    let Some(element) = element else {
        return;
    };
    let holder = block.holder();

    let node = get_deepest_node(&ed.dom, element, position == CaretPosition::End);
    let length = get_content_length(&ed.dom, node);
    let offset = match position {
        CaretPosition::Start => 0,
        CaretPosition::End => length,
        CaretPosition::Default => offset.min(length),
    };

    ed.tasks.push(Deferred::SetCaret { node, offset });

    let anchor = ed.selection.anchor().map(|p| p.node);
    ed.block_manager
        .set_current_block_by_child_node(&ed.dom, holder, anchor);
    if let Some(block) = ed.block_manager.current_block_mut() {
        block.set_current_input(&ed.dom, element);
    }
}

/// Puts the caret into one input of the current block, immediately.
pub fn set_to_input(ed: &mut Editor, input: NodeId, position: CaretPosition, offset: usize) {
    let node = get_deepest_node(&ed.dom, input, position == CaretPosition::End);
    match position {
        CaretPosition::Start => set(ed, node, 0),
        CaretPosition::End => {
            let length = get_content_length(&ed.dom, node);
            set(ed, node, length);
        }
        CaretPosition::Default if offset > 0 => set(ed, node, offset),
        CaretPosition::Default => {}
    }
    if let Some(block) = ed.block_manager.current_block_mut() {
        block.set_current_input(&ed.dom, input);
    }
}

/// Collapses the selection at `node`/`offset` and scrolls it into view.
pub fn set(ed: &mut Editor, node: NodeId, offset: usize) {
    let point = ed.selection.set_cursor(&mut ed.dom, node, offset);
    if let Some(rect) = caret_rect(ed, point) {
        ed.viewport.scroll_into_view(rect);
    }
}

/// Line box of the caret in page coordinates.
fn caret_rect(ed: &Editor, point: Point) -> Option<Rect> {
    let dom = &ed.dom;
    let index = ed.block_manager.get_block_index(dom, point.node)?;
    let holder = ed.block_manager.get_block(index)?.holder();
    let row = ed.layout().content_rect(index)?;

    let mut line = 0;
    for node in dom.descendants(holder) {
        if node == point.node {
            if let Some(text) = dom.text(node) {
                line += split_at_char(text, point.offset).0.matches('\n').count();
            } else if let Some(input) = dom.input(node) {
                line += split_at_char(&input.value, point.offset).0.matches('\n').count();
            }
            break;
        }
        if dom.compare_points((node, 0), (point.node, point.offset)) != std::cmp::Ordering::Less {
            break;
        }
        if dom.contains(node, point.node) {
            continue;
        }
        if let Some(text) = dom.text(node) {
            line += text.matches('\n').count();
        } else if is_line_break_tag(dom, node) {
            line += 1;
        }
    }

    let top = row.top + BLOCK_PADDING + line as f32 * LINE_HEIGHT;
    Some(Rect::new(row.left, top, 1.0, LINE_HEIGHT))
}

/// Moves the caret to the last block, appending a default block unless the
/// last one already is an empty default block.
pub fn set_to_the_last_block(ed: &mut Editor) {
    let Some(last) = ed.block_manager.last_block() else {
        return;
    };
    let reusable = ed.block_manager.tools().is_default(last.name()) && last.is_empty(&ed.dom);
    let index = ed.block_manager.len() - 1;

    if reusable {
        set_to_block(ed, index, CaretPosition::Default, 0);
        return;
    }
    match ed.block_manager.insert_at_end(&mut ed.dom) {
        Ok(index) => set_to_block(ed, index, CaretPosition::Default, 0),
        Err(error) => log::error!("Could not append a block: {error}"),
    }
}

// ============ content surgery ============

/// Cuts everything from the caret to the end of the current input.
///
/// A selected range is deleted first. Returns a fragment holding the cut
/// content, or `None` without a selection.
pub fn extract_fragment_from_caret_position(ed: &mut Editor) -> Option<NodeId> {
    let range = ed.selection.range(&ed.dom)?;
    let input = ed
        .block_manager
        .current_block()
        .and_then(|block| block.current_input(&ed.dom))?;

    let point = delete_contents(&mut ed.dom, range);
    ed.selection.collapse(point);

    if let Some(native) = ed.dom.input(input) {
        let value = native.value.clone();
        let start = native.selection_start;
        let (left, right) = split_at_char(&value, start);
        let (left, right) = (left.to_string(), right.to_string());

        let fragment = ed.dom.create_fragment();
        let text = ed.dom.create_text(&right);
        ed.dom.append_child(fragment, text);
        ed.dom.set_input_value(input, &left);
        return Some(fragment);
    }

    let from = if ed.dom.contains(input, point.node) {
        point
    } else {
        Point::new(input, ed.dom.children(input).len())
    };
    Some(extract_to_end(&mut ed.dom, from, input))
}

/// Moves the caret into the next input or block when it sits at the end.
///
/// A non-default block at the very end gets a default block appended so the
/// caret can leave it. Returns whether the caret moved.
pub fn navigate_next(ed: &mut Editor) -> bool {
    let Some(block) = ed.block_manager.current_block() else {
        return false;
    };
    let next_input = block.next_input(&ed.dom);
    let is_default = ed.block_manager.tools().is_default(block.name());
    let at_end = is_at_end(ed);
    let mut next_block = ed.block_manager.next_contentful_block(&ed.dom);

    if next_block.is_none() && next_input.is_none() {
        if is_default || !at_end {
            return false;
        }
        next_block = match ed.block_manager.insert_at_end(&mut ed.dom) {
            Ok(index) => Some(index),
            Err(error) => {
                log::error!("Could not append a block: {error}");
                return false;
            }
        };
    }

    if !at_end {
        return false;
    }
    match (next_input, next_block) {
        (Some(input), _) => set_to_input(ed, input, CaretPosition::Start, 0),
        (None, Some(index)) => set_to_block(ed, index, CaretPosition::Start, 0),
        (None, None) => return false,
    }
    true
}

/// Moves the caret into the previous input or block when it sits at the start.
pub fn navigate_previous(ed: &mut Editor) -> bool {
    let Some(block) = ed.block_manager.current_block() else {
        return false;
    };
    let previous_input = block.previous_input(&ed.dom);
    let previous_block = ed.block_manager.previous_contentful_block(&ed.dom);

    if previous_block.is_none() && previous_input.is_none() {
        return false;
    }
    if !is_at_start(ed) {
        return false;
    }
    match (previous_input, previous_block) {
        (Some(input), _) => set_to_input(ed, input, CaretPosition::End, 0),
        (None, Some(index)) => set_to_block(ed, index, CaretPosition::End, 0),
        (None, None) => return false,
    }
    true
}

// ============ shadow caret ============

/// Marks the end of `element` so the caret can be put back there later.
pub fn create_shadow(ed: &mut Editor, element: NodeId) {
    let shadow = ed.dom.make("span", &[SHADOW_CARET], &[]);
    ed.dom.append_child(element, shadow);
}

/// Puts the caret where [`create_shadow`] left its marker and schedules the
/// marker's removal.
pub fn restore_caret(ed: &mut Editor, element: NodeId) {
    let Some(shadow) = ed
        .dom
        .descendants(element)
        .into_iter()
        .find(|node| ed.dom.has_class(*node, SHADOW_CARET))
    else {
        return;
    };

    let point = match ed.dom.previous_sibling(shadow) {
        Some(previous) if ed.dom.is_text(previous) => {
            Point::new(previous, get_content_length(&ed.dom, previous))
        }
        _ => {
            let parent = ed.dom.parent(shadow).unwrap_or(element);
            let index = ed.dom.index_in_parent(shadow).unwrap_or(0);
            Point::new(parent, index)
        }
    };
    ed.selection.set_cursor(&mut ed.dom, point.node, point.offset);
    ed.tasks.push(Deferred::RemoveShadowCaret(shadow));
}

/// Deferred half of [`restore_caret`].
pub(crate) fn remove_shadow_caret(ed: &mut Editor, shadow: NodeId) {
    if !ed.dom.is_attached(shadow) {
        return;
    }
    let parent = ed.dom.parent(shadow);
    ed.dom.detach(shadow);
    if let Some(parent) = parent {
        ed.dom.normalize(parent);
    }
}

/// Replaces the selection with parsed `html` and leaves the caret after it.
pub fn insert_content_at_caret_position(ed: &mut Editor, html: &str) {
    let Some(range) = ed.selection.range(&ed.dom) else {
        return;
    };

    if is_native_input(&ed.dom, range.start.node) {
        let point = delete_contents(&mut ed.dom, range);
        let value = native_value(&ed.dom, point.node);
        let (left, right) = split_at_char(&value, point.offset);
        let text = html_text(html);
        let joined = format!("{left}{text}{right}");
        ed.dom.set_input_value(point.node, &joined);
        let caret = point.offset + char_len(&text);
        ed.selection.set_cursor(&mut ed.dom, point.node, caret);
        return;
    }

    let fragment = parse_fragment(&mut ed.dom, html);
    if ed.dom.children(fragment).is_empty() {
        let empty = ed.dom.create_text("");
        ed.dom.append_child(fragment, empty);
    }
    let Some(last) = ed.dom.last_child(fragment) else {
        return;
    };

    let point = delete_contents(&mut ed.dom, range);
    insert_node(&mut ed.dom, point, fragment);

    let caret = if ed.dom.is_text(last) {
        Point::new(last, get_content_length(&ed.dom, last))
    } else {
        let parent = ed.dom.parent(last).unwrap_or(point.node);
        Point::new(parent, ed.dom.index_in_parent(last).map_or(0, |i| i + 1))
    };
    ed.selection.collapse(caret);
}

fn native_value(dom: &Dom, node: NodeId) -> String {
    dom.input(node).map(|i| i.value.clone()).unwrap_or_default()
}

/// Text a fragment of `html` would render as.
fn html_text(html: &str) -> String {
    let mut scratch = Dom::new();
    let fragment = parse_fragment(&mut scratch, html);
    scratch.text_content(fragment)
}
