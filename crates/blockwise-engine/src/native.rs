/*!
# Native defaults

What the host does on its own when an event reaches it unprevented: typing,
deleting, moving the caret inside an input, soft line breaks, clicks and
plain-text copy.

Offsets are counted in chars across the whole editable host, so a caret
moves over inline markup (`<b>`, `<i>`) as if it were one text run.
*/

use crate::Editor;
use crate::caret;
use crate::dom::{Dom, NodeId, char_len, get_deepest_node, get_content_length, is_native_input};
use crate::events::{ClipboardEvent, Key, KeyboardEvent, MouseButton, MouseEvent};
use crate::selection::{Point, Range, delete_contents};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Backward,
    Forward,
}

/// Closest editable surface around `node`: a native input or a contenteditable host.
pub fn editable_host(dom: &Dom, node: NodeId) -> Option<NodeId> {
    dom.closest(node, |dom, n| is_native_input(dom, n) || dom.is_content_editable(n))
}

fn host_text(dom: &Dom, host: NodeId) -> String {
    match dom.input(host) {
        Some(input) => input.value.clone(),
        None => dom.text_content(host),
    }
}

/// Host and flat char offset of a selection point.
fn locate(ed: &Editor, point: Point) -> Option<(NodeId, usize)> {
    let host = editable_host(&ed.dom, point.node)?;
    let offset = ed.dom.text_offset_within(host, point.node, point.offset)?;
    Some((host, offset))
}

/// Merges split text nodes and puts the caret back at `offset` within `host`.
fn settle(ed: &mut Editor, host: NodeId, offset: usize) {
    if ed.dom.input(host).is_none() {
        ed.dom.normalize(host);
    }
    let (node, offset) = ed.dom.point_at_text_offset(host, offset);
    ed.selection.set_cursor(&mut ed.dom, node, offset);
}

// ============ keys ============

pub fn apply_key(ed: &mut Editor, event: &KeyboardEvent) {
    if event.default_prevented() || ed.read_only() {
        return;
    }
    let modifiers = event.modifiers;
    if modifiers.ctrl || modifiers.meta || modifiers.alt {
        return;
    }

    match &event.key {
        Key::Character(c) => insert_text(ed, &c.to_string()),
        Key::Space => insert_text(ed, " "),
        Key::Enter => line_break(ed),
        Key::Backspace => delete(ed, Direction::Backward),
        Key::Delete => delete(ed, Direction::Forward),
        Key::Left | Key::Right | Key::Up | Key::Down => move_caret(ed, &event.key, modifiers.shift),
        _ => {}
    }
}

pub fn insert_text(ed: &mut Editor, text: &str) {
    let Some(range) = ed.selection.range(&ed.dom) else {
        return;
    };
    let Some((host, start)) = locate(ed, range.start) else {
        return;
    };

    if ed.dom.input(host).is_some() {
        let point = delete_contents(&mut ed.dom, range);
        let value = host_text(&ed.dom, host);
        let (left, right) = crate::dom::split_at_char(&value, point.offset);
        let joined = format!("{left}{text}{right}");
        ed.dom.set_input_value(host, &joined);
        settle(ed, host, start + char_len(text));
        return;
    }

    let html = html_escape::encode_text(text).into_owned();
    caret::insert_content_at_caret_position(ed, &html);
    settle(ed, host, start + char_len(text));
}

/// Shift+Enter, or Enter in a tool that keeps its own line breaks.
fn line_break(ed: &mut Editor) {
    let Some(anchor) = ed.selection.anchor() else {
        return;
    };
    match editable_host(&ed.dom, anchor.node) {
        Some(host) if ed.dom.input(host).is_some() => insert_text(ed, "\n"),
        Some(_) => caret::insert_content_at_caret_position(ed, "<br>"),
        None => {}
    }
}

fn delete(ed: &mut Editor, direction: Direction) {
    let Some(range) = ed.selection.range(&ed.dom) else {
        return;
    };
    let Some((host, offset)) = locate(ed, range.start) else {
        return;
    };

    if !range.is_collapsed() {
        delete_contents(&mut ed.dom, range);
        settle(ed, host, offset);
        return;
    }

    let length = char_len(&host_text(&ed.dom, host));
    let (from, to) = match direction {
        Direction::Backward if offset > 0 => (offset - 1, offset),
        Direction::Forward if offset < length => (offset, offset + 1),
        _ => return,
    };

    let (start_node, start_offset) = ed.dom.point_at_text_offset(host, from);
    let (end_node, end_offset) = ed.dom.point_at_text_offset(host, to);
    let range = Range {
        start: Point::new(start_node, start_offset),
        end: Point::new(end_node, end_offset),
    };
    delete_contents(&mut ed.dom, range);
    settle(ed, host, from);
}

fn move_caret(ed: &mut Editor, key: &Key, extend: bool) {
    let (Some(anchor), Some(focus)) = (ed.selection.anchor(), ed.selection.focus()) else {
        return;
    };
    let Some((host, offset)) = locate(ed, focus) else {
        return;
    };
    let text = host_text(&ed.dom, host);
    let target = match key {
        Key::Left => offset.saturating_sub(1),
        Key::Right => (offset + 1).min(char_len(&text)),
        Key::Up => line_above(&text, offset),
        Key::Down => line_below(&text, offset),
        _ => offset,
    };

    let (node, target) = ed.dom.point_at_text_offset(host, target);
    if extend {
        ed.selection.set_base_and_extent(anchor, Point::new(node, target));
    } else {
        ed.selection.set_cursor(&mut ed.dom, node, target);
    }
}

/// `(line start, column)` of a char offset.
fn line_position(chars: &[char], offset: usize) -> (usize, usize) {
    let start = chars[..offset]
        .iter()
        .rposition(|c| *c == '\n')
        .map_or(0, |i| i + 1);
    (start, offset - start)
}

fn line_above(text: &str, offset: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let offset = offset.min(chars.len());
    let (start, column) = line_position(&chars, offset);
    if start == 0 {
        return 0;
    }
    let (previous_start, _) = line_position(&chars, start - 1);
    previous_start + column.min(start - 1 - previous_start)
}

fn line_below(text: &str, offset: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let offset = offset.min(chars.len());
    let (_, column) = line_position(&chars, offset);
    let Some(end) = chars[offset..].iter().position(|c| *c == '\n').map(|i| offset + i) else {
        return chars.len();
    };
    let next_start = end + 1;
    let next_end = chars[next_start..]
        .iter()
        .position(|c| *c == '\n')
        .map_or(chars.len(), |i| next_start + i);
    next_start + column.min(next_end - next_start)
}

// ============ pointer ============

/// Click inside a block: caret to the end of the clicked input, block becomes current.
pub fn mouse_down(ed: &mut Editor, event: &MouseEvent) {
    if event.default_prevented() || event.button != MouseButton::Left {
        return;
    }
    let Some(host) = event.target.and_then(|target| editable_host(&ed.dom, target)) else {
        return;
    };
    let node = get_deepest_node(&ed.dom, host, true);
    let length = get_content_length(&ed.dom, node);
    ed.selection.set_cursor(&mut ed.dom, node, length);

    let anchor = ed.selection.anchor().map(|p| p.node);
    ed.block_manager
        .set_current_block_by_child_node(&ed.dom, host, anchor);
}

// ============ clipboard ============

/// Plain-text copy of a text selection; `cut` also removes it.
pub fn copy(ed: &mut Editor, event: &mut ClipboardEvent, cut: bool) {
    if event.default_prevented() {
        return;
    }
    let Some(range) = ed.selection.range(&ed.dom).filter(|r| !r.is_collapsed()) else {
        return;
    };
    let (Some((host, start)), Some((end_host, end))) = (locate(ed, range.start), locate(ed, range.end)) else {
        return;
    };
    if host != end_host {
        return;
    }

    let text: String = host_text(&ed.dom, host)
        .chars()
        .skip(start)
        .take(end - start)
        .collect();
    event.clipboard_data.set_data("text/plain", text);
    event.prevent_default();

    if cut && !ed.read_only() {
        delete_contents(&mut ed.dom, range);
        settle(ed, host, start);
    }
}
