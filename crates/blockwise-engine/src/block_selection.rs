/*!
# Block selection

Whole-block selection: the state behind CMD+A escalation, copy of selected
blocks and the "type over the selection" behaviour.

## CMD+A escalation

Inside a block with a single input the first CMD+A selects the input's text
natively and arms `need_to_select_all`; the second selects every block. Inside
a native input or a block with several inputs the first press arms
`ready_to_block_selection`, the second selects the current block and the third
selects everything.
*/

use std::cell::Cell;

use crate::Editor;
use crate::block::SavedData;
use crate::caret::{self, CaretPosition};
use crate::dom::{Dom, is_native_input};
use crate::error::EditorError;
use crate::events::{ClearReason, ClipboardEvent, KeyboardEvent};
use crate::sanitizer::{Sanitizer, SanitizerConfig};
use crate::selection::SavedSelection;
use crate::tasks::Deferred;
use crate::cross_block_selection;

/// MIME type of the lossless clipboard payload.
pub const MIME_TYPE: &str = "application/x-blockwise";

#[derive(Debug, Default)]
pub struct BlockSelection {
    any_block_selected_cache: Cell<Option<bool>>,
    need_to_select_all: bool,
    native_input_selected: bool,
    ready_to_block_selection: bool,
    saved: SavedSelection,
}

impl BlockSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear_cache(&self) {
        self.any_block_selected_cache.set(None);
    }

    pub fn need_to_select_all(&self) -> bool {
        self.need_to_select_all
    }

    pub fn native_input_selected(&self) -> bool {
        self.native_input_selected
    }

    pub fn ready_to_block_selection(&self) -> bool {
        self.ready_to_block_selection
    }

    fn reset_flags(&mut self) {
        self.need_to_select_all = false;
        self.native_input_selected = false;
        self.ready_to_block_selection = false;
    }
}

// ============ queries ============

pub fn all_blocks_selected(ed: &Editor) -> bool {
    ed.block_manager.blocks().iter().all(|block| block.selected())
}

/// Whether any block is selected. Cached until the next selection change.
pub fn any_block_selected(ed: &Editor) -> bool {
    let cache = &ed.block_selection.any_block_selected_cache;
    if let Some(cached) = cache.get() {
        return cached;
    }
    let any = ed.block_manager.blocks().iter().any(|block| block.selected());
    cache.set(Some(any));
    any
}

/// Indices of the selected blocks, in order.
pub fn selected_blocks(ed: &Editor) -> Vec<usize> {
    ed.block_manager
        .blocks()
        .iter()
        .enumerate()
        .filter(|(_, block)| block.selected())
        .map(|(index, _)| index)
        .collect()
}

// ============ mutations ============

pub fn set_all_blocks_selected(ed: &mut Editor, state: bool) {
    for index in 0..ed.block_manager.len() {
        if let Some(block) = ed.block_manager.get_block_mut(index) {
            block.set_selected(&mut ed.dom, state);
        }
    }
    ed.block_selection.clear_cache();
}

/// Selects one block (the current one when `index` is `None`).
pub fn select_block_by_index(ed: &mut Editor, index: Option<usize>) {
    ed.block_manager.clear_focused(&mut ed.dom);

    let Some(index) = index.or(ed.block_manager.current_index()) else {
        return;
    };

    ed.block_selection.saved = ed.selection.save();
    ed.selection.remove_all_ranges();

    if let Some(block) = ed.block_manager.get_block_mut(index) {
        block.set_selected(&mut ed.dom, true);
    }
    ed.block_selection.clear_cache();
    ed.ui.close_inline_toolbar(&mut ed.dom);
}

pub fn unselect_block_by_index(ed: &mut Editor, index: Option<usize>) {
    let Some(index) = index.or(ed.block_manager.current_index()) else {
        return;
    };
    if let Some(block) = ed.block_manager.get_block_mut(index) {
        block.set_selected(&mut ed.dom, false);
    }
    ed.block_selection.clear_cache();
}

pub fn select_all_blocks(ed: &mut Editor) {
    ed.block_selection.saved = ed.selection.save();
    ed.selection.remove_all_ranges();
    set_all_blocks_selected(ed, true);
    ed.ui.close_inline_toolbar(&mut ed.dom);
}

/// Drops every kind of block selection.
///
/// A printable key typed over selected blocks replaces them with a default
/// block holding that character.
pub fn clear_selection(ed: &mut Editor, reason: Option<ClearReason<'_>>, restore_selection: bool) {
    ed.block_selection.reset_flags();

    let printable = reason
        .and_then(|r| r.key())
        .filter(|event| event.key.is_printable());

    if let Some(event) = printable
        && any_block_selected(ed)
        && !ed.selection.exists()
    {
        type_over_selection(ed, event);
    }

    cross_block_selection::clear(ed, reason);

    if !any_block_selected(ed) || ed.rectangle_selection.is_rect_activated() {
        ed.rectangle_selection.clear_selection();
        return;
    }

    if restore_selection {
        let saved = ed.block_selection.saved;
        ed.selection.restore(&ed.dom, saved);
    }
    set_all_blocks_selected(ed, false);
}

fn type_over_selection(ed: &mut Editor, event: &KeyboardEvent) {
    let inserted = ed
        .block_manager
        .remove_selected_blocks(&mut ed.dom)
        .and_then(|index| {
            ed.block_manager
                .insert_default_block_at_index(&mut ed.dom, index.unwrap_or(0), true)
        });
    ed.block_selection.clear_cache();

    match inserted {
        Ok(index) => {
            caret::set_to_block(ed, index, CaretPosition::Default, 0);
            let key = event.key.name();
            let content = if key.chars().count() > 1 { String::new() } else { key };
            ed.tasks.push(Deferred::InsertContent(content));
        }
        Err(error) => log::error!("Could not replace the selected blocks: {error}"),
    }
}

// ============ clipboard ============

/// Writes the selected blocks to the clipboard as plain text, HTML and the
/// editor's own JSON.
pub fn copy_selected_blocks(ed: &mut Editor, event: &mut ClipboardEvent) -> Result<(), EditorError> {
    event.prevent_default();

    let config = SanitizerConfig::block_copy();
    let mut fake = Dom::new();
    let clipboard = fake.create_element("div");
    let mut saved: Vec<SavedData> = Vec::new();

    for index in selected_blocks(ed) {
        let Some(block) = ed.block_manager.get_block(index) else {
            continue;
        };
        let clean = ed.sanitizer.clean(&ed.dom.inner_html(block.holder()), &config);
        let paragraph = fake.create_element("p");
        fake.set_inner_html(paragraph, &clean);
        fake.append_child(clipboard, paragraph);

        match block.save(&ed.dom) {
            Ok(data) => saved.push(data),
            Err(error) => log::error!("Saving «{}» for the clipboard failed: {error:#}", block.name()),
        }
    }

    let text_plain = fake
        .children(clipboard)
        .iter()
        .map(|node| fake.text_content(*node))
        .collect::<Vec<_>>()
        .join("\n\n");

    event.clipboard_data.set_data("text/plain", text_plain);
    event.clipboard_data.set_data("text/html", fake.inner_html(clipboard));
    event
        .clipboard_data
        .set_data(MIME_TYPE, serde_json::to_string(&saved)?);
    Ok(())
}

// ============ shortcuts ============

/// CMD+A handler registered for the whole document.
pub fn shortcut_select_all(ed: &mut Editor, event: &mut KeyboardEvent) {
    if ed.read_only() {
        event.prevent_default();
        select_all_blocks(ed);
        return;
    }
    if ed.block_manager.current_block().is_none() {
        return;
    }
    handle_command_a(ed, event);
}

pub fn handle_command_a(ed: &mut Editor, event: &mut KeyboardEvent) {
    ed.rectangle_selection.clear_selection();

    let target = event.target.or_else(|| ed.caret_node());
    let Some(target) = target else {
        return;
    };

    if is_native_input(&ed.dom, target) && !ed.block_selection.ready_to_block_selection {
        ed.block_selection.ready_to_block_selection = true;
        return;
    }

    let Some(index) = ed.block_manager.get_block_index(&ed.dom, target) else {
        return;
    };
    let inputs = ed
        .block_manager
        .get_block(index)
        .map_or(0, |block| block.inputs(&ed.dom).len());

    if inputs > 1 && !ed.block_selection.ready_to_block_selection {
        ed.block_selection.ready_to_block_selection = true;
        return;
    }

    if inputs == 1 && !ed.block_selection.need_to_select_all {
        ed.block_selection.need_to_select_all = true;
        return;
    }

    if ed.block_selection.need_to_select_all {
        event.prevent_default();
        select_all_blocks(ed);
        ed.block_selection.need_to_select_all = false;
        ed.block_selection.ready_to_block_selection = false;
        ed.ui.close_conversion_toolbar();
    } else if ed.block_selection.ready_to_block_selection {
        event.prevent_default();
        select_block_by_index(ed, None);
        ed.block_selection.need_to_select_all = true;
    }
}

/// Read-only switches drop every selection.
pub fn toggle_read_only(ed: &mut Editor) {
    ed.selection.remove_all_ranges();
    set_all_blocks_selected(ed, false);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorConfig;
    use crate::events::Key;
    use crate::saver::{OutputBlockData, OutputData};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn editor(texts: &[&str]) -> Editor {
        let blocks = texts
            .iter()
            .map(|t| OutputBlockData::new("paragraph", json!({ "text": t })))
            .collect();
        Editor::new(EditorConfig {
            data: Some(OutputData::new(blocks)),
            ..EditorConfig::default()
        })
        .unwrap()
    }

    fn texts(ed: &Editor) -> Vec<String> {
        ed.block_manager
            .blocks()
            .iter()
            .map(|b| ed.dom.text_content(b.holder()))
            .collect()
    }

    // ============ selection state ============

    #[test]
    fn test_clear_selection_is_idempotent() {
        let mut ed = editor(&["a", "b"]);
        select_block_by_index(&mut ed, Some(1));
        assert!(any_block_selected(&ed));

        clear_selection(&mut ed, None, false);
        assert!(!any_block_selected(&ed));

        clear_selection(&mut ed, None, false);
        assert!(!any_block_selected(&ed));
    }

    #[test]
    fn test_select_block_saves_and_removes_native_selection() {
        let mut ed = editor(&["a", "b"]);
        let input = ed.block_manager.get_block(0).unwrap().first_input(&ed.dom).unwrap();
        ed.selection.set_cursor(&mut ed.dom, input, 0);

        select_block_by_index(&mut ed, Some(0));
        assert!(!ed.selection.exists());

        clear_selection(&mut ed, None, true);
        assert!(ed.selection.exists());
        assert_eq!(selected_blocks(&ed), Vec::<usize>::new());
    }

    #[test]
    fn test_all_blocks_selected() {
        let mut ed = editor(&["a", "b", "c"]);

        set_all_blocks_selected(&mut ed, true);

        assert!(all_blocks_selected(&ed));
        assert_eq!(selected_blocks(&ed), vec![0, 1, 2]);
    }

    #[test]
    fn test_typing_over_selection_replaces_blocks() {
        // Given: blocks b and c selected with no native selection
        let mut ed = editor(&["a", "b", "c", "d"]);
        select_block_by_index(&mut ed, Some(1));
        select_block_by_index(&mut ed, Some(2));
        ed.selection.remove_all_ranges();

        // When: a printable key clears the selection
        let event = KeyboardEvent::new(Key::Character('x'));
        clear_selection(&mut ed, Some(ClearReason::Key(&event)), false);
        ed.tick(std::time::Instant::now());

        // Then: one new block holds the typed character
        assert_eq!(texts(&ed), vec!["a", "x", "d"]);
        assert_eq!(ed.block_manager.current_index(), Some(1));
    }

    // ============ clipboard ============

    #[test]
    fn test_copy_writes_three_representations() {
        let mut ed = editor(&["one <b>bold</b>", "two", "three"]);
        select_block_by_index(&mut ed, Some(0));
        select_block_by_index(&mut ed, Some(1));
        let mut event = ClipboardEvent::new();

        copy_selected_blocks(&mut ed, &mut event).unwrap();

        assert!(event.default_prevented());
        let data = &event.clipboard_data;
        assert_eq!(data.get_data("text/plain"), Some("one bold\n\ntwo"));
        insta::assert_snapshot!(data.get_data("text/html").unwrap(), @"<p>one <b>bold</b></p><p>two</p>");
        let json: serde_json::Value = serde_json::from_str(data.get_data(MIME_TYPE).unwrap()).unwrap();
        assert_eq!(json[1]["tool"], "paragraph");
        assert_eq!(json[1]["data"], json!({ "text": "two" }));
    }

    // ============ CMD+A ============

    #[test]
    fn test_command_a_escalates_to_all_blocks() {
        let mut ed = editor(&["a", "b"]);
        let input = ed.block_manager.get_block(0).unwrap().first_input(&ed.dom).unwrap();
        ed.block_manager.set_current_index(Some(0));
        ed.selection.set_cursor(&mut ed.dom, input, 0);

        let mut first = KeyboardEvent::new(Key::Character('a')).ctrl().with_target(input);
        shortcut_select_all(&mut ed, &mut first);
        assert!(!first.default_prevented());
        assert!(ed.block_selection.need_to_select_all());

        let mut second = KeyboardEvent::new(Key::Character('a')).ctrl().with_target(input);
        shortcut_select_all(&mut ed, &mut second);
        assert!(second.default_prevented());
        assert!(all_blocks_selected(&ed));
    }

    #[test]
    fn test_command_a_in_native_input_needs_three_presses() {
        let mut ed = editor(&["a"]);
        ed.block_manager.set_current_index(Some(0));
        ed.block_manager
            .insert(
                &mut ed.dom,
                crate::block_manager::InsertOptions::new()
                    .tool("code")
                    .data(json!({ "code": "x" })),
            )
            .unwrap();
        let textarea = ed.block_manager.get_block(1).unwrap().first_input(&ed.dom).unwrap();
        let press = |ed: &mut Editor| {
            let mut event = KeyboardEvent::new(Key::Character('a')).ctrl().with_target(textarea);
            shortcut_select_all(ed, &mut event);
            event.default_prevented()
        };

        assert!(!press(&mut ed));
        assert!(ed.block_selection.ready_to_block_selection());

        assert!(!press(&mut ed));
        assert!(ed.block_selection.need_to_select_all());

        assert!(press(&mut ed));
        assert!(all_blocks_selected(&ed));
    }

    #[test]
    fn test_read_only_command_a_selects_everything() {
        let mut ed = editor(&["a", "b"]);
        ed.toggle_read_only(true).unwrap();

        let mut event = KeyboardEvent::new(Key::Character('a')).meta();
        shortcut_select_all(&mut ed, &mut event);

        assert!(event.default_prevented());
        assert!(all_blocks_selected(&ed));
    }
}
