//! Dropping dragged content onto blocks.

use crate::Editor;
use crate::caret::{self, CaretPosition};
use crate::error::EditorError;
use crate::events::DragEvent;
use crate::paste;
use crate::selection::delete_contents;

#[derive(Debug, Default)]
pub struct DragNDrop {
    /// A drag that began on a text selection inside this editor.
    started_at_editor: bool,
}

impl DragNDrop {
    pub fn is_started_at_editor(&self) -> bool {
        self.started_at_editor
    }
}

pub fn drag_start(ed: &mut Editor, _event: &DragEvent) {
    let inside = ed.selection.is_inside(&ed.dom, ed.ui.nodes.redactor);
    if inside && !ed.selection.is_collapsed() {
        ed.drag.started_at_editor = true;
    }
    ed.ui.close_inline_toolbar(&mut ed.dom);
}

/// Moves the caret to the end of the block under the pointer and pastes the
/// dragged data there. Text dragged from inside the editor is cut first.
pub fn drop(ed: &mut Editor, event: &mut DragEvent) -> Result<(), EditorError> {
    if ed.read_only() {
        return Ok(());
    }
    event.prevent_default();

    for index in 0..ed.block_manager.len() {
        if let Some(block) = ed.block_manager.get_block_mut(index) {
            block.set_drop_target(&mut ed.dom, false);
        }
    }

    if ed.drag.started_at_editor {
        if let Some(range) = ed.selection.range(&ed.dom) {
            let point = delete_contents(&mut ed.dom, range);
            ed.selection.collapse(point);
        }
        ed.drag.started_at_editor = false;
    }

    let target = event
        .target
        .and_then(|node| ed.block_manager.block_by_child_node(&ed.dom, node))
        .or_else(|| ed.block_manager.len().checked_sub(1));
    let Some(target) = target else {
        return Ok(());
    };
    let Some(holder) = ed.block_manager.get_block(target).map(|b| b.holder()) else {
        return Ok(());
    };

    // The pasted content lands at the caret, so it has to be placed now.
    ed.block_manager
        .set_current_block_by_child_node(&ed.dom, holder, None);
    if let Some(input) = ed
        .block_manager
        .current_block()
        .and_then(|block| block.last_input(&ed.dom))
    {
        caret::set_to_input(ed, input, CaretPosition::End, 0);
    }

    paste::process_data_transfer(ed, &event.data_transfer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorConfig;
    use crate::events::DataTransfer;
    use crate::saver::{OutputBlockData, OutputData};
    use crate::selection::Point;
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

    fn drag_event(target: Option<crate::dom::NodeId>, text: &str) -> DragEvent {
        let mut event = DragEvent::new(target);
        let mut data = DataTransfer::new();
        data.set_data("text/plain", text);
        event.data_transfer = data;
        event
    }

    #[test]
    fn test_drop_appends_to_block_under_pointer() {
        let mut ed = editor(&["one", "two"]);
        let input = ed.block_manager.get_block(0).unwrap().first_input(&ed.dom).unwrap();

        drop(&mut ed, &mut drag_event(Some(input), "!")).unwrap();

        assert_eq!(texts(&ed), vec!["one!", "two"]);
        assert_eq!(ed.block_manager.current_index(), Some(0));
    }

    #[test]
    fn test_drop_outside_blocks_uses_last_block() {
        let mut ed = editor(&["one", "two"]);

        drop(&mut ed, &mut drag_event(None, "!")).unwrap();

        assert_eq!(texts(&ed), vec!["one", "two!"]);
    }

    #[test]
    fn test_drag_inside_editor_moves_text() {
        // Given: "cd" selected inside the second block
        let mut ed = editor(&["ab", "cdef"]);
        let input = ed.block_manager.get_block(1).unwrap().first_input(&ed.dom).unwrap();
        let text = ed.dom.first_child(input).unwrap();
        ed.selection
            .set_base_and_extent(Point::new(text, 0), Point::new(text, 2));
        drag_start(&mut ed, &DragEvent::new(Some(input)));
        assert!(ed.drag.is_started_at_editor());

        // When: it is dropped onto the first block
        let first = ed.block_manager.get_block(0).unwrap().first_input(&ed.dom).unwrap();
        drop(&mut ed, &mut drag_event(Some(first), "cd")).unwrap();

        // Then
        assert_eq!(texts(&ed), vec!["abcd", "ef"]);
        assert!(!ed.drag.is_started_at_editor());
    }

    #[test]
    fn test_drop_clears_drop_targets() {
        let mut ed = editor(&["one", "two"]);
        let input = ed.block_manager.get_block(1).unwrap().first_input(&ed.dom).unwrap();
        crate::block_events::drag_over(&mut ed, &DragEvent::new(Some(input)));

        drop(&mut ed, &mut drag_event(Some(input), "")).unwrap();

        assert!(!ed.block_manager.get_block(1).unwrap().drop_target());
    }
}
