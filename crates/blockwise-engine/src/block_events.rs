/*!
# Block events

Keyboard, clipboard and drag handlers for the current block. Each handler is
a short decision procedure over the caret, block selection and block manager.

## Usage Pattern

```rust,ignore
block_events::keydown(&mut ed, &mut event);
if !event.default_prevented() {
    native::apply_key(&mut ed, &event);
}
```

The editor calls these only when the event target lies inside a block and the
editor is editable.
*/

use crate::Editor;
use crate::block_manager;
use crate::block_selection;
use crate::caret::{self, CaretPosition, SHADOW_CARET};
use crate::cross_block_selection;
use crate::error::EditorError;
use crate::events::{ClearReason, ClipboardEvent, DragEvent, Key, KeyboardEvent};
use crate::flipper::Flipper;
use crate::tasks::Deferred;

pub fn keydown(ed: &mut Editor, event: &mut KeyboardEvent) {
    before_keydown_processing(ed, event);

    match event.key {
        Key::Backspace => backspace(ed, event),
        Key::Enter => enter(ed, event),
        Key::Down | Key::Right => arrow_right_and_down(ed, event),
        Key::Up | Key::Left => arrow_left_and_up(ed, event),
        Key::Tab => tab_pressed(ed, event),
        _ => {}
    }
}

/// Typing dismisses contextual UI and any block selection.
pub fn before_keydown_processing(ed: &mut Editor, event: &KeyboardEvent) {
    if !need_toolbar_closing(ed, event) {
        return;
    }
    if !event.key.is_printable() {
        return;
    }

    ed.ui.close_toolbar(&mut ed.dom);
    ed.ui.close_conversion_toolbar();

    let modifiers = event.modifiers;
    let is_shortcut = modifiers.ctrl || modifiers.meta || modifiers.alt || modifiers.shift;
    if !is_shortcut {
        ed.block_manager.clear_focused(&mut ed.dom);
        block_selection::clear_selection(ed, Some(ClearReason::Key(event)), false);
    }
}

/// False while the keystroke belongs to an open toolbar: Tab flips its items,
/// Enter activates one.
fn need_toolbar_closing(ed: &Editor, event: &KeyboardEvent) -> bool {
    let enter = event.key == Key::Enter;
    let item_selected = enter
        && (ed.ui.toolbox.is_opened()
            || ed.ui.block_settings.is_opened()
            || ed.ui.inline_toolbar_opened()
            || ed.ui.conversion_toolbar_opened());
    let flipping = event.key == Key::Tab;

    !(event.modifiers.shift || flipping || item_selected)
}

pub fn keyup(ed: &mut Editor, event: &KeyboardEvent) {
    if event.modifiers.shift {
        return;
    }
    let empty = ed.block_manager.is_editor_empty(&ed.dom);
    ed.ui.check_emptiness(&mut ed.dom, empty);
}

// ============ tab ============

/// Opens the toolbox on an empty default block, block settings otherwise.
pub fn tab_pressed(ed: &mut Editor, event: &KeyboardEvent) {
    block_selection::clear_selection(ed, Some(ClearReason::Key(event)), false);

    let Some(block) = ed.block_manager.current_block() else {
        return;
    };
    let is_empty = block.is_empty(&ed.dom);
    let can_open_toolbox = ed.block_manager.tools().is_default(block.name()) && is_empty;
    let conversion_opened = !is_empty && ed.ui.conversion_toolbar_opened();
    let inline_opened = !is_empty && !ed.selection.is_collapsed() && ed.ui.inline_toolbar_opened();

    if can_open_toolbox {
        activate_toolbox(ed);
    } else if !conversion_opened && !inline_opened {
        activate_block_settings(ed);
    }
}

fn activate_toolbox(ed: &mut Editor) {
    if !ed.ui.toolbar.opened {
        let current = ed.block_manager.current_index();
        ed.ui.open_toolbar(&mut ed.dom, current, false);
        ed.ui.show_plus_button(&mut ed.dom);
    }
    ed.ui.toolbox.open(&mut ed.dom);
}

fn activate_block_settings(ed: &mut Editor) {
    if !ed.ui.toolbar.opened {
        if let Some(block) = ed.block_manager.current_block_mut() {
            block.set_focused(&mut ed.dom, true);
        }
        let current = ed.block_manager.current_index();
        ed.ui.open_toolbar(&mut ed.dom, current, true);
        ed.ui.hide_plus_button(&mut ed.dom);
    }
    ed.ui.block_settings.open(&mut ed.dom);
}

// ============ enter ============

fn enter(ed: &mut Editor, event: &mut KeyboardEvent) {
    let Some(index) = ed.block_manager.current_index() else {
        return;
    };
    let Some(block) = ed.block_manager.get_block(index) else {
        return;
    };

    if block.enable_line_breaks() {
        return;
    }
    if ed.ui.some_toolbar_opened() && ed.ui.some_flipper_button_focused() {
        return;
    }
    if event.modifiers.shift {
        return;
    }

    let has_media = block.has_media(&ed.dom);
    let new_current = if caret::is_at_start(ed) && !has_media {
        // The new block goes above; the caret stays with the content.
        match ed
            .block_manager
            .insert_default_block_at_index(&mut ed.dom, index, false)
        {
            Ok(_) => index + 1,
            Err(error) => {
                log::error!("Could not insert a block above {index}: {error}");
                return;
            }
        }
    } else {
        match block_manager::split(ed) {
            Ok(new_index) => new_index,
            Err(error) => {
                log::error!("Could not split block {index}: {error}");
                return;
            }
        }
    };

    caret::set_to_block(ed, new_current, CaretPosition::Default, 0);

    let opens_toolbar = ed.block_manager.get_block(new_current).is_some_and(|block| {
        ed.block_manager.tools().is_default(block.name()) && block.is_empty(&ed.dom)
    });
    if opens_toolbar {
        ed.ui.open_toolbar(&mut ed.dom, Some(new_current), false);
        ed.ui.show_plus_button(&mut ed.dom);
    }

    event.prevent_default();
}

// ============ backspace ============

fn backspace(ed: &mut Editor, event: &mut KeyboardEvent) {
    let Some(index) = ed.block_manager.current_index() else {
        return;
    };
    let Some(block) = ed.block_manager.get_block(index) else {
        return;
    };

    let in_first_input = block.current_input(&ed.dom) == block.first_input(&ed.dom);
    let line_breaks = block.enable_line_breaks();

    if block.selected() || (block.is_empty(&ed.dom) && in_first_input) {
        event.prevent_default();

        let previous_without_inputs = index
            .checked_sub(1)
            .and_then(|previous| ed.block_manager.get_block(previous))
            .is_some_and(|previous| previous.inputs(&ed.dom).is_empty());
        let target = if previous_without_inputs { Some(index - 1) } else { None };

        if let Err(error) = ed.block_manager.remove_block(&mut ed.dom, target) {
            log::error!("Could not remove block: {error}");
        }

        if let Some(current) = ed.block_manager.current_index() {
            let position = if index > 0 { CaretPosition::End } else { CaretPosition::Start };
            caret::set_to_block(ed, current, position, 0);
        }
        ed.ui.close_toolbar(&mut ed.dom);
        block_selection::clear_selection(ed, Some(ClearReason::Key(event)), false);
        return;
    }

    let at_start = caret::is_at_start(ed);
    // Tools with their own line breaks handle Backspace natively, except at the very start.
    if line_breaks && !at_start {
        return;
    }

    let can_merge = at_start && ed.selection.is_collapsed() && in_first_input && index > 0;
    if can_merge {
        event.prevent_default();
        merge_blocks(ed, index);
    }
}

/// Merges the current block into the previous one when both use the same
/// mergeable tool; otherwise removes an empty previous block or just moves
/// the caret into it.
fn merge_blocks(ed: &mut Editor, index: usize) {
    let (Some(target), Some(to_merge)) = (
        ed.block_manager.get_block(index - 1),
        ed.block_manager.get_block(index),
    ) else {
        return;
    };

    if target.name() != to_merge.name() || !target.is_mergeable() {
        if target.inputs(&ed.dom).is_empty() || target.is_empty(&ed.dom) {
            if let Err(error) = ed.block_manager.remove_block(&mut ed.dom, Some(index - 1)) {
                log::error!("Could not remove block {}: {error}", index - 1);
                return;
            }
            if let Some(current) = ed.block_manager.current_index() {
                caret::set_to_block(ed, current, CaretPosition::Default, 0);
            }
            ed.ui.close_toolbar(&mut ed.dom);
            return;
        }

        if caret::navigate_previous(ed) {
            ed.ui.close_toolbar(&mut ed.dom);
        }
        return;
    }

    let (target_id, merge_id) = (target.id(), to_merge.id());
    let content = target.plugin_content();

    caret::create_shadow(ed, content);
    match ed.block_manager.merge_blocks(&mut ed.dom, target_id, merge_id) {
        Ok(()) => {
            caret::restore_caret(ed, content);
            ed.dom.normalize(content);
            ed.ui.close_toolbar(&mut ed.dom);
        }
        Err(_) => {
            // Both blocks stay; drop the marker.
            let shadows: Vec<_> = ed
                .dom
                .descendants(content)
                .into_iter()
                .filter(|node| ed.dom.has_class(*node, SHADOW_CARET))
                .collect();
            for shadow in shadows {
                caret::remove_shadow_caret(ed, shadow);
            }
        }
    }
}

// ============ arrows ============

fn is_flipper_combination(event: &KeyboardEvent) -> bool {
    Flipper::is_used_key(&event.key) && (!event.modifiers.shift || event.key == Key::Tab)
}

fn arrow_right_and_down(ed: &mut Editor, event: &mut KeyboardEvent) {
    if ed.ui.some_toolbar_opened() && is_flipper_combination(event) {
        return;
    }

    ed.block_manager.clear_focused(&mut ed.dom);
    ed.ui.close_toolbar(&mut ed.dom);

    let should_enable_cbs = caret::is_at_end(ed) || block_selection::any_block_selected(ed);
    if event.modifiers.shift && event.key == Key::Down && should_enable_cbs {
        cross_block_selection::toggle_block_selected_state(ed, true);
        return;
    }

    let forward = event.key == Key::Down || (event.key == Key::Right && !ed.ui.is_rtl());
    let navigated = if forward {
        caret::navigate_next(ed)
    } else {
        caret::navigate_previous(ed)
    };
    settle_navigation(ed, event, navigated);
}

fn arrow_left_and_up(ed: &mut Editor, event: &mut KeyboardEvent) {
    if ed.ui.some_toolbar_opened() {
        if is_flipper_combination(event) {
            return;
        }
        ed.ui.close_all_toolbars(&mut ed.dom);
    }

    ed.block_manager.clear_focused(&mut ed.dom);
    ed.ui.close_toolbar(&mut ed.dom);

    let should_enable_cbs = caret::is_at_start(ed) || block_selection::any_block_selected(ed);
    if event.modifiers.shift && event.key == Key::Up && should_enable_cbs {
        cross_block_selection::toggle_block_selected_state(ed, false);
        return;
    }

    let backward = event.key == Key::Up || (event.key == Key::Left && !ed.ui.is_rtl());
    let navigated = if backward {
        caret::navigate_previous(ed)
    } else {
        caret::navigate_next(ed)
    };
    settle_navigation(ed, event, navigated);
}

/// Navigated carets replace the native one-character move. Otherwise the
/// host moves the caret and the current input is recomputed afterwards.
fn settle_navigation(ed: &mut Editor, event: &mut KeyboardEvent, navigated: bool) {
    if navigated {
        event.prevent_default();
    } else {
        ed.tasks.push(Deferred::UpdateCurrentInput);
    }
    block_selection::clear_selection(ed, Some(ClearReason::Key(event)), false);
}

// ============ drag ============

pub fn drag_over(ed: &mut Editor, event: &DragEvent) {
    set_drop_target(ed, event, true);
}

pub fn drag_leave(ed: &mut Editor, event: &DragEvent) {
    set_drop_target(ed, event, false);
}

fn set_drop_target(ed: &mut Editor, event: &DragEvent, state: bool) {
    let Some(index) = event
        .target
        .and_then(|target| ed.block_manager.block_by_child_node(&ed.dom, target))
    else {
        return;
    };
    if let Some(block) = ed.block_manager.get_block_mut(index) {
        block.set_drop_target(&mut ed.dom, state);
    }
}

// ============ clipboard ============

pub fn handle_command_c(ed: &mut Editor, event: &mut ClipboardEvent) -> Result<(), EditorError> {
    if !block_selection::any_block_selected(ed) {
        return Ok(());
    }
    block_selection::copy_selected_blocks(ed, event)
}

/// Copies the selected blocks, then replaces them with one empty default block.
pub fn handle_command_x(ed: &mut Editor, event: &mut ClipboardEvent) -> Result<(), EditorError> {
    if !block_selection::any_block_selected(ed) {
        return Ok(());
    }

    block_selection::copy_selected_blocks(ed, event)?;

    let position = ed.block_manager.remove_selected_blocks(&mut ed.dom)?;
    ed.block_selection.clear_cache();
    let index = ed
        .block_manager
        .insert_default_block_at_index(&mut ed.dom, position.unwrap_or(0), true)?;
    caret::set_to_block(ed, index, CaretPosition::Start, 0);

    block_selection::clear_selection(ed, None, false);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_selection::{MIME_TYPE, select_block_by_index, selected_blocks};
    use crate::editor::EditorConfig;
    use crate::saver::{OutputBlockData, OutputData};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;
    use std::time::Instant;

    fn paragraphs(texts: &[&str]) -> Vec<OutputBlockData> {
        texts
            .iter()
            .map(|t| OutputBlockData::new("paragraph", json!({ "text": t })))
            .collect()
    }

    fn editor(blocks: Vec<OutputBlockData>) -> Editor {
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

    /// Places the caret `offset` chars into block `index` and settles it.
    fn caret_at(ed: &mut Editor, index: usize, offset: usize) {
        caret::set_to_block(ed, index, CaretPosition::Default, offset);
        ed.tick(Instant::now());
    }

    fn press(ed: &mut Editor, event: KeyboardEvent) -> bool {
        let mut event = event;
        keydown(ed, &mut event);
        ed.tick(Instant::now());
        event.default_prevented()
    }

    // ============ backspace ============

    #[test]
    fn test_backspace_in_only_empty_block_recreates_default() {
        // Given: one empty default block with the caret at its start
        let mut ed = editor(paragraphs(&[""]));
        caret_at(&mut ed, 0, 0);
        let before = ed.block_manager.get_block(0).unwrap().id();

        // When
        assert!(press(&mut ed, KeyboardEvent::new(Key::Backspace)));

        // Then: a fresh default block replaces it and holds the caret
        assert_eq!(ed.block_manager.len(), 1);
        assert_ne!(ed.block_manager.get_block(0).unwrap().id(), before);
        assert_eq!(ed.block_manager.current_index(), Some(0));
        assert!(caret::is_at_start(&ed));
    }

    #[test]
    fn test_backspace_merges_into_previous_paragraph() {
        // Given: caret at the start of the second paragraph
        let mut ed = editor(paragraphs(&["hello", "world"]));
        caret_at(&mut ed, 1, 0);

        // When
        assert!(press(&mut ed, KeyboardEvent::new(Key::Backspace)));

        // Then
        assert_eq!(texts(&ed), vec!["helloworld"]);
        assert_eq!(ed.block_manager.current_index(), Some(0));
        let holder = ed.block_manager.get_block(0).unwrap().holder();
        assert!(
            ed.dom
                .descendants(holder)
                .iter()
                .all(|n| !ed.dom.has_class(*n, SHADOW_CARET))
        );
    }

    #[test]
    fn test_backspace_in_empty_block_goes_to_end_of_previous() {
        let mut ed = editor(paragraphs(&["abc", ""]));
        caret_at(&mut ed, 1, 0);

        press(&mut ed, KeyboardEvent::new(Key::Backspace));

        assert_eq!(texts(&ed), vec!["abc"]);
        assert_eq!(ed.block_manager.current_index(), Some(0));
        assert!(caret::is_at_end(&ed));
    }

    #[test]
    fn test_backspace_removes_previous_block_without_inputs() {
        let mut blocks = paragraphs(&["a"]);
        blocks.push(OutputBlockData::new("delimiter", json!({})));
        blocks.extend(paragraphs(&[""]));
        let mut ed = editor(blocks);
        caret_at(&mut ed, 2, 0);

        press(&mut ed, KeyboardEvent::new(Key::Backspace));

        let names: Vec<&str> = ed.block_manager.blocks().iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["paragraph", "paragraph"]);
    }

    #[test]
    fn test_backspace_mid_text_is_native() {
        let mut ed = editor(paragraphs(&["hello", "world"]));
        caret_at(&mut ed, 1, 2);

        assert!(!press(&mut ed, KeyboardEvent::new(Key::Backspace)));
        assert_eq!(ed.block_manager.len(), 2);
    }

    #[test]
    fn test_backspace_into_different_tool_navigates() {
        let mut blocks = vec![OutputBlockData::new("header", json!({ "text": "Title", "level": 2 }))];
        blocks.extend(paragraphs(&["body"]));
        let mut ed = editor(blocks);
        caret_at(&mut ed, 1, 0);

        assert!(press(&mut ed, KeyboardEvent::new(Key::Backspace)));

        assert_eq!(texts(&ed), vec!["Title", "body"]);
        assert_eq!(ed.block_manager.current_index(), Some(0));
        assert!(caret::is_at_end(&ed));
    }

    // ============ enter ============

    #[test]
    fn test_enter_splits_block_at_caret() {
        // Given: "ab|cd"
        let mut ed = editor(paragraphs(&["abcd"]));
        caret_at(&mut ed, 0, 2);

        // When
        assert!(press(&mut ed, KeyboardEvent::new(Key::Enter)));

        // Then
        assert_eq!(texts(&ed), vec!["ab", "cd"]);
        assert_eq!(ed.block_manager.current_index(), Some(1));
        assert!(caret::is_at_start(&ed));
    }

    #[test]
    fn test_enter_at_start_inserts_block_above() {
        let mut ed = editor(paragraphs(&["abc"]));
        caret_at(&mut ed, 0, 0);

        press(&mut ed, KeyboardEvent::new(Key::Enter));

        assert_eq!(texts(&ed), vec!["", "abc"]);
        assert_eq!(ed.block_manager.current_index(), Some(1));
    }

    #[test]
    fn test_enter_at_end_opens_toolbar_for_empty_block() {
        let mut ed = editor(paragraphs(&["abc"]));
        caret_at(&mut ed, 0, 3);

        press(&mut ed, KeyboardEvent::new(Key::Enter));

        assert_eq!(texts(&ed), vec!["abc", ""]);
        assert!(ed.ui.toolbar.opened);
        assert!(ed.ui.toolbar.plus_visible);
    }

    #[rstest]
    #[case::shift(KeyboardEvent::new(Key::Enter).shift())]
    fn test_enter_left_to_host(#[case] event: KeyboardEvent) {
        let mut ed = editor(paragraphs(&["abcd"]));
        caret_at(&mut ed, 0, 2);

        assert!(!press(&mut ed, event));
        assert_eq!(ed.block_manager.len(), 1);
    }

    #[test]
    fn test_enter_in_code_block_is_native() {
        let mut ed = editor(vec![OutputBlockData::new("code", json!({ "code": "x" }))]);
        caret_at(&mut ed, 0, 1);

        assert!(!press(&mut ed, KeyboardEvent::new(Key::Enter)));
        assert_eq!(ed.block_manager.len(), 1);
    }

    // ============ arrows ============

    #[rstest]
    #[case::right_at_end(Key::Right, 0, 2, true, Some(1))]
    #[case::down_at_end(Key::Down, 0, 2, true, Some(1))]
    #[case::right_mid_text(Key::Right, 0, 1, false, Some(0))]
    #[case::left_at_start(Key::Left, 1, 0, true, Some(0))]
    #[case::up_mid_text(Key::Up, 1, 1, false, Some(1))]
    fn test_arrow_navigation(
        #[case] key: Key,
        #[case] block: usize,
        #[case] offset: usize,
        #[case] prevented: bool,
        #[case] current: Option<usize>,
    ) {
        let mut ed = editor(paragraphs(&["ab", "cd"]));
        caret_at(&mut ed, block, offset);

        assert_eq!(press(&mut ed, KeyboardEvent::new(key)), prevented);
        assert_eq!(ed.block_manager.current_index(), current);
    }

    #[test]
    fn test_shift_down_at_end_selects_blocks() {
        let mut ed = editor(paragraphs(&["ab", "cd", "ef"]));
        caret_at(&mut ed, 0, 2);

        press(&mut ed, KeyboardEvent::new(Key::Down).shift());

        assert_eq!(selected_blocks(&ed), vec![0, 1]);
    }

    #[test]
    fn test_unhandled_arrow_schedules_input_update() {
        let mut ed = editor(paragraphs(&["ab"]));
        caret_at(&mut ed, 0, 1);
        let mut event = KeyboardEvent::new(Key::Right);

        keydown(&mut ed, &mut event);

        assert!(ed.tasks.contains(|task| *task == Deferred::UpdateCurrentInput));
    }

    // ============ tab ============

    #[test]
    fn test_tab_on_empty_default_block_opens_toolbox() {
        let mut ed = editor(paragraphs(&[""]));
        caret_at(&mut ed, 0, 0);

        press(&mut ed, KeyboardEvent::new(Key::Tab));

        assert!(ed.ui.toolbox.is_opened());
        assert!(ed.ui.toolbar.plus_visible);
        assert!(!ed.ui.block_settings.is_opened());
    }

    #[test]
    fn test_tab_on_filled_block_opens_settings() {
        let mut ed = editor(paragraphs(&["text"]));
        caret_at(&mut ed, 0, 1);

        press(&mut ed, KeyboardEvent::new(Key::Tab));

        assert!(ed.ui.block_settings.is_opened());
        assert!(ed.ui.toolbar.actions_visible);
        assert!(ed.block_manager.get_block(0).unwrap().focused());
    }

    // ============ typing ============

    #[test]
    fn test_printable_key_closes_toolbar_and_selection() {
        let mut ed = editor(paragraphs(&["ab", "cd"]));
        caret_at(&mut ed, 0, 1);
        ed.ui.open_toolbar(&mut ed.dom, Some(0), true);
        select_block_by_index(&mut ed, Some(1));
        let input = ed.block_manager.get_block(0).unwrap().first_input(&ed.dom).unwrap();
        ed.selection.set_cursor(&mut ed.dom, input, 0);

        press(&mut ed, KeyboardEvent::new(Key::Character('x')));

        assert!(!ed.ui.toolbar.opened);
        assert_eq!(selected_blocks(&ed), Vec::<usize>::new());
    }

    #[test]
    fn test_keyup_marks_empty_editor() {
        let mut ed = editor(paragraphs(&[""]));

        keyup(&mut ed, &KeyboardEvent::new(Key::Character('a')));

        assert!(ed.dom.has_class(ed.ui.nodes.wrapper, crate::ui::css::EDITOR_EMPTY));
    }

    // ============ clipboard ============

    #[test]
    fn test_copy_without_selection_is_noop() {
        let mut ed = editor(paragraphs(&["a"]));
        let mut event = ClipboardEvent::new();

        handle_command_c(&mut ed, &mut event).unwrap();

        assert!(!event.default_prevented());
        assert!(event.clipboard_data.is_empty());
    }

    #[test]
    fn test_cut_replaces_selection_with_default_block() {
        // Given: blocks 1 and 2 of four selected
        let mut ed = editor(paragraphs(&["a", "b", "c", "d"]));
        select_block_by_index(&mut ed, Some(1));
        select_block_by_index(&mut ed, Some(2));
        let mut event = ClipboardEvent::new();

        // When
        handle_command_x(&mut ed, &mut event).unwrap();
        ed.tick(Instant::now());

        // Then
        assert_eq!(texts(&ed), vec!["a", "", "d"]);
        assert_eq!(ed.block_manager.current_index(), Some(1));
        assert!(caret::is_at_start(&ed));
        assert_eq!(event.clipboard_data.get_data("text/plain"), Some("b\n\nc"));
        let copied: serde_json::Value =
            serde_json::from_str(event.clipboard_data.get_data(MIME_TYPE).unwrap()).unwrap();
        assert_eq!(copied.as_array().map(Vec::len), Some(2));
    }

    // ============ drag ============

    #[test]
    fn test_drag_over_and_leave_toggle_drop_target() {
        let mut ed = editor(paragraphs(&["a", "b"]));
        let input = ed.block_manager.get_block(1).unwrap().first_input(&ed.dom).unwrap();

        drag_over(&mut ed, &DragEvent::new(Some(input)));
        assert!(ed.block_manager.get_block(1).unwrap().drop_target());

        drag_leave(&mut ed, &DragEvent::new(Some(input)));
        assert!(!ed.block_manager.get_block(1).unwrap().drop_target());
    }
}
