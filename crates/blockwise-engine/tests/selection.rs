//! Block selection gestures: rectangle drags, cross-block pointer runs and
//! keyboard shortcuts.

use std::time::Instant;

use blockwise_engine::block_selection::{self, selected_blocks};
use blockwise_engine::caret::{self, CaretPosition};
use blockwise_engine::{
    Editor, EditorConfig, Key, KeyboardEvent, MouseButton, MouseEvent, NodeId, OutputBlockData,
    OutputData,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

const CENTER_X: f32 = 640.0;

fn editor(count: usize) -> Editor {
    let blocks = (0..count)
        .map(|i| OutputBlockData::new("paragraph", json!({ "text": format!("block {i}") })))
        .collect();
    Editor::new(EditorConfig {
        data: Some(OutputData::new(blocks)),
        ..EditorConfig::default()
    })
    .unwrap()
}

/// Vertical centre of a one-line block row.
fn row_center(index: usize) -> f32 {
    40.0 + index as f32 * 44.0 + 18.0
}

fn input(ed: &Editor, index: usize) -> NodeId {
    ed.block_manager()
        .get_block(index)
        .and_then(|block| block.first_input(ed.dom()))
        .unwrap()
}

fn mouse_down(ed: &mut Editor, x: f32, y: f32) {
    ed.mouse_down(&mut MouseEvent::new(MouseButton::Left, x, y));
}

fn mouse_move(ed: &mut Editor, x: f32, y: f32) {
    ed.mouse_move(&mut MouseEvent::new(MouseButton::Left, x, y));
}

fn mouse_over(ed: &mut Editor, from: usize, to: usize) {
    let event = MouseEvent::new(MouseButton::Left, CENTER_X, row_center(to))
        .with_target(Some(input(ed, to)))
        .with_related_target(Some(input(ed, from)));
    ed.mouse_over(&event);
}

// ============ rectangle ============

#[test]
fn test_rectangle_drag_down_and_back() {
    // Given: five blocks and a press above the first one
    let mut ed = editor(5);
    mouse_down(&mut ed, CENTER_X, 20.0);

    // When: the pointer sweeps down to the gap below block 2
    for index in 0..3 {
        mouse_move(&mut ed, CENTER_X, row_center(index));
    }
    mouse_move(&mut ed, CENTER_X, row_center(2) + 22.0);

    // Then
    assert!(ed.rectangle_selection().is_rect_activated());
    assert_eq!(selected_blocks(&ed), vec![0, 1, 2]);

    // When: it comes back into block 1
    mouse_move(&mut ed, CENTER_X, row_center(1));

    // Then: only block 2 is released
    assert_eq!(selected_blocks(&ed), vec![0, 1]);

    // And releasing the button keeps the selection but hides the overlay
    ed.mouse_up(&MouseEvent::new(MouseButton::Left, CENTER_X, row_center(1)));
    assert_eq!(ed.rectangle_selection().overlay(), None);
    assert_eq!(selected_blocks(&ed), vec![0, 1]);
}

#[test]
fn test_click_after_rectangle_clears_selection() {
    let mut ed = editor(3);
    mouse_down(&mut ed, CENTER_X, 20.0);
    mouse_move(&mut ed, CENTER_X, row_center(0));
    mouse_move(&mut ed, CENTER_X, row_center(1));
    ed.mouse_up(&MouseEvent::new(MouseButton::Left, CENTER_X, row_center(1)));
    assert!(block_selection::any_block_selected(&ed));

    mouse_down(&mut ed, CENTER_X, row_center(2));

    assert!(!block_selection::any_block_selected(&ed));
    assert_eq!(ed.block_manager().current_index(), Some(2));
}

#[test]
fn test_pointer_leaving_window_ends_rectangle() {
    let mut ed = editor(3);
    mouse_down(&mut ed, CENTER_X, 20.0);
    mouse_move(&mut ed, CENTER_X, row_center(0));

    ed.mouse_leave();
    mouse_move(&mut ed, CENTER_X, row_center(2));

    assert!(!ed.rectangle_selection().is_rect_activated());
    assert_eq!(ed.rectangle_selection().overlay(), None);
}

// ============ cross-block ============

#[test]
fn test_pointer_run_across_blocks() {
    // Given: a press inside block 0
    let mut ed = editor(4);
    mouse_down(&mut ed, CENTER_X, row_center(0));
    assert!(ed.cross_block_selection().is_watching());

    // When: the pointer runs down to block 2
    mouse_over(&mut ed, 0, 1);
    mouse_over(&mut ed, 1, 2);

    // Then
    assert_eq!(selected_blocks(&ed), vec![0, 1, 2]);
    assert!(!ed.selection().exists());

    // When: it returns to block 1
    mouse_over(&mut ed, 2, 1);

    // Then
    assert_eq!(selected_blocks(&ed), vec![0, 1]);

    // And after the release further moves change nothing
    ed.mouse_up(&MouseEvent::new(MouseButton::Left, CENTER_X, row_center(1)));
    mouse_over(&mut ed, 1, 3);
    assert_eq!(selected_blocks(&ed), vec![0, 1]);
}

#[test]
fn test_returning_to_anchor_unselects_run() {
    let mut ed = editor(3);
    mouse_down(&mut ed, CENTER_X, row_center(1));

    mouse_over(&mut ed, 1, 2);
    mouse_over(&mut ed, 2, 1);

    assert_eq!(selected_blocks(&ed), Vec::<usize>::new());
}

#[rstest]
#[case::down_from_end(Key::Down, CaretPosition::End, 2, vec![1, 2, 3])]
#[case::up_from_start(Key::Up, CaretPosition::Start, 1, vec![0, 1])]
#[case::up_from_end(Key::Up, CaretPosition::End, 1, vec![])]
fn test_shift_arrows_extend_selection(
    #[case] key: Key,
    #[case] position: CaretPosition,
    #[case] presses: usize,
    #[case] expected: Vec<usize>,
) {
    let mut ed = editor(4);
    caret::set_to_block(&mut ed, 1, position, 0);
    ed.tick(Instant::now());

    for _ in 0..presses {
        let mut event = KeyboardEvent::new(key.clone()).shift();
        ed.keydown(&mut event);
    }

    assert_eq!(selected_blocks(&ed), expected);
}

// ============ keyboard ============

#[test]
fn test_escape_then_escape() {
    let mut ed = editor(2);
    block_selection::select_all_blocks(&mut ed);
    let body = ed.dom().body();

    ed.keydown(&mut KeyboardEvent::new(Key::Escape).with_target(body));
    assert!(!block_selection::any_block_selected(&ed));

    ed.keydown(&mut KeyboardEvent::new(Key::Escape).with_target(body));
    assert!(!block_selection::any_block_selected(&ed));
}

#[test]
fn test_read_only_command_a_selects_all_at_once() {
    let mut ed = editor(3);
    ed.toggle_read_only(true).unwrap();

    let mut event = KeyboardEvent::new(Key::Character('a')).meta();
    ed.keydown(&mut event);

    assert!(event.default_prevented());
    assert_eq!(selected_blocks(&ed), vec![0, 1, 2]);
}

#[test]
fn test_enter_after_selection_opens_block_below() {
    let mut ed = editor(3);
    block_selection::select_block_by_index(&mut ed, Some(0));
    block_selection::select_block_by_index(&mut ed, Some(1));

    let mut event = KeyboardEvent::new(Key::Enter).with_target(ed.dom().body());
    ed.keydown(&mut event);
    ed.tick(Instant::now());

    assert!(event.default_prevented());
    assert_eq!(ed.block_manager().len(), 4);
    assert_eq!(ed.block_manager().current_index(), Some(2));
    assert!(!block_selection::any_block_selected(&ed));
}
