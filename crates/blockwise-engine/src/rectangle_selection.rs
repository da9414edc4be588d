/*!
# Rectangle selection

Selects whole blocks by dragging a rectangle over the empty parts of the
editor, independent of the native text selection.

## Architecture

- A drag may only start on the canvas or beside a block; presses on block
  content, toolbars or outside the editor are left to the caret.
- `stack` records the block indices visited during the drag, in visiting
  order. Moving on in the same direction pushes every skipped index, reversing
  pops until the stack is consistent with the pointer again.
- `rect_crosses_blocks` is false while the rectangle lies entirely to one side
  of the content column. Stacked blocks stay unselected in that state and
  [`inverse_selection`] flips the whole stack when the flag changes.
- Near the top or bottom edge of the viewport the page scrolls in fixed steps,
  one [`Deferred::AutoScroll`] task per tick.
*/

use crate::Editor;
use crate::block::css as block_css;
use crate::block_selection;
use crate::events::{MouseButton, MouseEvent};
use crate::layout::Rect;
use crate::tasks::Deferred;
use crate::ui::css;

/// Pixels scrolled per auto-scroll step.
pub const SCROLL_SPEED: f32 = 3.0;
/// Height of the auto-scroll zones at the viewport edges.
pub const HEIGHT_OF_SCROLL_ZONE: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScrollZone {
    Top,
    Bottom,
}

#[derive(Debug, Default)]
pub struct RectangleSelection {
    activated: bool,
    mousedown: bool,
    is_scrolling: bool,
    in_scroll_zone: Option<ScrollZone>,
    start_x: f32,
    start_y: f32,
    mouse_x: f32,
    mouse_y: f32,
    stack: Vec<usize>,
    rect_crosses_blocks: bool,
    /// Overlay rectangle in client coordinates, when shown.
    overlay: Option<Rect>,
}

impl RectangleSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_rect_activated(&self) -> bool {
        self.activated
    }

    pub fn clear_selection(&mut self) {
        self.activated = false;
    }

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    pub fn stack(&self) -> &[usize] {
        &self.stack
    }

    pub fn overlay(&self) -> Option<Rect> {
        self.overlay
    }

    fn rect_from(&self, scroll_y: f32) -> Rect {
        let left = self.start_x.min(self.mouse_x);
        let top = self.start_y.min(self.mouse_y) - scroll_y;
        Rect::new(
            left,
            top,
            (self.mouse_x - self.start_x).abs(),
            (self.mouse_y - self.start_y).abs(),
        )
    }
}

// ============ gesture ============

pub fn process_mouse_down(ed: &mut Editor, event: &MouseEvent) {
    if event.button != MouseButton::Left {
        return;
    }
    start_selection(ed, event.page_x, event.page_y);
}

pub fn start_selection(ed: &mut Editor, page_x: f32, page_y: f32) {
    let Some(element) = ed.element_from_point(page_x, page_y) else {
        return;
    };

    let inside_toolbar = ed.dom.closest_class(element, css::TOOLBAR).is_some();
    if !inside_toolbar {
        block_selection::set_all_blocks_selected(ed, false);
        let state = &mut ed.rectangle_selection;
        state.clear_selection();
        state.stack.clear();
    }

    let inside_editor = ed.dom.closest_class(element, css::EDITOR_WRAPPER).is_some();
    let avoided = [block_css::CONTENT, css::TOOLBAR, css::INLINE_TOOLBAR]
        .iter()
        .any(|class| ed.dom.closest_class(element, class).is_some());
    if !inside_editor || avoided {
        return;
    }

    let state = &mut ed.rectangle_selection;
    state.mousedown = true;
    state.start_x = page_x;
    state.start_y = page_y;
}

pub fn end_selection(ed: &mut Editor) {
    let state = &mut ed.rectangle_selection;
    state.mousedown = false;
    state.start_x = 0.0;
    state.start_y = 0.0;
    state.overlay = None;
    let rectangle = ed.ui.nodes.rectangle;
    ed.dom.set_attr(rectangle, "style", "display: none");
}

pub fn process_mouse_move(ed: &mut Editor, event: &mut MouseEvent) {
    ed.sync_viewport();
    if changing_rectangle(ed, Some((event.page_x, event.page_y))) {
        event.prevent_default();
    }
    let client_y = ed.viewport.to_client_y(event.page_y);
    scroll_by_zones(ed, client_y);
}

pub fn process_mouse_leave(ed: &mut Editor) {
    ed.rectangle_selection.clear_selection();
    end_selection(ed);
}

pub fn process_scroll(ed: &mut Editor) {
    changing_rectangle(ed, None);
}

pub fn process_mouse_up(ed: &mut Editor) {
    end_selection(ed);
}

// ============ auto-scroll ============

fn scroll_by_zones(ed: &mut Editor, client_y: f32) {
    let height = ed.viewport.height;
    let state = &mut ed.rectangle_selection;

    state.in_scroll_zone = None;
    if client_y <= HEIGHT_OF_SCROLL_ZONE {
        state.in_scroll_zone = Some(ScrollZone::Top);
    }
    if height - client_y <= HEIGHT_OF_SCROLL_ZONE {
        state.in_scroll_zone = Some(ScrollZone::Bottom);
    }

    let Some(zone) = state.in_scroll_zone else {
        state.is_scrolling = false;
        return;
    };

    if !state.is_scrolling {
        state.is_scrolling = true;
        let speed = match zone {
            ScrollZone::Top => -SCROLL_SPEED,
            ScrollZone::Bottom => SCROLL_SPEED,
        };
        scroll_vertical(ed, speed);
    }
}

/// One auto-scroll step; schedules the next while the pointer stays in a zone.
pub fn scroll_vertical(ed: &mut Editor, speed: f32) {
    let state = &ed.rectangle_selection;
    if state.in_scroll_zone.is_none() || !state.mousedown {
        return;
    }

    ed.sync_viewport();
    let moved = ed.viewport.scroll_by(speed);
    ed.rectangle_selection.mouse_y += moved;

    if moved == 0.0 {
        ed.rectangle_selection.is_scrolling = false;
        return;
    }
    changing_rectangle(ed, None);
    ed.tasks.push(Deferred::AutoScroll { speed });
}

// ============ selection ============

/// Applies a pointer position to the rectangle. Returns whether the event's
/// default action should be prevented.
fn changing_rectangle(ed: &mut Editor, pointer: Option<(f32, f32)>) -> bool {
    if !ed.rectangle_selection.mousedown {
        return false;
    }

    if let Some((x, y)) = pointer {
        ed.rectangle_selection.mouse_x = x;
        ed.rectangle_selection.mouse_y = y;
    }

    let layout = ed.layout();
    let left_pos = layout.column_left;
    let right_pos = layout.column_left + layout.column_width;
    let index = layout.block_at_y(ed.rectangle_selection.mouse_y);

    let scroll_y = ed.viewport.scroll_y;
    let state = &mut ed.rectangle_selection;
    let on_right = state.start_x > right_pos && state.mouse_x > right_pos;
    let on_left = state.start_x < left_pos && state.mouse_x < left_pos;
    state.rect_crosses_blocks = !(on_right || on_left);

    if !state.activated {
        state.rect_crosses_blocks = false;
        state.activated = true;
        let rectangle = ed.ui.nodes.rectangle;
        ed.dom.set_attr(rectangle, "style", "display: block");
    }

    let rect = ed.rectangle_selection.rect_from(scroll_y);
    ed.rectangle_selection.overlay = Some(rect);

    let Some(index) = index else {
        return false;
    };

    try_select_next_block(ed, index);
    inverse_selection(ed);

    ed.selection.remove_all_ranges();
    true
}

/// Selects or unselects the whole stack when the column crossing changed.
pub fn inverse_selection(ed: &mut Editor) {
    let Some(first) = ed.rectangle_selection.stack.first().copied() else {
        return;
    };
    let selected_mode = ed
        .block_manager
        .get_block(first)
        .is_some_and(|block| block.selected());
    let crosses = ed.rectangle_selection.rect_crosses_blocks;
    let stack = ed.rectangle_selection.stack.clone();

    if crosses && !selected_mode {
        for index in &stack {
            block_selection::select_block_by_index(ed, Some(*index));
        }
    }
    if !crosses && selected_mode {
        for index in &stack {
            block_selection::unselect_block_by_index(ed, Some(*index));
        }
    }
}

fn add_block_in_selection(ed: &mut Editor, index: usize) {
    if ed.rectangle_selection.rect_crosses_blocks {
        block_selection::select_block_by_index(ed, Some(index));
    }
    ed.rectangle_selection.stack.push(index);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StackDirection {
    Down,
    Up,
    Undefined,
}

fn try_select_next_block(ed: &mut Editor, index: usize) {
    let stack = &ed.rectangle_selection.stack;
    let last = stack.last().copied();
    if last == Some(index) {
        return;
    }

    let direction = match stack.len() {
        0 | 1 => StackDirection::Undefined,
        len if stack[len - 1] > stack[len - 2] => StackDirection::Down,
        _ => StackDirection::Up,
    };

    let Some(last) = last else {
        add_block_in_selection(ed, index);
        return;
    };

    let extends = match direction {
        StackDirection::Undefined => true,
        StackDirection::Down => index > last,
        StackDirection::Up => index < last,
    };

    if extends {
        if index > last {
            for ind in last + 1..=index {
                add_block_in_selection(ed, ind);
            }
        } else {
            for ind in (index..last).rev() {
                add_block_in_selection(ed, ind);
            }
        }
        return;
    }

    // Reversed: pop everything past the pointer.
    let forward = index > last;
    while let Some(top) = ed.rectangle_selection.stack.last().copied() {
        let beyond = if forward { index > top } else { index < top };
        if !beyond {
            break;
        }
        if ed.rectangle_selection.rect_crosses_blocks {
            block_selection::unselect_block_by_index(ed, Some(top));
        }
        ed.rectangle_selection.stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_selection::selected_blocks;
    use crate::editor::EditorConfig;
    use crate::saver::{OutputBlockData, OutputData};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    const CENTER_X: f32 = 640.0;

    fn editor(count: usize) -> Editor {
        let blocks = (0..count)
            .map(|i| OutputBlockData::new("paragraph", json!({ "text": format!("{i}") })))
            .collect();
        Editor::new(EditorConfig {
            data: Some(OutputData::new(blocks)),
            ..EditorConfig::default()
        })
        .unwrap()
    }

    /// Vertical centre of a block row: rows are 36px tall, 8px apart, from 40px.
    fn row_center(index: usize) -> f32 {
        40.0 + index as f32 * 44.0 + 18.0
    }

    fn down(ed: &mut Editor, x: f32, y: f32) {
        process_mouse_down(ed, &MouseEvent::new(MouseButton::Left, x, y));
    }

    fn drag(ed: &mut Editor, x: f32, y: f32) -> bool {
        let mut event = MouseEvent::new(MouseButton::Left, x, y);
        process_mouse_move(ed, &mut event);
        event.default_prevented()
    }

    // ============ starting ============

    #[rstest]
    #[case::canvas(CENTER_X, 20.0, true)]
    #[case::beside_block(20.0, row_center(0), true)]
    #[case::block_content(CENTER_X, row_center(0), false)]
    #[case::outside(CENTER_X, 5000.0, false)]
    fn test_where_selection_may_start(#[case] x: f32, #[case] y: f32, #[case] starts: bool) {
        let mut ed = editor(3);

        down(&mut ed, x, y);
        drag(&mut ed, x, row_center(1));

        assert_eq!(ed.rectangle_selection.is_rect_activated(), starts);
    }

    #[test]
    fn test_right_button_is_ignored() {
        let mut ed = editor(3);

        process_mouse_down(&mut ed, &MouseEvent::new(MouseButton::Right, CENTER_X, 20.0));
        drag(&mut ed, CENTER_X, row_center(1));

        assert!(!ed.rectangle_selection.is_rect_activated());
    }

    // ============ stack ============

    #[test]
    fn test_drag_down_then_back_up() {
        // Given: a drag started above the first block
        let mut ed = editor(5);
        down(&mut ed, CENTER_X, 20.0);

        // When: the pointer passes blocks 0..=2 and stops in the gap below
        for index in 0..3 {
            assert!(drag(&mut ed, CENTER_X, row_center(index)));
        }
        assert!(!drag(&mut ed, CENTER_X, row_center(2) + 22.0));

        // Then: exactly the visited blocks are selected
        assert_eq!(selected_blocks(&ed), vec![0, 1, 2]);

        // When: the pointer returns into block 1
        drag(&mut ed, CENTER_X, row_center(1));

        // Then: only block 2 is released
        assert_eq!(selected_blocks(&ed), vec![0, 1]);
        assert_eq!(ed.rectangle_selection.stack(), &[0, 1]);
    }

    #[test]
    fn test_fast_pointer_fills_skipped_blocks() {
        let mut ed = editor(6);
        down(&mut ed, CENTER_X, 20.0);

        drag(&mut ed, CENTER_X, row_center(0));
        drag(&mut ed, CENTER_X, row_center(4));

        assert_eq!(selected_blocks(&ed), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_rectangle_beside_column_selects_nothing() {
        let mut ed = editor(4);
        down(&mut ed, 20.0, 20.0);

        drag(&mut ed, 30.0, row_center(0));
        drag(&mut ed, 30.0, row_center(2));
        assert_eq!(selected_blocks(&ed), Vec::<usize>::new());
        assert_eq!(ed.rectangle_selection.stack(), &[0, 1, 2]);

        // Crossing into the column selects the whole stack at once.
        drag(&mut ed, CENTER_X, row_center(2));
        assert_eq!(selected_blocks(&ed), vec![0, 1, 2]);
    }

    #[test]
    fn test_mouse_up_hides_overlay() {
        let mut ed = editor(2);
        down(&mut ed, CENTER_X, 20.0);
        drag(&mut ed, CENTER_X, row_center(1));
        assert_eq!(
            ed.rectangle_selection.overlay(),
            Some(Rect::new(CENTER_X, 20.0, 0.0, row_center(1) - 20.0))
        );

        process_mouse_up(&mut ed);

        assert_eq!(ed.rectangle_selection.overlay(), None);
        assert!(!drag(&mut ed, CENTER_X, row_center(0)));
    }

    // ============ auto-scroll ============

    #[test]
    fn test_bottom_zone_scrolls_until_pointer_leaves() {
        let mut ed = editor(40);
        down(&mut ed, CENTER_X, 20.0);

        drag(&mut ed, CENTER_X, 790.0);
        assert!(ed.rectangle_selection.is_scrolling());
        assert_eq!(ed.viewport.scroll_y, SCROLL_SPEED);

        ed.tick(std::time::Instant::now());
        assert_eq!(ed.viewport.scroll_y, 2.0 * SCROLL_SPEED);

        let y = 400.0 + ed.viewport.scroll_y;
        drag(&mut ed, CENTER_X, y);
        ed.tick(std::time::Instant::now());
        assert!(!ed.rectangle_selection.is_scrolling());
        assert_eq!(ed.viewport.scroll_y, 2.0 * SCROLL_SPEED);
    }

    #[test]
    fn test_top_zone_at_page_top_does_not_loop() {
        let mut ed = editor(40);
        down(&mut ed, CENTER_X, 20.0);

        drag(&mut ed, CENTER_X, 10.0);

        assert!(!ed.rectangle_selection.is_scrolling());
        assert!(ed.tasks.is_empty());
    }
}
