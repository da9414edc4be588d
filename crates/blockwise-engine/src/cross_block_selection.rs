/*!
# Cross-block selection

A contiguous run of selected blocks grown by dragging the pointer across
blocks, or by Shift+arrow from the keyboard.

The run is anchored at `first` (where the gesture began) and extended to
`last`. Endpoints are stored as block ids so removals elsewhere never leave
them pointing at the wrong block.
*/

use crate::Editor;
use crate::block::BlockId;
use crate::block_selection;
use crate::caret::{self, CaretPosition};
use crate::events::{ClearReason, Key, MouseButton, MouseEvent};

#[derive(Debug, Default)]
pub struct CrossBlockSelection {
    first: Option<BlockId>,
    last: Option<BlockId>,
    /// Pointer listeners are attached between mousedown and mouseup.
    watching: bool,
}

impl CrossBlockSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_started(&self) -> bool {
        self.first.is_some() && self.last.is_some()
    }

    pub fn is_watching(&self) -> bool {
        self.watching
    }
}

/// Document mousedown: drops stale selections and starts watching when the
/// press lands inside the redactor.
pub fn enable(ed: &mut Editor, event: &MouseEvent) {
    if !ed.selection.is_collapsed() {
        block_selection::clear_selection(ed, Some(ClearReason::Pointer), false);
    }

    let inside = event
        .target
        .is_some_and(|target| ed.dom.contains(ed.ui.nodes.redactor, target));
    if inside {
        watch_selection(ed, event);
    } else {
        block_selection::clear_selection(ed, Some(ClearReason::Pointer), false);
    }
}

pub fn watch_selection(ed: &mut Editor, event: &MouseEvent) {
    if event.button != MouseButton::Left {
        return;
    }

    let first = event
        .target
        .and_then(|target| ed.block_manager.get_block_index(&ed.dom, target))
        .and_then(|index| ed.block_manager.get_block(index))
        .map(|block| block.id());

    let state = &mut ed.cross_block_selection;
    state.first = first;
    state.last = first;
    state.watching = true;
}

pub fn mouse_up(ed: &mut Editor) {
    ed.cross_block_selection.watching = false;
}

/// Pointer crossed from `related_target` into `target`.
pub fn mouse_over(ed: &mut Editor, event: &MouseEvent) {
    if !ed.cross_block_selection.watching {
        return;
    }

    let manager = &ed.block_manager;
    let related = event
        .related_target
        .and_then(|node| manager.block_by_child_node(&ed.dom, node))
        .or_else(|| {
            ed.cross_block_selection
                .last
                .and_then(|id| manager.block_by_id(id))
        });
    let target = event
        .target
        .and_then(|node| manager.block_by_child_node(&ed.dom, node));

    let (Some(related), Some(target)) = (related, target) else {
        return;
    };
    if related == target {
        return;
    }

    let first = ed
        .cross_block_selection
        .first
        .and_then(|id| ed.block_manager.block_by_id(id));

    if Some(related) == first {
        ed.selection.remove_all_ranges();
        set_selected(ed, related, true);
        set_selected(ed, target, true);
        return;
    }

    if Some(target) == first {
        set_selected(ed, related, false);
        set_selected(ed, target, false);
        return;
    }

    ed.ui.close_inline_toolbar(&mut ed.dom);
    toggle_blocks_selected_state(ed, related, target);
    ed.cross_block_selection.last = ed.block_manager.get_block(target).map(|b| b.id());
}

/// Flips every block between two indices except the anchor and one endpoint.
fn toggle_blocks_selected_state(ed: &mut Editor, first_index: usize, last_index: usize) {
    let selected = |ed: &Editor, index: usize| {
        ed.block_manager
            .get_block(index)
            .is_some_and(|block| block.selected())
    };
    let anchor = ed
        .cross_block_selection
        .first
        .and_then(|id| ed.block_manager.block_by_id(id));
    let keep = if selected(ed, first_index) != selected(ed, last_index) {
        first_index
    } else {
        last_index
    };

    for index in first_index.min(last_index)..=first_index.max(last_index) {
        if Some(index) == anchor || index == keep {
            continue;
        }
        let state = !selected(ed, index);
        set_selected(ed, index, state);
    }
}

/// Shift+arrow: extends or shrinks the run by one block.
pub fn toggle_block_selected_state(ed: &mut Editor, next: bool) {
    if ed.cross_block_selection.last.is_none() {
        let current = ed.block_manager.current_block().map(|b| b.id());
        ed.cross_block_selection.first = current;
        ed.cross_block_selection.last = current;
    }

    let resolve = |ed: &Editor, id: Option<BlockId>| id.and_then(|id| ed.block_manager.block_by_id(id));
    let Some(last) = resolve(ed, ed.cross_block_selection.last) else {
        return;
    };

    if ed.cross_block_selection.first == ed.cross_block_selection.last {
        set_selected(ed, last, true);
        ed.selection.remove_all_ranges();
    }

    let next_index = if next { last.checked_add(1) } else { last.checked_sub(1) };
    let Some(next_index) = next_index.filter(|i| *i < ed.block_manager.len()) else {
        return;
    };

    let last_selected = ed.block_manager.get_block(last).is_some_and(|b| b.selected());
    let next_selected = ed.block_manager.get_block(next_index).is_some_and(|b| b.selected());
    if last_selected != next_selected {
        set_selected(ed, next_index, true);
    } else {
        set_selected(ed, last, false);
    }

    ed.cross_block_selection.last = ed.block_manager.get_block(next_index).map(|b| b.id());
    ed.ui.close_inline_toolbar(&mut ed.dom);

    if let Some(row) = ed.layout().row(next_index) {
        ed.viewport.scroll_into_view(row);
    }
}

/// Ends the gesture and leaves the caret at the edge of the run.
pub fn clear(ed: &mut Editor, reason: Option<ClearReason<'_>>) {
    let first = ed
        .cross_block_selection
        .first
        .and_then(|id| ed.block_manager.block_by_id(id));
    let last = ed
        .cross_block_selection
        .last
        .and_then(|id| ed.block_manager.block_by_id(id));

    if let (Some(first), Some(last)) = (first, last)
        && block_selection::any_block_selected(ed)
    {
        let key = reason.and_then(|r| r.key()).map(|event| &event.key);
        match key {
            Some(Key::Up | Key::Left) => {
                caret::set_to_block(ed, first.min(last), CaretPosition::Start, 0)
            }
            _ => caret::set_to_block(ed, first.max(last), CaretPosition::End, 0),
        }
    }

    ed.cross_block_selection.first = None;
    ed.cross_block_selection.last = None;
}

fn set_selected(ed: &mut Editor, index: usize, state: bool) {
    if let Some(block) = ed.block_manager.get_block_mut(index) {
        block.set_selected(&mut ed.dom, state);
    }
    ed.block_selection.clear_cache();
}
