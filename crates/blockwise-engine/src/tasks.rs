//! Work deferred until the current event has been handled.
//!
//! The host drains the queue with [`Editor::tick`](crate::Editor::tick). Each
//! tick runs only the tasks queued before it started, so a task that queues
//! itself again (auto-scroll) runs once per tick.

use std::collections::VecDeque;

use crate::dom::NodeId;

#[derive(Debug, Clone, PartialEq)]
pub enum Deferred {
    /// Collapse the selection at a node once the DOM settled.
    SetCaret { node: NodeId, offset: usize },
    /// Insert HTML at the caret of the current block.
    InsertContent(String),
    /// Recompute the current block's input from the selection.
    UpdateCurrentInput,
    RemoveShadowCaret(NodeId),
    /// One rectangle-selection auto-scroll step.
    AutoScroll { speed: f32 },
    /// Put the native caret into a flipper item.
    FocusItem(NodeId),
}

#[derive(Debug, Default)]
pub struct TaskQueue {
    pending: VecDeque<Deferred>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Deferred) {
        self.pending.push_back(task);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn contains(&self, pred: impl Fn(&Deferred) -> bool) -> bool {
        self.pending.iter().any(pred)
    }

    /// Takes every task queued so far, leaving later pushes for the next tick.
    pub fn take_pending(&mut self) -> Vec<Deferred> {
        self.pending.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
