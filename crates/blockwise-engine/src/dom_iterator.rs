//! Cyclic cursor over a list of elements, marking the focused one with a class.

use crate::dom::{Dom, NodeId, can_set_caret};
use crate::tasks::{Deferred, TaskQueue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub struct DomIterator {
    items: Vec<NodeId>,
    cursor: Option<usize>,
    focused_class: String,
}

impl DomIterator {
    pub fn new(items: Vec<NodeId>, focused_class: &str) -> Self {
        Self {
            items,
            cursor: None,
            focused_class: focused_class.to_string(),
        }
    }

    pub fn current_item(&self) -> Option<NodeId> {
        self.cursor.and_then(|index| self.items.get(index).copied())
    }

    pub fn items(&self) -> &[NodeId] {
        &self.items
    }

    pub fn set_items(&mut self, items: Vec<NodeId>) {
        self.items = items;
        self.cursor = self.cursor.filter(|index| *index < self.items.len());
    }

    pub fn next(&mut self, dom: &mut Dom, tasks: &mut TaskQueue) {
        self.cursor = self.leaf(dom, tasks, Direction::Right);
    }

    pub fn previous(&mut self, dom: &mut Dom, tasks: &mut TaskQueue) {
        self.cursor = self.leaf(dom, tasks, Direction::Left);
    }

    pub fn drop_cursor(&mut self, dom: &mut Dom) {
        if let Some(item) = self.current_item() {
            dom.remove_class(item, &self.focused_class);
        }
        self.cursor = None;
    }

    fn leaf(&self, dom: &mut Dom, tasks: &mut TaskQueue, direction: Direction) -> Option<usize> {
        if self.items.is_empty() {
            return self.cursor;
        }
        let len = self.items.len();

        if let Some(item) = self.current_item() {
            dom.remove_class(item, &self.focused_class);
        }

        let index = match (self.cursor, direction) {
            (None, Direction::Right) => 0,
            (None, Direction::Left) => len - 1,
            (Some(cursor), Direction::Right) => (cursor + 1) % len,
            (Some(cursor), Direction::Left) => (len + cursor - 1) % len,
        };

        let item = self.items[index];
        if can_set_caret(dom, item) {
            tasks.push(Deferred::FocusItem(item));
        }
        dom.add_class(item, &self.focused_class);
        Some(index)
    }
}
