/*!
# Flipper

Keyboard navigation through a popover's items. While activated, Tab and the
arrow keys move a focus cursor over the items and Enter activates the focused
one.

## Usage Pattern

```rust,ignore
let mut flipper = Flipper::new(items, "bw-popover-item--focused", true);
flipper.activate(None);
match flipper.handle_keydown(&mut dom, &mut tasks, &mut event) {
    FlipperOutcome::Activated(Some(item)) => run_action(item),
    _ => {}
}
```

The owner decides what activation means: the flipper only reports which item
was current when Enter was pressed.
*/

use crate::dom::{Dom, NodeId};
use crate::dom_iterator::DomIterator;
use crate::events::{Key, KeyboardEvent};
use crate::tasks::TaskQueue;

/// What a keydown did to the flipper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipperOutcome {
    Ignored,
    Flipped,
    /// Enter was pressed; carries the focused item, if any.
    Activated(Option<NodeId>),
}

#[derive(Debug, Clone)]
pub struct Flipper {
    iterator: DomIterator,
    activated: bool,
    allow_arrows: bool,
}

impl Flipper {
    pub fn new(items: Vec<NodeId>, focused_class: &str, allow_arrows: bool) -> Self {
        Self {
            iterator: DomIterator::new(items, focused_class),
            activated: false,
            allow_arrows,
        }
    }

    /// Keys a flipper may consume.
    pub fn is_used_key(key: &Key) -> bool {
        matches!(
            key,
            Key::Tab | Key::Left | Key::Right | Key::Enter | Key::Up | Key::Down
        )
    }

    pub fn activate(&mut self, items: Option<Vec<NodeId>>) {
        self.activated = true;
        if let Some(items) = items {
            self.iterator.set_items(items);
        }
    }

    pub fn deactivate(&mut self, dom: &mut Dom) {
        self.activated = false;
        self.iterator.drop_cursor(dom);
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn current_item(&self) -> Option<NodeId> {
        self.iterator.current_item()
    }

    pub fn focus_first(&mut self, dom: &mut Dom, tasks: &mut TaskQueue) {
        self.iterator.drop_cursor(dom);
        self.flip_right(dom, tasks);
    }

    pub fn flip_left(&mut self, dom: &mut Dom, tasks: &mut TaskQueue) {
        self.iterator.previous(dom, tasks);
    }

    pub fn flip_right(&mut self, dom: &mut Dom, tasks: &mut TaskQueue) {
        self.iterator.next(dom, tasks);
    }

    fn is_event_ready_for_handling(&self, dom: &Dom, event: &KeyboardEvent) -> bool {
        if !self.activated {
            return false;
        }
        match event.key {
            Key::Tab | Key::Enter => true,
            Key::Left | Key::Right | Key::Up | Key::Down => {
                let item_has_focus = self
                    .current_item()
                    .is_some_and(|item| dom.active_element() == Some(item));
                self.allow_arrows && !item_has_focus
            }
            _ => false,
        }
    }

    pub fn handle_keydown(
        &mut self,
        dom: &mut Dom,
        tasks: &mut TaskQueue,
        event: &mut KeyboardEvent,
    ) -> FlipperOutcome {
        if !self.is_event_ready_for_handling(dom, event) {
            return FlipperOutcome::Ignored;
        }
        if Self::is_used_key(&event.key) {
            event.prevent_default();
        }

        match event.key {
            Key::Tab if event.modifiers.shift => self.flip_left(dom, tasks),
            Key::Tab => self.flip_right(dom, tasks),
            Key::Left | Key::Up => self.flip_left(dom, tasks),
            Key::Right | Key::Down => self.flip_right(dom, tasks),
            Key::Enter => return FlipperOutcome::Activated(self.current_item()),
            _ => return FlipperOutcome::Ignored,
        }
        FlipperOutcome::Flipped
    }
}
