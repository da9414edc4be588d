//! The ordered block sequence and its placement inside the redactor.
//!
//! Array order and the redactor's child order stay identical after every
//! operation. Only [`BlockManager`](crate::block_manager::BlockManager) mutates
//! this type.

use crate::block::{Block, BlockId};
use crate::dom::{Adjacent, Dom, NodeId};
use crate::tools::LifecycleEvent;

#[derive(Debug)]
pub struct Blocks {
    blocks: Vec<Block>,
    working_area: NodeId,
}

impl Blocks {
    pub fn new(working_area: NodeId) -> Self {
        Self {
            blocks: Vec::new(),
            working_area,
        }
    }

    pub fn working_area(&self) -> NodeId {
        self.working_area
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Block> {
        self.blocks.iter_mut()
    }

    pub fn index_of(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| block.id() == id)
    }

    /// Holder nodes in DOM order.
    pub fn nodes<'a>(&self, dom: &'a Dom) -> &'a [NodeId] {
        dom.children(self.working_area)
    }

    pub fn holders(&self) -> Vec<NodeId> {
        self.blocks.iter().map(Block::holder).collect()
    }

    pub fn push(&mut self, dom: &mut Dom, mut block: Block) {
        dom.append_child(self.working_area, block.holder());
        block.call(LifecycleEvent::Rendered);
        self.blocks.push(block);
    }

    /// Index assignment: inserts at `index`.
    pub fn set_at(&mut self, dom: &mut Dom, index: usize, block: Block) -> usize {
        self.insert(dom, index, block, false)
    }

    /// Inserts at `index`, clamped to the length, and returns the index used.
    ///
    /// With `replace` the block previously at `index` is detached first.
    pub fn insert(&mut self, dom: &mut Dom, index: usize, mut block: Block, replace: bool) -> usize {
        if self.blocks.is_empty() {
            self.push(dom, block);
            return 0;
        }

        let index = index.min(self.blocks.len());
        let replace = replace && index < self.blocks.len();

        if replace {
            let mut old = self.blocks.remove(index);
            dom.detach(old.holder());
            old.call(LifecycleEvent::Removed);
        }

        if index > 0 {
            let previous = self.blocks[index - 1].holder();
            dom.insert_adjacent(previous, Adjacent::AfterEnd, block.holder());
        } else if let Some(next) = self.blocks.first() {
            dom.insert_adjacent(next.holder(), Adjacent::BeforeBegin, block.holder());
        } else {
            dom.append_child(self.working_area, block.holder());
        }
        block.call(LifecycleEvent::Rendered);
        self.blocks.insert(index, block);
        index
    }

    /// Removes the block at `index`, or the last one when `index` is `None`.
    pub fn remove(&mut self, dom: &mut Dom, index: Option<usize>) -> Option<Block> {
        let index = match index {
            Some(index) => index,
            None => self.blocks.len().checked_sub(1)?,
        };
        if index >= self.blocks.len() {
            return None;
        }
        let mut block = self.blocks.remove(index);
        dom.detach(block.holder());
        block.call(LifecycleEvent::Removed);
        Some(block)
    }

    pub fn remove_all(&mut self, dom: &mut Dom) -> Vec<Block> {
        dom.remove_children(self.working_area);
        let mut removed = std::mem::take(&mut self.blocks);
        for block in &mut removed {
            block.call(LifecycleEvent::Removed);
        }
        removed
    }

    /// Moves the block at `from` so it ends up at `to`. Both must be valid.
    pub fn move_block(&mut self, dom: &mut Dom, to: usize, from: usize) {
        let mut block = self.blocks.remove(from);

        let neighbour = to
            .saturating_sub(1)
            .min(self.blocks.len().saturating_sub(1));
        match self.blocks.get(neighbour) {
            Some(previous) if to > 0 => {
                dom.insert_adjacent(previous.holder(), Adjacent::AfterEnd, block.holder());
            }
            Some(next) => {
                dom.insert_adjacent(next.holder(), Adjacent::BeforeBegin, block.holder());
            }
            None => dom.append_child(self.working_area, block.holder()),
        }

        block.call(LifecycleEvent::Moved {
            from_index: from,
            to_index: to,
        });
        self.blocks.insert(to, block);
    }

    /// Exchanges two blocks' holders and slots.
    pub fn swap(&mut self, dom: &mut Dom, first: usize, second: usize) {
        dom.swap(self.blocks[first].holder(), self.blocks[second].holder());
        self.blocks.swap(first, second);
    }

    pub fn insert_after(&mut self, dom: &mut Dom, target: BlockId, block: Block) -> usize {
        let index = self.index_of(target).map_or(self.blocks.len(), |i| i + 1);
        self.insert(dom, index, block, false)
    }
}
