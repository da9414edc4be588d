/*!
# Block manager

Owns the block sequence, the tool registry and the current block pointer.
Every structural change to the document goes through here so the array order,
the redactor's child order and the current index stay consistent.

## Usage Pattern

```rust,ignore
let index = manager.insert(&mut dom, InsertOptions::new().tool("header").data(json!({"text": "Hi"})))?;
manager.move_block(&mut dom, 0, Some(index));
manager.remove_block(&mut dom, None)?;
```

## Current index

The current index is `None` when no block is current. Writes go through
[`BlockManager::set_current_index`], which tells the previous block's tool it is
being left and the new one it is being entered.

Removing the last block always inserts a fresh default block, so the
collection is never observably empty.
*/

use serde_json::{Map, Value};

use crate::Editor;
use crate::block::{Block, BlockId, css};
use crate::blocks::Blocks;
use crate::dom::{Dom, NodeId, is_empty};
use crate::error::EditorError;
use crate::tools::{LifecycleEvent, PasteEvent, Tools};

/// Arguments of [`BlockManager::insert`].
#[derive(Debug, Clone)]
pub struct InsertOptions {
    pub tool: Option<String>,
    pub data: Value,
    pub index: Option<usize>,
    pub need_to_focus: bool,
    pub replace: bool,
}

impl Default for InsertOptions {
    fn default() -> Self {
        Self {
            tool: None,
            data: Value::Object(Map::new()),
            index: None,
            need_to_focus: true,
            replace: false,
        }
    }
}

impl InsertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(mut self, tool: &str) -> Self {
        self.tool = Some(tool.to_string());
        self
    }

    pub fn data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn focus(mut self, need_to_focus: bool) -> Self {
        self.need_to_focus = need_to_focus;
        self
    }

    pub fn replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }
}

#[derive(Debug)]
pub struct BlockManager {
    blocks: Blocks,
    tools: Tools,
    wrapper: NodeId,
    current_index: Option<usize>,
    read_only: bool,
}

impl BlockManager {
    /// `working_area` receives the block holders; `wrapper` identifies this
    /// editor instance.
    pub fn new(working_area: NodeId, wrapper: NodeId, tools: Tools) -> Self {
        Self {
            blocks: Blocks::new(working_area),
            tools,
            wrapper,
            current_index: None,
            read_only: false,
        }
    }

    pub fn tools(&self) -> &Tools {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut Tools {
        &mut self.tools
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn blocks(&self) -> &Blocks {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    // ============ current block ============

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    pub fn set_current_index(&mut self, index: Option<usize>) {
        if let Some(block) = self.current_index.and_then(|i| self.blocks.get_mut(i)) {
            block.call(LifecycleEvent::WillUnselect);
        }
        if let Some(block) = index.and_then(|i| self.blocks.get_mut(i)) {
            block.call(LifecycleEvent::WillSelect);
        }
        self.current_index = index;
    }

    pub fn current_block(&self) -> Option<&Block> {
        self.current_index.and_then(|i| self.blocks.get(i))
    }

    pub fn current_block_mut(&mut self) -> Option<&mut Block> {
        self.current_index.and_then(|i| self.blocks.get_mut(i))
    }

    pub fn get_block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn get_block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    pub fn block_by_id(&self, id: BlockId) -> Option<usize> {
        self.blocks.index_of(id)
    }

    pub fn first_block(&self) -> Option<&Block> {
        self.blocks.get(0)
    }

    pub fn last_block(&self) -> Option<&Block> {
        self.blocks.len().checked_sub(1).and_then(|i| self.blocks.get(i))
    }

    // ============ neighbours ============

    pub fn next_block(&self) -> Option<usize> {
        let next = self.current_index? + 1;
        (next < self.blocks.len()).then_some(next)
    }

    pub fn previous_block(&self) -> Option<usize> {
        self.current_index?.checked_sub(1)
    }

    /// First following block that has at least one input.
    pub fn next_contentful_block(&self, dom: &Dom) -> Option<usize> {
        let start = self.current_index.map_or(0, |i| i + 1);
        (start..self.blocks.len()).find(|i| self.has_inputs(dom, *i))
    }

    /// Nearest preceding block that has at least one input.
    pub fn previous_contentful_block(&self, dom: &Dom) -> Option<usize> {
        let end = self.current_index.unwrap_or(0);
        (0..end).rev().find(|i| self.has_inputs(dom, *i))
    }

    fn has_inputs(&self, dom: &Dom, index: usize) -> bool {
        self.blocks
            .get(index)
            .is_some_and(|block| !block.inputs(dom).is_empty())
    }

    pub fn is_editor_empty(&self, dom: &Dom) -> bool {
        self.blocks.iter().all(|block| block.is_empty(dom))
    }

    // ============ lookup by node ============

    /// Index of the block whose holder contains `node`.
    pub fn get_block_index(&self, dom: &Dom, node: NodeId) -> Option<usize> {
        let holder = dom.closest_class(node, css::WRAPPER)?;
        self.blocks.nodes(dom).iter().position(|n| *n == holder)
    }

    pub fn block_by_child_node(&self, dom: &Dom, node: NodeId) -> Option<usize> {
        let holder = dom.closest_class(node, css::WRAPPER)?;
        self.blocks.iter().position(|block| block.holder() == holder)
    }

    /// Makes the block containing `node` current, if it belongs to this editor.
    pub fn set_current_block_by_child_node(
        &mut self,
        dom: &Dom,
        node: NodeId,
        anchor: Option<NodeId>,
    ) -> Option<usize> {
        let holder = dom.closest_class(node, css::WRAPPER)?;
        let wrapper = dom.closest_class(holder, crate::ui::css::EDITOR_WRAPPER)?;
        if wrapper != self.wrapper {
            return None;
        }
        let index = self.blocks.nodes(dom).iter().position(|n| *n == holder)?;
        self.set_current_index(Some(index));
        if let Some(block) = self.blocks.get_mut(index) {
            block.update_current_input(dom, anchor);
        }
        Some(index)
    }

    // ============ insertion ============

    pub fn compose_block(&self, dom: &mut Dom, tool: &str, data: Value) -> Result<Block, EditorError> {
        let definition = self
            .tools
            .get(tool)
            .ok_or_else(|| EditorError::ToolNotFound(tool.to_string()))?;
        let instance = definition.create(data.clone(), self.read_only).map_err(|error| {
            log::error!("Tool «{tool}» failed to construct with data {data}: {error:#}");
            EditorError::tool(tool, &error)
        })?;
        Ok(Block::compose(dom, definition, instance))
    }

    /// Inserts a new block and returns the index it landed at.
    pub fn insert(&mut self, dom: &mut Dom, options: InsertOptions) -> Result<usize, EditorError> {
        let tool = options
            .tool
            .unwrap_or_else(|| self.tools.default_tool().to_string());
        let index = options.index.unwrap_or_else(|| match self.current_index {
            Some(current) if options.replace => current,
            Some(current) => current + 1,
            None => 0,
        });

        let block = self.compose_block(dom, &tool, options.data)?;
        let index = self.blocks.insert(dom, index, block, options.replace);
        self.shift_current_after_insert(index, options.need_to_focus);
        Ok(index)
    }

    fn shift_current_after_insert(&mut self, index: usize, need_to_focus: bool) {
        if need_to_focus {
            self.set_current_index(Some(index));
        } else if let Some(current) = self.current_index
            && index <= current
        {
            self.set_current_index(Some(current + 1));
        }
    }

    /// Replaces the current block with a new one.
    pub fn replace(&mut self, dom: &mut Dom, tool: &str, data: Value) -> Result<usize, EditorError> {
        let mut options = InsertOptions::new().tool(tool).data(data).replace(true);
        options.index = self.current_index;
        self.insert(dom, options)
    }

    /// Inserts a block of `tool` and hands it the pasted content.
    pub fn paste(
        &mut self,
        dom: &mut Dom,
        tool: &str,
        event: PasteEvent,
        replace: bool,
    ) -> Result<usize, EditorError> {
        let index = self.insert(dom, InsertOptions::new().tool(tool).replace(replace))?;
        if let Some(block) = self.blocks.get_mut(index)
            && let Err(error) = block.on_paste(dom, &event)
        {
            log::error!("{tool}: onPaste callback call is failed for {event:?}: {error:#}");
        }
        Ok(index)
    }

    pub fn insert_default_block_at_index(
        &mut self,
        dom: &mut Dom,
        index: usize,
        need_to_focus: bool,
    ) -> Result<usize, EditorError> {
        let tool = self.tools.default_tool().to_string();
        let block = self.compose_block(dom, &tool, Value::Object(Map::new()))?;
        let index = self.blocks.set_at(dom, index, block);
        self.shift_current_after_insert(index, need_to_focus);
        Ok(index)
    }

    /// Appends a default block and makes it current.
    pub fn insert_at_end(&mut self, dom: &mut Dom) -> Result<usize, EditorError> {
        self.set_current_index(self.blocks.len().checked_sub(1));
        self.insert(dom, InsertOptions::new())
    }

    // ============ merge and removal ============

    /// Appends `to_merge`'s data to `target` and removes `to_merge`.
    ///
    /// An empty `to_merge` is left alone. When the target's tool rejects the
    /// data, both blocks stay and the failure is returned.
    pub fn merge_blocks(&mut self, dom: &mut Dom, target: BlockId, to_merge: BlockId) -> Result<(), EditorError> {
        let (Some(target_index), Some(merge_index)) =
            (self.blocks.index_of(target), self.blocks.index_of(to_merge))
        else {
            return Err(EditorError::BlockNotFound);
        };

        let Some(source) = self.blocks.get(merge_index) else {
            return Err(EditorError::BlockNotFound);
        };
        if source.is_empty(dom) {
            return Ok(());
        }
        let source_name = source.name().to_string();
        let data = source
            .data(dom)
            .map_err(|error| EditorError::tool(&source_name, &error))?;

        let has_data = data.as_object().is_none_or(|map| !map.is_empty());
        if has_data && let Some(block) = self.blocks.get_mut(target_index) {
            if let Err(error) = block.merge_with(dom, &data) {
                log::error!(
                    "Tool «{}» failed to merge {data}: {error:#}",
                    block.name()
                );
                return Err(EditorError::tool(block.name(), &error));
            }
        }

        self.remove_block(dom, Some(merge_index))?;
        self.set_current_index(self.blocks.index_of(target));
        Ok(())
    }

    /// Removes the block at `index` (the current one when `None`).
    pub fn remove_block(&mut self, dom: &mut Dom, index: Option<usize>) -> Result<(), EditorError> {
        self.remove_block_at(dom, index, true)
    }

    /// `add_last_block` refills an emptied collection with a default block.
    fn remove_block_at(
        &mut self,
        dom: &mut Dom,
        index: Option<usize>,
        add_last_block: bool,
    ) -> Result<(), EditorError> {
        let index = index
            .or(self.current_index)
            .filter(|i| *i < self.blocks.len())
            .ok_or(EditorError::BlockNotFound)?;

        self.blocks.remove(dom, Some(index));

        if let Some(current) = self.current_index
            && current >= index
        {
            self.set_current_index(current.checked_sub(1));
        }

        if self.blocks.is_empty() {
            self.set_current_index(None);
            if add_last_block {
                self.insert(dom, InsertOptions::new())?;
            }
        } else if index == 0 {
            self.set_current_index(Some(0));
        }
        Ok(())
    }

    /// Removes every selected block and returns the lowest removed index.
    ///
    /// Callers refill the collection: removing every block leaves it empty.
    pub(crate) fn remove_selected_blocks(&mut self, dom: &mut Dom) -> Result<Option<usize>, EditorError> {
        let mut first_selected = None;
        for index in (0..self.blocks.len()).rev() {
            if !self.blocks.get(index).is_some_and(Block::selected) {
                continue;
            }
            self.remove_block_at(dom, Some(index), false)?;
            first_selected = Some(index);
        }
        Ok(first_selected)
    }

    /// Empties the editor and leaves one default block.
    pub fn remove_all_blocks(&mut self, dom: &mut Dom) -> Result<(), EditorError> {
        self.blocks.remove_all(dom);
        self.set_current_index(None);
        self.insert(dom, InsertOptions::new())?;
        if let Some(input) = self.current_block().and_then(|b| b.first_input(dom)) {
            dom.focus(input);
        }
        Ok(())
    }

    // ============ reordering ============

    /// Moves the block at `from` (the current one when `None`) to `to`.
    ///
    /// Out-of-range indices are logged and ignored.
    pub fn move_block(&mut self, dom: &mut Dom, to: usize, from: Option<usize>) {
        let Some(from) = from.or(self.current_index) else {
            log::warn!("Warning during 'move' call: incorrect indices provided.");
            return;
        };
        if to >= self.blocks.len() || from >= self.blocks.len() {
            log::warn!(
                "Warning during 'move' call: indices cannot be lower than 0 or greater than the amount of blocks."
            );
            return;
        }
        self.blocks.move_block(dom, to, from);
        self.set_current_index(Some(to));
    }

    pub fn swap(&mut self, dom: &mut Dom, from: usize, to: usize) {
        if from >= self.blocks.len() || to >= self.blocks.len() {
            log::warn!("Warning during 'swap' call: index out of range.");
            return;
        }
        self.blocks.swap(dom, from, to);
        self.set_current_index(Some(to));
    }

    // ============ focus highlight ============

    pub fn highlight_current_node(&mut self, dom: &mut Dom) {
        self.clear_focused(dom);
        if let Some(block) = self.current_block_mut() {
            block.set_focused(dom, true);
        }
    }

    pub fn clear_focused(&mut self, dom: &mut Dom) {
        for block in self.blocks.iter_mut() {
            block.set_focused(dom, false);
        }
    }

    pub fn drop_pointer(&mut self, dom: &mut Dom) {
        self.set_current_index(None);
        self.clear_focused(dom);
    }

    // ============ teardown ============

    /// Removes every block; optionally leaves one default block behind.
    pub fn clear(&mut self, dom: &mut Dom, add_default_block: bool) -> Result<(), EditorError> {
        self.blocks.remove_all(dom);
        self.drop_pointer(dom);
        if add_default_block {
            self.insert(dom, InsertOptions::new())?;
        }
        Ok(())
    }

    pub fn destroy(&mut self) {
        for block in self.blocks.iter_mut() {
            block.destroy();
        }
    }
}

/// Splits the current block at the caret: everything after it moves into a new
/// default block inserted right after.
pub fn split(ed: &mut Editor) -> Result<usize, EditorError> {
    let fragment = crate::caret::extract_fragment_from_caret_position(ed);
    let wrapper = ed.dom.create_element("div");
    if let Some(fragment) = fragment {
        ed.dom.append_child(wrapper, fragment);
    }
    let text = if is_empty(&ed.dom, wrapper) {
        String::new()
    } else {
        ed.dom.inner_html(wrapper)
    };
    ed.block_manager.insert(
        &mut ed.dom,
        InsertOptions::new().data(serde_json::json!({ "text": text })),
    )
}
